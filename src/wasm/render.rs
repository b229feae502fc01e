use crate::config::MaterialProperties;
use crate::error::VizError;
use crate::sphere::camera::FOV_Y_DEGREES;
use crate::sphere::{PointMesh, SphereScene};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in float a_scale;
layout(location = 2) in float a_intensity;
layout(location = 3) in float a_opacity;
layout(location = 4) in float a_metalness;

uniform mat4 u_view_proj;
uniform mat4 u_model;
uniform float u_point_scale;

out float v_intensity;
out float v_opacity;
out float v_metalness;

void main() {
    gl_Position = u_view_proj * u_model * vec4(a_position, 1.0);
    gl_PointSize = max(1.0, u_point_scale * a_scale / gl_Position.w);
    v_intensity = a_intensity;
    v_opacity = a_opacity;
    v_metalness = a_metalness;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

in float v_intensity;
in float v_opacity;
in float v_metalness;

uniform vec3 u_color;
uniform vec3 u_emissive;
uniform float u_roughness;
uniform float u_clearcoat;

out vec4 frag_color;

const vec3 KEY_DIR = vec3(0.8165, 0.4082, 0.4082);
const vec3 FILL_DIR = vec3(-0.5774, 0.5774, -0.5774);
const vec3 FILL_COLOR = vec3(0.31, 0.765, 0.969);
const vec3 VIEW_DIR = vec3(0.0, 0.0, 1.0);

void main() {
    vec2 c = gl_PointCoord * 2.0 - 1.0;
    c.y = -c.y;
    float r2 = dot(c, c);
    if (r2 > 1.0) {
        discard;
    }
    vec3 n = vec3(c, sqrt(1.0 - r2));

    float key = max(dot(n, KEY_DIR), 0.0) * 1.2;
    float fill = max(dot(n, FILL_DIR), 0.0) * 0.4;
    float rim = pow(1.0 - n.z, 3.0) * 0.3;

    float shininess = mix(256.0, 8.0, u_roughness);
    float spec = pow(max(dot(n, normalize(KEY_DIR + VIEW_DIR)), 0.0), shininess);

    vec3 diffuse = u_color * (0.075 + key * (1.0 - v_metalness)) + FILL_COLOR * fill;
    vec3 specular = mix(vec3(0.04), u_color, v_metalness) * spec * (1.0 + u_clearcoat);
    vec3 glow = u_emissive * v_intensity * 4.0;

    frag_color = vec4(diffuse + specular + glow + vec3(rim), v_opacity);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    scale: f32,
    intensity: f32,
    opacity: f32,
    metalness: f32,
}

impl From<&PointMesh> for Vertex {
    fn from(mesh: &PointMesh) -> Self {
        Self {
            position: mesh.position.to_array(),
            scale: mesh.scale,
            intensity: mesh.intensity,
            opacity: mesh.opacity,
            metalness: mesh.metalness,
        }
    }
}

struct Uniforms {
    view_proj: Option<WebGlUniformLocation>,
    model: Option<WebGlUniformLocation>,
    point_scale: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    emissive: Option<WebGlUniformLocation>,
    roughness: Option<WebGlUniformLocation>,
    clearcoat: Option<WebGlUniformLocation>,
}

/// Draws sphere particles as lit point sprites.
pub struct PointRenderer {
    gl: GL,
    canvas: HtmlCanvasElement,
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    buffer: WebGlBuffer,
    uniforms: Uniforms,
    vertices: Vec<Vertex>,
}

impl PointRenderer {
    /// Everything GL-side is created up front; any failure leaves nothing behind.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, VizError> {
        let gl: GL = canvas
            .get_context("webgl2")?
            .ok_or(VizError::ContextUnavailable("WebGL2"))?
            .dyn_into()
            .map_err(|_| VizError::ContextUnavailable("WebGL2"))?;

        let program = link(&gl)?;
        let Some(vao) = gl.create_vertex_array() else {
            gl.delete_program(Some(&program));
            return Err(VizError::ContextUnavailable("vertex array"));
        };
        let Some(buffer) = gl.create_buffer() else {
            gl.delete_vertex_array(Some(&vao));
            gl.delete_program(Some(&program));
            return Err(VizError::ContextUnavailable("vertex buffer"));
        };

        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        let stride = std::mem::size_of::<Vertex>() as i32;
        let attributes = [(0, 3, 0), (1, 1, 12), (2, 1, 16), (3, 1, 20), (4, 1, 24)];
        for (index, size, offset) in attributes {
            gl.enable_vertex_attrib_array(index);
            gl.vertex_attrib_pointer_with_i32(index, size, GL::FLOAT, false, stride, offset);
        }
        gl.bind_vertex_array(None);

        let uniform = |name: &str| gl.get_uniform_location(&program, name);
        let uniforms = Uniforms {
            view_proj: uniform("u_view_proj"),
            model: uniform("u_model"),
            point_scale: uniform("u_point_scale"),
            color: uniform("u_color"),
            emissive: uniform("u_emissive"),
            roughness: uniform("u_roughness"),
            clearcoat: uniform("u_clearcoat"),
        };

        gl.enable(GL::DEPTH_TEST);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);

        Ok(Self {
            gl,
            canvas,
            program,
            vao,
            buffer,
            uniforms,
            vertices: Vec::new(),
        })
    }

    /// Match the drawing buffer to the CSS size times the (capped) pixel ratio.
    pub fn resize(&self, css_width: f32, css_height: f32, pixel_ratio: f32) {
        let ratio = pixel_ratio.clamp(1.0, 2.0);
        let width = (css_width * ratio) as u32;
        let height = (css_height * ratio) as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    pub fn render(&mut self, scene: &SphereScene<PointMesh>) {
        let gl = &self.gl;
        let engine = &scene.engine;

        self.vertices.clear();
        self.vertices
            .extend(engine.particles().iter().map(|p| Vertex::from(&p.mesh)));

        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);

        gl.use_program(Some(&self.program));
        gl.bind_vertex_array(Some(&self.vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.buffer));
        gl.buffer_data_with_u8_array(
            GL::ARRAY_BUFFER,
            bytemuck::cast_slice(&self.vertices),
            GL::DYNAMIC_DRAW,
        );

        let model = Mat4::from_quat(engine.group_rotation(scene.time()));
        let u = &self.uniforms;
        gl.uniform_matrix4fv_with_f32_array(
            u.view_proj.as_ref(),
            false,
            &scene.camera.view_projection().to_cols_array(),
        );
        gl.uniform_matrix4fv_with_f32_array(u.model.as_ref(), false, &model.to_cols_array());

        // Pixel diameter of a unit-distance particle.
        let focal = self.canvas.height() as f32 / (2.0 * (FOV_Y_DEGREES.to_radians() / 2.0).tan());
        gl.uniform1f(u.point_scale.as_ref(), engine.config().particle_size * 2.0 * focal);
        set_material(gl, u, &engine.config().material);

        gl.draw_arrays(GL::POINTS, 0, self.vertices.len() as i32);
        gl.bind_vertex_array(None);
    }

    pub fn dispose(&self) {
        self.gl.delete_buffer(Some(&self.buffer));
        self.gl.delete_vertex_array(Some(&self.vao));
        self.gl.delete_program(Some(&self.program));
    }
}

fn set_material(gl: &GL, u: &Uniforms, material: &MaterialProperties) {
    let color = material.color.to_vec3();
    let emissive = material.emissive.to_vec3();
    gl.uniform3f(u.color.as_ref(), color.x, color.y, color.z);
    gl.uniform3f(u.emissive.as_ref(), emissive.x, emissive.y, emissive.z);
    gl.uniform1f(u.roughness.as_ref(), material.roughness);
    gl.uniform1f(u.clearcoat.as_ref(), material.clearcoat);
}

fn compile(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, VizError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| VizError::Shader("unable to create shader".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(VizError::Shader(log))
    }
}

fn link(gl: &GL) -> Result<WebGlProgram, VizError> {
    let vertex = compile(gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
    let fragment = match compile(gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER) {
        Ok(shader) => shader,
        Err(e) => {
            gl.delete_shader(Some(&vertex));
            return Err(e);
        }
    };
    let Some(program) = gl.create_program() else {
        gl.delete_shader(Some(&vertex));
        gl.delete_shader(Some(&fragment));
        return Err(VizError::Shader("unable to create program".into()));
    };
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);
    gl.delete_shader(Some(&vertex));
    gl.delete_shader(Some(&fragment));

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(VizError::Shader(log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn canvas() -> HtmlCanvasElement {
        web_sys::window()
            .unwrap()
            .document()
            .unwrap()
            .create_element("canvas")
            .unwrap()
            .dyn_into()
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn canvas_taken_by_2d_is_refused() {
        let canvas = canvas();
        canvas.get_context("2d").unwrap();
        assert!(matches!(
            PointRenderer::new(canvas),
            Err(VizError::ContextUnavailable("WebGL2"))
        ));
    }

    #[wasm_bindgen_test]
    fn dispose_releases_gl_objects() {
        let renderer = PointRenderer::new(canvas()).unwrap();
        assert!(renderer.gl.is_program(Some(&renderer.program)));
        renderer.dispose();
        assert!(!renderer.gl.is_program(Some(&renderer.program)));
        assert!(!renderer.gl.is_buffer(Some(&renderer.buffer)));
        assert!(!renderer.gl.is_vertex_array(Some(&renderer.vao)));
    }
}
