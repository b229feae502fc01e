#![cfg(target_arch = "wasm32")]

use glam::Vec2;
use particle_viz::sphere::camera::{pointer_ndc, OrbitCamera};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn hit(client: (f32, f32), res: (f32, f32)) -> glam::Vec3 {
    let camera = OrbitCamera::new(res.0 / res.1);
    let ndc = pointer_ndc(Vec2::new(client.0, client.1), Vec2::new(res.0, res.1));
    camera.ray_to_plane(ndc).expect("camera faces the plane")
}

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() < eps
}

#[wasm_bindgen_test]
fn centre_of_any_viewport_hits_origin() {
    for res in [(1920.0, 1080.0), (1080.0, 1920.0), (500.0, 500.0)] {
        let p = hit((res.0 / 2.0, res.1 / 2.0), res);
        assert!(p.length() < 1e-3, "res={:?} p={:?}", res, p);
    }
}

#[wasm_bindgen_test]
fn vertical_reach_ignores_aspect() {
    // Vertical field of view is fixed, so the top edge lands at the same height.
    let wide = hit((960.0, 0.0), (1920.0, 1080.0));
    let tall = hit((540.0, 0.0), (1080.0, 1920.0));
    assert!(approx_eq(wide.y, tall.y, 1e-3), "wide={:?} tall={:?}", wide, tall);
    assert!(wide.y > 0.0);

    // Horizontal reach scales with aspect.
    let wide_right = hit((1920.0, 540.0), (1920.0, 1080.0));
    let tall_right = hit((1080.0, 960.0), (1080.0, 1920.0));
    assert!(wide_right.x > tall_right.x);
}
