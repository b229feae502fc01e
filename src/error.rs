//! Error types for the visualizers.
//!
//! Only setup can fail. Once an engine is running every input is clamped
//! and every degenerate distance is guarded, so nothing per-frame returns
//! an error.

use std::fmt;

/// Errors that stop an engine from starting.
#[derive(Debug, Clone, PartialEq)]
pub enum VizError {
    /// A required DOM element (canvas, container) was not found.
    MissingElement(String),
    /// The browser refused to hand out a rendering context.
    ContextUnavailable(&'static str),
    /// A GLSL shader failed to compile or link.
    Shader(String),
    /// Engine construction was given geometry it cannot lay out.
    InvalidConfig(String),
    /// Any other failure reported by a browser API.
    Js(String),
}

impl fmt::Display for VizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VizError::MissingElement(id) => write!(f, "Required element not found: #{}", id),
            VizError::ContextUnavailable(kind) => write!(f, "{} context not available", kind),
            VizError::Shader(log) => write!(f, "Shader error: {}", log),
            VizError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            VizError::Js(msg) => write!(f, "Browser error: {}", msg),
        }
    }
}

impl std::error::Error for VizError {}

impl From<serde_json::Error> for VizError {
    fn from(e: serde_json::Error) -> Self {
        VizError::InvalidConfig(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for VizError {
    fn from(v: wasm_bindgen::JsValue) -> Self {
        VizError::Js(v.as_string().unwrap_or_else(|| format!("{:?}", v)))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<VizError> for wasm_bindgen::JsValue {
    fn from(e: VizError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
