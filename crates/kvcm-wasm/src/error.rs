//! Error conversion for the WASM boundary.

use serde::Serialize;
use wasm_bindgen::JsValue;

/// Convert any error with Display into a JsValue error.
pub fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Serialize a Rust value to a plain JS object (not a `Map`).
pub fn to_js_value(value: &impl Serialize) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(to_js_error)
}

/// Best-effort human-readable message for a thrown JS value.
#[cfg(target_arch = "wasm32")]
pub fn js_error_message(e: &JsValue) -> String {
    use wasm_bindgen::JsCast;

    if let Some(s) = e.as_string() {
        s
    } else if let Some(err) = e.dyn_ref::<js_sys::Error>() {
        String::from(err.message())
    } else {
        format!("{e:?}")
    }
}
