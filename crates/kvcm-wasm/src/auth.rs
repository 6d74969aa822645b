//! WASM bindings for kvcm-auth.

use crate::error::{to_js_error, to_js_value};
use kvcm_auth::{
    generate_nonce, generate_state, parse_redirect_url, AuthorizationRequest, GoogleOAuthConfig,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// --- Redirect parsing ---

/// Parse query and fragment parameters of a redirect URL into a plain object.
#[wasm_bindgen(js_name = "parseRedirectUrl")]
pub fn wasm_parse_redirect_url(url: &str) -> Result<JsValue, JsValue> {
    to_js_value(&parse_redirect_url(url).into_inner())
}

// --- Authorization request ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizationRequestJs {
    url: String,
    state: String,
    nonce: String,
}

/// Build a fresh authorization request from a JSON `GoogleOAuthConfig`.
///
/// Returns `{ url, state, nonce }`.
#[wasm_bindgen(js_name = "buildAuthorizationUrl")]
pub fn wasm_build_authorization_url(config_json: &str) -> Result<JsValue, JsValue> {
    let config: GoogleOAuthConfig = serde_json::from_str(config_json).map_err(to_js_error)?;
    config.validate().map_err(to_js_error)?;
    let request = AuthorizationRequest::new(&config).map_err(to_js_error)?;
    to_js_value(&AuthorizationRequestJs {
        url: request.authorization_url(),
        state: request.state,
        nonce: request.nonce,
    })
}

#[wasm_bindgen(js_name = "generateState")]
pub fn wasm_generate_state() -> Result<String, JsValue> {
    generate_state().map_err(to_js_error)
}

#[wasm_bindgen(js_name = "generateNonce")]
pub fn wasm_generate_nonce() -> Result<String, JsValue> {
    generate_nonce().map_err(to_js_error)
}
