//! Authorization request construction for the implicit id-token flow.

use base64ct::{Base64UrlUnpadded, Encoding};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::GoogleOAuthConfig;
use crate::error::AuthError;

/// Response type requesting an id token directly in the redirect.
pub const RESPONSE_TYPE_ID_TOKEN: &str = "id_token";

/// Characters left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Generate a random URL-safe token (22 characters).
///
/// Produces 16 random bytes encoded as base64url.
pub fn generate_state() -> Result<String, AuthError> {
    random_token()
}

/// Generate a random URL-safe nonce (22 characters).
pub fn generate_nonce() -> Result<String, AuthError> {
    random_token()
}

fn random_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes).map_err(|e| AuthError::RngFailed(e.to_string()))?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// One login attempt. `state` and `nonce` are fresh per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub authorization_endpoint: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub response_type: String,
    pub prompt: String,
    pub state: String,
    pub nonce: String,
}

impl AuthorizationRequest {
    /// Create a request for `config` with freshly generated `state` and `nonce`.
    pub fn new(config: &GoogleOAuthConfig) -> Result<Self, AuthError> {
        Ok(Self {
            authorization_endpoint: config.authorization_endpoint.clone(),
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope(),
            response_type: RESPONSE_TYPE_ID_TOKEN.to_string(),
            prompt: config.prompt.clone(),
            state: generate_state()?,
            nonce: generate_nonce()?,
        })
    }

    /// The URL to load in the identity provider's browsing context.
    pub fn authorization_url(&self) -> String {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", self.response_type.as_str()),
            ("scope", self.scope.as_str()),
            ("state", self.state.as_str()),
            ("nonce", self.nonce.as_str()),
            ("prompt", self.prompt.as_str()),
        ];
        let query = params
            .iter()
            .filter(|(name, value)| *name != "prompt" || !value.is_empty())
            .map(|(name, value)| format!("{name}={}", utf8_percent_encode(value, URI_COMPONENT)))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.authorization_endpoint.contains('?') {
            '&'
        } else {
            '?'
        };
        format!("{}{separator}{query}", self.authorization_endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redirect::parse_redirect_url;

    fn config() -> GoogleOAuthConfig {
        GoogleOAuthConfig::new("123-abc.apps.googleusercontent.com")
    }

    #[test]
    fn state_is_22_url_safe_chars() {
        let state = generate_state().unwrap();
        assert_eq!(state.len(), 22);
        assert!(state
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_state().unwrap(), generate_state().unwrap());
        assert_ne!(generate_nonce().unwrap(), generate_nonce().unwrap());
    }

    #[test]
    fn requests_do_not_share_state_or_nonce() {
        let a = AuthorizationRequest::new(&config()).unwrap();
        let b = AuthorizationRequest::new(&config()).unwrap();
        assert_ne!(a.state, b.state);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.state, a.nonce);
    }

    #[test]
    fn url_carries_all_parameters() {
        let request = AuthorizationRequest::new(&config()).unwrap();
        let url = request.authorization_url();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?client_id="));
        assert!(url.contains("&redirect_uri=https%3A%2F%2Fwww.kvcm.io&"));
        assert!(url.contains("&response_type=id_token&"));
        assert!(url.contains("&scope=openid%20email%20profile&"));
        assert!(url.ends_with("&prompt=consent"));

        let params = parse_redirect_url(&url);
        assert_eq!(params.get("client_id"), Some("123-abc.apps.googleusercontent.com"));
        assert_eq!(params.get("redirect_uri"), Some("https://www.kvcm.io"));
        assert_eq!(params.get("scope"), Some("openid email profile"));
        assert_eq!(params.state(), Some(request.state.as_str()));
        assert_eq!(params.get("nonce"), Some(request.nonce.as_str()));
    }

    #[test]
    fn empty_prompt_is_omitted() {
        let config = GoogleOAuthConfig {
            prompt: String::new(),
            ..config()
        };
        let url = AuthorizationRequest::new(&config).unwrap().authorization_url();
        assert!(!url.contains("prompt="));
    }

    #[test]
    fn endpoint_with_existing_query_is_extended() {
        let config = GoogleOAuthConfig {
            authorization_endpoint: "https://idp.example/auth?hl=ko".into(),
            ..config()
        };
        let url = AuthorizationRequest::new(&config).unwrap().authorization_url();
        assert!(url.starts_with("https://idp.example/auth?hl=ko&client_id="));
    }
}
