//! Identity-provider settings for the implicit id-token flow.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AuthError;

/// Google's OAuth 2.0 authorization endpoint.
pub const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Registered redirect URI of the shipped application.
pub const DEFAULT_REDIRECT_URI: &str = "https://www.kvcm.io";

/// Client identity and endpoint used to build authorization URLs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub authorization_endpoint: String,
    /// Value of the `prompt` parameter. `consent` forces the consent screen.
    pub prompt: String,
}

impl Default for GoogleOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: vec!["openid".into(), "email".into(), "profile".into()],
            authorization_endpoint: GOOGLE_AUTHORIZATION_ENDPOINT.to_string(),
            prompt: "consent".to_string(),
        }
    }
}

impl GoogleOAuthConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Default::default()
        }
    }

    /// Space-delimited scope string as sent to the provider.
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }

    /// Host of the registered redirect URI, lowercased.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidRedirectUri` if the URI is not absolute or has no host.
    pub fn callback_host(&self) -> Result<String, AuthError> {
        let invalid = |reason: String| AuthError::InvalidRedirectUri {
            uri: self.redirect_uri.clone(),
            reason,
        };
        let url = Url::parse(&self.redirect_uri).map_err(|e| invalid(e.to_string()))?;
        url.host_str()
            .map(|h| h.to_ascii_lowercase())
            .ok_or_else(|| invalid("no host".to_string()))
    }

    /// Check required fields and that the redirect URI yields a callback host.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::MissingField { field: "clientId" });
        }
        if self.scopes.iter().all(|s| s.trim().is_empty()) {
            return Err(AuthError::MissingField { field: "scopes" });
        }
        if self.authorization_endpoint.trim().is_empty() {
            return Err(AuthError::MissingField {
                field: "authorizationEndpoint",
            });
        }
        self.callback_host().map(|_| ())
    }
}
