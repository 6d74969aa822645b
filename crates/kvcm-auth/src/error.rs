use thiserror::Error;

use crate::context::BrowsingContextError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Random number generation failed: {0}")]
    RngFailed(String),

    #[error("Invalid redirect URI {uri:?}: {reason}")]
    InvalidRedirectUri { uri: String, reason: String },

    #[error("Invalid identity-provider configuration: missing {field}")]
    MissingField { field: &'static str },

    #[error("Browsing context failed: {0}")]
    BrowsingContext(#[from] BrowsingContextError),
}
