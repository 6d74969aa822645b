use kvcm_auth::AuthError;
use kvcm_wallet::WalletError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Malformed bridge message: {0}")]
    MalformedMessage(#[source] serde_json::Error),

    #[error("Bridge message has no type")]
    MissingKind,

    #[error("Unrecognized bridge message type {0:?}")]
    UnknownKind(String),

    #[error("Invalid {kind} message: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
