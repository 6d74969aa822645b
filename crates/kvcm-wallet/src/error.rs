use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("not connected")]
    NotConnected,

    #[error("already connected")]
    AlreadyConnected,

    #[error("another wallet operation is in progress")]
    Busy,

    #[error("no accounts")]
    NoAccounts,

    /// The provider ended the session while the operation was awaiting it.
    #[error("wallet session ended before the request completed")]
    Interrupted,

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid provider response for {method}: {reason}")]
    InvalidResponse { method: &'static str, reason: String },

    #[error("Invalid wallet configuration: missing {field}")]
    MissingField { field: &'static str },
}

impl WalletError {
    /// Whether the error was raised locally by the state machine, without
    /// reaching the provider.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::NotConnected | Self::AlreadyConnected | Self::Busy
        )
    }
}
