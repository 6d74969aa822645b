use serde::{Deserialize, Serialize};

/// Wallet session lifecycle.
///
/// `Disconnected -> Connecting -> Connected -> Disconnected`, and
/// `Connected -> Signing -> Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    Disconnected,
    Connecting,
    Connected,
    Signing,
}

impl std::fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Signing => "signing",
        };
        f.write_str(s)
    }
}

/// In-memory wallet session. Never persisted.
///
/// `address` is set exactly while the session holds an approved account
/// (`Connected` or `Signing`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub status: WalletStatus,
    pub address: Option<String>,
    pub chain_id: Option<u64>,
}

impl Default for WalletSession {
    fn default() -> Self {
        Self {
            status: WalletStatus::Disconnected,
            address: None,
            chain_id: None,
        }
    }
}

impl WalletSession {
    pub fn is_connected(&self) -> bool {
        matches!(self.status, WalletStatus::Connected | WalletStatus::Signing)
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Outcome of a successful connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnection {
    pub address: String,
    /// Balance as reported by `eth_getBalance` (hex wei).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    pub signature: String,
    pub message: String,
}

/// Session change caused by a provider event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    AccountChanged(String),
    ChainChanged(u64),
    Disconnected,
}
