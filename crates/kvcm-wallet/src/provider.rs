//! The external wallet-provider capability (a WalletConnect-style session
//! object). Implemented by the host, consumed by the session adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// JSON-RPC style request forwarded to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub const GET_BALANCE: &'static str = "eth_getBalance";
    pub const CHAIN_ID: &'static str = "eth_chainId";
    pub const PERSONAL_SIGN: &'static str = "personal_sign";

    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    pub fn balance(address: &str) -> Self {
        Self::new(Self::GET_BALANCE, vec![json!(address), json!("latest")])
    }

    pub fn chain_id() -> Self {
        Self::new(Self::CHAIN_ID, Vec::new())
    }

    pub fn personal_sign(message: &str, address: &str) -> Self {
        Self::new(Self::PERSONAL_SIGN, vec![json!(message), json!(address)])
    }
}

/// Session events pushed by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(u64),
    Disconnected,
}

pub type ProviderEventListener = Arc<dyn Fn(ProviderEvent) + Send + Sync>;

/// Failure reported by the provider (user rejection, relay error, timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

/// Wallet connection capability.
///
/// `connect` may suspend for as long as the user takes to approve the session
/// in their wallet app.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait WalletProvider: Send + Sync {
    /// Establish a session and return the approved accounts.
    async fn connect(&self) -> Result<Vec<String>, ProviderError>;

    async fn disconnect(&self) -> Result<(), ProviderError>;

    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError>;

    /// Register the listener for session events, replacing any previous one.
    fn subscribe(&self, listener: ProviderEventListener);
}

/// Parse a chain id reported as a hex string, decimal string or number.
pub fn parse_chain_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => s.parse().ok(),
        },
        _ => None,
    }
}
