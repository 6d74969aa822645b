//! Wallet session handling for the shell.
//!
//! The wallet connection itself (pairing, QR/deep-link approval, relays,
//! chain RPC) belongs to an external provider SDK. This crate wraps that
//! provider behind a small session state machine and converts its failures
//! into typed errors.

mod adapter;
mod config;
mod error;
mod provider;
mod session;

pub use adapter::WalletSessionAdapter;
pub use config::{AppMetadata, WalletConnectConfig, WalletFilter, METAMASK_WALLET_ID};
pub use error::WalletError;
pub use provider::{
    parse_chain_id, ProviderError, ProviderEvent, ProviderEventListener, RpcRequest,
    WalletProvider,
};
pub use session::{SessionChange, SignedMessage, WalletConnection, WalletSession, WalletStatus};
