//! Message bridge between the native shell and the embedded web app.
//!
//! The web app cannot reach the identity provider or a wallet itself. It posts
//! JSON requests over the bridge; the dispatcher runs the matching flow and
//! posts the result back on the same channel.

mod channel;
mod config;
mod dispatcher;
mod error;
mod message;

pub use channel::{BridgeChannel, ChannelError};
pub use config::{
    dev_web_app_url, Platform, ShellConfig, DEFAULT_SIGN_MESSAGE, DEFAULT_WEB_APP_PORT,
};
pub use dispatcher::BridgeDispatcher;
pub use error::BridgeError;
pub use message::{
    AccountData, InboundMessage, OutboundMessage, WalletConnectedData, WalletErrorData,
    WALLET_CONNECTED_MESSAGE, WALLET_CONNECT_FAILED_MESSAGE,
};
