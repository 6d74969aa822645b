//! Bridge wire format.
//!
//! Every crossing is one UTF-8 JSON object with a `type` discriminator and
//! kind-specific fields.

use kvcm_auth::LoginSuccess;
use kvcm_wallet::{SignedMessage, WalletConnection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;

/// Messages sent by the web app to the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundMessage {
    GoogleLoginRequest,
    WalletConnectAttempt,
    /// Without a message the configured sign message is used.
    WalletSignRequest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    WalletDisconnectRequest,
}

impl InboundMessage {
    pub const KINDS: [&'static str; 4] = [
        "GOOGLE_LOGIN_REQUEST",
        "WALLET_CONNECT_ATTEMPT",
        "WALLET_SIGN_REQUEST",
        "WALLET_DISCONNECT_REQUEST",
    ];

    /// Decode one inbound crossing.
    ///
    /// The payload may arrive JSON-encoded twice (a JSON string whose content
    /// is the message object); one extra level is unwrapped.
    ///
    /// # Errors
    /// `MalformedMessage` for invalid JSON, `MissingKind` without a string
    /// `type`, `UnknownKind` for kinds this shell does not handle and
    /// `InvalidPayload` when a known kind has malformed fields.
    pub fn decode(raw: &str) -> Result<Self, BridgeError> {
        let value = match serde_json::from_str(raw).map_err(BridgeError::MalformedMessage)? {
            Value::String(inner) => {
                serde_json::from_str(&inner).map_err(BridgeError::MalformedMessage)?
            }
            value => value,
        };

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(BridgeError::MissingKind)?
            .to_string();
        if !Self::KINDS.contains(&kind.as_str()) {
            return Err(BridgeError::UnknownKind(kind));
        }

        serde_json::from_value(value).map_err(|source| BridgeError::InvalidPayload { kind, source })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::GoogleLoginRequest => Self::KINDS[0],
            Self::WalletConnectAttempt => Self::KINDS[1],
            Self::WalletSignRequest { .. } => Self::KINDS[2],
            Self::WalletDisconnectRequest => Self::KINDS[3],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnectedData {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletErrorData {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountData {
    pub address: String,
}

/// Messages sent by the shell to the web app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    GoogleLoginSuccess {
        id_token: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<String>,
    },
    GoogleLoginError {
        error: String,
    },
    WalletConnectSuccess {
        data: WalletConnectedData,
    },
    WalletConnectError {
        data: WalletErrorData,
    },
    WalletSignSuccess {
        signature: String,
        message: String,
    },
    WalletSignError {
        error: String,
        message: String,
    },
    WalletDisconnected,
    WalletAccountChanged {
        data: AccountData,
    },
}

pub const WALLET_CONNECTED_MESSAGE: &str = "Wallet connected";
pub const WALLET_CONNECT_FAILED_MESSAGE: &str = "Wallet connection failed";

impl OutboundMessage {
    pub fn login_succeeded(success: LoginSuccess) -> Self {
        Self::GoogleLoginSuccess {
            id_token: success.id_token,
            state: success.state,
        }
    }

    pub fn login_failed(error: impl std::fmt::Display) -> Self {
        Self::GoogleLoginError {
            error: error.to_string(),
        }
    }

    pub fn wallet_connected(connection: WalletConnection) -> Self {
        Self::WalletConnectSuccess {
            data: WalletConnectedData {
                address: connection.address,
                balance: connection.balance,
                chain_id: connection.chain_id,
                message: WALLET_CONNECTED_MESSAGE.to_string(),
            },
        }
    }

    pub fn wallet_connect_failed(error: impl std::fmt::Display) -> Self {
        Self::WalletConnectError {
            data: WalletErrorData {
                error: error.to_string(),
                message: WALLET_CONNECT_FAILED_MESSAGE.to_string(),
            },
        }
    }

    pub fn wallet_signed(signed: SignedMessage) -> Self {
        Self::WalletSignSuccess {
            signature: signed.signature,
            message: signed.message,
        }
    }

    pub fn wallet_sign_failed(error: impl std::fmt::Display, message: &str) -> Self {
        Self::WalletSignError {
            error: error.to_string(),
            message: message.to_string(),
        }
    }

    pub fn wallet_account_changed(address: String) -> Self {
        Self::WalletAccountChanged {
            data: AccountData { address },
        }
    }

    pub fn to_json(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }
}
