//! Shell configuration.

use kvcm_auth::GoogleOAuthConfig;
use kvcm_wallet::WalletConnectConfig;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Port the web app's dev server listens on.
pub const DEFAULT_WEB_APP_PORT: u16 = 3003;

/// Message signed when a sign request does not carry one.
pub const DEFAULT_SIGN_MESSAGE: &str = "Sign in to Climate Foundation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Host under which the development machine is reachable from the device.
    ///
    /// The Android emulator maps the host's loopback to `10.0.2.2`.
    pub fn dev_host(self) -> &'static str {
        match self {
            Self::Android => "10.0.2.2",
            Self::Ios => "localhost",
        }
    }
}

/// URL of the web app's development server as seen from `platform`.
pub fn dev_web_app_url(platform: Platform, port: u16) -> String {
    format!("http://{}:{port}", platform.dev_host())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShellConfig {
    pub google: GoogleOAuthConfig,
    pub wallet_connect: WalletConnectConfig,
    /// URL loaded into the primary web view.
    pub web_app_url: String,
    pub sign_message: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            google: GoogleOAuthConfig::default(),
            wallet_connect: WalletConnectConfig::default(),
            web_app_url: dev_web_app_url(Platform::Ios, DEFAULT_WEB_APP_PORT),
            sign_message: DEFAULT_SIGN_MESSAGE.to_string(),
        }
    }
}

impl ShellConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, BridgeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        self.google.validate()?;
        self.wallet_connect.validate()?;
        if url::Url::parse(&self.web_app_url).is_err() {
            return Err(BridgeError::Config(format!(
                "webAppUrl {:?} is not an absolute URL",
                self.web_app_url
            )));
        }
        if self.sign_message.is_empty() {
            return Err(BridgeError::Config("signMessage must not be empty".into()));
        }
        Ok(())
    }
}
