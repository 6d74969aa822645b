//! `WasmShell`: the bridge dispatcher exposed to the JavaScript host.

use std::sync::Arc;

use kvcm_auth::{BrowsingContextEvent, NavigationEvent, SessionStatus};
use kvcm_bridge::{dev_web_app_url, BridgeDispatcher, Platform, ShellConfig};
use kvcm_wallet::{parse_chain_id, ProviderEvent, WalletConnectConfig};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::error::{to_js_error, to_js_value};
use crate::host::{
    HostBrowsingContext, HostChannel, HostWalletProvider, JsBridgeChannel, JsBrowsingContext,
    JsWalletProvider,
};

#[wasm_bindgen]
pub struct WasmShell {
    dispatcher: Arc<BridgeDispatcher>,
    context: Arc<HostBrowsingContext>,
    provider: Arc<HostWalletProvider>,
    wallet_connect: WalletConnectConfig,
    web_app_url: String,
}

#[wasm_bindgen]
impl WasmShell {
    /// Create the shell from a JSON `ShellConfig` and the host's capabilities.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: &str,
        channel: JsBridgeChannel,
        context: JsBrowsingContext,
        provider: JsWalletProvider,
    ) -> Result<WasmShell, JsValue> {
        console_error_panic_hook::set_once();

        let config = ShellConfig::from_json_str(config_json).map_err(to_js_error)?;
        let wallet_connect = config.wallet_connect.clone();
        let web_app_url = config.web_app_url.clone();

        let context = Arc::new(HostBrowsingContext::new(context));
        let provider = Arc::new(HostWalletProvider::new(provider));
        let dispatcher = BridgeDispatcher::new(
            config,
            Arc::new(HostChannel::new(channel)),
            context.clone(),
            provider.clone(),
        )
        .map_err(to_js_error)?;

        Ok(WasmShell {
            dispatcher: Arc::new(dispatcher),
            context,
            provider,
            wallet_connect,
            web_app_url,
        })
    }

    // ========================================================================
    // Bridge
    // ========================================================================

    /// Handle one raw message from the web app. Resolves once the resulting
    /// message, if any, has been posted.
    #[wasm_bindgen(js_name = "handleMessage")]
    pub fn handle_message(&self, raw: String) -> js_sys::Promise {
        let dispatcher = Arc::clone(&self.dispatcher);
        future_to_promise(async move {
            dispatcher.handle_message(&raw).await;
            Ok(JsValue::UNDEFINED)
        })
    }

    // ========================================================================
    // Login web view
    // ========================================================================

    #[wasm_bindgen(js_name = "startLogin")]
    pub fn start_login(&self) {
        self.dispatcher.start_login();
    }

    /// The user dismissed the login web view.
    #[wasm_bindgen(js_name = "closeLogin")]
    pub fn close_login(&self) {
        self.dispatcher.close_login();
    }

    /// URL currently loaded for login, or `undefined` when idle.
    #[wasm_bindgen(getter, js_name = "loginUrl")]
    pub fn login_url(&self) -> Option<String> {
        match self.dispatcher.identity().status() {
            SessionStatus::Active { authorization_url } => Some(authorization_url),
            SessionStatus::Idle => None,
        }
    }

    #[wasm_bindgen(js_name = "onNavigation")]
    pub fn on_navigation(&self, url: String) {
        self.context
            .deliver(BrowsingContextEvent::Navigated(NavigationEvent::new(url)));
    }

    #[wasm_bindgen(js_name = "onLoadError")]
    pub fn on_load_error(&self, url: Option<String>, description: String) {
        self.context
            .deliver(BrowsingContextEvent::LoadFailed { url, description });
    }

    #[wasm_bindgen(js_name = "onHttpError")]
    pub fn on_http_error(&self, url: String, status: u16) {
        self.context
            .deliver(BrowsingContextEvent::HttpError { url, status });
    }

    // ========================================================================
    // Wallet
    // ========================================================================

    /// Snapshot of the wallet session as `{ status, address, chainId }`.
    #[wasm_bindgen(getter, js_name = "walletSession")]
    pub fn wallet_session(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.dispatcher.wallet().session())
    }

    /// Options for the host's wallet modal.
    #[wasm_bindgen(getter, js_name = "walletConnectConfig")]
    pub fn wallet_connect_config(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.wallet_connect)
    }

    #[wasm_bindgen(js_name = "onAccountsChanged")]
    pub fn on_accounts_changed(&self, accounts: JsValue) -> Result<(), JsValue> {
        let accounts: Vec<String> = serde_wasm_bindgen::from_value(accounts).map_err(to_js_error)?;
        self.provider.deliver(ProviderEvent::AccountsChanged(accounts));
        Ok(())
    }

    /// Accepts the chain id as a number, decimal string or hex string.
    #[wasm_bindgen(js_name = "onChainChanged")]
    pub fn on_chain_changed(&self, chain_id: JsValue) -> Result<(), JsValue> {
        let value: Value = serde_wasm_bindgen::from_value(chain_id).map_err(to_js_error)?;
        match parse_chain_id(&value) {
            Some(chain_id) => {
                self.provider.deliver(ProviderEvent::ChainChanged(chain_id));
                Ok(())
            }
            None => {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "[kvcm] ignoring unparseable chain id: {value}"
                )));
                Ok(())
            }
        }
    }

    #[wasm_bindgen(js_name = "onWalletDisconnect")]
    pub fn on_wallet_disconnect(&self) {
        self.provider.deliver(ProviderEvent::Disconnected);
    }

    // ========================================================================
    // Web app
    // ========================================================================

    #[wasm_bindgen(getter, js_name = "webAppUrl")]
    pub fn web_app_url(&self) -> String {
        self.web_app_url.clone()
    }
}

/// Development server URL for `platform` (`"android"` or `"ios"`).
#[wasm_bindgen(js_name = "devWebAppUrl")]
pub fn wasm_dev_web_app_url(platform: &str, port: u16) -> Result<String, JsValue> {
    let platform: Platform =
        serde_json::from_value(Value::String(platform.to_string())).map_err(to_js_error)?;
    Ok(dev_web_app_url(platform, port))
}
