//! Host capabilities implemented by JavaScript objects.
//!
//! The shell passes three objects in:
//!
//! - a bridge channel with `postMessage(json)`;
//! - a browsing context with `navigate(url)` and `close()`;
//! - a wallet provider with async `connect()`, `disconnect()` and
//!   `request({ method, params })`.
//!
//! Events flowing the other way (navigations, wallet session events) are fed
//! back through `WasmShell`.

use std::cell::RefCell;

use async_trait::async_trait;
use kvcm_auth::{BrowsingContext, BrowsingContextError, BrowsingContextEvent, NavigationObserver};
use kvcm_bridge::{BridgeChannel, ChannelError};
use kvcm_wallet::{ProviderError, ProviderEvent, ProviderEventListener, RpcRequest, WalletProvider};
use serde_json::Value;
use tracing::debug;
use wasm_bindgen::prelude::*;

use crate::error::{js_error_message, to_js_value};

// ============================================================================
// JS extern types
// ============================================================================

#[wasm_bindgen]
extern "C" {
    /// Channel into the web app's web view.
    pub type JsBridgeChannel;

    #[wasm_bindgen(method, catch, js_name = "postMessage")]
    fn post_message(this: &JsBridgeChannel, message: &str) -> Result<(), JsValue>;

    /// Secondary web view used for the identity provider's pages.
    pub type JsBrowsingContext;

    #[wasm_bindgen(method, catch)]
    fn navigate(this: &JsBrowsingContext, url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn close(this: &JsBrowsingContext);

    /// WalletConnect-style provider object.
    pub type JsWalletProvider;

    #[wasm_bindgen(method, catch)]
    async fn connect(this: &JsWalletProvider) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    async fn disconnect(this: &JsWalletProvider) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    async fn request(this: &JsWalletProvider, args: JsValue) -> Result<JsValue, JsValue>;
}

// ============================================================================
// Bridge channel
// ============================================================================

pub struct HostChannel {
    inner: JsBridgeChannel,
}

// SAFETY: WASM is single-threaded.
unsafe impl Send for HostChannel {}
unsafe impl Sync for HostChannel {}

impl HostChannel {
    pub fn new(channel: JsBridgeChannel) -> Self {
        Self { inner: channel }
    }
}

impl BridgeChannel for HostChannel {
    fn post_message(&self, message: &str) -> Result<(), ChannelError> {
        self.inner
            .post_message(message)
            .map_err(|e| ChannelError::new(js_error_message(&e)))
    }
}

// ============================================================================
// Browsing context
// ============================================================================

pub struct HostBrowsingContext {
    inner: JsBrowsingContext,
    observer: RefCell<Option<NavigationObserver>>,
}

// SAFETY: WASM is single-threaded.
unsafe impl Send for HostBrowsingContext {}
unsafe impl Sync for HostBrowsingContext {}

impl HostBrowsingContext {
    pub fn new(context: JsBrowsingContext) -> Self {
        Self {
            inner: context,
            observer: RefCell::new(None),
        }
    }

    /// Deliver an event reported by the host to the registered observer.
    pub fn deliver(&self, event: BrowsingContextEvent) {
        // Clone out so the observer may re-register while running.
        let observer = self.observer.borrow().clone();
        match observer {
            Some(observer) => observer(event),
            None => debug!(?event, "browsing context event with no observer"),
        }
    }
}

impl BrowsingContext for HostBrowsingContext {
    fn navigate(&self, url: &str) -> Result<(), BrowsingContextError> {
        self.inner
            .navigate(url)
            .map_err(|e| BrowsingContextError::new(js_error_message(&e)))
    }

    fn on_navigate(&self, observer: NavigationObserver) {
        *self.observer.borrow_mut() = Some(observer);
    }

    fn close(&self) {
        self.inner.close();
    }
}

// ============================================================================
// Wallet provider
// ============================================================================

pub struct HostWalletProvider {
    inner: JsWalletProvider,
    listener: RefCell<Option<ProviderEventListener>>,
}

// SAFETY: WASM is single-threaded.
unsafe impl Send for HostWalletProvider {}
unsafe impl Sync for HostWalletProvider {}

impl HostWalletProvider {
    pub fn new(provider: JsWalletProvider) -> Self {
        Self {
            inner: provider,
            listener: RefCell::new(None),
        }
    }

    /// Deliver a session event reported by the host's wallet SDK.
    pub fn deliver(&self, event: ProviderEvent) {
        let listener = self.listener.borrow().clone();
        match listener {
            Some(listener) => listener(event),
            None => debug!(?event, "wallet event with no listener"),
        }
    }
}

fn provider_err(e: JsValue) -> ProviderError {
    ProviderError::new(js_error_message(&e))
}

#[async_trait(?Send)]
impl WalletProvider for HostWalletProvider {
    async fn connect(&self) -> Result<Vec<String>, ProviderError> {
        let result = self.inner.connect().await.map_err(provider_err)?;
        if result.is_undefined() || result.is_null() {
            return Ok(Vec::new());
        }
        serde_wasm_bindgen::from_value(result)
            .map_err(|e| ProviderError::new(format!("Failed to parse accounts: {e}")))
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.inner.disconnect().await.map_err(provider_err)?;
        Ok(())
    }

    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError> {
        let args = to_js_value(&request).map_err(provider_err)?;
        let result = self.inner.request(args).await.map_err(provider_err)?;
        if result.is_undefined() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result).map_err(|e| {
            ProviderError::new(format!("Failed to parse {} response: {e}", request.method))
        })
    }

    fn subscribe(&self, listener: ProviderEventListener) {
        *self.listener.borrow_mut() = Some(listener);
    }
}
