//! In-memory collaborators for dispatcher tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use kvcm_auth::{
    BrowsingContext, BrowsingContextError, BrowsingContextEvent, GoogleOAuthConfig,
    NavigationEvent, NavigationObserver,
};
use kvcm_bridge::{BridgeChannel, BridgeDispatcher, ChannelError, ShellConfig};
use kvcm_wallet::{
    ProviderError, ProviderEvent, ProviderEventListener, RpcRequest, WalletConnectConfig,
    WalletProvider,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::Notify;

pub const ALICE: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const BOB: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

// ============================================================================
// Bridge channel
// ============================================================================

#[derive(Default)]
pub struct RecordingChannel {
    messages: Mutex<Vec<String>>,
}

impl RecordingChannel {
    pub fn values(&self) -> Vec<Value> {
        self.messages
            .lock()
            .iter()
            .map(|m| serde_json::from_str(m).expect("outbound message is JSON"))
            .collect()
    }

    pub fn types(&self) -> Vec<String> {
        self.values()
            .iter()
            .map(|v| v["type"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }
}

impl BridgeChannel for RecordingChannel {
    fn post_message(&self, message: &str) -> Result<(), ChannelError> {
        self.messages.lock().push(message.to_string());
        Ok(())
    }
}

// ============================================================================
// Browsing context
// ============================================================================

#[derive(Default)]
pub struct FakeContext {
    observer: Mutex<Option<NavigationObserver>>,
    pub loaded: Mutex<Vec<String>>,
    pub closes: AtomicUsize,
    fail_navigate: bool,
}

impl FakeContext {
    pub fn failing() -> Self {
        Self {
            fail_navigate: true,
            ..Default::default()
        }
    }

    pub fn navigate_to(&self, url: &str) {
        self.emit(BrowsingContextEvent::Navigated(NavigationEvent::new(url)));
    }

    pub fn emit(&self, event: BrowsingContextEvent) {
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer(event);
        }
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl BrowsingContext for FakeContext {
    fn navigate(&self, url: &str) -> Result<(), BrowsingContextError> {
        if self.fail_navigate {
            return Err(BrowsingContextError::new("web view unavailable"));
        }
        self.loaded.lock().push(url.to_string());
        Ok(())
    }

    fn on_navigate(&self, observer: NavigationObserver) {
        *self.observer.lock() = Some(observer);
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Wallet provider
// ============================================================================

pub struct FakeProvider {
    pub accounts: Result<Vec<String>, ProviderError>,
    pub signature: Result<Value, ProviderError>,
    /// When set, `connect` waits until `release` is called.
    connect_gate: Option<Arc<Notify>>,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub requests: Mutex<Vec<RpcRequest>>,
    listener: Mutex<Option<ProviderEventListener>>,
}

impl FakeProvider {
    pub fn with_accounts(accounts: &[&str]) -> Self {
        Self {
            accounts: Ok(accounts.iter().map(|a| a.to_string()).collect()),
            signature: Ok(json!("0xsignature")),
            connect_gate: None,
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            listener: Mutex::new(None),
        }
    }

    pub fn rejecting_connect(message: &str) -> Self {
        Self {
            accounts: Err(ProviderError::new(message)),
            ..Self::with_accounts(&[])
        }
    }

    pub fn rejecting_sign(message: &str) -> Self {
        Self {
            signature: Err(ProviderError::new(message)),
            ..Self::with_accounts(&[ALICE])
        }
    }

    pub fn gated(accounts: &[&str]) -> Self {
        Self {
            connect_gate: Some(Arc::new(Notify::new())),
            ..Self::with_accounts(accounts)
        }
    }

    /// Let one pending (or the next) gated `connect` resolve.
    pub fn release(&self) {
        if let Some(gate) = &self.connect_gate {
            gate.notify_one();
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn sign_requests(&self) -> Vec<RpcRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == RpcRequest::PERSONAL_SIGN)
            .cloned()
            .collect()
    }

    pub fn emit(&self, event: ProviderEvent) {
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener(event);
        }
    }
}

#[async_trait]
impl WalletProvider for FakeProvider {
    async fn connect(&self) -> Result<Vec<String>, ProviderError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.connect_gate {
            gate.notified().await;
        }
        self.accounts.clone()
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError> {
        let method = request.method.clone();
        self.requests.lock().push(request);
        match method.as_str() {
            RpcRequest::GET_BALANCE => Ok(json!("0x0")),
            RpcRequest::CHAIN_ID => Ok(json!("0x1")),
            RpcRequest::PERSONAL_SIGN => self.signature.clone(),
            _ => Err(ProviderError::new("unsupported method")),
        }
    }

    fn subscribe(&self, listener: ProviderEventListener) {
        *self.listener.lock() = Some(listener);
    }
}

// ============================================================================
// Harness
// ============================================================================

pub fn config() -> ShellConfig {
    ShellConfig {
        google: GoogleOAuthConfig::new("123-abc.apps.googleusercontent.com"),
        wallet_connect: WalletConnectConfig::new("dd7fba3764fcb3e524663dfa87ed04a5"),
        ..Default::default()
    }
}

pub struct Harness {
    pub dispatcher: BridgeDispatcher,
    pub channel: Arc<RecordingChannel>,
    pub context: Arc<FakeContext>,
    pub provider: Arc<FakeProvider>,
}

pub fn harness_with(context: FakeContext, provider: FakeProvider) -> Harness {
    let channel = Arc::new(RecordingChannel::default());
    let context = Arc::new(context);
    let provider = Arc::new(provider);
    let dispatcher = BridgeDispatcher::new(
        config(),
        channel.clone(),
        context.clone(),
        provider.clone(),
    )
    .expect("valid test configuration");
    Harness {
        dispatcher,
        channel,
        context,
        provider,
    }
}

pub fn harness(provider: FakeProvider) -> Harness {
    harness_with(FakeContext::default(), provider)
}
