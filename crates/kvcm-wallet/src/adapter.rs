//! Wallet session adapter.
//!
//! Wraps the provider capability behind the session state machine. At most
//! one connect or sign is in flight; concurrent calls are rejected, not queued.
//! The state lock is never held across an await.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::WalletError;
use crate::provider::{parse_chain_id, ProviderEvent, RpcRequest, WalletProvider};
use crate::session::{SessionChange, SignedMessage, WalletConnection, WalletSession, WalletStatus};

#[derive(Default)]
struct AdapterState {
    session: WalletSession,
    /// Bumped when a connect or sign starts and whenever the session is reset.
    /// An operation only commits its result while its generation is current.
    generation: u64,
    /// A connect or sign is awaiting the provider. Stays set across a
    /// provider-initiated reset until that call returns.
    in_flight: bool,
}

impl AdapterState {
    fn begin(&mut self, status: WalletStatus) -> u64 {
        self.session.status = status;
        self.generation += 1;
        self.in_flight = true;
        self.generation
    }

    /// Release the in-flight slot. Returns whether `generation` is still current.
    fn finish(&mut self, generation: u64) -> bool {
        self.in_flight = false;
        self.generation == generation
    }

    fn reset(&mut self) {
        self.session.reset();
        self.generation += 1;
    }
}

pub struct WalletSessionAdapter {
    provider: Arc<dyn WalletProvider>,
    state: Mutex<AdapterState>,
}

impl WalletSessionAdapter {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(AdapterState::default()),
        }
    }

    pub fn provider(&self) -> &Arc<dyn WalletProvider> {
        &self.provider
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> WalletSession {
        self.state.lock().session.clone()
    }

    pub fn status(&self) -> WalletStatus {
        self.state.lock().session.status
    }

    pub fn address(&self) -> Option<String> {
        self.state.lock().session.address.clone()
    }

    /// Connect through the provider and record the first approved account.
    ///
    /// # Errors
    /// `AlreadyConnected`/`Busy` without touching the provider when not
    /// `Disconnected` or while another call is in flight; `NoAccounts` when
    /// the provider approves no account; `Provider` when the provider fails;
    /// `Interrupted` when the provider ends the session before the connect
    /// completes. The session ends `Disconnected` on every error except the
    /// local ones.
    pub async fn connect(&self) -> Result<WalletConnection, WalletError> {
        let generation = {
            let mut state = self.state.lock();
            if state.in_flight {
                return Err(WalletError::Busy);
            }
            match state.session.status {
                WalletStatus::Disconnected => state.begin(WalletStatus::Connecting),
                WalletStatus::Connected => return Err(WalletError::AlreadyConnected),
                _ => return Err(WalletError::Busy),
            }
        };
        debug!(generation, "wallet connecting");

        let accounts = match self.provider.connect().await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!(error = %e, "wallet connect failed");
                self.abort_connect(generation);
                return Err(e.into());
            }
        };

        let Some(address) = accounts.into_iter().next().filter(|a| !a.is_empty()) else {
            warn!("wallet approved no accounts");
            self.abort_connect(generation);
            return Err(WalletError::NoAccounts);
        };

        let balance = self.lookup_balance(&address).await;
        let chain_id = self.lookup_chain_id().await;

        {
            let mut state = self.state.lock();
            if !state.finish(generation) {
                warn!(generation, "wallet session ended while connecting");
                return Err(WalletError::Interrupted);
            }
            state.session.status = WalletStatus::Connected;
            state.session.address = Some(address.clone());
            state.session.chain_id = chain_id;
        }
        info!(%address, ?chain_id, "wallet connected");

        Ok(WalletConnection {
            address,
            balance,
            chain_id,
        })
    }

    /// End the session. The provider is told best-effort; the local session is
    /// cleared even if that fails.
    pub async fn disconnect(&self) -> Result<(), WalletError> {
        {
            let mut state = self.state.lock();
            match state.session.status {
                WalletStatus::Connected => state.reset(),
                WalletStatus::Disconnected => return Err(WalletError::NotConnected),
                _ => return Err(WalletError::Busy),
            }
        }

        if let Err(e) = self.provider.disconnect().await {
            warn!(error = %e, "provider disconnect failed; session cleared locally");
        }
        info!("wallet disconnected");
        Ok(())
    }

    /// Sign `message` with the connected account via `personal_sign`.
    ///
    /// A signing failure leaves the session connected. If the provider ends
    /// the session while the signature is pending, the result is discarded
    /// and `Interrupted` is returned.
    pub async fn sign(&self, message: &str) -> Result<SignedMessage, WalletError> {
        let (generation, address) = {
            let mut state = self.state.lock();
            if state.in_flight {
                return Err(WalletError::Busy);
            }
            match (state.session.status, state.session.address.clone()) {
                (WalletStatus::Connected, Some(address)) => {
                    (state.begin(WalletStatus::Signing), address)
                }
                (WalletStatus::Disconnected, _) | (WalletStatus::Connected, None) => {
                    return Err(WalletError::NotConnected)
                }
                _ => return Err(WalletError::Busy),
            }
        };
        debug!(generation, %address, "requesting signature");

        let result = self
            .provider
            .request(RpcRequest::personal_sign(message, &address))
            .await;

        {
            let mut state = self.state.lock();
            if !state.finish(generation) {
                warn!(generation, "wallet session ended while signing");
                return Err(WalletError::Interrupted);
            }
            state.session.status = WalletStatus::Connected;
        }

        let signature = match result {
            Ok(Value::String(signature)) if !signature.is_empty() => signature,
            Ok(other) => {
                warn!(response = %other, "unexpected personal_sign response");
                return Err(WalletError::InvalidResponse {
                    method: RpcRequest::PERSONAL_SIGN,
                    reason: "expected a non-empty signature string".to_string(),
                });
            }
            Err(e) => {
                warn!(error = %e, "signing failed");
                return Err(e.into());
            }
        };
        info!(%address, "message signed");

        Ok(SignedMessage {
            signature,
            message: message.to_string(),
        })
    }

    /// Apply a provider-pushed event. Returns what changed, if anything.
    ///
    /// A session the web app never saw connected produces no change, even
    /// when the event ends a pending connect.
    pub fn handle_provider_event(&self, event: ProviderEvent) -> Option<SessionChange> {
        let mut state = self.state.lock();
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                if !state.session.is_connected() {
                    debug!(status = %state.session.status, "ignoring accounts change");
                    return None;
                }
                match accounts.into_iter().next().filter(|a| !a.is_empty()) {
                    Some(address) if state.session.address.as_deref() == Some(address.as_str()) => {
                        None
                    }
                    Some(address) => {
                        info!(%address, "wallet account changed");
                        state.session.address = Some(address.clone());
                        Some(SessionChange::AccountChanged(address))
                    }
                    None => {
                        info!("wallet revoked all accounts");
                        state.reset();
                        Some(SessionChange::Disconnected)
                    }
                }
            }
            ProviderEvent::ChainChanged(chain_id) => {
                if !state.session.is_connected() || state.session.chain_id == Some(chain_id) {
                    return None;
                }
                debug!(chain_id, "wallet chain changed");
                state.session.chain_id = Some(chain_id);
                Some(SessionChange::ChainChanged(chain_id))
            }
            ProviderEvent::Disconnected => match state.session.status {
                WalletStatus::Disconnected => None,
                WalletStatus::Connecting => {
                    info!("wallet session ended by provider before connect completed");
                    state.reset();
                    None
                }
                WalletStatus::Connected | WalletStatus::Signing => {
                    info!("wallet session ended by provider");
                    state.reset();
                    Some(SessionChange::Disconnected)
                }
            },
        }
    }

    /// Release the slot after a failed connect and drop back to Disconnected,
    /// unless the provider already reset the session.
    fn abort_connect(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.finish(generation) {
            state.reset();
        }
    }

    async fn lookup_balance(&self, address: &str) -> Option<String> {
        match self.provider.request(RpcRequest::balance(address)).await {
            Ok(Value::String(balance)) => Some(balance),
            Ok(Value::Number(balance)) => Some(balance.to_string()),
            Ok(other) => {
                warn!(response = %other, "unexpected eth_getBalance response");
                None
            }
            Err(e) => {
                warn!(error = %e, "balance lookup failed");
                None
            }
        }
    }

    async fn lookup_chain_id(&self) -> Option<u64> {
        match self.provider.request(RpcRequest::chain_id()).await {
            Ok(value) => {
                let chain_id = parse_chain_id(&value);
                if chain_id.is_none() {
                    warn!(response = %value, "unexpected eth_chainId response");
                }
                chain_id
            }
            Err(e) => {
                warn!(error = %e, "chain id lookup failed");
                None
            }
        }
    }
}
