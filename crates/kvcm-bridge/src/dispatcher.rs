//! Bridge dispatcher.
//!
//! Owns the single outbound channel to the web app and routes each inbound
//! message to the identity session or the wallet adapter. Every result is
//! posted back as one complete message; failures from the identity provider
//! or the wallet become `*_ERROR` messages, never raw errors.

use std::sync::{Arc, Weak};

use kvcm_auth::{BrowsingContext, IdentitySession, LoginListener};
use kvcm_wallet::{
    ProviderEvent, SessionChange, WalletConnection, WalletError, WalletProvider,
    WalletSessionAdapter,
};
use tracing::{debug, warn};

use crate::channel::BridgeChannel;
use crate::config::ShellConfig;
use crate::error::BridgeError;
use crate::message::{InboundMessage, OutboundMessage};

pub struct BridgeDispatcher {
    channel: Arc<dyn BridgeChannel>,
    identity: IdentitySession,
    wallet: Arc<WalletSessionAdapter>,
    default_sign_message: String,
}

impl BridgeDispatcher {
    /// Wire the identity session and the wallet adapter to `channel`.
    ///
    /// Subscribes to the provider's session events.
    ///
    /// # Errors
    /// Returns `BridgeError` if `config` is invalid.
    pub fn new(
        config: ShellConfig,
        channel: Arc<dyn BridgeChannel>,
        context: Arc<dyn BrowsingContext>,
        provider: Arc<dyn WalletProvider>,
    ) -> Result<Self, BridgeError> {
        config.validate()?;

        let login_channel = Arc::clone(&channel);
        let listener: LoginListener = Arc::new(move |success| {
            post(login_channel.as_ref(), &OutboundMessage::login_succeeded(success));
        });
        let identity = IdentitySession::new(config.google, context, listener)?;

        let wallet = Arc::new(WalletSessionAdapter::new(Arc::clone(&provider)));
        let weak_wallet: Weak<WalletSessionAdapter> = Arc::downgrade(&wallet);
        let event_channel = Arc::clone(&channel);
        provider.subscribe(Arc::new(move |event| {
            if let Some(wallet) = weak_wallet.upgrade() {
                forward_provider_event(&wallet, event_channel.as_ref(), event);
            }
        }));

        Ok(Self {
            channel,
            identity,
            wallet,
            default_sign_message: config.sign_message,
        })
    }

    pub fn identity(&self) -> &IdentitySession {
        &self.identity
    }

    pub fn wallet(&self) -> &WalletSessionAdapter {
        &self.wallet
    }

    /// Handle one raw message from the web app.
    ///
    /// Malformed messages and unknown kinds are logged and dropped.
    pub async fn handle_message(&self, raw: &str) {
        match InboundMessage::decode(raw) {
            Ok(message) => self.dispatch(message).await,
            Err(BridgeError::UnknownKind(kind)) => {
                warn!(%kind, "dropping bridge message of unrecognized type");
            }
            Err(e) => warn!(error = %e, "dropping bridge message"),
        }
    }

    pub async fn dispatch(&self, message: InboundMessage) {
        debug!(kind = message.kind(), "bridge message received");
        match message {
            InboundMessage::GoogleLoginRequest => self.start_login(),
            InboundMessage::WalletConnectAttempt => self.connect_wallet_and_report().await,
            InboundMessage::WalletSignRequest { message } => {
                let message = message.unwrap_or_else(|| self.default_sign_message.clone());
                self.sign_message(&message).await;
            }
            InboundMessage::WalletDisconnectRequest => self.disconnect_wallet().await,
        }
    }

    /// Open the identity provider's login page. The token is posted when the
    /// callback is observed.
    pub fn start_login(&self) {
        if let Err(e) = self.identity.start_login() {
            warn!(error = %e, "could not start login");
            self.post(&OutboundMessage::login_failed(e));
        }
    }

    /// The user dismissed the login page.
    pub fn close_login(&self) {
        self.identity.close_login();
    }

    /// Connect and post the outcome. Callers that need the connection use
    /// `connect_wallet`.
    async fn connect_wallet_and_report(&self) {
        if let Err(e) = self.connect_wallet().await {
            debug!(error = %e, "wallet connect attempt ended without a session");
        }
    }

    pub async fn connect_wallet(&self) -> Result<WalletConnection, WalletError> {
        match self.wallet.connect().await {
            Ok(connection) => {
                self.post(&OutboundMessage::wallet_connected(connection.clone()));
                Ok(connection)
            }
            Err(e) if e.is_local() => {
                warn!(error = %e, "wallet connect rejected");
                Err(e)
            }
            Err(e) => {
                self.post(&OutboundMessage::wallet_connect_failed(&e));
                Err(e)
            }
        }
    }

    pub async fn sign_message(&self, message: &str) {
        match self.wallet.sign(message).await {
            Ok(signed) => self.post(&OutboundMessage::wallet_signed(signed)),
            Err(e) if e.is_local() => warn!(error = %e, "wallet sign rejected"),
            Err(e) => self.post(&OutboundMessage::wallet_sign_failed(&e, message)),
        }
    }

    pub async fn disconnect_wallet(&self) {
        match self.wallet.disconnect().await {
            Ok(()) => self.post(&OutboundMessage::WalletDisconnected),
            Err(e) => warn!(error = %e, "wallet disconnect rejected"),
        }
    }

    fn post(&self, message: &OutboundMessage) {
        post(self.channel.as_ref(), message);
    }
}

fn forward_provider_event(
    wallet: &WalletSessionAdapter,
    channel: &dyn BridgeChannel,
    event: ProviderEvent,
) {
    match wallet.handle_provider_event(event) {
        Some(SessionChange::AccountChanged(address)) => {
            post(channel, &OutboundMessage::wallet_account_changed(address));
        }
        Some(SessionChange::Disconnected) => post(channel, &OutboundMessage::WalletDisconnected),
        Some(SessionChange::ChainChanged(chain_id)) => debug!(chain_id, "chain change not forwarded"),
        None => {}
    }
}

fn post(channel: &dyn BridgeChannel, message: &OutboundMessage) {
    let json = match message.to_json() {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "failed to serialize bridge message");
            return;
        }
    };
    if let Err(e) = channel.post_message(&json) {
        warn!(error = %e, "failed to post bridge message");
    }
}
