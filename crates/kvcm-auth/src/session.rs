//! Identity-provider session controller.
//!
//! Drives one isolated browsing context through the hosted login page and
//! watches its navigations for the registered callback host. Each login
//! attempt gets a generation number; events observed on behalf of a
//! discarded attempt are ignored.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::GoogleOAuthConfig;
use crate::context::{BrowsingContext, BrowsingContextEvent, NavigationEvent};
use crate::error::AuthError;
use crate::redirect::parse_redirect_url;
use crate::request::AuthorizationRequest;
use crate::types::{CallbackResult, LoginSuccess, SessionStatus};

/// Receives the captured token once per successful login.
pub type LoginListener = Arc<dyn Fn(LoginSuccess) + Send + Sync>;

struct ActiveLogin {
    generation: u64,
    request: AuthorizationRequest,
    authorization_url: String,
}

#[derive(Default)]
struct SessionState {
    generation: u64,
    active: Option<ActiveLogin>,
}

struct Inner {
    config: GoogleOAuthConfig,
    callback_host: String,
    context: Arc<dyn BrowsingContext>,
    listener: LoginListener,
    state: Mutex<SessionState>,
}

/// Controller for the `Idle -> Active -> Idle` login lifecycle.
#[derive(Clone)]
pub struct IdentitySession {
    inner: Arc<Inner>,
}

impl IdentitySession {
    /// # Errors
    /// Returns `AuthError` if the configuration is invalid.
    pub fn new(
        config: GoogleOAuthConfig,
        context: Arc<dyn BrowsingContext>,
        listener: LoginListener,
    ) -> Result<Self, AuthError> {
        config.validate()?;
        let callback_host = config.callback_host()?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                callback_host,
                context,
                listener,
                state: Mutex::new(SessionState::default()),
            }),
        })
    }

    pub fn callback_host(&self) -> &str {
        &self.inner.callback_host
    }

    pub fn status(&self) -> SessionStatus {
        match &self.inner.state.lock().active {
            Some(active) => SessionStatus::Active {
                authorization_url: active.authorization_url.clone(),
            },
            None => SessionStatus::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.state.lock().active.is_some()
    }

    /// `state` of the in-flight request, if any.
    pub fn pending_state(&self) -> Option<String> {
        self.inner
            .state
            .lock()
            .active
            .as_ref()
            .map(|active| active.request.state.clone())
    }

    /// Start a login attempt and load the authorization URL.
    ///
    /// Any attempt already in flight is discarded. Returns the authorization URL.
    pub fn start_login(&self) -> Result<String, AuthError> {
        let request = AuthorizationRequest::new(&self.inner.config)?;
        let authorization_url = request.authorization_url();

        let generation = {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            let generation = state.generation;
            if state.active.is_some() {
                debug!(generation, "discarding previous login attempt");
            }
            state.active = Some(ActiveLogin {
                generation,
                request,
                authorization_url: authorization_url.clone(),
            });
            generation
        };

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner.context.on_navigate(Arc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_event(generation, event);
            }
        }));

        if let Err(e) = self.inner.context.navigate(&authorization_url) {
            warn!(generation, error = %e, "failed to load authorization page");
            self.inner.finish(generation);
            return Err(e.into());
        }

        debug!(generation, "login attempt started");
        Ok(authorization_url)
    }

    /// Abandon any attempt in flight and dismiss the browsing context.
    pub fn close_login(&self) {
        let discarded = self.inner.state.lock().active.take();
        if let Some(active) = discarded {
            debug!(generation = active.generation, "login attempt abandoned");
        }
        self.inner.context.close();
    }

    /// Feed one browsing-context event for the attempt numbered `generation`.
    ///
    /// Returns the captured token if this event completed the login.
    pub fn handle_event(&self, generation: u64, event: BrowsingContextEvent) -> Option<LoginSuccess> {
        self.inner.handle_event(generation, event)
    }

    /// Generation number of the attempt in flight, if any.
    pub fn current_generation(&self) -> Option<u64> {
        self.inner
            .state
            .lock()
            .active
            .as_ref()
            .map(|active| active.generation)
    }
}

impl Inner {
    fn handle_event(&self, generation: u64, event: BrowsingContextEvent) -> Option<LoginSuccess> {
        match event {
            BrowsingContextEvent::Navigated(navigation) => {
                self.handle_navigation(generation, &navigation)
            }
            BrowsingContextEvent::LoadFailed { url, description } => {
                warn!(generation, ?url, %description, "identity-provider page failed to load");
                None
            }
            BrowsingContextEvent::HttpError { url, status } => {
                warn!(generation, %url, status, "identity-provider page returned HTTP error");
                None
            }
        }
    }

    fn handle_navigation(&self, generation: u64, event: &NavigationEvent) -> Option<LoginSuccess> {
        if !self.is_current(generation) {
            debug!(generation, "ignoring navigation for a discarded login attempt");
            return None;
        }
        if !self.is_callback(&event.url) {
            debug!(generation, "navigation outside the callback host");
            return None;
        }

        let result = CallbackResult::from_params(&parse_redirect_url(&event.url));
        let Some(success) = result.into_success() else {
            debug!(generation, "callback host reached without id_token");
            return None;
        };

        // Another event may have completed or replaced this attempt meanwhile.
        if !self.finish(generation) {
            return None;
        }
        self.context.close();
        info!(
            generation,
            has_state = success.state.is_some(),
            "id token captured from identity-provider callback"
        );
        (self.listener)(success.clone());
        Some(success)
    }

    fn is_current(&self, generation: u64) -> bool {
        matches!(&self.state.lock().active, Some(active) if active.generation == generation)
    }

    fn is_callback(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|url| url.host_str().map(|host| host.eq_ignore_ascii_case(&self.callback_host)))
            .unwrap_or(false)
    }

    /// Move to Idle if `generation` is still the attempt in flight.
    fn finish(&self, generation: u64) -> bool {
        let mut state = self.state.lock();
        match &state.active {
            Some(active) if active.generation == generation => {
                state.active = None;
                true
            }
            _ => false,
        }
    }
}
