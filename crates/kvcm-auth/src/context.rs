//! Capability interface for the isolated browsing context that hosts the
//! identity provider's pages.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Location change reported by the browsing context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEvent {
    pub url: String,
}

impl NavigationEvent {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Everything a browsing context reports to its observer, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowsingContextEvent {
    Navigated(NavigationEvent),
    /// Transport-level failure (DNS, TLS, connection reset).
    LoadFailed { url: Option<String>, description: String },
    /// The page loaded with a non-success HTTP status.
    HttpError { url: String, status: u16 },
}

/// Observer invoked for every event of the browsing context.
pub type NavigationObserver = Arc<dyn Fn(BrowsingContextEvent) + Send + Sync>;

/// Error reported by a browsing context implementation.
#[derive(Debug, Clone)]
pub struct BrowsingContextError {
    pub message: String,
}

impl BrowsingContextError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for BrowsingContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BrowsingContextError {}

/// A navigable rendering surface the shell does not control, such as a modal
/// web view.
///
/// Implementations must deliver events to the registered observer in the order
/// they occur, without coalescing. Registering a new observer replaces the
/// previous one. `close` must be idempotent.
pub trait BrowsingContext: Send + Sync {
    /// Show the context and load `url`.
    fn navigate(&self, url: &str) -> Result<(), BrowsingContextError>;

    fn on_navigate(&self, observer: NavigationObserver);

    /// Dismiss the context.
    fn close(&self);
}
