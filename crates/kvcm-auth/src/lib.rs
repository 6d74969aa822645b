//! Google sign-in for the shell: implicit id-token flow captured from an
//! embedded browsing context.
//!
//! The identity provider's hosted pages run in a context the shell does not
//! control. This crate builds the authorization URL, watches that context's
//! navigations for the registered callback host and extracts the token from
//! the redirect. Tokens are opaque here; verification happens downstream.

mod config;
mod context;
mod error;
mod redirect;
mod request;
mod session;
mod types;

pub use config::{GoogleOAuthConfig, DEFAULT_REDIRECT_URI, GOOGLE_AUTHORIZATION_ENDPOINT};
pub use context::{
    BrowsingContext, BrowsingContextError, BrowsingContextEvent, NavigationEvent,
    NavigationObserver,
};
pub use error::AuthError;
pub use redirect::{parse_redirect_url, RedirectParams};
pub use request::{generate_nonce, generate_state, AuthorizationRequest, RESPONSE_TYPE_ID_TOKEN};
pub use session::{IdentitySession, LoginListener};
pub use types::{CallbackResult, LoginSuccess, SessionStatus};
