use serde::{Deserialize, Serialize};

use crate::redirect::RedirectParams;

/// Result read from a navigation that reached the callback host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackResult {
    pub id_token: Option<String>,
    pub state: Option<String>,
}

impl CallbackResult {
    pub fn from_params(params: &RedirectParams) -> Self {
        Self {
            id_token: params.id_token().map(str::to_string),
            state: params.state().map(str::to_string),
        }
    }

    /// Whether an `id_token` was found in the fragment or the query.
    pub fn present(&self) -> bool {
        self.id_token.is_some()
    }

    pub fn into_success(self) -> Option<LoginSuccess> {
        let id_token = self.id_token?;
        Some(LoginSuccess {
            id_token,
            state: self.state,
        })
    }
}

/// A captured id token, forwarded to the web app as-is.
///
/// `state` is passed through unchecked; the web app compares it with the
/// value it expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSuccess {
    pub id_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Lifecycle of the identity-provider session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Active { authorization_url: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redirect::parse_redirect_url;

    #[test]
    fn present_iff_id_token_found() {
        let with = CallbackResult::from_params(&parse_redirect_url("https://a.test/#id_token=T"));
        assert!(with.present());
        assert_eq!(with.state, None);

        let without = CallbackResult::from_params(&parse_redirect_url("https://a.test/#state=S"));
        assert!(!without.present());
        assert!(without.into_success().is_none());
    }

    #[test]
    fn success_keeps_state() {
        let result =
            CallbackResult::from_params(&parse_redirect_url("https://a.test/?id_token=T&state=S"));
        let success = result.into_success().unwrap();
        assert_eq!(success.id_token, "T");
        assert_eq!(success.state.as_deref(), Some("S"));
    }
}
