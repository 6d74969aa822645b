/// Outbound half of the bridge to the primary web app (its `postMessage`).
///
/// Each call carries one complete serialized message.
pub trait BridgeChannel: Send + Sync {
    fn post_message(&self, message: &str) -> Result<(), ChannelError>;
}

#[derive(Debug, Clone)]
pub struct ChannelError {
    pub message: String,
}

impl ChannelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ChannelError {}
