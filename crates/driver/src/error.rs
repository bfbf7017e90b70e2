use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("invalid endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("websocket connect failed: {0}")]
    Connect(#[source] tungstenite::Error),
    #[error("websocket transport error: {0}")]
    Transport(#[source] tungstenite::Error),
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}
