use std::net::SocketAddr;
use std::time::Duration;

use dash_driver::DriverConfig;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

pub(crate) fn configure_tracing() {
    use std::sync::OnceLock;
    static TRACING_INIT: OnceLock<()> = OnceLock::new();
    TRACING_INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with_test_writer()
            .try_init();
    });
}

pub(crate) fn test_config(addr: SocketAddr, session_timeout: Duration) -> DriverConfig {
    DriverConfig {
        session_timeout,
        close_grace: Duration::from_millis(200),
        ..DriverConfig::default()
    }
    .with_endpoint(format!("ws://{}/ws", addr))
}

/// Accepts a single client, pushes `greeting` frames, then answers every
/// text frame with whatever `script` returns. Resolves to the decoded frames
/// the client sent once the client goes away.
pub(crate) async fn spawn_server<F>(greeting: Vec<String>, mut script: F) -> (SocketAddr, JoinHandle<Vec<Value>>)
where
    F: FnMut(&Value) -> Vec<String> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let mut received = Vec::new();
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(stream).await.expect("handshake");

        for text in greeting {
            if ws.send(Message::Text(text)).await.is_err() {
                return received;
            }
        }

        while let Some(frame) = ws.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    let value: Value = serde_json::from_str(&text).expect("client sent JSON");
                    let replies = script(&value);
                    received.push(value);
                    for reply in replies {
                        if ws.send(Message::Text(reply)).await.is_err() {
                            return received;
                        }
                    }
                }
                // Keep reading so the close reply gets flushed
                Ok(Message::Close(_)) => continue,
                Ok(_) => {}
                Err(_) => break,
            }
        }
        received
    });

    (addr, handle)
}

pub(crate) fn kind(value: &Value) -> &str {
    value.get("type").and_then(Value::as_str).unwrap_or("")
}
