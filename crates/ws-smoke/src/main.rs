use dash_driver::{close_channel, run_session_with_close, CloseReason, DriverConfig, ScriptedHandler};
use dotenvy::dotenv;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    // Optional: full endpoint URL as the first argument
    let mut config = DriverConfig::from_env();
    if let Some(url) = std::env::args().nth(1) {
        config = config.with_endpoint(url);
    }

    let (handle, close_signal) = close_channel();
    let interrupt = handle.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received, closing connection");
            interrupt.request(CloseReason::Requested);
        }
    });

    let mut handler = ScriptedHandler::new();
    let report = run_session_with_close(&config, &mut handler, (handle, close_signal)).await?;

    tracing::info!(
        endpoint = %report.endpoint,
        sent = report.sent.len(),
        received = report.received,
        malformed = handler.malformed(),
        server_errors = handler.server_errors().len(),
        end = ?report.end,
        "Done"
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tungstenite=warn,tokio_tungstenite=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
