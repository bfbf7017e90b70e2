use dash_protocol::{Envelope, ErrorDetail, Inbound, Request};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::DriverError;
use crate::handler::{CloseInfo, Outbox, SessionHandler};

/// Walks the server through status -> container_list -> container_info ->
/// container_select. Reacts to each message on its own; nothing about earlier
/// messages is remembered except the counters below.
#[derive(Debug, Default)]
pub struct ScriptedHandler {
    malformed: usize,
    server_errors: Vec<ErrorDetail>,
}

impl ScriptedHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames that were not valid envelopes or had the wrong payload shape.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    pub fn server_errors(&self) -> &[ErrorDetail] {
        &self.server_errors
    }
}

impl SessionHandler for ScriptedHandler {
    fn on_open(&mut self, endpoint: &Url) {
        info!(%endpoint, "WebSocket connection opened");
    }

    fn on_message(&mut self, text: &str, outbox: &mut Outbox) {
        debug!(raw = text, "Received message");

        let envelope = match Envelope::parse(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.malformed += 1;
                warn!(error = %e, raw = text, "Invalid JSON");
                return;
            }
        };
        let inbound = match Inbound::decode(&envelope) {
            Ok(inbound) => inbound,
            Err(e) => {
                self.malformed += 1;
                warn!(kind = %envelope.kind, error = %e, payload = %envelope.payload, "Unexpected payload shape");
                return;
            }
        };

        match inbound {
            Inbound::Status(status) => {
                info!(connected = status.connected, text = status.message.as_deref().unwrap_or(""), "Status");
                if status.connected {
                    info!("Connected, requesting container list");
                    outbox.send(Request::container_list());
                }
            }
            Inbound::ContainerList(containers) => {
                info!("Found {} containers", containers.len());
                for c in &containers {
                    info!(name = %c.name, status = %c.status, kind = %c.kind, "Container");
                }
                if let Some(first) = containers.first() {
                    info!(container = %first.name, "Requesting container info");
                    outbox.send(Request::container_info(first.name.as_str()));
                }
            }
            Inbound::ContainerInfo(detail) => {
                info!(container = %envelope.payload, "Container info");
                info!(container = %detail.name, "Selecting container");
                outbox.send(Request::container_select(detail.name));
            }
            Inbound::Error(detail) => {
                error!(error.code = detail.code, error.message = %detail.message, "Server reported error");
                self.server_errors.push(detail);
            }
            Inbound::Unhandled(kind) => {
                debug!(%kind, "Ignoring message");
            }
        }
    }

    fn on_error(&mut self, error: &DriverError) {
        error!(%error, "WebSocket error");
    }

    fn on_close(&mut self, frame: Option<&CloseInfo>) {
        match frame {
            Some(frame) => info!(code = frame.code, reason = %frame.reason, "WebSocket connection closed"),
            None => info!("WebSocket connection closed"),
        }
    }
}
