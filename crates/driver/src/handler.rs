use dash_protocol::Request;
use url::Url;

use crate::error::DriverError;

/// Requests queued by a handler during one callback. The session loop sends
/// them in order once the callback returns.
#[derive(Debug, Default)]
pub struct Outbox {
    queued: Vec<Request>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, request: Request) {
        self.queued.push(request);
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Request> {
        self.queued.drain(..)
    }
}

/// Close frame details as reported by the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

/// Connection events, delivered one at a time in arrival order.
pub trait SessionHandler {
    fn on_open(&mut self, _endpoint: &Url) {}

    fn on_message(&mut self, text: &str, outbox: &mut Outbox);

    fn on_error(&mut self, _error: &DriverError) {}

    fn on_close(&mut self, _frame: Option<&CloseInfo>) {}
}
