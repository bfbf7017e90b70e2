use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    SessionTimeout,
    Requested,
}

/// Sending side of the single-use close signal. Cloneable; only the first
/// `request` is delivered, later calls are no-ops.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    tx: Arc<Mutex<Option<oneshot::Sender<CloseReason>>>>,
}

/// Receiving side, owned by the session loop.
#[derive(Debug)]
pub struct CloseSignal {
    rx: Option<oneshot::Receiver<CloseReason>>,
}

pub fn close_channel() -> (CloseHandle, CloseSignal) {
    let (tx, rx) = oneshot::channel();
    (
        CloseHandle { tx: Arc::new(Mutex::new(Some(tx))) },
        CloseSignal { rx: Some(rx) },
    )
}

impl CloseHandle {
    /// Returns true if this call was the one that delivered the request.
    pub fn request(&self, reason: CloseReason) -> bool {
        let sender = self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
        match sender {
            Some(tx) => tx.send(reason).is_ok(),
            None => false,
        }
    }
}

impl CloseSignal {
    /// Resolves once with the first requested reason; pending forever after
    /// that, or if every handle was dropped without requesting.
    pub async fn recv(&mut self) -> CloseReason {
        if let Some(rx) = self.rx.as_mut() {
            if let Ok(reason) = rx.await {
                self.rx = None;
                return reason;
            }
            self.rx = None;
        }
        std::future::pending().await
    }
}

/// Sleeps for `after`, then requests a close. Abort the handle to cancel.
pub fn spawn_session_timer(after: Duration, handle: CloseHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        sleep(after).await;
        if handle.request(CloseReason::SessionTimeout) {
            debug!(?after, "Session timer fired");
        }
    })
}
