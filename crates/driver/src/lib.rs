pub mod client;
pub mod close;
pub mod config;
pub mod error;
pub mod handler;
pub mod scripted;

pub use client::{run_session, run_session_with_close, EndReason, SessionReport};
pub use close::{close_channel, spawn_session_timer, CloseHandle, CloseReason, CloseSignal};
pub use config::DriverConfig;
pub use error::DriverError;
pub use handler::{CloseInfo, Outbox, SessionHandler};
pub use scripted::ScriptedHandler;
