use std::time::Duration;

use dash_protocol::Request;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info};
use url::Url;

use crate::close::{close_channel, spawn_session_timer, CloseHandle, CloseReason, CloseSignal};
use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::handler::{CloseInfo, Outbox, SessionHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The session timer fired.
    Timeout,
    /// Someone other than the timer requested the close.
    CloseRequested,
    ServerClosed,
    TransportError,
    ConnectFailed,
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub endpoint: Url,
    /// Requests actually written to the socket, in order.
    pub sent: Vec<Request>,
    /// Text frames received.
    pub received: usize,
    pub end: EndReason,
}

/// Runs one session against the configured endpoint with the default session
/// timer. Only an invalid endpoint is returned as an error; connection and
/// transport failures go to `handler.on_error` and end the session normally.
pub async fn run_session<H: SessionHandler>(
    config: &DriverConfig,
    handler: &mut H,
) -> Result<SessionReport, DriverError> {
    run_session_with_close(config, handler, close_channel()).await
}

/// Like [`run_session`], but with a caller-supplied close channel so other
/// tasks (a Ctrl+C listener, a test) can end the session through their own
/// `CloseHandle`.
pub async fn run_session_with_close<H: SessionHandler>(
    config: &DriverConfig,
    handler: &mut H,
    (close_handle, mut close_signal): (CloseHandle, CloseSignal),
) -> Result<SessionReport, DriverError> {
    let endpoint = config.endpoint()?;
    let timer = spawn_session_timer(config.session_timeout, close_handle.clone());
    let mut sent = Vec::new();
    let mut received = 0usize;

    info!(%endpoint, timeout = ?config.session_timeout, "Connecting");
    let connected = tokio::select! {
        res = connect_async(endpoint.as_str()) => res,
        reason = close_signal.recv() => {
            info!(?reason, "Session ended before the connection was established");
            handler.on_close(None);
            timer.abort();
            return Ok(SessionReport { endpoint, sent, received, end: end_reason(reason) });
        }
    };
    let ws_stream = match connected {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            handler.on_error(&DriverError::Connect(e));
            handler.on_close(None);
            timer.abort();
            return Ok(SessionReport { endpoint, sent, received, end: EndReason::ConnectFailed });
        }
    };

    let (mut write, mut read) = ws_stream.split();
    handler.on_open(&endpoint);

    let mut outbox = Outbox::new();
    let end = loop {
        tokio::select! {
            reason = close_signal.recv() => {
                debug!(?reason, "Close requested");
                close_gracefully(&mut write, &mut read, config.close_grace, handler).await;
                break end_reason(reason);
            }
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    received += 1;
                    handler.on_message(&text, &mut outbox);
                    if let Err(e) = flush(&mut write, &mut outbox, &mut sent).await {
                        handler.on_error(&e);
                        handler.on_close(None);
                        break EndReason::TransportError;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    // Our Close reply is only queued until the next write or flush
                    if let Err(e) = write.flush().await {
                        debug!(error = %e, "Close reply could not be flushed");
                    }
                    let info = frame.map(close_info);
                    handler.on_close(info.as_ref());
                    break EndReason::ServerClosed;
                }
                Some(Ok(_)) => {
                    // Binary, ping and pong frames are not part of the protocol
                }
                Some(Err(e)) => {
                    handler.on_error(&DriverError::Transport(e));
                    handler.on_close(None);
                    break EndReason::TransportError;
                }
                None => {
                    handler.on_close(None);
                    break EndReason::ServerClosed;
                }
            }
        }
    };
    timer.abort();

    info!(sent = sent.len(), received, ?end, "Session finished");
    Ok(SessionReport { endpoint, sent, received, end })
}

async fn flush<S>(write: &mut S, outbox: &mut Outbox, sent: &mut Vec<Request>) -> Result<(), DriverError>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    if outbox.is_empty() {
        return Ok(());
    }
    debug!(queued = outbox.len(), "Sending queued requests");
    for request in outbox.drain() {
        let json = request.to_json()?;
        write.send(Message::Text(json)).await.map_err(DriverError::Transport)?;
        info!(kind = %request.message_type(), container = request.container_name().unwrap_or(""), "Sent request");
        sent.push(request);
    }
    Ok(())
}

/// Sends our Close frame and waits up to `grace` for the peer's reply.
/// Frames that arrive in between are dropped.
async fn close_gracefully<S, R, H>(write: &mut S, read: &mut R, grace: Duration, handler: &mut H)
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
    H: SessionHandler,
{
    if let Err(e) = write.send(Message::Close(None)).await {
        debug!(error = %e, "Close frame could not be sent");
        handler.on_close(None);
        return;
    }

    let reply = timeout(grace, async {
        while let Some(frame) = read.next().await {
            match frame {
                Ok(Message::Close(frame)) => return frame.map(close_info),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
        None
    })
    .await;

    match reply {
        Ok(info) => handler.on_close(info.as_ref()),
        Err(_) => {
            debug!(?grace, "No close reply from server");
            handler.on_close(None);
        }
    }
}

fn close_info(frame: CloseFrame<'_>) -> CloseInfo {
    CloseInfo { code: u16::from(frame.code), reason: frame.reason.into_owned() }
}

fn end_reason(reason: CloseReason) -> EndReason {
    match reason {
        CloseReason::SessionTimeout => EndReason::Timeout,
        CloseReason::Requested => EndReason::CloseRequested,
    }
}
