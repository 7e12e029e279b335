//! Background receive task.
//!
//! One per open connection. Reads chunks into the reassembler, decodes and
//! dispatches each complete message in wire order, and answers peer close
//! frames. Keep-alive pings run on a sibling task so a slow ping write
//! never holds up reads.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use cashdesk_core::error::CashDeskError;
use cashdesk_core::protocol::decode_incoming;

use super::{ConnectionState, Shared};
use crate::dispatch::{ConnectionClosed, DispatchOutcome};
use crate::transport::reassembler::FrameReassembler;
use crate::transport::{CloseInfo, FrameKind, FrameSource, CLOSE_NORMAL};

pub(crate) async fn run(
    shared: Arc<Shared>,
    mut source: Box<dyn FrameSource>,
    shutdown: CancellationToken,
    keep_alive: Option<Duration>,
    buffer_size: usize,
) {
    let mut asm = FrameReassembler::new(buffer_size);

    // The pinger stops with the connection or when this loop returns.
    let pinger_stop = shutdown.child_token();
    let _stop_pinger_on_exit = pinger_stop.clone().drop_guard();
    let mut ping_failures = keep_alive.map(|every| {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(keep_alive_loop(shared.clone(), pinger_stop, every, tx));
        rx
    });

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                tracing::debug!(target: "cashdesk", "receive loop stopped");
                return;
            }

            err = next_ping_failure(&mut ping_failures) => {
                fault(&shared, &shutdown, err);
                return;
            }

            read = source.receive(asm.chunk_mut()) => {
                let chunk = match read {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        fault(&shared, &shutdown, e);
                        return;
                    }
                };

                if chunk.kind == FrameKind::Close {
                    handle_close(&shared, chunk.close.unwrap_or_default()).await;
                    return;
                }

                if asm.accept(chunk.count, chunk.end_of_message) {
                    deliver(&shared, asm.message());
                }
            }
        }
    }
}

/// Ping through the send gate every `every` until `stop` fires or a ping
/// fails. The failure is handed back to the receive loop, which owns fault
/// reporting.
async fn keep_alive_loop(
    shared: Arc<Shared>,
    stop: CancellationToken,
    every: Duration,
    failed: mpsc::Sender<CashDeskError>,
) {
    let mut tick = interval_at(Instant::now() + every, every);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => return,
            _ = tick.tick() => {}
        }

        let res = tokio::select! {
            biased;
            _ = stop.cancelled() => return,
            res = shared.gate.ping() => res,
        };
        match res {
            Ok(()) => tracing::trace!(target: "cashdesk", "keep-alive ping sent"),
            Err(e) => {
                let _ = failed.send(e).await;
                return;
            }
        }
    }
}

async fn next_ping_failure(rx: &mut Option<mpsc::Receiver<CashDeskError>>) -> CashDeskError {
    match rx {
        Some(rx) => match rx.recv().await {
            Some(err) => err,
            None => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}

fn deliver(shared: &Shared, bytes: &[u8]) {
    let env = match decode_incoming(bytes) {
        Ok(env) => env,
        Err(e) => {
            tracing::warn!(target: "cashdesk", error = %e, bytes = bytes.len(), "dropped malformed message");
            shared.diag.line(&format!("Dropped malformed message: {e}"));
            return;
        }
    };

    match shared.dispatcher.dispatch(&env) {
        DispatchOutcome::Delivered(n) => {
            tracing::debug!(target: "cashdesk", msg_type = %env.msg_type, handlers = n, "delivered")
        }
        DispatchOutcome::NoHandler => {
            tracing::debug!(target: "cashdesk", msg_type = %env.msg_type, "no handler")
        }
        DispatchOutcome::Unsupported | DispatchOutcome::PayloadRejected => {}
    }
}

async fn handle_close(shared: &Shared, info: CloseInfo) {
    tracing::info!(
        target: "cashdesk",
        code = ?info.code,
        reason = info.reason.as_deref().unwrap_or(""),
        "server closed connection"
    );
    shared.diag.line(&format!(
        "Server closed connection: {} {}",
        info.code.map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
        info.reason.as_deref().unwrap_or("")
    ));

    let state = shared.state.close_received();
    shared.dispatcher.notify_closed(&ConnectionClosed {
        code: info.code,
        reason: info.reason,
    });

    // Only a peer-initiated close is acknowledged; if we were already
    // closing, the peer's frame is the acknowledgement.
    if state == ConnectionState::CloseReceived {
        if let Err(e) = shared.gate.close(CLOSE_NORMAL, "Acknowledged").await {
            tracing::warn!(target: "cashdesk", code = CLOSE_NORMAL, error = %e, "close acknowledgement failed");
            shared.diag.line(&format!("Close acknowledgement failed: {e}"));
        }
        shared.state.close_sent();
    }
}

fn fault(shared: &Shared, shutdown: &CancellationToken, err: CashDeskError) {
    // Shutdown racing an in-flight read or ping is not a fault.
    if shutdown.is_cancelled() || matches!(err, CashDeskError::Cancelled) {
        return;
    }

    tracing::warn!(target: "cashdesk", error = %err, kind = err.kind().as_str(), "receive loop faulted");
    shared.diag.line(&format!("Receive loop faulted: {err}"));
    shared.state.set(ConnectionState::Closed);
    shared.dispatcher.notify_closed(&ConnectionClosed {
        code: None,
        reason: Some(err.to_string()),
    });
}
