//! Single-writer gate over the transport's write half.
//!
//! Every outbound frame (text, ping, close) takes the same async mutex, so
//! concurrent callers never interleave bytes on the wire. Reads never touch
//! the gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use cashdesk_core::error::{CashDeskError, Result};

use crate::transport::FrameSink;

enum Outbound<'a> {
    Text(String),
    Ping,
    Close { code: u16, reason: &'a str },
}

#[derive(Default)]
pub struct SendGate {
    sink: tokio::sync::Mutex<Option<Box<dyn FrameSink>>>,
    shutdown: Mutex<Option<CancellationToken>>,
    attached: AtomicBool,
}

impl SendGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the write half of a freshly opened socket.
    pub async fn attach(&self, sink: Box<dyn FrameSink>, shutdown: CancellationToken) {
        *self.sink.lock().await = Some(sink);
        *self.shutdown.lock().unwrap_or_else(|e| e.into_inner()) = Some(shutdown);
        self.attached.store(true, Ordering::Release);
    }

    /// Drop the write half. Later sends fail with `NotConnected`.
    pub async fn detach(&self) {
        self.attached.store(false, Ordering::Release);
        self.shutdown.lock().unwrap_or_else(|e| e.into_inner()).take();
        self.sink.lock().await.take();
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Write one complete text frame.
    ///
    /// Waiting for the gate and the write itself both observe the
    /// connection's shutdown signal and yield `Cancelled` when it fires.
    pub async fn send_text(&self, text: String) -> Result<()> {
        self.gated(Outbound::Text(text)).await
    }

    pub async fn ping(&self) -> Result<()> {
        self.gated(Outbound::Ping).await
    }

    /// Write a close frame. Not interrupted by shutdown, since disconnect
    /// fires the signal before closing.
    pub async fn close(&self, code: u16, reason: &str) -> Result<()> {
        self.write(Outbound::Close { code, reason }).await
    }

    async fn gated(&self, frame: Outbound<'_>) -> Result<()> {
        let token = self
            .shutdown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(CashDeskError::NotConnected)?;

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(CashDeskError::Cancelled),
            res = self.write(frame) => res,
        }
    }

    async fn write(&self, frame: Outbound<'_>) -> Result<()> {
        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or(CashDeskError::NotConnected)?;
        match frame {
            Outbound::Text(text) => sink.send_text(text).await,
            Outbound::Ping => sink.send_ping().await,
            Outbound::Close { code, reason } => sink.send_close(code, reason).await,
        }
    }
}
