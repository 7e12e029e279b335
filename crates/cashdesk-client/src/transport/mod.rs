//! Transport layer (WebSocket).
//!
//! The engine consumes the socket as a capability: a `Connector` opens it and
//! hands back a write half (`FrameSink`) and a read half (`FrameSource`).
//! `ws` is the production adapter over `tokio-tungstenite`; tests plug in an
//! in-memory implementation of the same traits.

pub mod reassembler;
pub mod ws;

use async_trait::async_trait;

use cashdesk_core::error::Result;

use crate::config::Headers;

/// Normal closure (RFC 6455 §7.4.1).
pub const CLOSE_NORMAL: u16 = 1000;

/// Frame category reported by a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Binary,
    Close,
}

/// Close code/reason as received from the peer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseInfo {
    pub code: Option<u16>,
    pub reason: Option<String>,
}

/// Outcome of one `FrameSource::receive` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveResult {
    pub kind: FrameKind,
    /// Bytes written into the caller's buffer.
    pub count: usize,
    /// True when this chunk ends a logical message.
    pub end_of_message: bool,
    /// Set only for `FrameKind::Close`.
    pub close: Option<CloseInfo>,
}

impl ReceiveResult {
    pub fn data(kind: FrameKind, count: usize, end_of_message: bool) -> Self {
        Self {
            kind,
            count,
            end_of_message,
            close: None,
        }
    }

    pub fn close(info: CloseInfo) -> Self {
        Self {
            kind: FrameKind::Close,
            count: 0,
            end_of_message: true,
            close: Some(info),
        }
    }
}

/// Read half of an open socket.
#[async_trait]
pub trait FrameSource: Send {
    /// Read the next chunk into `buf`.
    ///
    /// Must be cancel-safe: if the returned future is dropped before it
    /// completes, no data is lost and the next call resumes where it left off.
    async fn receive(&mut self, buf: &mut [u8]) -> Result<ReceiveResult>;
}

/// Write half of an open socket. Each call writes one complete frame.
#[async_trait]
pub trait FrameSink: Send {
    async fn send_text(&mut self, text: String) -> Result<()>;
    async fn send_ping(&mut self) -> Result<()>;
    async fn send_close(&mut self, code: u16, reason: &str) -> Result<()>;
}

/// Opens sockets.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(
        &self,
        endpoint: &str,
        headers: &Headers,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>)>;
}
