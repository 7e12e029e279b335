//! `tokio-tungstenite` adapter.
//!
//! Responsibilities:
//! - Build the client handshake request (endpoint + custom headers)
//! - Split the socket into a `FrameSink` / `FrameSource` pair
//! - Serve each complete tungstenite message to the reader in buffer-sized
//!   chunks, flagging the last one as end-of-message
//! - Absorb ping/pong control frames (tungstenite answers pings itself)

use async_trait::async_trait;
use bytes::{Buf, Bytes};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use cashdesk_core::error::{CashDeskError, Result};

use super::{CloseInfo, Connector, FrameKind, FrameSink, FrameSource, ReceiveResult};
use crate::config::Headers;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Production connector.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn open(
        &self,
        endpoint: &str,
        headers: &Headers,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>)> {
        let mut request = endpoint
            .into_client_request()
            .map_err(|e| CashDeskError::Connection(format!("invalid endpoint {endpoint}: {e}")))?;

        for (key, value) in headers.iter() {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| CashDeskError::Config(format!("invalid header name {key}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| CashDeskError::Config(format!("invalid header value for {key}: {e}")))?;
            request.headers_mut().insert(name, value);
        }

        let (ws, _response) = connect_async(request)
            .await
            .map_err(|e| CashDeskError::Connection(format!("connect to {endpoint} failed: {e}")))?;

        let (sink, stream) = ws.split();
        Ok((
            Box::new(WsSink { sink }),
            Box::new(WsSource {
                stream,
                pending: Bytes::new(),
                kind: FrameKind::Text,
                in_message: false,
            }),
        ))
    }
}

struct WsSink {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.sink
            .send(Message::text(text))
            .await
            .map_err(|e| CashDeskError::Connection(format!("write failed: {e}")))
    }

    async fn send_ping(&mut self) -> Result<()> {
        self.sink
            .send(Message::Ping(Bytes::new()))
            .await
            .map_err(|e| CashDeskError::Connection(format!("ping failed: {e}")))
    }

    async fn send_close(&mut self, code: u16, reason: &str) -> Result<()> {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_owned().into(),
        };
        self.sink
            .send(Message::Close(Some(frame)))
            .await
            .map_err(|e| CashDeskError::Connection(format!("close failed: {e}")))
    }
}

struct WsSource {
    stream: SplitStream<WsStream>,
    /// Unread remainder of the current message.
    pending: Bytes,
    kind: FrameKind,
    in_message: bool,
}

impl WsSource {
    fn begin(&mut self, kind: FrameKind, bytes: Bytes) {
        self.kind = kind;
        self.pending = bytes;
        self.in_message = true;
    }
}

#[async_trait]
impl FrameSource for WsSource {
    async fn receive(&mut self, buf: &mut [u8]) -> Result<ReceiveResult> {
        loop {
            if self.in_message {
                let n = self.pending.len().min(buf.len());
                buf[..n].copy_from_slice(&self.pending[..n]);
                self.pending.advance(n);
                let end = self.pending.is_empty();
                if end {
                    self.in_message = false;
                }
                return Ok(ReceiveResult::data(self.kind, n, end));
            }

            // `StreamExt::next` is cancel-safe; everything after it is synchronous.
            let Some(next) = self.stream.next().await else {
                return Err(CashDeskError::Connection(
                    "socket ended without a close frame".into(),
                ));
            };
            let msg = next.map_err(|e| CashDeskError::Connection(format!("read failed: {e}")))?;

            match msg {
                Message::Text(text) => {
                    self.begin(FrameKind::Text, Bytes::copy_from_slice(text.as_str().as_bytes()))
                }
                Message::Binary(bytes) => self.begin(FrameKind::Binary, bytes),
                Message::Close(frame) => {
                    let info = frame
                        .map(|f| CloseInfo {
                            code: Some(u16::from(f.code)),
                            reason: Some(f.reason.as_str().to_owned()).filter(|r| !r.is_empty()),
                        })
                        .unwrap_or_default();
                    return Ok(ReceiveResult::close(info));
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }
}
