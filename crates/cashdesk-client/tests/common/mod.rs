//! In-memory scripted transport for engine tests.
//!
//! Every `open` creates a fresh `ServerEnd`: the test pushes chunks, close
//! frames or read failures into it, and inspects the frames the client wrote.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use cashdesk_client::config::Headers;
use cashdesk_client::transport::{
    CloseInfo, Connector, FrameKind, FrameSink, FrameSource, ReceiveResult,
};
use cashdesk_client::ClientConfig;
use cashdesk_core::error::{CashDeskError, Result};

pub const ENDPOINT: &str = "ws://cashdesk.test/ws/cashdesk";

/// Config with keep-alive disabled so tests only see frames they caused.
pub fn test_config() -> ClientConfig {
    ClientConfig::new(ENDPOINT).with_keep_alive(Duration::ZERO)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Written {
    Text(String),
    Ping,
    Close(u16, String),
}

enum Scripted {
    Chunk {
        kind: FrameKind,
        bytes: Vec<u8>,
        end: bool,
    },
    Close(CloseInfo),
    Fail(String),
}

struct WireLog {
    frames: Mutex<Vec<Written>>,
    busy: AtomicBool,
    overlaps: AtomicUsize,
    /// While `true`, writes park before reaching the wire.
    stall: watch::Sender<bool>,
    parked: AtomicUsize,
}

impl Default for WireLog {
    fn default() -> Self {
        Self {
            frames: Mutex::default(),
            busy: AtomicBool::default(),
            overlaps: AtomicUsize::default(),
            stall: watch::channel(false).0,
            parked: AtomicUsize::default(),
        }
    }
}

/// Test-side view of one opened socket.
#[derive(Clone)]
pub struct ServerEnd {
    tx: mpsc::UnboundedSender<Scripted>,
    log: Arc<WireLog>,
}

impl ServerEnd {
    pub fn push_text(&self, text: &str) {
        self.push_chunk(text.as_bytes(), true);
    }

    /// One chunk of a (possibly fragmented) text message.
    pub fn push_chunk(&self, bytes: &[u8], end: bool) {
        let _ = self.tx.send(Scripted::Chunk {
            kind: FrameKind::Text,
            bytes: bytes.to_vec(),
            end,
        });
    }

    pub fn push_close(&self, code: u16, reason: &str) {
        let _ = self.tx.send(Scripted::Close(CloseInfo {
            code: Some(code),
            reason: Some(reason.to_owned()),
        }));
    }

    pub fn fail(&self, msg: &str) {
        let _ = self.tx.send(Scripted::Fail(msg.to_owned()));
    }

    pub fn written(&self) -> Vec<Written> {
        self.log.frames.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.written()
            .into_iter()
            .filter_map(|w| match w {
                Written::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn closes(&self) -> Vec<(u16, String)> {
        self.written()
            .into_iter()
            .filter_map(|w| match w {
                Written::Close(code, reason) => Some((code, reason)),
                _ => None,
            })
            .collect()
    }

    /// Park every later write until `resume_writes`.
    pub fn stall_writes(&self) {
        self.log.stall.send_replace(true);
    }

    pub fn resume_writes(&self) {
        self.log.stall.send_replace(false);
    }

    /// Writes currently parked by `stall_writes`.
    pub fn parked_writes(&self) -> usize {
        self.log.parked.load(Ordering::SeqCst)
    }

    /// Writes that started while another write was still in progress.
    pub fn overlapping_writes(&self) -> usize {
        self.log.overlaps.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct ScriptedConnector {
    servers: Mutex<Vec<ServerEnd>>,
    headers: Mutex<Vec<Headers>>,
    refuse: AtomicBool,
}

impl ScriptedConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every later `open` fail.
    pub fn refuse_connections(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }

    pub fn opened(&self) -> usize {
        self.servers.lock().unwrap().len()
    }

    pub fn server(&self, idx: usize) -> ServerEnd {
        self.servers.lock().unwrap()[idx].clone()
    }

    pub fn latest(&self) -> ServerEnd {
        self.servers.lock().unwrap().last().cloned().expect("no socket opened")
    }

    pub fn last_headers(&self) -> Option<Headers> {
        self.headers.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn open(
        &self,
        _endpoint: &str,
        headers: &Headers,
    ) -> Result<(Box<dyn FrameSink>, Box<dyn FrameSource>)> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(CashDeskError::Connection("connection refused".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let log = Arc::new(WireLog::default());
        self.servers.lock().unwrap().push(ServerEnd {
            tx,
            log: log.clone(),
        });
        self.headers.lock().unwrap().push(headers.clone());

        Ok((
            Box::new(ScriptedSink { log }),
            Box::new(ScriptedSource { rx, pending: None }),
        ))
    }
}

struct ScriptedSink {
    log: Arc<WireLog>,
}

impl ScriptedSink {
    async fn record(&mut self, frame: Written) -> Result<()> {
        if self.log.busy.swap(true, Ordering::SeqCst) {
            self.log.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let mut stall = self.log.stall.subscribe();
        let stalled = *stall.borrow();
        if stalled {
            self.log.parked.fetch_add(1, Ordering::SeqCst);
            let _ = stall.wait_for(|stalled| !*stalled).await;
            self.log.parked.fetch_sub(1, Ordering::SeqCst);
        }
        // widen the window a concurrent writer would have to interleave
        tokio::task::yield_now().await;
        self.log.frames.lock().unwrap().push(frame);
        self.log.busy.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl FrameSink for ScriptedSink {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.record(Written::Text(text)).await
    }

    async fn send_ping(&mut self) -> Result<()> {
        self.record(Written::Ping).await
    }

    async fn send_close(&mut self, code: u16, reason: &str) -> Result<()> {
        self.record(Written::Close(code, reason.to_owned())).await
    }
}

struct ScriptedSource {
    rx: mpsc::UnboundedReceiver<Scripted>,
    /// Remainder of a chunk larger than the caller's buffer.
    pending: Option<(FrameKind, Vec<u8>, bool)>,
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn receive(&mut self, buf: &mut [u8]) -> Result<ReceiveResult> {
        let (kind, mut bytes, end) = match self.pending.take() {
            Some(p) => p,
            None => match self.rx.recv().await {
                Some(Scripted::Chunk { kind, bytes, end }) => (kind, bytes, end),
                Some(Scripted::Close(info)) => return Ok(ReceiveResult::close(info)),
                Some(Scripted::Fail(msg)) => return Err(CashDeskError::Connection(msg)),
                None => return Err(CashDeskError::Connection("server end dropped".into())),
            },
        };

        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        if n < bytes.len() {
            self.pending = Some((kind, bytes.split_off(n), end));
            return Ok(ReceiveResult::data(kind, n, false));
        }
        Ok(ReceiveResult::data(kind, n, end))
    }
}

/// Poll `cond` until it holds or two seconds pass.
pub async fn wait_for(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !cond() {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
