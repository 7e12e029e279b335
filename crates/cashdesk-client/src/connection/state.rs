use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of one client's transport.
///
/// `CloseReceived` means the peer sent a close frame we have not answered
/// yet; `Closing` means we sent ours first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    Idle = 0,
    Connecting = 1,
    Open = 2,
    CloseReceived = 3,
    Closing = 4,
    Closed = 5,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::CloseReceived => "close_received",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => ConnectionState::Idle,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Open,
            3 => ConnectionState::CloseReceived,
            4 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free cell shared by the foreground and the receive task.
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(ConnectionState::Idle as u8))
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Peer close frame observed. Returns the resulting state.
    pub fn close_received(&self) -> ConnectionState {
        self.transition(|s| match s {
            ConnectionState::Open => Some(ConnectionState::CloseReceived),
            ConnectionState::Closing => Some(ConnectionState::Closed),
            _ => None,
        })
    }

    /// Local close frame written. Returns the resulting state.
    pub fn close_sent(&self) -> ConnectionState {
        self.transition(|s| match s {
            ConnectionState::Open => Some(ConnectionState::Closing),
            ConnectionState::CloseReceived => Some(ConnectionState::Closed),
            _ => None,
        })
    }

    fn transition(&self, f: impl Fn(ConnectionState) -> Option<ConnectionState>) -> ConnectionState {
        let prev = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                f(ConnectionState::from_u8(v)).map(|s| s as u8)
            })
            .unwrap_or_else(|v| v);
        let prev = ConnectionState::from_u8(prev);
        f(prev).unwrap_or(prev)
    }
}
