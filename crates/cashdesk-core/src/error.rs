//! Shared error type across cash desk crates.

use thiserror::Error;

/// Stable error categories (useful for logs and assertions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A command was issued without an open transport.
    NotConnected,
    /// The client was disposed.
    Disposed,
    /// The caller passed an invalid request.
    InvalidRequest,
    /// Transport open/read/write failed.
    Connection,
    /// A server message did not match the envelope contract.
    Protocol,
    /// A payload could not be serialized.
    Encode,
    /// The operation observed a shutdown signal.
    Cancelled,
    /// Configuration is malformed or out of range.
    Config,
    /// Unsupported config/protocol version.
    UnsupportedVersion,
}

impl ErrorKind {
    /// Upper-snake code used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotConnected => "NOT_CONNECTED",
            ErrorKind::Disposed => "DISPOSED",
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::Connection => "CONNECTION",
            ErrorKind::Protocol => "PROTOCOL",
            ErrorKind::Encode => "ENCODE",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::Config => "CONFIG",
            ErrorKind::UnsupportedVersion => "UNSUPPORTED_VERSION",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, CashDeskError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum CashDeskError {
    #[error("the client is not connected; call connect first")]
    NotConnected,
    #[error("the client has been disposed")]
    Disposed,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error("config error: {0}")]
    Config(String),
    #[error("unsupported version")]
    UnsupportedVersion,
}

impl CashDeskError {
    /// Map the error to its stable category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CashDeskError::NotConnected => ErrorKind::NotConnected,
            CashDeskError::Disposed => ErrorKind::Disposed,
            CashDeskError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            CashDeskError::Connection(_) => ErrorKind::Connection,
            CashDeskError::Protocol(_) => ErrorKind::Protocol,
            CashDeskError::Encode(_) => ErrorKind::Encode,
            CashDeskError::Cancelled => ErrorKind::Cancelled,
            CashDeskError::Config(_) => ErrorKind::Config,
            CashDeskError::UnsupportedVersion => ErrorKind::UnsupportedVersion,
        }
    }
}
