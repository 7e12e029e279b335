//! Cash desk WebSocket client engine.
//!
//! Wires the transport, frame reassembly, send gate, dispatch registry and
//! lifecycle management into `CashDeskClient`. Wire contracts live in
//! `cashdesk-core`.

pub mod client;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod obs;
pub mod transport;

pub use client::CashDeskClient;
pub use config::{ClientConfig, Headers};
pub use connection::ConnectionState;
pub use dispatch::{ConnectionClosed, DispatchOutcome};
