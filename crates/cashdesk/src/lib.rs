//! Top-level facade crate for the cash desk client.
//!
//! Re-exports the wire contracts and the client engine so users can depend on a single crate.

pub mod core {
    pub use cashdesk_core::*;
}

pub mod client {
    pub use cashdesk_client::*;
}

pub use cashdesk_client::{CashDeskClient, ClientConfig, ConnectionClosed, ConnectionState};
pub use cashdesk_core::{CashDeskError, ErrorKind, Result};
