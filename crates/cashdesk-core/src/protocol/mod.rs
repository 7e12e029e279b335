//! Cash desk wire protocol (JSON over WebSocket text frames).
//!
//! - `message_type`: the fixed registry of `type` discriminator strings.
//! - `envelope`: `{type, payload}` wrappers, with the inbound payload kept as
//!   `RawValue` until a handler asks for a concrete shape.
//! - `requests` / `events`: payload records sent and received.
//! - `status`: closed status enumerations owned by the server.
//!
//! Field names on the wire are lower-camel-case, optional fields are omitted
//! when unset, and enumerations travel as their lower-camel-case names.

pub mod envelope;
pub mod events;
pub mod message_type;
pub mod requests;
pub mod status;

pub use envelope::{decode_incoming, encode_outgoing, IncomingEnvelope, OutgoingEnvelope};
pub use message_type::MessageType;
pub use status::{CashInStatus, CashOutStatus, PaymentStatus};
