//! Inbound event routing.
//!
//! Maps each server-pushed message type to the closures subscribed to it,
//! plus the connection-closed notification.

pub mod dispatcher;

pub use dispatcher::{ConnectionClosed, DispatchOutcome, Dispatcher};
