//! Cash desk core: transport-agnostic wire contracts, error types, and
//! message-type constants.
//!
//! This crate defines the envelope codec, the request/event payload records,
//! and the error surface shared by the client engine and any tooling that
//! needs to speak the cash desk protocol. It carries no transport or runtime
//! dependencies.
//!
//! # Panic policy
//! Panics, `unwrap`, and `expect` are lint-denied here. All fallible paths
//! surface as `CashDeskError`/`Result`; a malformed server message is an
//! error value, never a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

pub use error::{CashDeskError, ErrorKind, Result};
