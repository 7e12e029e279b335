//! Lifecycle diagnostics.
//!
//! Call sites log structured `tracing` events (`endpoint`, `msg_type`,
//! `code`, `error`); an optional caller-supplied sink additionally receives
//! a short human-readable line for each.

pub mod diagnostics;

pub use diagnostics::{DiagnosticSink, Diagnostics};
