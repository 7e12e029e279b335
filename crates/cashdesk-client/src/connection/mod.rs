//! Connection engine: lifecycle state, the send gate and the receive loop.

pub mod gate;
pub(crate) mod receive;
pub mod state;

pub use gate::SendGate;
pub use state::{ConnectionState, StateCell};

use crate::dispatch::Dispatcher;
use crate::obs::Diagnostics;

/// State shared between the foreground client and its receive task.
pub(crate) struct Shared {
    pub gate: SendGate,
    pub dispatcher: Dispatcher,
    pub state: StateCell,
    pub diag: Diagnostics,
}

impl Shared {
    pub fn new(diag: Diagnostics) -> Self {
        Self {
            gate: SendGate::new(),
            dispatcher: Dispatcher::new(diag.clone()),
            state: StateCell::new(),
            diag,
        }
    }
}
