use std::fmt;
use std::sync::Arc;

/// Caller-supplied callback receiving short lifecycle messages.
#[derive(Clone)]
pub struct DiagnosticSink(Arc<dyn Fn(&str) + Send + Sync>);

impl DiagnosticSink {
    pub fn new(f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn emit(&self, msg: &str) {
        (self.0)(msg)
    }
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DiagnosticSink(..)")
    }
}

/// Optional sink for human-readable lines.
///
/// Call sites emit their own structured `tracing` event and pass the
/// one-line summary here; with no sink configured this is a no-op.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    sink: Option<DiagnosticSink>,
}

impl Diagnostics {
    pub fn new(sink: Option<DiagnosticSink>) -> Self {
        Self { sink }
    }

    pub fn line(&self, msg: &str) {
        if let Some(sink) = &self.sink {
            sink.emit(msg);
        }
    }
}
