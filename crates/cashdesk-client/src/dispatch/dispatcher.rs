use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use serde::de::DeserializeOwned;

use cashdesk_core::protocol::{IncomingEnvelope, MessageType};

use crate::obs::Diagnostics;

type Handler = Arc<dyn Fn(&IncomingEnvelope) -> serde_json::Result<()> + Send + Sync>;
type ClosedHandler = Arc<dyn Fn(&ConnectionClosed) + Send + Sync>;

/// Connection-closed notification.
///
/// Peer-initiated closes carry the peer's code and reason; transport faults
/// carry no code and the error text as reason.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionClosed {
    pub code: Option<u16>,
    pub reason: Option<String>,
}

/// What happened to one inbound envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Number of handlers that ran.
    Delivered(usize),
    /// A server event with nobody subscribed.
    NoHandler,
    /// Unknown discriminator, or a client-to-server type echoed back.
    Unsupported,
    /// Every subscribed handler rejected the payload shape or panicked.
    PayloadRejected,
}

/// Registry mapping message types to ordered handler lists.
///
/// Handlers run synchronously on the caller's task, in registration order.
/// The list is cloned out of the map before invoking, so a handler may
/// subscribe more handlers without deadlocking. A panicking handler is
/// logged and skipped; the remaining handlers still run.
pub struct Dispatcher {
    handlers: DashMap<MessageType, Vec<Handler>>,
    closed: RwLock<Vec<ClosedHandler>>,
    diag: Diagnostics,
}

impl Dispatcher {
    pub fn new(diag: Diagnostics) -> Self {
        Self {
            handlers: DashMap::new(),
            closed: RwLock::new(Vec::new()),
            diag,
        }
    }

    /// Register `f` for `msg_type`; the payload is decoded into `T` per call.
    pub fn subscribe<T, F>(&self, msg_type: MessageType, f: F)
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(move |env: &IncomingEnvelope| {
            let payload = env.decode_payload::<T>()?;
            f(payload);
            Ok(())
        });
        self.handlers.entry(msg_type).or_default().push(handler);
    }

    pub fn on_closed(&self, f: impl Fn(&ConnectionClosed) + Send + Sync + 'static) {
        self.closed
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(f));
    }

    pub fn registered_types(&self) -> Vec<MessageType> {
        self.handlers.iter().map(|e| *e.key()).collect()
    }

    pub fn dispatch(&self, env: &IncomingEnvelope) -> DispatchOutcome {
        let Some(msg_type) = env.message_type().filter(|t| t.is_event()) else {
            tracing::debug!(target: "cashdesk", msg_type = %env.msg_type, "unsupported message type");
            self.diag
                .line(&format!("Ignoring unsupported message type '{}'.", env.msg_type));
            return DispatchOutcome::Unsupported;
        };

        let handlers = match self.handlers.get(&msg_type) {
            Some(list) if !list.is_empty() => list.value().clone(),
            _ => return DispatchOutcome::NoHandler,
        };

        let mut delivered = 0;
        for handler in &handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(env))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    tracing::warn!(target: "cashdesk", msg_type = %msg_type, error = %e, "payload decode failed");
                    self.diag
                        .line(&format!("Failed to decode '{msg_type}' payload: {e}"));
                }
                Err(panic) => {
                    let msg = panic_message(panic.as_ref());
                    tracing::warn!(target: "cashdesk", msg_type = %msg_type, panic = %msg, "handler panicked");
                    self.diag
                        .line(&format!("Handler for '{msg_type}' panicked: {msg}"));
                }
            }
        }

        if delivered > 0 {
            DispatchOutcome::Delivered(delivered)
        } else {
            DispatchOutcome::PayloadRejected
        }
    }

    pub fn notify_closed(&self, event: &ConnectionClosed) {
        let handlers = self
            .closed
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for handler in &handlers {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(event))) {
                let msg = panic_message(panic.as_ref());
                tracing::warn!(target: "cashdesk", panic = %msg, "closed handler panicked");
                self.diag
                    .line(&format!("Connection-closed handler panicked: {msg}"));
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use cashdesk_core::protocol::decode_incoming;
    use cashdesk_core::protocol::events::CashDeskErrorPayload;
    use std::sync::Mutex;

    fn env(json: &str) -> IncomingEnvelope {
        decode_incoming(json.as_bytes()).unwrap()
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let d = Dispatcher::new(Diagnostics::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let seen = seen.clone();
            d.subscribe(MessageType::GeneralError, move |p: CashDeskErrorPayload| {
                seen.lock().unwrap().push(format!("{tag}:{}", p.code));
            });
        }

        let out = d.dispatch(&env(
            r#"{"type":"cashdesk.error","payload":{"code":"E1","message":"boom"}}"#,
        ));
        assert_eq!(out, DispatchOutcome::Delivered(2));
        assert_eq!(*seen.lock().unwrap(), vec!["first:E1", "second:E1"]);
    }

    #[test]
    fn unknown_and_outbound_types_are_unsupported() {
        let d = Dispatcher::new(Diagnostics::default());
        d.subscribe(MessageType::GeneralError, |_: CashDeskErrorPayload| {});

        let out = d.dispatch(&env(r#"{"type":"unknown.thing","payload":{}}"#));
        assert_eq!(out, DispatchOutcome::Unsupported);

        // client-to-server types are never delivered
        let out = d.dispatch(&env(r#"{"type":"cashier.login","payload":{}}"#));
        assert_eq!(out, DispatchOutcome::Unsupported);
    }

    #[test]
    fn event_without_subscribers() {
        let d = Dispatcher::new(Diagnostics::default());
        let out = d.dispatch(&env(r#"{"type":"payment.created","payload":{}}"#));
        assert_eq!(out, DispatchOutcome::NoHandler);
    }

    #[test]
    fn shape_mismatch_is_isolated() {
        let d = Dispatcher::new(Diagnostics::default());
        let hits = Arc::new(Mutex::new(0));
        let h = hits.clone();
        d.subscribe(MessageType::GeneralError, move |_: CashDeskErrorPayload| {
            *h.lock().unwrap() += 1;
        });

        let out = d.dispatch(&env(r#"{"type":"cashdesk.error","payload":{"code":7}}"#));
        assert_eq!(out, DispatchOutcome::PayloadRejected);

        let out = d.dispatch(&env(
            r#"{"type":"cashdesk.error","payload":{"code":"E","message":"m"}}"#,
        ));
        assert_eq!(out, DispatchOutcome::Delivered(1));
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn closed_handlers_receive_code_and_reason() {
        let d = Dispatcher::new(Diagnostics::default());
        let seen = Arc::new(Mutex::new(None));
        let s = seen.clone();
        d.on_closed(move |ev| *s.lock().unwrap() = Some(ev.clone()));

        d.notify_closed(&ConnectionClosed {
            code: Some(1000),
            reason: Some("bye".into()),
        });
        let ev = seen.lock().unwrap().clone().unwrap();
        assert_eq!(ev.code, Some(1000));
        assert_eq!(ev.reason.as_deref(), Some("bye"));
    }

    #[test]
    fn handler_may_subscribe_during_dispatch() {
        let d = Arc::new(Dispatcher::new(Diagnostics::default()));
        let inner = d.clone();
        d.subscribe(MessageType::GeneralError, move |_: CashDeskErrorPayload| {
            inner.subscribe(MessageType::PaymentCreated, |_: serde_json::Value| {});
        });

        let out = d.dispatch(&env(
            r#"{"type":"cashdesk.error","payload":{"code":"E","message":"m"}}"#,
        ));
        assert_eq!(out, DispatchOutcome::Delivered(1));
        assert!(d.registered_types().contains(&MessageType::PaymentCreated));
    }

    #[test]
    fn panicking_handler_does_not_stop_the_rest() {
        let d = Dispatcher::new(Diagnostics::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        d.subscribe(MessageType::GeneralError, |p: CashDeskErrorPayload| {
            if p.code == "BOOM" {
                panic!("handler exploded");
            }
        });
        let s = seen.clone();
        d.subscribe(MessageType::GeneralError, move |p: CashDeskErrorPayload| {
            s.lock().unwrap().push(p.code);
        });

        let out = d.dispatch(&env(
            r#"{"type":"cashdesk.error","payload":{"code":"BOOM","message":"m"}}"#,
        ));
        assert_eq!(out, DispatchOutcome::Delivered(1));

        let out = d.dispatch(&env(
            r#"{"type":"cashdesk.error","payload":{"code":"E2","message":"m"}}"#,
        ));
        assert_eq!(out, DispatchOutcome::Delivered(2));
        assert_eq!(*seen.lock().unwrap(), vec!["BOOM", "E2"]);
    }

    #[test]
    fn panicking_closed_handler_is_contained() {
        let d = Dispatcher::new(Diagnostics::default());
        let hits = Arc::new(Mutex::new(0));
        d.on_closed(|_| panic!("closed handler exploded"));
        let h = hits.clone();
        d.on_closed(move |_| *h.lock().unwrap() += 1);

        d.notify_closed(&ConnectionClosed::default());
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let a: Box<dyn Any + Send> = Box::new("static");
        let b: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let c: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(a.as_ref()), "static");
        assert_eq!(panic_message(b.as_ref()), "owned");
        assert_eq!(panic_message(c.as_ref()), "non-string panic payload");
    }

    /// Records every event's fields as `(name, debug value)` pairs.
    struct FieldCapture(Arc<Mutex<Vec<Vec<(String, String)>>>>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FieldCapture {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut fields = Vec::new();
            event.record(&mut |field: &tracing::field::Field, value: &dyn std::fmt::Debug| {
                fields.push((field.name().to_owned(), format!("{value:?}")));
            });
            self.0.lock().unwrap().push(fields);
        }
    }

    #[test]
    fn decode_failure_is_logged_with_fields() {
        use tracing_subscriber::layer::SubscriberExt;

        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(FieldCapture(events.clone()));
        let d = Dispatcher::new(Diagnostics::default());
        d.subscribe(MessageType::GeneralError, |_: CashDeskErrorPayload| {});

        tracing::subscriber::with_default(subscriber, || {
            d.dispatch(&env(r#"{"type":"cashdesk.error","payload":{"code":7}}"#));
        });

        let events = events.lock().unwrap();
        let fields = events
            .iter()
            .find(|f| f.iter().any(|(k, v)| k == "message" && v == "payload decode failed"))
            .expect("decode failure event");
        let get = |name: &str| fields.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());
        assert_eq!(get("msg_type"), Some("cashdesk.error"));
        assert!(get("error").is_some_and(|e| !e.is_empty()));
    }
}
