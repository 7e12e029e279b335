//! Public client: lifecycle, commands and event subscriptions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use cashdesk_core::error::{CashDeskError, Result};
use cashdesk_core::protocol::events::{
    CashDeskErrorPayload, CashInCompletedPayload, CashInCreateErrorPayload, CashInCreatedPayload,
    CashOutCompletedPayload, CashOutCreateErrorPayload, CashOutCreatedPayload,
    CashOutPaidByUserPayload, CashierLoginSuccessPayload, PaymentCompletedPayload,
    PaymentCreateErrorPayload, PaymentCreatedPayload,
};
use cashdesk_core::protocol::requests::{
    CashInCancelRequest, CashInCreateRequest, CashOutCancelRequest, CashOutCompleteRequest,
    CashOutCreateRequest, CashierLoginRequest, PaymentCancelRequest, PaymentCreateRequest,
    PaymentLineItem, PaymentMetadata,
};
use cashdesk_core::protocol::{encode_outgoing, MessageType};

use crate::config::ClientConfig;
use crate::connection::{receive, ConnectionState, Shared};
use crate::dispatch::ConnectionClosed;
use crate::obs::Diagnostics;
use crate::transport::ws::WsConnector;
use crate::transport::{Connector, CLOSE_NORMAL};

struct ReceiveTask {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// WebSocket cash desk client.
///
/// Commands may be issued concurrently from any task; outbound frames are
/// serialized by the send gate. Events are delivered one at a time on the
/// background receive task, in wire order.
pub struct CashDeskClient {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    shared: Arc<Shared>,
    lifecycle: tokio::sync::Mutex<Option<ReceiveTask>>,
    disposed: AtomicBool,
}

impl CashDeskClient {
    /// Client over the `tokio-tungstenite` transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_connector(config, Arc::new(WsConnector))
    }

    pub fn with_connector(config: ClientConfig, connector: Arc<dyn Connector>) -> Self {
        let diag = Diagnostics::new(config.diagnostics.clone());
        Self {
            config,
            connector,
            shared: Arc::new(Shared::new(diag)),
            lifecycle: tokio::sync::Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    // ---- lifecycle

    /// Open the socket and start the receive task.
    ///
    /// Does nothing while the connection is open. A stale connection (peer
    /// closed, faulted) is torn down first, so at most one socket and one
    /// receive task exist per client.
    pub async fn connect(&self) -> Result<()> {
        self.ensure_not_disposed()?;
        let mut lifecycle = self.lifecycle.lock().await;
        self.ensure_not_disposed()?;

        let task_alive = lifecycle
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished());
        if self.state() == ConnectionState::Open && task_alive {
            return Ok(());
        }

        self.teardown(&mut lifecycle).await;

        let endpoint = self.config.endpoint.as_str();
        self.shared.state.set(ConnectionState::Connecting);
        tracing::debug!(target: "cashdesk", %endpoint, "connecting");
        self.shared.diag.line(&format!("Connecting to {endpoint}..."));

        let (sink, source) = match self.connector.open(endpoint, &self.config.headers).await {
            Ok(halves) => halves,
            Err(e) => {
                self.shared.state.set(ConnectionState::Closed);
                tracing::warn!(target: "cashdesk", %endpoint, error = %e, "connect failed");
                self.shared.diag.line(&format!("Connect failed: {e}"));
                return Err(e);
            }
        };

        let shutdown = CancellationToken::new();
        self.shared.gate.attach(sink, shutdown.clone()).await;
        self.shared.state.set(ConnectionState::Open);
        tracing::info!(target: "cashdesk", %endpoint, "connected");
        self.shared.diag.line(&format!("Connected to {endpoint}."));

        let handle = tokio::spawn(receive::run(
            self.shared.clone(),
            source,
            shutdown.clone(),
            self.config.keep_alive(),
            self.config.effective_receive_buffer(),
        ));
        *lifecycle = Some(ReceiveTask { shutdown, handle });
        Ok(())
    }

    /// Stop the receive task, send a normal close if the socket is still
    /// usable, and release the transport. Safe to call repeatedly.
    pub async fn disconnect(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        self.teardown(&mut lifecycle).await;
        Ok(())
    }

    /// `disconnect` plus refusing any later `connect`.
    pub async fn dispose(&self) -> Result<()> {
        self.disposed.store(true, Ordering::Release);
        self.disconnect().await
    }

    async fn teardown(&self, slot: &mut Option<ReceiveTask>) {
        let had_task = slot.is_some();
        if let Some(task) = slot.take() {
            task.shutdown.cancel();
            match task.handle.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    tracing::warn!(target: "cashdesk", error = %e, "receive task ended abnormally");
                    self.shared
                        .diag
                        .line(&format!("Receive task ended abnormally: {e}"));
                }
            }
        }

        let state = self.shared.state.get();
        if matches!(state, ConnectionState::Open | ConnectionState::CloseReceived)
            && self.shared.gate.is_attached()
        {
            if let Err(e) = self.shared.gate.close(CLOSE_NORMAL, "Client disconnect").await {
                tracing::warn!(target: "cashdesk", code = CLOSE_NORMAL, error = %e, "close frame failed");
                self.shared.diag.line(&format!("Close frame failed: {e}"));
            }
            self.shared.state.close_sent();
        }

        self.shared.gate.detach().await;
        if state != ConnectionState::Idle {
            self.shared.state.set(ConnectionState::Closed);
        }
        if had_task {
            tracing::info!(target: "cashdesk", endpoint = %self.config.endpoint, "disconnected");
            self.shared.diag.line("Disconnected.");
        }
    }

    fn ensure_not_disposed(&self) -> Result<()> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(CashDeskError::Disposed);
        }
        Ok(())
    }

    // ---- commands

    /// Serialize `{type, payload}` and write it as one text frame.
    pub async fn send<T: Serialize>(&self, msg_type: MessageType, payload: &T) -> Result<()> {
        self.ensure_not_disposed()?;
        if !self.shared.gate.is_attached() {
            return Err(CashDeskError::NotConnected);
        }
        let text = encode_outgoing(msg_type, payload)?;
        tracing::debug!(target: "cashdesk", msg_type = %msg_type, bytes = text.len(), "send");
        self.shared.gate.send_text(text).await
    }

    pub async fn login(&self, account_id: &str, user_name: &str, password: &str) -> Result<()> {
        let req = CashierLoginRequest::new(account_id, user_name, password);
        req.validate()?;
        self.send(MessageType::CashierLogin, &req).await
    }

    pub async fn create_payment(
        &self,
        total_amount: Decimal,
        currency: &str,
        line_items: Vec<PaymentLineItem>,
        payment_metadata: Vec<PaymentMetadata>,
    ) -> Result<()> {
        let req = PaymentCreateRequest::new(total_amount, currency, line_items, payment_metadata);
        req.validate()?;
        self.send(MessageType::PaymentCreate, &req).await
    }

    pub async fn cancel_payment(&self, payment_id: Uuid) -> Result<()> {
        self.send(MessageType::PaymentCancel, &PaymentCancelRequest { payment_id })
            .await
    }

    pub async fn create_cash_in(&self, total_amount: Decimal, currency: &str) -> Result<()> {
        let req = CashInCreateRequest::new(total_amount, currency);
        req.validate()?;
        self.send(MessageType::CashInCreate, &req).await
    }

    pub async fn cancel_cash_in(&self, cash_in_id: Uuid) -> Result<()> {
        self.send(MessageType::CashInCancel, &CashInCancelRequest { cash_in_id })
            .await
    }

    pub async fn create_cash_out(&self, total_amount: Decimal, currency: &str) -> Result<()> {
        let req = CashOutCreateRequest::new(total_amount, currency);
        req.validate()?;
        self.send(MessageType::CashOutCreate, &req).await
    }

    pub async fn complete_cash_out(&self, cash_out_id: Uuid) -> Result<()> {
        self.send(MessageType::CashOutComplete, &CashOutCompleteRequest { cash_out_id })
            .await
    }

    pub async fn cancel_cash_out(&self, cash_out_id: Uuid) -> Result<()> {
        self.send(MessageType::CashOutCancel, &CashOutCancelRequest { cash_out_id })
            .await
    }

    // ---- subscriptions

    pub fn on_login_succeeded(&self, f: impl Fn(CashierLoginSuccessPayload) + Send + Sync + 'static) {
        self.shared.dispatcher.subscribe(MessageType::CashierLoginSuccess, f);
    }

    pub fn on_login_failed(&self, f: impl Fn(CashDeskErrorPayload) + Send + Sync + 'static) {
        self.shared.dispatcher.subscribe(MessageType::CashierLoginError, f);
    }

    pub fn on_payment_created(&self, f: impl Fn(PaymentCreatedPayload) + Send + Sync + 'static) {
        self.shared.dispatcher.subscribe(MessageType::PaymentCreated, f);
    }

    pub fn on_payment_completed(
        &self,
        f: impl Fn(PaymentCompletedPayload) + Send + Sync + 'static,
    ) {
        self.shared.dispatcher.subscribe(MessageType::PaymentCompleted, f);
    }

    pub fn on_payment_create_failed(
        &self,
        f: impl Fn(PaymentCreateErrorPayload) + Send + Sync + 'static,
    ) {
        self.shared.dispatcher.subscribe(MessageType::PaymentCreateError, f);
    }

    pub fn on_cash_in_created(&self, f: impl Fn(CashInCreatedPayload) + Send + Sync + 'static) {
        self.shared.dispatcher.subscribe(MessageType::CashInCreated, f);
    }

    pub fn on_cash_in_completed(&self, f: impl Fn(CashInCompletedPayload) + Send + Sync + 'static) {
        self.shared.dispatcher.subscribe(MessageType::CashInCompleted, f);
    }

    pub fn on_cash_in_create_failed(
        &self,
        f: impl Fn(CashInCreateErrorPayload) + Send + Sync + 'static,
    ) {
        self.shared.dispatcher.subscribe(MessageType::CashInCreateError, f);
    }

    pub fn on_cash_out_created(&self, f: impl Fn(CashOutCreatedPayload) + Send + Sync + 'static) {
        self.shared.dispatcher.subscribe(MessageType::CashOutCreated, f);
    }

    pub fn on_cash_out_paid_by_user(
        &self,
        f: impl Fn(CashOutPaidByUserPayload) + Send + Sync + 'static,
    ) {
        self.shared.dispatcher.subscribe(MessageType::CashOutPaidByUser, f);
    }

    pub fn on_cash_out_completed(
        &self,
        f: impl Fn(CashOutCompletedPayload) + Send + Sync + 'static,
    ) {
        self.shared.dispatcher.subscribe(MessageType::CashOutCompleted, f);
    }

    pub fn on_cash_out_create_failed(
        &self,
        f: impl Fn(CashOutCreateErrorPayload) + Send + Sync + 'static,
    ) {
        self.shared.dispatcher.subscribe(MessageType::CashOutCreateError, f);
    }

    pub fn on_general_error(&self, f: impl Fn(CashDeskErrorPayload) + Send + Sync + 'static) {
        self.shared.dispatcher.subscribe(MessageType::GeneralError, f);
    }

    pub fn on_connection_closed(&self, f: impl Fn(&ConnectionClosed) + Send + Sync + 'static) {
        self.shared.dispatcher.on_closed(f);
    }
}

impl Drop for CashDeskClient {
    fn drop(&mut self) {
        if let Some(task) = self.lifecycle.get_mut().take() {
            task.shutdown.cancel();
        }
    }
}
