//! Message-type registry.
//!
//! Type strings are exact, case-sensitive wire constants. Note that the
//! paid-by-user event is spelled `cashout.paid` (lower-case `o`) on the wire.

/// Every `type` discriminator the protocol defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    CashierLogin,
    CashierLoginSuccess,
    CashierLoginError,
    PaymentCreate,
    PaymentCreated,
    PaymentCreateError,
    PaymentCancel,
    PaymentCompleted,
    CashInCreate,
    CashInCreated,
    CashInCancel,
    CashInCompleted,
    CashInCreateError,
    CashOutCreate,
    CashOutCreated,
    CashOutCancel,
    CashOutComplete,
    CashOutCompleted,
    CashOutCreateError,
    CashOutPaidByUser,
    GeneralError,
}

impl MessageType {
    /// All message types, requests first.
    pub const ALL: [MessageType; 21] = [
        MessageType::CashierLogin,
        MessageType::PaymentCreate,
        MessageType::PaymentCancel,
        MessageType::CashInCreate,
        MessageType::CashInCancel,
        MessageType::CashOutCreate,
        MessageType::CashOutCancel,
        MessageType::CashOutComplete,
        MessageType::CashierLoginSuccess,
        MessageType::CashierLoginError,
        MessageType::PaymentCreated,
        MessageType::PaymentCreateError,
        MessageType::PaymentCompleted,
        MessageType::CashInCreated,
        MessageType::CashInCompleted,
        MessageType::CashInCreateError,
        MessageType::CashOutCreated,
        MessageType::CashOutCompleted,
        MessageType::CashOutCreateError,
        MessageType::CashOutPaidByUser,
        MessageType::GeneralError,
    ];

    /// Wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::CashierLogin => "cashier.login",
            MessageType::CashierLoginSuccess => "cashier.login.success",
            MessageType::CashierLoginError => "cashier.login.error",
            MessageType::PaymentCreate => "payment.create",
            MessageType::PaymentCreated => "payment.created",
            MessageType::PaymentCreateError => "payment.create.error",
            MessageType::PaymentCancel => "payment.cancel",
            MessageType::PaymentCompleted => "payment.completed",
            MessageType::CashInCreate => "cashIn.create",
            MessageType::CashInCreated => "cashIn.created",
            MessageType::CashInCancel => "cashIn.cancel",
            MessageType::CashInCompleted => "cashIn.completed",
            MessageType::CashInCreateError => "cashIn.create.error",
            MessageType::CashOutCreate => "cashOut.create",
            MessageType::CashOutCreated => "cashOut.created",
            MessageType::CashOutCancel => "cashOut.cancel",
            MessageType::CashOutComplete => "cashOut.complete",
            MessageType::CashOutCompleted => "cashOut.completed",
            MessageType::CashOutCreateError => "cashOut.create.error",
            MessageType::CashOutPaidByUser => "cashout.paid",
            MessageType::GeneralError => "cashdesk.error",
        }
    }

    /// Exact, case-sensitive lookup. Unknown strings yield `None`.
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// True for types the server pushes to the client.
    pub fn is_event(self) -> bool {
        !matches!(
            self,
            MessageType::CashierLogin
                | MessageType::PaymentCreate
                | MessageType::PaymentCancel
                | MessageType::CashInCreate
                | MessageType::CashInCancel
                | MessageType::CashOutCreate
                | MessageType::CashOutCancel
                | MessageType::CashOutComplete
        )
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
