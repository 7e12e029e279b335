//! Closed status sets. The server is the sole writer; the client only reads.
//!
//! Values travel as lower-camel-case names. The PascalCase aliases cover the
//! payment status, which the backend serializes with its default enum
//! converter.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatus {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Successful")]
    Successful,
    #[serde(alias = "Canceled")]
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CashInStatus {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Completed")]
    Completed,
    #[serde(alias = "Canceled")]
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CashOutStatus {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "UserPaid")]
    UserPaid,
    #[serde(alias = "Completed")]
    Completed,
    #[serde(alias = "Canceled")]
    Canceled,
}

impl PaymentStatus {
    /// Successful or canceled.
    pub fn is_final(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl CashInStatus {
    pub fn is_final(self) -> bool {
        !matches!(self, CashInStatus::Pending)
    }
}

impl CashOutStatus {
    /// `UserPaid` is not final: the desk still has to hand out the cash.
    pub fn is_final(self) -> bool {
        matches!(self, CashOutStatus::Completed | CashOutStatus::Canceled)
    }
}
