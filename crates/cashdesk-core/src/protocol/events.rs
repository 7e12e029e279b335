//! Event payloads the server pushes.
//!
//! These are decoded snapshots with no lifecycle of their own. Identity and
//! amount fields are required; collections, deep links and pending records
//! default to empty when the server leaves them out.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::status::{CashInStatus, CashOutStatus, PaymentStatus};

/// Authenticated terminal operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashierInfo {
    pub id: Uuid,
    pub user_name: String,
    #[serde(default)]
    pub location_id: Uuid,
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub location_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLineItemDetails {
    pub id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMetadataDetails {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub display_to_user: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub location: LocationInfo,
    /// Server timestamp, kept as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub line_items: Vec<PaymentLineItemDetails>,
    #[serde(default)]
    pub metadata: Vec<PaymentMetadataDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashInDetails {
    pub id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: CashInStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOutDetails {
    pub id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: CashOutStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
}

/// `cashier.login.success`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashierLoginSuccessPayload {
    pub cashier: CashierInfo,
    /// Unresolved payment from an earlier session, to resume or cancel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_payment: Option<PaymentDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_deep_link: Option<String>,
}

/// `cashier.login.error` and `cashdesk.error`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashDeskErrorPayload {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// `payment.created`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreatedPayload {
    pub payment: PaymentDetails,
    #[serde(default)]
    pub payment_deep_link: String,
}

/// `payment.completed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCompletedPayload {
    pub payment: PaymentDetails,
    pub user_id: Uuid,
}

/// `payment.create.error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreateErrorPayload {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_payment: Option<PaymentDetails>,
}

/// `cashIn.created`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashInCreatedPayload {
    pub cash_in: CashInDetails,
    #[serde(default)]
    pub cash_in_deep_link: String,
}

/// `cashIn.completed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashInCompletedPayload {
    pub cash_in: CashInDetails,
    pub user_id: Uuid,
}

/// `cashIn.create.error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashInCreateErrorPayload {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_cash_in: Option<CashInDetails>,
}

/// `cashOut.created`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOutCreatedPayload {
    pub cash_out: CashOutDetails,
    #[serde(default)]
    pub cash_out_deep_link: String,
}

/// `cashout.paid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOutPaidByUserPayload {
    pub cash_out: CashOutDetails,
    pub user_id: Uuid,
}

/// `cashOut.completed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOutCompletedPayload {
    pub cash_out: CashOutDetails,
    pub user_id: Uuid,
}

/// `cashOut.create.error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOutCreateErrorPayload {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_cash_out: Option<CashOutDetails>,
}
