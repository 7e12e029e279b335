//! Request payloads the client sends.
//!
//! Every request exposes `validate()`; the client calls it before anything
//! is serialized so usage errors fail synchronously.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CashDeskError, Result};

/// `cashier.login`
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashierLoginRequest {
    pub account_id: String,
    pub user_name: String,
    pub password: String,
}

impl CashierLoginRequest {
    pub fn new(
        account_id: impl Into<String>,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            user_name: user_name.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text("accountId", &self.account_id)?;
        require_text("userName", &self.user_name)?;
        if self.password.is_empty() {
            return Err(CashDeskError::InvalidRequest("password must not be empty".into()));
        }
        Ok(())
    }
}

// Keep credentials out of logs.
impl std::fmt::Debug for CashierLoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CashierLoginRequest")
            .field("account_id", &self.account_id)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One line of a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLineItem {
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl PaymentLineItem {
    pub fn new(name: impl Into<String>, unit_price: Decimal, quantity: u32) -> Self {
        Self {
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Single unit of `name`.
    pub fn single(name: impl Into<String>, unit_price: Decimal) -> Self {
        Self::new(name, unit_price, default_quantity())
    }

    fn validate(&self) -> Result<()> {
        require_text("lineItems.name", &self.name)?;
        if self.unit_price.is_sign_negative() {
            return Err(CashDeskError::InvalidRequest(format!(
                "line item '{}' has a negative unit price",
                self.name
            )));
        }
        if self.quantity == 0 {
            return Err(CashDeskError::InvalidRequest(format!(
                "line item '{}' has zero quantity",
                self.name
            )));
        }
        Ok(())
    }
}

/// Key/value attached to a payment; `display_to_user` shows it in the wallet app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMetadata {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub display_to_user: bool,
}

impl PaymentMetadata {
    pub fn new(key: impl Into<String>, value: impl Into<String>, display_to_user: bool) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            display_to_user,
        }
    }
}

/// `payment.create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreateRequest {
    pub total_amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub line_items: Vec<PaymentLineItem>,
    #[serde(default)]
    pub payment_metadata: Vec<PaymentMetadata>,
}

impl PaymentCreateRequest {
    pub fn new(
        total_amount: Decimal,
        currency: impl Into<String>,
        line_items: Vec<PaymentLineItem>,
        payment_metadata: Vec<PaymentMetadata>,
    ) -> Self {
        Self {
            total_amount,
            currency: currency.into(),
            line_items,
            payment_metadata,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_amount(self.total_amount)?;
        require_currency(&self.currency)?;
        for item in &self.line_items {
            item.validate()?;
        }
        for meta in &self.payment_metadata {
            require_text("paymentMetadata.key", &meta.key)?;
        }
        Ok(())
    }
}

/// `payment.cancel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCancelRequest {
    pub payment_id: Uuid,
}

/// `cashIn.create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashInCreateRequest {
    pub total_amount: Decimal,
    pub currency: String,
}

impl CashInCreateRequest {
    pub fn new(total_amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            total_amount,
            currency: currency.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_amount(self.total_amount)?;
        require_currency(&self.currency)
    }
}

/// `cashIn.cancel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashInCancelRequest {
    pub cash_in_id: Uuid,
}

/// `cashOut.create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOutCreateRequest {
    pub total_amount: Decimal,
    pub currency: String,
}

impl CashOutCreateRequest {
    pub fn new(total_amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            total_amount,
            currency: currency.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_amount(self.total_amount)?;
        require_currency(&self.currency)
    }
}

/// `cashOut.complete`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOutCompleteRequest {
    pub cash_out_id: Uuid,
}

/// `cashOut.cancel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOutCancelRequest {
    pub cash_out_id: Uuid,
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CashDeskError::InvalidRequest(format!("{field} must not be blank")));
    }
    Ok(())
}

fn require_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(CashDeskError::InvalidRequest(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

fn require_currency(currency: &str) -> Result<()> {
    if currency.is_empty() || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CashDeskError::InvalidRequest(format!(
            "currency must be an alphabetic code, got '{currency}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn payment_request_wire_shape() {
        let req = PaymentCreateRequest::new(
            dec("20.00"),
            "BAM",
            vec![PaymentLineItem::new("Item 1", dec("10.00"), 2)],
            vec![PaymentMetadata::new("orderId", "12345", true)],
        );
        let text = serde_json::to_string(&req).unwrap();
        assert_eq!(
            text,
            r#"{"totalAmount":20.00,"currency":"BAM","lineItems":[{"name":"Item 1","unitPrice":10.00,"quantity":2}],"paymentMetadata":[{"key":"orderId","value":"12345","displayToUser":true}]}"#
        );
    }

    #[test]
    fn quantity_defaults_to_one() {
        let item: PaymentLineItem = serde_json::from_str(r#"{"name":"Test","unitPrice":5}"#).unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(PaymentLineItem::single("Test", dec("5")).quantity, 1);
    }

    #[test]
    fn login_validation() {
        assert!(CashierLoginRequest::new("A1", "bob", "pw").validate().is_ok());
        let err = CashierLoginRequest::new("A1", " ", "pw").validate().unwrap_err();
        assert_eq!(err.kind().as_str(), "INVALID_REQUEST");
        assert!(CashierLoginRequest::new("A1", "bob", "").validate().is_err());
    }

    #[test]
    fn login_debug_redacts_password() {
        let dbg = format!("{:?}", CashierLoginRequest::new("A1", "bob", "hunter2"));
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("bob"));
    }

    #[test]
    fn amount_and_currency_validation() {
        assert!(CashInCreateRequest::new(dec("0"), "BAM").validate().is_err());
        assert!(CashOutCreateRequest::new(dec("-1"), "BAM").validate().is_err());
        assert!(CashOutCreateRequest::new(dec("5"), "").validate().is_err());
        assert!(CashOutCreateRequest::new(dec("5"), "B4M").validate().is_err());
        assert!(CashInCreateRequest::new(dec("0.01"), "EUR").validate().is_ok());
    }

    #[test]
    fn line_item_validation() {
        let zero_qty = PaymentCreateRequest::new(
            dec("1"),
            "BAM",
            vec![PaymentLineItem::new("Thing", dec("1"), 0)],
            vec![],
        );
        assert!(zero_qty.validate().is_err());

        let negative = PaymentCreateRequest::new(
            dec("1"),
            "BAM",
            vec![PaymentLineItem::new("Thing", dec("-1"), 1)],
            vec![],
        );
        assert!(negative.validate().is_err());
    }

    #[test]
    fn id_requests_use_camel_case_keys() {
        let id = Uuid::nil();
        let text = serde_json::to_string(&CashInCancelRequest { cash_in_id: id }).unwrap();
        assert_eq!(text, format!(r#"{{"cashInId":"{id}"}}"#));
    }
}
