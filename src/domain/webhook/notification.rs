//! Inbound payment notification wire format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{InvoiceId, Timestamp};

use super::WebhookError;

/// Notification body posted by the payment processor.
///
/// Deserialized only after the signature over the raw bytes has verified;
/// re-serializing this struct never feeds back into signature checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub payment_id: i64,
    pub invoice_id: String,
    /// Processor status vocabulary: `waiting`, `confirming`, `sending`,
    /// `finished`, `confirmed`, `partially_paid`, `failed`, `expired`.
    pub payment_status: String,
    /// Invoice amount in the priced currency.
    pub price_amount: Decimal,
    pub price_currency: String,
    /// Amount requested in the paid currency.
    pub pay_amount: Decimal,
    pub pay_currency: String,
    /// Amount the processor has actually seen arrive.
    #[serde(default)]
    pub actually_paid: Decimal,
    #[serde(default)]
    pub order_id: Option<String>,
    /// Self-reported update time; absent on some event kinds.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PaymentNotification {
    /// Parses a notification from the raw request body.
    pub fn parse(raw: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(raw).map_err(|e| WebhookError::Malformed(e.to_string()))
    }

    /// The ledger idempotency key this notification targets.
    pub fn invoice_id(&self) -> Result<InvoiceId, WebhookError> {
        InvoiceId::new(self.invoice_id.clone())
            .map_err(|e| WebhookError::Malformed(e.to_string()))
    }

    /// Self-reported update time as a domain timestamp.
    pub fn updated_at_ts(&self) -> Option<Timestamp> {
        self.updated_at.map(Timestamp::from_datetime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_json() -> String {
        r#"{
            "payment_id": 5077125096,
            "invoice_id": "inv_4913",
            "payment_status": "finished",
            "price_amount": 25.0,
            "price_currency": "usd",
            "pay_amount": 0.00041,
            "pay_currency": "btc",
            "actually_paid": 0.00041,
            "order_id": "sub-42",
            "updated_at": "2024-01-15T10:30:00Z"
        }"#
        .to_string()
    }

    #[test]
    fn parses_full_notification() {
        let n = PaymentNotification::parse(sample_json().as_bytes()).unwrap();

        assert_eq!(n.payment_id, 5077125096);
        assert_eq!(n.payment_status, "finished");
        assert_eq!(n.invoice_id().unwrap().as_str(), "inv_4913");
        assert_eq!(n.actually_paid, Decimal::from_str("0.00041").unwrap());
        assert!(n.updated_at_ts().is_some());
    }

    #[test]
    fn missing_optional_fields_default() {
        let n = PaymentNotification::parse(
            br#"{
                "payment_id": 1,
                "invoice_id": "inv_1",
                "payment_status": "waiting",
                "price_amount": 10,
                "price_currency": "usd",
                "pay_amount": 10,
                "pay_currency": "usdt"
            }"#,
        )
        .unwrap();

        assert_eq!(n.actually_paid, Decimal::ZERO);
        assert!(n.order_id.is_none());
        assert!(n.updated_at_ts().is_none());
    }

    #[test]
    fn garbage_body_is_malformed() {
        let err = PaymentNotification::parse(b"not json at all").unwrap_err();
        assert!(matches!(err, WebhookError::Malformed(_)));
    }

    #[test]
    fn empty_invoice_id_is_malformed() {
        let n = PaymentNotification::parse(
            br#"{
                "payment_id": 1,
                "invoice_id": "",
                "payment_status": "waiting",
                "price_amount": 10,
                "price_currency": "usd",
                "pay_amount": 10,
                "pay_currency": "usdt"
            }"#,
        )
        .unwrap();

        assert!(matches!(n.invoice_id(), Err(WebhookError::Malformed(_))));
    }
}
