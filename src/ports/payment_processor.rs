//! Payment processor port.
//!
//! The processor is the source of truth for settlement. The webhook path
//! consumes its pushed notifications; this port is the pull side: invoice
//! creation and the reconciliation sweep's authoritative status fetch, an
//! independent failure domain from the webhook path.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{InvoiceId, Timestamp};

/// Request to create a payment invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequest {
    /// Amount due, in `currency`.
    pub amount: Decimal,
    pub currency: String,
    /// Caller-side correlation id, echoed back in notifications.
    pub order_id: String,
}

/// Invoice issued by the processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedInvoice {
    pub invoice_id: InvoiceId,
    /// Payment page URL for the payer.
    pub payment_url: String,
    /// When the invoice lapses unpaid.
    pub expires_at: Timestamp,
}

/// One payment attempt against an invoice, as reported by the processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAttempt {
    /// Processor status vocabulary (same as webhook `payment_status`).
    pub status: String,
    #[serde(default)]
    pub actually_paid: Decimal,
    pub pay_currency: String,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Port for processor integrations.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Creates an invoice for the given amount.
    async fn create_invoice(&self, request: InvoiceRequest)
        -> Result<IssuedInvoice, ProcessorError>;

    /// Fetches every payment attempt recorded against an invoice, oldest
    /// first. The most recent entry is authoritative.
    async fn fetch_payment(
        &self,
        invoice_id: &InvoiceId,
    ) -> Result<Vec<PaymentAttempt>, ProcessorError>;
}

/// Errors from processor operations.
#[derive(Debug, Clone, Error)]
pub enum ProcessorError {
    /// Network failure or timeout; retryable.
    #[error("processor transport failure: {0}")]
    Transport(String),

    /// Processor asked us to back off; retryable after the given delay.
    #[error("processor rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Processor 5xx; retryable.
    #[error("processor unavailable ({status}): {message}")]
    Unavailable { status: u16, message: String },

    /// Invoice unknown to the processor.
    #[error("invoice not found: {0}")]
    NotFound(String),

    /// Processor rejected the request; not retryable.
    #[error("processor rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("unexpected processor response: {0}")]
    Malformed(String),
}

impl ProcessorError {
    /// True if retrying the same call can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProcessorError::Transport(_)
                | ProcessorError::RateLimited { .. }
                | ProcessorError::Unavailable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_processor_is_object_safe() {
        fn _accepts_dyn(_p: &dyn PaymentProcessor) {}
    }

    #[test]
    fn transport_and_rate_limit_are_retryable() {
        assert!(ProcessorError::Transport("timeout".into()).is_retryable());
        assert!(ProcessorError::RateLimited { retry_after_secs: 2 }.is_retryable());
        assert!(ProcessorError::Unavailable {
            status: 502,
            message: "bad gateway".into()
        }
        .is_retryable());

        assert!(!ProcessorError::NotFound("inv_1".into()).is_retryable());
        assert!(!ProcessorError::Rejected {
            status: 400,
            message: "bad currency".into()
        }
        .is_retryable());
    }
}
