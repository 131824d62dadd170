//! Scripted in-memory payment processor.
//!
//! Issues deterministic invoice ids and returns whatever attempt history a
//! test scripts for an invoice. Lets reconciliation tests simulate "the
//! processor saw the payment, the webhook never arrived".

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::foundation::{Clock, InvoiceId};
use crate::ports::{
    InvoiceRequest, IssuedInvoice, PaymentAttempt, PaymentProcessor, ProcessorError,
};

/// Invoice lifetime used for scripted invoices.
const INVOICE_TTL_SECS: i64 = 3600;

/// In-memory [`PaymentProcessor`] with scripted payment histories.
pub struct MockPaymentProcessor {
    clock: Arc<dyn Clock>,
    counter: AtomicU64,
    histories: Mutex<HashMap<String, Vec<PaymentAttempt>>>,
    fail_fetches: Mutex<HashMap<String, ProcessorError>>,
}

impl MockPaymentProcessor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            counter: AtomicU64::new(1),
            histories: Mutex::new(HashMap::new()),
            fail_fetches: Mutex::new(HashMap::new()),
        }
    }

    /// Scripts the attempt history returned for an invoice.
    pub fn set_attempts(&self, invoice_id: &InvoiceId, attempts: Vec<PaymentAttempt>) {
        self.histories
            .lock()
            .unwrap()
            .insert(invoice_id.as_str().to_string(), attempts);
    }

    /// Makes the next fetches for an invoice fail with the given error.
    pub fn fail_fetch_with(&self, invoice_id: &InvoiceId, error: ProcessorError) {
        self.fail_fetches
            .lock()
            .unwrap()
            .insert(invoice_id.as_str().to_string(), error);
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn create_invoice(
        &self,
        _request: InvoiceRequest,
    ) -> Result<IssuedInvoice, ProcessorError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let invoice_id = InvoiceId::new(format!("inv_{:06}", n))
            .expect("generated invoice id is never empty");
        Ok(IssuedInvoice {
            payment_url: format!("https://pay.example/{}", invoice_id),
            expires_at: self.clock.now().plus_secs(INVOICE_TTL_SECS),
            invoice_id,
        })
    }

    async fn fetch_payment(
        &self,
        invoice_id: &InvoiceId,
    ) -> Result<Vec<PaymentAttempt>, ProcessorError> {
        if let Some(err) = self.fail_fetches.lock().unwrap().get(invoice_id.as_str()) {
            return Err(err.clone());
        }
        Ok(self
            .histories
            .lock()
            .unwrap()
            .get(invoice_id.as_str())
            .cloned()
            .unwrap_or_default())
    }
}
