//! HTTP payment processor adapter.
//!
//! Talks to the processor's REST API with a bounded timeout; a timeout is a
//! retryable transport failure like any other. Callers decide retry policy.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::ProcessorConfig;
use crate::domain::foundation::{InvoiceId, Timestamp};
use crate::ports::{
    InvoiceRequest, IssuedInvoice, PaymentAttempt, PaymentProcessor, ProcessorError,
};

/// Processor API client configuration.
#[derive(Clone)]
pub struct ProcessorApiConfig {
    api_key: SecretString,
    base_url: String,
    timeout: Duration,
}

impl ProcessorApiConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self {
            api_key: SecretString::new(config.api_key.clone()),
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Set a custom timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP implementation of the [`PaymentProcessor`] port.
pub struct HttpPaymentProcessor {
    config: ProcessorApiConfig,
    client: reqwest::Client,
}

impl HttpPaymentProcessor {
    pub fn new(config: ProcessorApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn classify_error(response: reqwest::Response) -> ProcessorError {
        let status = response.status();
        let retry_after = parse_retry_after(&response);
        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::TOO_MANY_REQUESTS => ProcessorError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(30),
            },
            StatusCode::NOT_FOUND => ProcessorError::NotFound(body),
            s if s.is_client_error() => ProcessorError::Rejected {
                status: s.as_u16(),
                message: body,
            },
            s => ProcessorError::Unavailable {
                status: s.as_u16(),
                message: body,
            },
        }
    }
}

fn parse_retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn transport_error(err: reqwest::Error) -> ProcessorError {
    ProcessorError::Transport(err.to_string())
}

#[derive(Debug, Deserialize)]
struct InvoiceResponse {
    invoice_id: String,
    invoice_url: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct PaymentAttemptDto {
    payment_status: String,
    #[serde(default)]
    actually_paid: Decimal,
    pay_currency: String,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct PaymentHistoryResponse {
    payments: Vec<PaymentAttemptDto>,
}

#[async_trait]
impl PaymentProcessor for HttpPaymentProcessor {
    async fn create_invoice(
        &self,
        request: InvoiceRequest,
    ) -> Result<IssuedInvoice, ProcessorError> {
        let response = self
            .client
            .post(self.url("/invoice"))
            .header("x-api-key", self.config.api_key.expose_secret())
            .json(&serde_json::json!({
                "price_amount": request.amount,
                "price_currency": request.currency,
                "order_id": request.order_id,
            }))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::classify_error(response).await);
        }

        let body: InvoiceResponse = response
            .json()
            .await
            .map_err(|e| ProcessorError::Malformed(e.to_string()))?;

        let invoice_id = InvoiceId::new(body.invoice_id)
            .map_err(|e| ProcessorError::Malformed(e.to_string()))?;

        Ok(IssuedInvoice {
            invoice_id,
            payment_url: body.invoice_url,
            expires_at: Timestamp::from_datetime(body.expires_at),
        })
    }

    async fn fetch_payment(
        &self,
        invoice_id: &InvoiceId,
    ) -> Result<Vec<PaymentAttempt>, ProcessorError> {
        let response = self
            .client
            .get(self.url(&format!("/payment/{}", invoice_id)))
            .header("x-api-key", self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::classify_error(response).await);
        }

        let body: PaymentHistoryResponse = response
            .json()
            .await
            .map_err(|e| ProcessorError::Malformed(e.to_string()))?;

        Ok(body
            .payments
            .into_iter()
            .map(|dto| PaymentAttempt {
                status: dto.payment_status,
                actually_paid: dto.actually_paid,
                pay_currency: dto.pay_currency,
                updated_at: dto.updated_at.map(Timestamp::from_datetime),
            })
            .collect())
    }
}
