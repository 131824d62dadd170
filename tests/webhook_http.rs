//! HTTP-level webhook behavior: signature enforcement over the raw body,
//! replay window edges, and response status mapping.

use std::sync::Arc;

use axum::body::Body;
use http::{Request, StatusCode};
use rust_decimal::Decimal;
use tower::ServiceExt;

use paygate::adapters::http::{router, AppState, SIGNATURE_HEADER};
use paygate::adapters::memory::{FakeChatProvider, InMemoryStore};
use paygate::application::{AccessControlEngine, OutboxRelay, RetryPolicy, WebhookIngest};
use paygate::domain::foundation::{
    ChannelId, ChatUserId, FixedClock, InvoiceId, PlanId, RecordingSleeper, SubscriberId,
    Timestamp,
};
use paygate::domain::ledger::{Payee, Transaction, TransactionStatus};
use paygate::domain::settlement::SettlementEngine;
use paygate::domain::subscription::{Plan, Subscription};
use paygate::domain::webhook::{compute_signature, ReplayGuard, SignatureVerifier};
use paygate::ports::TransactionRepository;

const SECRET: &str = "ipn_secret_f00d";
const BASE_UNIX: i64 = 1_700_000_000;

fn base_time() -> Timestamp {
    Timestamp::from_unix_secs(BASE_UNIX)
}

struct Harness {
    store: Arc<InMemoryStore>,
    router: axum::Router,
    plan: Plan,
}

impl Harness {
    fn new() -> Self {
        let clock = Arc::new(FixedClock::at(base_time()));
        let store = Arc::new(InMemoryStore::new(clock.clone()));
        let chat = Arc::new(FakeChatProvider::new());

        let engine = Arc::new(SettlementEngine::new(store.clone(), clock.clone()));
        let access = Arc::new(AccessControlEngine::new(
            chat,
            store.clone(),
            store.clone(),
            RetryPolicy::default(),
            Arc::new(RecordingSleeper::new()),
            clock.clone(),
        ));
        let relay = Arc::new(OutboxRelay::new(store.clone(), access, clock.clone()));
        let ingest = Arc::new(WebhookIngest::new(
            SignatureVerifier::new(SECRET),
            ReplayGuard::default(),
            store.clone(),
            engine,
            relay,
            clock,
        ));

        let plan = Plan::new(
            PlanId::new(),
            ChannelId::new(-1_001_777),
            30,
            Decimal::new(2500, 2),
            "usd",
        );

        Self {
            store,
            router: router(AppState::new(ingest)),
            plan,
        }
    }

    async fn seed_invoice(&self, invoice: &str) {
        self.store.add_plan(self.plan.clone()).await;

        let payee = Payee::subscriber(SubscriberId::new());
        self.store
            .seed_subscription(
                payee,
                Subscription::pending(self.plan.id, Some(ChatUserId::new(7)), base_time()),
            )
            .await;

        let transaction = Transaction::pending(
            InvoiceId::new(invoice).unwrap(),
            payee,
            self.plan.id,
            self.plan.price,
            "usd",
            base_time().add_days(1),
            base_time(),
        );
        self.store.insert(&transaction).await.unwrap();
    }

    async fn post(&self, body: Vec<u8>, signature: Option<String>) -> http::Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri("/webhooks/payment")
            .header("content-type", "application/json");
        if let Some(sig) = signature {
            request = request.header(SIGNATURE_HEADER, sig);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap()
    }
}

fn notification(invoice: &str, status: &str, paid: Decimal, updated_at: Option<Timestamp>) -> Vec<u8> {
    let mut body = serde_json::json!({
        "payment_id": 5_077_125_096i64,
        "invoice_id": invoice,
        "payment_status": status,
        "price_amount": 25.0,
        "price_currency": "usd",
        "pay_amount": paid,
        "pay_currency": "btc",
        "actually_paid": paid,
        "order_id": "subscriber:test",
    });
    if let Some(ts) = updated_at {
        body["updated_at"] = serde_json::json!(ts.as_datetime().to_rfc3339());
    }
    serde_json::to_vec(&body).unwrap()
}

fn sign(body: &[u8]) -> String {
    compute_signature(SECRET, body)
}

#[tokio::test]
async fn valid_notification_settles_with_200() {
    let harness = Harness::new();
    harness.seed_invoice("inv_http_1").await;

    let body = notification(
        "inv_http_1",
        "finished",
        Decimal::new(2500, 2),
        Some(base_time().minus_secs(60)),
    );
    let sig = sign(&body);

    let response = harness.post(body, Some(sig)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let tx = harness
        .store
        .find_by_invoice_id(&InvoiceId::new("inv_http_1").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Confirmed);
}

#[tokio::test]
async fn redelivery_of_settled_invoice_returns_200() {
    let harness = Harness::new();
    harness.seed_invoice("inv_http_2").await;

    let body = notification("inv_http_2", "finished", Decimal::new(2500, 2), None);
    let sig = sign(&body);

    let first = harness.post(body.clone(), Some(sig.clone())).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = harness.post(body, Some(sig)).await;
    assert_eq!(second.status(), StatusCode::OK);
}

#[tokio::test]
async fn single_byte_mutation_invalidates_signature() {
    let harness = Harness::new();
    harness.seed_invoice("inv_http_3").await;

    let body = notification("inv_http_3", "finished", Decimal::new(2500, 2), None);
    let sig = sign(&body);

    let mut tampered = body.clone();
    let idx = tampered.len() / 2;
    tampered[idx] ^= 0x01;

    let response = harness.post(tampered, Some(sig)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The ledger was never touched.
    let tx = harness
        .store
        .find_by_invoice_id(&InvoiceId::new("inv_http_3").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending);
}

#[tokio::test]
async fn missing_signature_is_403() {
    let harness = Harness::new();
    harness.seed_invoice("inv_http_4").await;

    let body = notification("inv_http_4", "finished", Decimal::new(2500, 2), None);
    let response = harness.post(body, None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn six_minute_old_notification_is_rejected() {
    let harness = Harness::new();
    harness.seed_invoice("inv_http_5").await;

    let body = notification(
        "inv_http_5",
        "finished",
        Decimal::new(2500, 2),
        Some(base_time().minus_secs(360)),
    );
    let sig = sign(&body);

    let response = harness.post(body, Some(sig)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let tx = harness
        .store
        .find_by_invoice_id(&InvoiceId::new("inv_http_5").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending);
}

#[tokio::test]
async fn four_minute_old_notification_is_accepted() {
    let harness = Harness::new();
    harness.seed_invoice("inv_http_6").await;

    let body = notification(
        "inv_http_6",
        "finished",
        Decimal::new(2500, 2),
        Some(base_time().minus_secs(240)),
    );
    let sig = sign(&body);

    let response = harness.post(body, Some(sig)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn notification_without_timestamp_is_accepted() {
    let harness = Harness::new();
    harness.seed_invoice("inv_http_7").await;

    let body = notification("inv_http_7", "confirming", Decimal::ZERO, None);
    let sig = sign(&body);

    let response = harness.post(body, Some(sig)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn underpaid_notification_is_a_handled_200() {
    let harness = Harness::new();
    harness.seed_invoice("inv_http_8").await;

    let body = notification(
        "inv_http_8",
        "finished",
        Decimal::new(2499, 2), // 24.99 against 25.00 due
        None,
    );
    let sig = sign(&body);

    let response = harness.post(body, Some(sig)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let tx = harness
        .store
        .find_by_invoice_id(&InvoiceId::new("inv_http_8").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Failed);
}

#[tokio::test]
async fn malformed_body_with_valid_signature_is_400() {
    let harness = Harness::new();

    let body = b"{not json".to_vec();
    let sig = sign(&body);

    let response = harness.post(body, Some(sig)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_invoice_is_acknowledged() {
    let harness = Harness::new();

    let body = notification("inv_ghost", "finished", Decimal::ONE, None);
    let sig = sign(&body);

    let response = harness.post(body, Some(sig)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_endpoint_responds() {
    let harness = Harness::new();

    let response = harness
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
