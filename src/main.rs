//! Paygate service entry point.
//!
//! Wires the Postgres adapters and HTTP clients into the application
//! services, spawns the periodic sweeps, and serves the webhook endpoint.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use paygate::adapters::chat::{BotApiChatProvider, BotApiConfig};
use paygate::adapters::http::{router, AppState};
use paygate::adapters::postgres::{
    PgAccessLogRepository, PgAccessOutbox, PgPlanCatalog, PgSettlementStore,
    PgSubscriptionRepository, PgTransactionRepository,
};
use paygate::adapters::processor::{HttpPaymentProcessor, ProcessorApiConfig};
use paygate::adapters::sink::{ChatNotificationSink, TracingSink};
use paygate::application::{
    AccessControlEngine, ExpirationSweep, OutboxRelay, ReconciliationSweeper, RetryPolicy,
    WebhookIngest,
};
use paygate::config::AppConfig;
use paygate::domain::foundation::{ChatUserId, Clock, Sleeper, SystemClock, TokioSleeper};
use paygate::domain::settlement::SettlementEngine;
use paygate::domain::webhook::{ReplayGuard, SignatureVerifier};
use paygate::ports::{
    AccessLogRepository, AccessOutbox, ChatProvider, NotificationSink, PaymentProcessor,
    PlanCatalog, SettlementStore, SubscriptionRepository, TransactionRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);

    // Storage adapters
    let store: Arc<dyn SettlementStore> =
        Arc::new(PgSettlementStore::new(pool.clone(), clock.clone()));
    let transactions: Arc<dyn TransactionRepository> =
        Arc::new(PgTransactionRepository::new(pool.clone()));
    let subscriptions: Arc<dyn SubscriptionRepository> =
        Arc::new(PgSubscriptionRepository::new(pool.clone()));
    let plans: Arc<dyn PlanCatalog> = Arc::new(PgPlanCatalog::new(pool.clone()));
    let access_log: Arc<dyn AccessLogRepository> =
        Arc::new(PgAccessLogRepository::new(pool.clone()));
    let outbox: Arc<dyn AccessOutbox> = Arc::new(PgAccessOutbox::new(pool.clone()));

    // Provider adapters
    let chat: Arc<dyn ChatProvider> = Arc::new(BotApiChatProvider::new(BotApiConfig::from_config(
        &config.chat,
    )));
    let processor: Arc<dyn PaymentProcessor> = Arc::new(HttpPaymentProcessor::new(
        ProcessorApiConfig::from_config(&config.processor),
    ));
    let sink: Arc<dyn NotificationSink> = match config.chat.ops_channel_id {
        Some(target) => Arc::new(ChatNotificationSink::new(
            chat.clone(),
            ChatUserId::new(target),
        )),
        None => Arc::new(TracingSink),
    };

    // Core services
    let engine = Arc::new(SettlementEngine::new(store, clock.clone()));
    let access = Arc::new(AccessControlEngine::new(
        chat,
        access_log,
        subscriptions.clone(),
        RetryPolicy::default(),
        sleeper,
        clock.clone(),
    ));
    let relay = Arc::new(OutboxRelay::new(outbox, access.clone(), clock.clone()));
    let ingest = Arc::new(WebhookIngest::new(
        SignatureVerifier::new(config.processor.ipn_secret.clone()),
        ReplayGuard::new(config.processor.replay_window_secs),
        transactions.clone(),
        engine.clone(),
        relay.clone(),
        clock.clone(),
    ));
    let reconciliation = Arc::new(ReconciliationSweeper::new(
        transactions,
        processor,
        engine,
        relay.clone(),
        sink.clone(),
        clock.clone(),
        config.sweeps.reconcile_lookback_hours,
    ));
    let expiration = Arc::new(ExpirationSweep::new(
        subscriptions,
        plans,
        access,
        sink,
        clock,
    ));

    // Periodic jobs; the webhook handler runs independently of all of them.
    {
        let reconciliation = reconciliation.clone();
        let mut ticker = tokio::time::interval(config.sweeps.reconcile_interval());
        tokio::spawn(async move {
            ticker.tick().await; // first tick fires immediately, skip it
            loop {
                ticker.tick().await;
                let report = reconciliation.run_once().await;
                tracing::info!(?report, "reconciliation sweep finished");
            }
        });
    }
    {
        let expiration = expiration.clone();
        let mut ticker = tokio::time::interval(config.sweeps.expire_interval());
        tokio::spawn(async move {
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let report = expiration.run_once().await;
                tracing::info!(?report, "expiration sweep finished");
            }
        });
    }
    {
        let relay = relay.clone();
        let mut ticker = tokio::time::interval(config.sweeps.relay_interval());
        tokio::spawn(async move {
            ticker.tick().await;
            loop {
                ticker.tick().await;
                relay.drain().await;
            }
        });
    }

    let app = router(AppState::new(ingest)).layer(TraceLayer::new_for_http());
    let addr = config.server.socket_addr();
    tracing::info!(%addr, "paygate listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
