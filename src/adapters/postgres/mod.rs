//! PostgreSQL adapters for the storage ports.

mod access_log_repository;
mod codecs;
mod outbox_repository;
mod plan_catalog;
mod rows;
mod settlement_store;
mod subscription_repository;
mod transaction_repository;

pub use access_log_repository::PgAccessLogRepository;
pub use outbox_repository::PgAccessOutbox;
pub use plan_catalog::PgPlanCatalog;
pub use settlement_store::PgSettlementStore;
pub use subscription_repository::PgSubscriptionRepository;
pub use transaction_repository::PgTransactionRepository;
