//! Ports: the interfaces between the core and everything that carries
//! state or talks to the outside world.

mod access_log_repository;
mod chat_provider;
mod notification_sink;
mod outbox;
mod payment_processor;
mod plan_catalog;
mod settlement_store;
mod subscription_repository;
mod transaction_repository;

pub use access_log_repository::AccessLogRepository;
pub use chat_provider::{ChatError, ChatMember, ChatProvider, InviteLink};
pub use notification_sink::NotificationSink;
pub use outbox::{AccessOutbox, OutboxEntry, OutboxStatus};
pub use payment_processor::{
    InvoiceRequest, IssuedInvoice, PaymentAttempt, PaymentProcessor, ProcessorError,
};
pub use plan_catalog::PlanCatalog;
pub use settlement_store::{SettlementStore, SettlementTxn};
pub use subscription_repository::SubscriptionRepository;
pub use transaction_repository::TransactionRepository;
