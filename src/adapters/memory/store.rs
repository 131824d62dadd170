//! In-memory storage backend.
//!
//! Implements every storage port over a single mutex-guarded state bag.
//! Used by the test suites and by local development without a database.
//! A settlement transaction holds the store lock for its whole lifetime,
//! which gives the same serialization the row lock gives in Postgres
//! (coarser, but observationally equivalent for one invoice).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::access::{AccessLogEntry, AccessTask};
use crate::domain::foundation::{
    ChatUserId, Clock, DomainError, ErrorCode, InvoiceId, PlanId, SubscriberId, Timestamp,
    TransactionId,
};
use crate::domain::ledger::{Payee, Transaction, TransactionStatus};
use crate::domain::subscription::{Plan, Subscription, SubscriptionStatus};
use crate::ports::{
    AccessLogRepository, AccessOutbox, OutboxEntry, PlanCatalog, SettlementStore, SettlementTxn,
    SubscriptionRepository, TransactionRepository,
};

#[derive(Default)]
struct StoreState {
    transactions: HashMap<InvoiceId, Transaction>,
    subscriptions: HashMap<Payee, Subscription>,
    plans: HashMap<PlanId, Plan>,
    access_log: Vec<AccessLogEntry>,
    outbox: Vec<OutboxEntry>,
}

/// In-memory implementation of all storage ports.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            clock,
        }
    }

    /// Seeds a plan into the catalog.
    pub async fn add_plan(&self, plan: Plan) {
        self.state.lock().await.plans.insert(plan.id, plan);
    }

    /// Seeds a subscription facet.
    pub async fn seed_subscription(&self, payee: Payee, subscription: Subscription) {
        self.state
            .lock()
            .await
            .subscriptions
            .insert(payee, subscription);
    }

    /// Returns a snapshot of the access audit trail.
    pub async fn access_log(&self) -> Vec<AccessLogEntry> {
        self.state.lock().await.access_log.clone()
    }

    /// Returns a snapshot of all outbox entries.
    pub async fn outbox_entries(&self) -> Vec<OutboxEntry> {
        self.state.lock().await.outbox.clone()
    }
}

// ─── Settlement store ────────────────────────────────────────────────────────

struct InMemoryTxn {
    guard: OwnedMutexGuard<StoreState>,
    now: Timestamp,
    staged_transaction: Option<Transaction>,
    staged_subscription: Option<(Payee, Subscription)>,
    staged_outbox: Vec<OutboxEntry>,
}

#[async_trait]
impl SettlementTxn for InMemoryTxn {
    async fn lock_transaction(
        &mut self,
        invoice_id: &InvoiceId,
    ) -> Result<Option<Transaction>, DomainError> {
        Ok(self.guard.transactions.get(invoice_id).cloned())
    }

    async fn load_plan(&mut self, plan_id: &PlanId) -> Result<Option<Plan>, DomainError> {
        Ok(self.guard.plans.get(plan_id).cloned())
    }

    async fn load_subscription(
        &mut self,
        payee: &Payee,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self.guard.subscriptions.get(payee).cloned())
    }

    async fn update_transaction(&mut self, transaction: &Transaction) -> Result<(), DomainError> {
        self.staged_transaction = Some(transaction.clone());
        Ok(())
    }

    async fn save_subscription(
        &mut self,
        payee: &Payee,
        subscription: &Subscription,
    ) -> Result<(), DomainError> {
        self.staged_subscription = Some((*payee, subscription.clone()));
        Ok(())
    }

    async fn enqueue_task(&mut self, task: &AccessTask) -> Result<(), DomainError> {
        self.staged_outbox.push(OutboxEntry::new(task.clone(), self.now));
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), DomainError> {
        if let Some(tx) = self.staged_transaction.take() {
            self.guard.transactions.insert(tx.invoice_id.clone(), tx);
        }
        if let Some((payee, sub)) = self.staged_subscription.take() {
            self.guard.subscriptions.insert(payee, sub);
        }
        self.guard.outbox.append(&mut self.staged_outbox);
        Ok(())
    }
}

#[async_trait]
impl SettlementStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn SettlementTxn>, DomainError> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(InMemoryTxn {
            guard,
            now: self.clock.now(),
            staged_transaction: None,
            staged_subscription: None,
            staged_outbox: Vec::new(),
        }))
    }
}

// ─── Repositories ────────────────────────────────────────────────────────────

#[async_trait]
impl TransactionRepository for InMemoryStore {
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state.transactions.contains_key(&transaction.invoice_id) {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                format!("invoice {} already recorded", transaction.invoice_id),
            ));
        }
        state
            .transactions
            .insert(transaction.invoice_id.clone(), transaction.clone());
        Ok(())
    }

    async fn find_by_invoice_id(
        &self,
        invoice_id: &InvoiceId,
    ) -> Result<Option<Transaction>, DomainError> {
        Ok(self.state.lock().await.transactions.get(invoice_id).cloned())
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .transactions
            .values()
            .find(|t| t.id == *id)
            .cloned())
    }

    async fn find_stuck_since(
        &self,
        created_after: Timestamp,
    ) -> Result<Vec<Transaction>, DomainError> {
        let state = self.state.lock().await;
        let mut stuck: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|t| {
                matches!(
                    t.status,
                    TransactionStatus::Pending | TransactionStatus::Confirming
                ) && t.payee.is_subscriber()
                    && !t.created_at.is_before(&created_after)
            })
            .cloned()
            .collect();
        stuck.sort_by_key(|t| t.created_at);
        Ok(stuck)
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn find_by_payee(&self, payee: &Payee) -> Result<Option<Subscription>, DomainError> {
        Ok(self.state.lock().await.subscriptions.get(payee).cloned())
    }

    async fn find_by_chat_user(
        &self,
        chat_user_id: ChatUserId,
    ) -> Result<Option<(Payee, Subscription)>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .subscriptions
            .iter()
            .find(|(_, s)| s.chat_user_id == Some(chat_user_id))
            .map(|(p, s)| (*p, s.clone())))
    }

    async fn upsert(&self, payee: &Payee, subscription: &Subscription) -> Result<(), DomainError> {
        self.state
            .lock()
            .await
            .subscriptions
            .insert(*payee, subscription.clone());
        Ok(())
    }

    async fn find_expired(
        &self,
        now: Timestamp,
    ) -> Result<Vec<(Payee, Subscription)>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .subscriptions
            .iter()
            .filter(|(_, s)| s.status == SubscriptionStatus::Active && s.period_end.is_before(&now))
            .map(|(p, s)| (*p, s.clone()))
            .collect())
    }
}

#[async_trait]
impl PlanCatalog for InMemoryStore {
    async fn find(&self, plan_id: &PlanId) -> Result<Option<Plan>, DomainError> {
        Ok(self.state.lock().await.plans.get(plan_id).cloned())
    }
}

#[async_trait]
impl AccessLogRepository for InMemoryStore {
    async fn append(&self, entry: &AccessLogEntry) -> Result<(), DomainError> {
        self.state.lock().await.access_log.push(entry.clone());
        Ok(())
    }

    async fn list_for_subject(
        &self,
        subject_id: &SubscriberId,
    ) -> Result<Vec<AccessLogEntry>, DomainError> {
        let state = self.state.lock().await;
        let mut entries: Vec<AccessLogEntry> = state
            .access_log
            .iter()
            .filter(|e| e.subject_id == *subject_id)
            .cloned()
            .collect();
        entries.reverse();
        Ok(entries)
    }
}

#[async_trait]
impl AccessOutbox for InMemoryStore {
    async fn enqueue(&self, entry: &OutboxEntry) -> Result<(), DomainError> {
        self.state.lock().await.outbox.push(entry.clone());
        Ok(())
    }

    async fn pending(&self, limit: u32) -> Result<Vec<OutboxEntry>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .outbox
            .iter()
            .filter(|e| e.status == crate::ports::OutboxStatus::Pending)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, entry: &OutboxEntry) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let existing = state
            .outbox
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| {
                DomainError::database(format!("outbox entry {} not found", entry.id))
            })?;
        *existing = entry.clone();
        Ok(())
    }
}
