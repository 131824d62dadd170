//! The settlement engine: sole authority over terminal transaction state.
//!
//! Every path that can settle a payment converges here: the webhook handler,
//! the reconciliation sweep, and the admin override all call [`apply`] with
//! whatever the processor reported, and the engine decides what that means
//! for the ledger and the payee's subscription.
//!
//! One invocation is one storage transaction. The ledger row is locked first,
//! so a webhook delivery and a reconciliation probe racing on the same
//! invoice serialize: whichever runs second sees the committed outcome of
//! the first and no-ops. That lock, plus the forward-only status machine, is
//! what makes duplicate notifications unable to double-extend a
//! subscription.
//!
//! [`apply`]: SettlementEngine::apply

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::access::{AccessActor, AccessTask};
use crate::domain::foundation::{Clock, InvoiceId, StateMachine, SubscriberId, Timestamp};
use crate::domain::ledger::{is_settled_report, map_report, Transaction};
use crate::domain::subscription::Subscription;
use crate::ports::{SettlementStore, SettlementTxn};

use super::{ApplyOutcome, SettlementAction, SettlementError};

/// Engine applying processor-reported settlement state to the ledger.
pub struct SettlementEngine {
    store: Arc<dyn SettlementStore>,
    clock: Arc<dyn Clock>,
}

impl SettlementEngine {
    pub fn new(store: Arc<dyn SettlementStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Applies a reported payment state to the transaction for `invoice_id`.
    ///
    /// Runs as one atomic unit: lock row, run the state machine, mutate the
    /// subscription on settlement, commit. Any failure rolls the whole
    /// attempt back. Calling this twice with a settled status yields exactly
    /// one confirmation; the second call returns
    /// [`ApplyOutcome::AlreadyConfirmed`].
    pub async fn apply(
        &self,
        invoice_id: &InvoiceId,
        reported_status: &str,
        actually_paid: Decimal,
        pay_currency: &str,
        actor: AccessActor,
    ) -> Result<ApplyOutcome, SettlementError> {
        let mut txn = self.store.begin().await?;

        let Some(mut transaction) = txn.lock_transaction(invoice_id).await? else {
            return Err(SettlementError::UnknownInvoice(invoice_id.clone()));
        };

        // Terminal and idempotent: a confirmed transaction absorbs any
        // further report without effect.
        if transaction.is_confirmed() {
            tracing::debug!(%invoice_id, "transaction already confirmed, no-op");
            return Ok(ApplyOutcome::AlreadyConfirmed);
        }

        let now = self.clock.now();

        if is_settled_report(reported_status) {
            self.settle(txn, &mut transaction, actually_paid, pay_currency, actor, now)
                .await
        } else {
            let target = map_report(reported_status);
            if !transaction.status.can_transition_to(&target) {
                // Late or out-of-order report; the ledger only moves forward.
                tracing::debug!(
                    %invoice_id,
                    current = transaction.status.as_str(),
                    reported = reported_status,
                    "ignoring status regression"
                );
                return Ok(ApplyOutcome::Updated {
                    status: transaction.status,
                });
            }
            transaction.record_status(target, now)?;
            txn.update_transaction(&transaction).await?;
            txn.commit().await?;
            tracing::info!(%invoice_id, status = target.as_str(), "transaction status updated");
            Ok(ApplyOutcome::Updated { status: target })
        }
    }

    /// Settlement branch: the underpayment gate, then confirm + extend.
    async fn settle(
        &self,
        mut txn: Box<dyn SettlementTxn>,
        transaction: &mut Transaction,
        actually_paid: Decimal,
        pay_currency: &str,
        actor: AccessActor,
        now: Timestamp,
    ) -> Result<ApplyOutcome, SettlementError> {
        if transaction.is_underpaid(actually_paid) {
            let expected = transaction.amount;
            transaction.fail(now)?;
            txn.update_transaction(transaction).await?;
            txn.commit().await?;
            tracing::warn!(
                invoice_id = %transaction.invoice_id,
                %expected,
                received = %actually_paid,
                %pay_currency,
                "settled report under the amount due, transaction failed"
            );
            return Err(SettlementError::Underpaid {
                expected,
                received: actually_paid,
            });
        }

        transaction.confirm(now)?;
        txn.update_transaction(transaction).await?;

        let plan = txn
            .load_plan(&transaction.plan_id)
            .await?
            .ok_or(SettlementError::PlanMissing(transaction.plan_id))?;

        // The facet is normally created on first interaction; a missing row
        // here means that flow was skipped, so create it rather than lose
        // the payment.
        let mut subscription = match txn.load_subscription(&transaction.payee).await? {
            Some(s) => s,
            None => {
                tracing::warn!(
                    invoice_id = %transaction.invoice_id,
                    "no subscription facet for payee, creating one"
                );
                Subscription::pending(transaction.plan_id, None, now)
            }
        };

        let period_end = subscription.apply_confirmed_payment(&plan, now)?;
        txn.save_subscription(&transaction.payee, &subscription).await?;

        let action = if transaction.payee.is_subscriber() {
            let subscriber_id = SubscriberId::from_uuid(transaction.payee.id);
            match subscription.chat_user_id {
                Some(chat_user_id) => {
                    txn.enqueue_task(&AccessTask::Grant {
                        subscriber_id,
                        channel_id: plan.channel_id,
                        chat_user_id,
                        performed_by: actor,
                    })
                    .await?;
                }
                None => {
                    tracing::warn!(
                        %subscriber_id,
                        "subscriber has no chat account on file, skipping grant task"
                    );
                }
            }
            SettlementAction::ActivatedSubscriber
        } else {
            SettlementAction::ActivatedClient
        };

        txn.commit().await?;
        tracing::info!(
            invoice_id = %transaction.invoice_id,
            action = ?action,
            period_end = period_end.as_unix_secs(),
            "payment settled, subscription extended"
        );
        Ok(ApplyOutcome::Confirmed { action, period_end })
    }
}
