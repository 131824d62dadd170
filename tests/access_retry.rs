//! Access-control behavior under provider failure: rate limits, transient
//! outages, the outbox attempt budget, and the moderation revoke path.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use paygate::adapters::memory::{ChatCall, FakeChatProvider, InMemoryStore};
use paygate::application::{
    AccessControlEngine, ModerationService, OutboxRelay, RetryPolicy, MAX_DELIVERY_ATTEMPTS,
};
use paygate::domain::access::{AccessAction, AccessActor, AccessTask};
use paygate::domain::foundation::{
    ChannelId, ChatUserId, Clock, FixedClock, PlanId, RecordingSleeper, SubscriberId, Timestamp,
};
use paygate::domain::ledger::Payee;
use paygate::domain::subscription::{Plan, Subscription, SubscriptionStatus};
use paygate::ports::{
    AccessLogRepository, AccessOutbox, ChatError, OutboxEntry, OutboxStatus,
    SubscriptionRepository,
};

fn base_time() -> Timestamp {
    Timestamp::from_unix_secs(1_700_000_000)
}

struct Harness {
    clock: Arc<FixedClock>,
    store: Arc<InMemoryStore>,
    chat: Arc<FakeChatProvider>,
    sleeper: Arc<RecordingSleeper>,
    access: Arc<AccessControlEngine>,
    relay: OutboxRelay,
}

impl Harness {
    fn new() -> Self {
        let clock = Arc::new(FixedClock::at(base_time()));
        let store = Arc::new(InMemoryStore::new(clock.clone()));
        let chat = Arc::new(FakeChatProvider::new());
        let sleeper = Arc::new(RecordingSleeper::new());

        let access = Arc::new(AccessControlEngine::new(
            chat.clone(),
            store.clone(),
            store.clone(),
            RetryPolicy::default(),
            sleeper.clone(),
            clock.clone(),
        ));
        let relay = OutboxRelay::new(store.clone(), access.clone(), clock.clone());

        Self {
            clock,
            store,
            chat,
            sleeper,
            access,
            relay,
        }
    }
}

#[tokio::test]
async fn rate_limited_grant_waits_and_succeeds() {
    let h = Harness::new();

    // First invite-link call hits the rate limit with retry_after=2.
    h.chat
        .fail_next_with([ChatError::RateLimited { retry_after_secs: 2 }]);

    h.access
        .grant(
            SubscriberId::new(),
            ChannelId::new(-1),
            ChatUserId::new(9),
            AccessActor::System,
            "payment confirmed",
        )
        .await
        .unwrap();

    // Slept at least the provider-requested 2s (plus the buffer), then
    // succeeded without surfacing the rate limit to the caller.
    let slept = h.sleeper.slept();
    assert_eq!(slept.len(), 1);
    assert!(slept[0] >= Duration::from_secs(2));

    let calls = h.chat.calls();
    let invite_calls = calls
        .iter()
        .filter(|c| matches!(c, ChatCall::CreateInviteLink { .. }))
        .count();
    assert_eq!(invite_calls, 2);
}

#[tokio::test]
async fn transient_outage_exhausts_budget_and_propagates() {
    let h = Harness::new();

    h.chat.fail_next_with([
        ChatError::Transport("gateway timeout".into()),
        ChatError::Transport("gateway timeout".into()),
        ChatError::Transport("gateway timeout".into()),
    ]);

    let result = h
        .access
        .grant(
            SubscriberId::new(),
            ChannelId::new(-1),
            ChatUserId::new(9),
            AccessActor::System,
            "payment confirmed",
        )
        .await;

    assert!(result.is_err());
    // Three attempts, two backoff sleeps (500ms, 1s).
    assert_eq!(
        h.sleeper.slept(),
        vec![Duration::from_millis(500), Duration::from_millis(1000)]
    );
    // Nothing was logged for a grant that never happened.
    assert!(h.store.access_log().await.is_empty());
}

#[tokio::test]
async fn client_rejection_fails_without_retry() {
    let h = Harness::new();

    h.chat.fail_next_with([ChatError::Rejected {
        status: 403,
        message: "bot is not channel admin".into(),
    }]);

    let result = h
        .access
        .grant(
            SubscriberId::new(),
            ChannelId::new(-1),
            ChatUserId::new(9),
            AccessActor::System,
            "payment confirmed",
        )
        .await;

    assert!(result.is_err());
    assert!(h.sleeper.slept().is_empty());
    assert_eq!(h.chat.calls().len(), 1);
}

#[tokio::test]
async fn revoke_then_grant_leaves_no_lingering_ban() {
    let h = Harness::new();
    let subscriber = SubscriberId::new();
    let channel = ChannelId::new(-1_001_555);
    let user = ChatUserId::new(31337);

    h.access
        .revoke(subscriber, channel, user, AccessActor::System, "expired")
        .await
        .unwrap();
    assert!(!h.chat.is_banned(channel, user));

    // Re-subscribing works: the grant succeeds against the same channel.
    h.access
        .grant(subscriber, channel, user, AccessActor::System, "payment confirmed")
        .await
        .unwrap();

    let log = h.store.list_for_subject(&subscriber).await.unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].action, AccessAction::Grant);
    assert_eq!(log[1].action, AccessAction::Revoke);
}

#[tokio::test]
async fn outbox_entry_survives_failures_until_budget_runs_out() {
    let h = Harness::new();

    let entry = OutboxEntry::new(
        AccessTask::Grant {
            subscriber_id: SubscriberId::new(),
            channel_id: ChannelId::new(-5),
            chat_user_id: ChatUserId::new(4),
            performed_by: AccessActor::System,
        },
        h.clock.now(),
    );
    h.store.enqueue(&entry).await.unwrap();

    // Each drain sees the full retry policy fail on transport errors.
    for round in 1..=MAX_DELIVERY_ATTEMPTS {
        h.chat.fail_next_with(vec![
            ChatError::Transport("down".into());
            3
        ]);
        let report = h.relay.drain().await;
        assert_eq!(report.failed, 1, "round {}", round);
    }

    let entries = h.store.outbox_entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, OutboxStatus::Abandoned);
    assert_eq!(entries[0].attempts, MAX_DELIVERY_ATTEMPTS);
    assert!(entries[0].last_error.is_some());

    // Abandoned entries are no longer offered to the relay.
    let report = h.relay.drain().await;
    assert_eq!(report.delivered + report.failed, 0);
}

#[tokio::test]
async fn outbox_delivery_recovers_after_one_bad_round() {
    let h = Harness::new();

    let entry = OutboxEntry::new(
        AccessTask::Grant {
            subscriber_id: SubscriberId::new(),
            channel_id: ChannelId::new(-5),
            chat_user_id: ChatUserId::new(4),
            performed_by: AccessActor::System,
        },
        h.clock.now(),
    );
    h.store.enqueue(&entry).await.unwrap();

    h.chat.fail_next_with(vec![ChatError::Transport("down".into()); 3]);
    let report = h.relay.drain().await;
    assert_eq!(report.failed, 1);

    // Provider back up: the next pass delivers.
    let report = h.relay.drain().await;
    assert_eq!(report.delivered, 1);

    let entries = h.store.outbox_entries().await;
    assert_eq!(entries[0].status, OutboxStatus::Done);
}

#[tokio::test]
async fn moderation_revoke_flows_through_outbox() {
    let h = Harness::new();

    let plan = Plan::new(PlanId::new(), ChannelId::new(-77), 30, Decimal::ONE, "usd");
    h.store.add_plan(plan.clone()).await;

    let subscriber = SubscriberId::new();
    let payee = Payee::subscriber(subscriber);
    let user = ChatUserId::new(555);
    let mut sub = Subscription::pending(plan.id, Some(user), base_time());
    sub.apply_confirmed_payment(&plan, base_time()).unwrap();
    h.store.seed_subscription(payee, sub).await;

    let moderation = ModerationService::new(
        h.store.clone(),
        h.store.clone(),
        h.store.clone(),
        h.clock.clone(),
    );
    moderation
        .revoke_subscription(payee, AccessActor::Client, "terms violation")
        .await
        .unwrap();

    let stored = h.store.find_by_payee(&payee).await.unwrap().unwrap();
    assert_eq!(stored.status, SubscriptionStatus::Revoked);

    let report = h.relay.drain().await;
    assert_eq!(report.delivered, 1);

    let log = h.store.list_for_subject(&subscriber).await.unwrap();
    assert_eq!(log[0].action, AccessAction::Revoke);
    assert_eq!(log[0].performed_by, AccessActor::Client);
    assert_eq!(log[0].reason, "terms violation");
    assert!(!h.chat.is_banned(plan.channel_id, user));
}
