use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use refund_desk::config::load_from_str;
use refund_desk::lifecycle::{
    BookError, CaseBook, Clock, ExpirationSweeper, ManualClock, NoticeKind, RefundState,
    ReviewAction, check_expiration, evaluate, resolve, review_notice,
};
use refund_desk::policy::{
    ActivePolicy, ApprovalMode, DecisionReason, ExpirationAction, InMemorySettingsStore,
    OrderState, Policy, PolicyDraft, RefundRequest, RefundType, ReviewTriggers,
};
use refund_desk::primitives::{ActorId, OrderId, RefundId};

fn requested_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 19, 30, 0).unwrap()
}

fn scenario_policy() -> Policy {
    Policy::validate(PolicyDraft {
        approval_mode: ApprovalMode::Hybrid,
        auto_approval_limit: 200,
        allowed_types: BTreeSet::from([RefundType::Full]),
        review_triggers: ReviewTriggers::default(),
        review_time_limit_minutes: 30,
        expiration_action: ExpirationAction::EscalateToPlatform,
        ..PolicyDraft::default()
    })
    .unwrap()
}

fn request(id: &str, amount: u64, refund_type: RefundType) -> RefundRequest {
    RefundRequest::builder(
        RefundId::new(id).unwrap(),
        OrderId::new("#9281").unwrap(),
        requested_at(),
    )
    .amount(amount)
    .unwrap()
    .refund_type(refund_type)
    .order_state(OrderState::Placed)
    .customer("Rahul K.")
    .items(["Chicken Tikka Masala x1"])
    .unwrap()
    .build()
    .unwrap()
}

#[test]
fn small_full_refund_is_auto_approved() {
    let case = evaluate(request("R101", 150, RefundType::Full), &scenario_policy(), requested_at());
    assert_eq!(case.state(), RefundState::Approved);
    assert_eq!(case.decision_reason(), DecisionReason::BelowAutoLimit);
}

#[test]
fn large_refund_escalates_after_deadline() {
    let case = evaluate(request("R102", 650, RefundType::Full), &scenario_policy(), requested_at());
    assert_eq!(case.state(), RefundState::PendingReview);
    let deadline = requested_at() + TimeDelta::minutes(30);
    assert_eq!(case.review_deadline(), Some(deadline));

    assert!(check_expiration(&case, deadline - TimeDelta::seconds(1)).is_none());
    let expired = check_expiration(&case, deadline + TimeDelta::seconds(1)).unwrap();
    assert_eq!(expired.state(), RefundState::EscalatedToPlatform);
    assert_eq!(expired.decision_reason(), DecisionReason::TimedOut);
    assert!(check_expiration(&expired, deadline + TimeDelta::minutes(5)).is_none());
}

#[test]
fn partial_refund_rejected_when_only_full_allowed() {
    let case = evaluate(request("R103", 1, RefundType::Partial), &scenario_policy(), requested_at());
    assert_eq!(case.state(), RefundState::Rejected);
    assert_eq!(case.decision_reason(), DecisionReason::DisallowedType);
}

#[test]
fn hybrid_boundary() {
    let policy = scenario_policy();
    let at_limit = evaluate(request("R1", 200, RefundType::Full), &policy, requested_at());
    let above = evaluate(request("R2", 201, RefundType::Full), &policy, requested_at());
    assert_eq!(at_limit.state(), RefundState::Approved);
    assert_eq!(above.state(), RefundState::PendingReview);
}

#[test]
fn resolving_twice_is_rejected() {
    let case = evaluate(request("R104", 450, RefundType::Full), &scenario_policy(), requested_at());
    let reviewer = ActorId::new("simran").unwrap();
    let approved = resolve(&case, ReviewAction::Approve, reviewer.clone(), requested_at()).unwrap();
    let before = approved.clone();
    assert!(resolve(&approved, ReviewAction::Reject, reviewer, requested_at()).is_err());
    assert_eq!(approved, before);
}

#[test]
fn review_needed_notice_follows_policy_settings() {
    let policy = scenario_policy();
    let case = evaluate(request("R105", 650, RefundType::Full), &policy, requested_at());
    let notice = review_notice(&case, policy.notifications()).unwrap();
    assert_eq!(notice.kind(), NoticeKind::ReviewNeeded);
    assert_eq!(notice.refund_id().as_str(), "R105");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolution_and_sweep_have_one_winner() {
    let clock = Arc::new(ManualClock::new(requested_at()));
    let book = Arc::new(CaseBook::new(clock.clone()));
    let policy = scenario_policy();

    let ids: Vec<RefundId> = (0..32)
        .map(|n| {
            let case = book
                .submit(request(&format!("R-{n}"), 650, RefundType::Full), &policy)
                .unwrap();
            case.id().clone()
        })
        .collect();
    clock.advance(TimeDelta::minutes(45));

    let mut handles = Vec::new();
    for id in ids.clone() {
        let resolver_book = Arc::clone(&book);
        let sweeper_book = Arc::clone(&book);
        let resolver_id = id.clone();
        handles.push(tokio::spawn(async move {
            let reviewer = ActorId::new("simran").unwrap();
            let resolver = tokio::task::spawn_blocking(move || {
                resolver_book.resolve(&resolver_id, ReviewAction::Approve, reviewer)
            });
            let sweeper = tokio::task::spawn_blocking(move || sweeper_book.check_expiration(&id));
            (resolver.await.unwrap(), sweeper.await.unwrap().unwrap())
        }));
    }

    for handle in handles {
        let (resolved, expired) = handle.await.unwrap();
        match (resolved, expired) {
            (Ok(case), None) => assert_eq!(case.state(), RefundState::Approved),
            (Err(BookError::Lifecycle(_)), Some(case)) => {
                assert_eq!(case.state(), RefundState::EscalatedToPlatform);
            }
            other => panic!("expected exactly one winner, got {other:?}"),
        }
    }

    assert!(book.pending().is_empty());
    assert_eq!(book.history().len(), ids.len());
}

#[tokio::test]
async fn desk_wiring_from_config() {
    let config = load_from_str(r#"{ "sweep_interval_ms": 5 }"#).unwrap();
    let active = ActivePolicy::new(config.initial_policy().unwrap());
    let store = InMemorySettingsStore::new();
    active.save_to(&store).await.unwrap();

    let clock = Arc::new(ManualClock::new(requested_at()));
    let book = Arc::new(CaseBook::new(clock.clone()));
    let sweeper = ExpirationSweeper::spawn(Arc::clone(&book), config.sweeper()).unwrap();
    assert_eq!(sweeper.config().interval(), Duration::from_millis(5));

    let pending = book
        .submit(request("R201", 650, RefundType::Full), &active.snapshot())
        .unwrap();
    assert_eq!(pending.state(), RefundState::PendingReview);

    // Switching to auto mode affects new requests only.
    active
        .apply(PolicyDraft {
            approval_mode: ApprovalMode::Auto,
            ..active.snapshot().to_draft()
        })
        .unwrap();
    let auto = book
        .submit(request("R202", 650, RefundType::Full), &active.snapshot())
        .unwrap();
    assert_eq!(auto.state(), RefundState::Approved);
    assert_eq!(book.get(pending.id()).unwrap().state(), RefundState::PendingReview);

    let withdrawn = book
        .withdraw(pending.id(), ActorId::new("rahul").unwrap())
        .unwrap();
    assert_eq!(withdrawn.state(), RefundState::Withdrawn);

    clock.advance(TimeDelta::hours(1));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(book.get(pending.id()).unwrap().state(), RefundState::Withdrawn);
    assert_eq!(clock.now(), requested_at() + TimeDelta::hours(1));

    sweeper.shutdown().await;

    let restored = ActivePolicy::default();
    restored.restore_from(&store).await.unwrap();
    assert_eq!(restored.snapshot().approval_mode(), ApprovalMode::Hybrid);
}
