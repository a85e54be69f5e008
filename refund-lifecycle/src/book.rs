//! Case book owning every refund case and serialising their transitions.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use refund_policy::{NotificationSettings, Policy, RefundRequest};
use refund_primitives::{ActorId, RefundId};
use thiserror::Error;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::lifecycle::{self, LifecycleError, LifecycleResult, RefundCase, ReviewAction};
use crate::notify::{self, Notice};

/// Errors surfaced by the case book.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BookError {
    /// No case exists for the identifier.
    #[error("unknown refund {0}")]
    UnknownRefund(RefundId),
    /// A case with the same identifier was already submitted.
    #[error("refund {0} already submitted")]
    Duplicate(RefundId),
    /// The case was no longer in a state that allows the transition.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Result alias for case book operations.
pub type BookResult<T> = Result<T, BookError>;

#[derive(Debug)]
struct TrackedCase {
    case: RefundCase,
    reminded: bool,
}

/// In-memory owner of refund cases.
///
/// Every transition runs under the book's write lock and is applied only if the
/// case is still in a state that permits it, so when a reviewer, a withdrawal,
/// and the expiration sweep race for the same case exactly one of them wins.
/// Terminal cases stay in the book as history and are never modified again.
pub struct CaseBook {
    clock: Arc<dyn Clock>,
    cases: RwLock<HashMap<RefundId, TrackedCase>>,
}

impl fmt::Debug for CaseBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseBook")
            .field("clock", &"dyn Clock")
            .field("cases", &self.len())
            .finish()
    }
}

impl CaseBook {
    /// Creates an empty book reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            cases: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the book's clock.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Evaluates `request` against `policy` and stores the resulting case.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::Duplicate`] when the refund was already submitted;
    /// the stored case is left untouched.
    pub fn submit(&self, request: RefundRequest, policy: &Policy) -> BookResult<RefundCase> {
        let mut guard = self.cases.write().unwrap_or_else(PoisonError::into_inner);
        let entry = match guard.entry(request.id().clone()) {
            Entry::Occupied(occupied) => return Err(BookError::Duplicate(occupied.key().clone())),
            Entry::Vacant(vacant) => vacant,
        };

        let case = lifecycle::evaluate(request, policy, self.clock.now());
        info!(
            refund_id = %case.id(),
            state = ?case.state(),
            reason = ?case.decision_reason(),
            "refund submitted"
        );
        entry.insert(TrackedCase {
            case: case.clone(),
            reminded: false,
        });
        Ok(case)
    }

    /// Applies a reviewer's verdict.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::UnknownRefund`] for unknown ids and
    /// [`BookError::Lifecycle`] when the case is no longer pending.
    pub fn resolve(
        &self,
        id: &RefundId,
        action: ReviewAction,
        reviewer: ActorId,
    ) -> BookResult<RefundCase> {
        self.update(id, |case, now| lifecycle::resolve(case, action, reviewer, now))
            .inspect(|case| {
                info!(
                    refund_id = %id,
                    state = ?case.state(),
                    resolved_by = ?case.resolved_by(),
                    "refund resolved by reviewer"
                );
            })
    }

    /// Withdraws a pending refund on behalf of the requester.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::UnknownRefund`] for unknown ids and
    /// [`BookError::Lifecycle`] when the case is no longer pending.
    pub fn withdraw(&self, id: &RefundId, requester: ActorId) -> BookResult<RefundCase> {
        self.update(id, |case, now| lifecycle::withdraw(case, requester, now))
            .inspect(|_| info!(refund_id = %id, "refund withdrawn"))
    }

    /// Expires one case if its deadline has been reached.
    ///
    /// Returns `Ok(None)` when the case is not pending or not yet due.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::UnknownRefund`] for unknown ids.
    pub fn check_expiration(&self, id: &RefundId) -> BookResult<Option<RefundCase>> {
        let mut guard = self.cases.write().unwrap_or_else(PoisonError::into_inner);
        let tracked = guard
            .get_mut(id)
            .ok_or_else(|| BookError::UnknownRefund(id.clone()))?;
        let expired = expire(tracked, self.clock.now());
        Ok(expired)
    }

    /// Expires every pending case whose deadline has been reached.
    pub fn sweep_expired(&self) -> Vec<RefundCase> {
        let now = self.clock.now();
        let mut guard = self.cases.write().unwrap_or_else(PoisonError::into_inner);
        let expired: Vec<_> = guard
            .values_mut()
            .filter_map(|tracked| expire(tracked, now))
            .collect();
        if !expired.is_empty() {
            debug!(count = expired.len(), "expired pending refunds");
        }
        expired
    }

    /// Returns expiry reminders that have become due, at most once per case.
    pub fn due_reminders(&self, settings: &NotificationSettings) -> Vec<Notice> {
        let now = self.clock.now();
        let mut guard = self.cases.write().unwrap_or_else(PoisonError::into_inner);
        guard
            .values_mut()
            .filter(|tracked| !tracked.reminded)
            .filter_map(|tracked| {
                let notice = notify::expiry_notice(&tracked.case, settings, now)?;
                tracked.reminded = true;
                Some(notice)
            })
            .collect()
    }

    /// Returns a copy of the case, if known.
    #[must_use]
    pub fn get(&self, id: &RefundId) -> Option<RefundCase> {
        let guard = self.cases.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(id).map(|tracked| tracked.case.clone())
    }

    /// Returns cases awaiting review, soonest deadline first.
    #[must_use]
    pub fn pending(&self) -> Vec<RefundCase> {
        let mut pending = self.collect(|case| case.state().is_pending());
        pending.sort_by(|a, b| {
            a.review_deadline()
                .cmp(&b.review_deadline())
                .then_with(|| a.id().cmp(b.id()))
        });
        pending
    }

    /// Returns cases that left review, most recently updated first.
    #[must_use]
    pub fn history(&self) -> Vec<RefundCase> {
        let mut history = self.collect(|case| case.state().is_terminal());
        history.sort_by(|a, b| {
            b.updated_at()
                .cmp(&a.updated_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        history
    }

    /// Returns the number of cases held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when the book holds no cases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect(&self, keep: impl Fn(&RefundCase) -> bool) -> Vec<RefundCase> {
        let guard = self.cases.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .values()
            .map(|tracked| &tracked.case)
            .filter(|case| keep(case))
            .cloned()
            .collect()
    }

    fn update<F>(&self, id: &RefundId, transition: F) -> BookResult<RefundCase>
    where
        F: FnOnce(&RefundCase, DateTime<Utc>) -> LifecycleResult<RefundCase>,
    {
        let mut guard = self.cases.write().unwrap_or_else(PoisonError::into_inner);
        let tracked = guard
            .get_mut(id)
            .ok_or_else(|| BookError::UnknownRefund(id.clone()))?;
        let next = transition(&tracked.case, self.clock.now())?;
        tracked.case = next.clone();
        Ok(next)
    }
}

fn expire(tracked: &mut TrackedCase, now: DateTime<Utc>) -> Option<RefundCase> {
    let expired = lifecycle::check_expiration(&tracked.case, now)?;
    info!(
        refund_id = %expired.id(),
        state = ?expired.state(),
        "refund review timed out"
    );
    tracked.case = expired.clone();
    Some(expired)
}
