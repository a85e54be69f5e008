//! Holder for the merchant's current policy.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::error::PolicyResult;
use crate::integrations::SettingsStore;
use crate::policy::{Policy, PolicyDraft};

/// Current policy, replaced wholesale on every edit.
///
/// Evaluations take a [`snapshot`](Self::snapshot) and keep using it; a later
/// [`apply`](Self::apply) swaps the shared pointer but never touches a
/// snapshot already handed out.
#[derive(Debug)]
pub struct ActivePolicy {
    current: RwLock<Arc<Policy>>,
}

impl ActivePolicy {
    /// Creates a holder with the supplied policy.
    #[must_use]
    pub fn new(policy: Policy) -> Self {
        Self {
            current: RwLock::new(Arc::new(policy)),
        }
    }

    /// Returns the current policy snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Policy> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Validates `draft` and makes it the current policy.
    ///
    /// # Errors
    ///
    /// Returns the validation error and keeps the previous policy when the
    /// draft is invalid.
    pub fn apply(&self, draft: PolicyDraft) -> PolicyResult<Arc<Policy>> {
        let policy = Policy::validate(draft).inspect_err(|err| {
            warn!(%err, "rejected policy edit");
        })?;
        Ok(self.replace(policy))
    }

    /// Restores the default policy.
    pub fn reset_defaults(&self) -> Arc<Policy> {
        self.replace(Policy::default())
    }

    /// Persists the current snapshot.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub async fn save_to<S>(&self, store: &S) -> PolicyResult<()>
    where
        S: SettingsStore + ?Sized,
    {
        let snapshot = self.snapshot();
        store.save(&snapshot).await.inspect_err(|err| {
            warn!(%err, "failed to save refund settings");
        })
    }

    /// Loads, validates, and applies the stored policy.
    ///
    /// Returns `Ok(None)` and leaves the current policy untouched when the store
    /// holds nothing.
    ///
    /// # Errors
    ///
    /// Propagates store failures and validation errors of the stored draft.
    pub async fn restore_from<S>(&self, store: &S) -> PolicyResult<Option<Arc<Policy>>>
    where
        S: SettingsStore + ?Sized,
    {
        match store.load().await? {
            Some(draft) => self.apply(draft).map(Some),
            None => Ok(None),
        }
    }

    fn replace(&self, policy: Policy) -> Arc<Policy> {
        let policy = Arc::new(policy);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&policy);
        info!(
            mode = ?policy.approval_mode(),
            auto_approval_limit = %policy.auto_approval_limit(),
            review_minutes = policy.review_time_limit_minutes().get(),
            "refund policy updated"
        );
        policy
    }
}

impl Default for ActivePolicy {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::error::PolicyError;
    use crate::integrations::InMemorySettingsStore;
    use crate::policy::ApprovalMode;

    #[test]
    fn snapshots_survive_later_edits() {
        let active = ActivePolicy::default();
        let before = active.snapshot();

        active
            .apply(PolicyDraft {
                approval_mode: ApprovalMode::Manual,
                ..PolicyDraft::default()
            })
            .unwrap();

        assert_eq!(before.approval_mode(), ApprovalMode::Hybrid);
        assert_eq!(active.snapshot().approval_mode(), ApprovalMode::Manual);
    }

    #[test]
    fn invalid_edit_keeps_previous_policy() {
        let active = ActivePolicy::default();
        let err = active
            .apply(PolicyDraft {
                allowed_types: BTreeSet::new(),
                ..PolicyDraft::default()
            })
            .unwrap_err();

        assert_eq!(err, PolicyError::EmptyAllowedTypes);
        assert_eq!(*active.snapshot(), Policy::default());
    }

    #[test]
    fn reset_restores_defaults() {
        let active = ActivePolicy::default();
        active
            .apply(PolicyDraft {
                auto_approval_limit: 900,
                ..PolicyDraft::default()
            })
            .unwrap();
        active.reset_defaults();
        assert_eq!(*active.snapshot(), Policy::default());
    }

    #[tokio::test]
    async fn save_and_restore_through_store() {
        let store = InMemorySettingsStore::new();
        let active = ActivePolicy::default();
        assert!(active.restore_from(&store).await.unwrap().is_none());

        active
            .apply(PolicyDraft {
                approval_mode: ApprovalMode::Auto,
                ..PolicyDraft::default()
            })
            .unwrap();
        active.save_to(&store).await.unwrap();

        let fresh = ActivePolicy::default();
        let restored = fresh.restore_from(&store).await.unwrap().unwrap();
        assert_eq!(restored.approval_mode(), ApprovalMode::Auto);
        assert_eq!(fresh.snapshot().approval_mode(), ApprovalMode::Auto);
    }

    #[tokio::test]
    async fn invalid_stored_draft_is_not_applied() {
        let store = InMemorySettingsStore::with_document(
            r#"{"approval_mode":"auto","auto_approval_limit":-1,"allowed_types":["full"],
                "review_time_limit_minutes":30,"expiration_action":"auto_approve"}"#,
        );
        let active = ActivePolicy::default();
        let err = active.restore_from(&store).await.unwrap_err();
        assert!(matches!(err, PolicyError::InvalidThreshold(_)));
        assert_eq!(*active.snapshot(), Policy::default());
    }
}
