//! Settings persistence collaborators.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{PolicyError, PolicyResult};
use crate::policy::{Policy, PolicyDraft};

/// Trait implemented by settings backends that persist the active policy.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Persists a validated policy.
    async fn save(&self, policy: &Policy) -> PolicyResult<()>;

    /// Loads the last persisted policy as a draft, if any was saved.
    ///
    /// The result is a draft because stored settings may predate the current
    /// validation rules; callers validate it before use.
    async fn load(&self) -> PolicyResult<Option<PolicyDraft>>;
}

/// Settings store holding the serialized policy in memory.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    document: RwLock<Option<String>>,
}

impl InMemorySettingsStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with a raw JSON document.
    #[must_use]
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: RwLock::new(Some(document.into())),
        }
    }

    /// Returns the raw stored document.
    pub async fn document(&self) -> Option<String> {
        self.document.read().await.clone()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn save(&self, policy: &Policy) -> PolicyResult<()> {
        let document =
            serde_json::to_string(policy).map_err(|err| PolicyError::backend(err.to_string()))?;
        *self.document.write().await = Some(document);
        Ok(())
    }

    async fn load(&self) -> PolicyResult<Option<PolicyDraft>> {
        let guard = self.document.read().await;
        guard
            .as_deref()
            .map(|document| {
                serde_json::from_str(document).map_err(|err| PolicyError::backend(err.to_string()))
            })
            .transpose()
    }
}
