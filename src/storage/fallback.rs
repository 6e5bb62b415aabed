// src/storage/fallback.rs
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::staking::StakePosition;
use crate::storage::{StakeStore, StoreError};

/// Tries the primary store first and repeats the same operation on the local
/// fallback when the primary fails. There is no reconciliation between the two:
/// writes that only reached the fallback stay there.
pub struct FallbackStore {
    primary: Option<Arc<dyn StakeStore>>,
    fallback: Arc<dyn StakeStore>,
}

impl FallbackStore {
    pub fn new(primary: Option<Arc<dyn StakeStore>>, fallback: Arc<dyn StakeStore>) -> Self {
        Self { primary, fallback }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    async fn run<'a, T, F, Fut>(&'a self, operation: &str, call: F) -> Result<T, StoreError>
    where
        F: Fn(&'a dyn StakeStore) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let Some(primary) = self.primary.as_deref() else {
            return call(self.fallback.as_ref()).await;
        };

        let primary_error = match call(primary).await {
            Ok(value) => return Ok(value),
            // A missing row is an answer, not an outage. An unconfirmed write
            // already landed on the primary and must not be duplicated locally.
            Err(e @ (StoreError::NotFound(_) | StoreError::Unconfirmed(_))) => return Err(e),
            Err(e) => e,
        };

        log::warn!(
            "⚠️ {} store failed during {}, using {} store: {}",
            primary.name(),
            operation,
            self.fallback.name(),
            primary_error
        );

        call(self.fallback.as_ref()).await.map_err(|fallback_error| {
            log::error!(
                "❌ {} failed on both stores: {} / {}",
                operation,
                primary_error,
                fallback_error
            );
            StoreError::Exhausted {
                primary: Box::new(primary_error),
                fallback: Box::new(fallback_error),
            }
        })
    }
}

#[async_trait]
impl StakeStore for FallbackStore {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn insert(&self, position: &StakePosition) -> Result<StakePosition, StoreError> {
        self.run("insert", |store| store.insert(position)).await
    }

    async fn update_claimed(&self, position: &StakePosition) -> Result<(), StoreError> {
        self.run("update_claimed", |store| store.update_claimed(position)).await
    }

    async fn select_active(&self, owner: &str) -> Result<Vec<StakePosition>, StoreError> {
        self.run("select_active", |store| store.select_active(owner)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rating;
    use crate::storage::LocalStakeStore;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WALLET: &str = "So11111111111111111111111111111111111111112";

    /// Store that fails every call the way an unreachable backend would
    #[derive(Default)]
    struct DownStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StakeStore for DownStore {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn insert(&self, _position: &StakePosition) -> Result<StakePosition, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Status { status: 503, body: "unavailable".to_string() })
        }

        async fn update_claimed(&self, _position: &StakePosition) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Status { status: 503, body: "unavailable".to_string() })
        }

        async fn select_active(&self, _owner: &str) -> Result<Vec<StakePosition>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Status { status: 503, body: "unavailable".to_string() })
        }
    }

    /// Store whose rows never exist
    struct EmptyStore;

    #[async_trait]
    impl StakeStore for EmptyStore {
        fn name(&self) -> &'static str {
            "empty"
        }

        async fn insert(&self, position: &StakePosition) -> Result<StakePosition, StoreError> {
            Ok(position.clone())
        }

        async fn update_claimed(&self, position: &StakePosition) -> Result<(), StoreError> {
            Err(StoreError::NotFound(position.id.clone()))
        }

        async fn select_active(&self, _owner: &str) -> Result<Vec<StakePosition>, StoreError> {
            Ok(Vec::new())
        }
    }

    /// Store that commits writes but loses the response
    struct LostReplyStore;

    #[async_trait]
    impl StakeStore for LostReplyStore {
        fn name(&self) -> &'static str {
            "lost-reply"
        }

        async fn insert(&self, _position: &StakePosition) -> Result<StakePosition, StoreError> {
            Err(StoreError::Unconfirmed("insert returned no rows".to_string()))
        }

        async fn update_claimed(&self, _position: &StakePosition) -> Result<(), StoreError> {
            Ok(())
        }

        async fn select_active(&self, _owner: &str) -> Result<Vec<StakePosition>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn position() -> StakePosition {
        StakePosition::new(WALLET, 1000.0, Rating::BBB, 1.5, 30, Utc::now())
    }

    #[tokio::test]
    async fn test_without_primary_uses_fallback_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = FallbackStore::new(None, Arc::new(LocalStakeStore::new(dir.path())));
        assert!(!store.has_primary());

        let stored = store.insert(&position()).await.unwrap();
        assert_eq!(store.select_active(WALLET).await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let down = Arc::new(DownStore::default());
        let store = FallbackStore::new(
            Some(down.clone() as Arc<dyn StakeStore>),
            Arc::new(LocalStakeStore::new(dir.path())),
        );

        let stored = store.insert(&position()).await.unwrap();
        let active = store.select_active(WALLET).await.unwrap();
        assert_eq!(active, vec![stored.clone()]);

        store.update_claimed(&stored).await.unwrap();
        assert!(store.select_active(WALLET).await.unwrap().is_empty());
        assert_eq!(down.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_both_down_is_exhausted() {
        let store = FallbackStore::new(
            Some(Arc::new(DownStore::default()) as Arc<dyn StakeStore>),
            Arc::new(DownStore::default()),
        );

        let err = store.insert(&position()).await.unwrap_err();
        assert!(matches!(err, StoreError::Exhausted { .. }));
    }

    #[tokio::test]
    async fn test_primary_not_found_is_not_retried() {
        let down = Arc::new(DownStore::default());
        let store = FallbackStore::new(
            Some(Arc::new(EmptyStore) as Arc<dyn StakeStore>),
            down.clone(),
        );

        let err = store.update_claimed(&position()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(down.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unconfirmed_insert_is_not_duplicated_locally() {
        let dir = tempfile::tempdir().unwrap();
        let local = Arc::new(LocalStakeStore::new(dir.path()));
        let store = FallbackStore::new(Some(Arc::new(LostReplyStore) as Arc<dyn StakeStore>), local.clone());

        let err = store.insert(&position()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unconfirmed(_)));
        assert!(local.select_active(WALLET).await.unwrap().is_empty());
    }
}
