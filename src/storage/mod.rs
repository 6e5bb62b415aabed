// src/storage/mod.rs
//! Stake persistence: a remote relational store with a local per-wallet fallback.

mod fallback;
mod local;
mod remote;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::staking::StakePosition;
use crate::supabase::SupabaseClient;

pub use fallback::FallbackStore;
pub use local::LocalStakeStore;
pub use remote::RemoteStakeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Remote store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Stake not found: {0}")]
    NotFound(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    /// The write was accepted but its result could not be read back
    #[error("Write accepted but unconfirmed: {0}")]
    Unconfirmed(String),
    #[error("Primary store failed ({primary}) and fallback failed ({fallback})")]
    Exhausted {
        primary: Box<StoreError>,
        fallback: Box<StoreError>,
    },
}

/// Storage backend for stake positions, keyed by wallet address
#[async_trait]
pub trait StakeStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Persist a new position and return it as stored. The backend may assign a new id.
    async fn insert(&self, position: &StakePosition) -> Result<StakePosition, StoreError>;

    /// Mark a position as claimed
    async fn update_claimed(&self, position: &StakePosition) -> Result<(), StoreError>;

    /// Unclaimed positions for `owner`, in backend order
    async fn select_active(&self, owner: &str) -> Result<Vec<StakePosition>, StoreError>;
}

/// Build the process-wide store: remote first when configured, local files always
pub fn build_stake_store(config: &AppConfig) -> Arc<dyn StakeStore> {
    let local: Arc<dyn StakeStore> = Arc::new(LocalStakeStore::new(&config.storage_dir));

    let primary: Option<Arc<dyn StakeStore>> = if config.supabase.is_enabled() {
        log::info!("✅ Remote stake store enabled: {}", config.supabase.url);
        let client = Arc::new(SupabaseClient::new(&config.supabase));
        Some(Arc::new(RemoteStakeStore::new(client)))
    } else {
        log::info!(
            "ℹ️ Remote stake store not configured, using local files in {}",
            config.storage_dir.display()
        );
        None
    };

    Arc::new(FallbackStore::new(primary, local))
}
