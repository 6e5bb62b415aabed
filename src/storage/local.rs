// src/storage/local.rs
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::staking::StakePosition;
use crate::storage::{StakeStore, StoreError};

const STORAGE_KEY: &str = "bond_stakes";

/// One JSON file per wallet holding that wallet's full position list.
///
/// File names are sanitized, so two owners can map to the same file; every
/// read filters by the exact owner. Claimed positions are dropped the next
/// time the file is loaded. Concurrent writers to the same wallet are not
/// coordinated: last write wins.
pub struct LocalStakeStore {
    dir: PathBuf,
}

impl LocalStakeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn wallet_file(&self, owner: &str) -> PathBuf {
        let key: String = owner
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}_{}.json", STORAGE_KEY, key))
    }

    /// Load every position in the owner's file, pruning claimed ones from disk
    async fn load(&self, owner: &str) -> Result<Vec<StakePosition>, StoreError> {
        let wallet_file = self.wallet_file(owner);

        let data = match fs::read_to_string(&wallet_file).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                log::error!("❌ Failed to read stakes from {}: {}", wallet_file.display(), e);
                return Err(e.into());
            }
        };

        let stored: Vec<StakePosition> = match serde_json::from_str(&data) {
            Ok(stored) => stored,
            Err(e) => {
                log::error!("❌ Failed to parse stakes from {}: {}", wallet_file.display(), e);
                return Ok(Vec::new());
            }
        };

        let stored_count = stored.len();
        let active: Vec<StakePosition> = stored.into_iter().filter(|p| !p.claimed).collect();
        if active.len() != stored_count {
            log::debug!(
                "Pruning {} claimed stakes from {}",
                stored_count - active.len(),
                wallet_file.display()
            );
            self.save(owner, &active).await?;
        }

        Ok(active)
    }

    async fn save(&self, owner: &str, positions: &[StakePosition]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            log::error!("❌ Failed to create storage directory {}: {}", self.dir.display(), e);
            e
        })?;

        let wallet_file = self.wallet_file(owner);
        let serialized = serde_json::to_string_pretty(positions)?;
        fs::write(&wallet_file, serialized).await.map_err(|e| {
            log::error!("❌ Failed to write stakes to {}: {}", wallet_file.display(), e);
            e
        })?;
        log::debug!("Saved {} stakes to {}", positions.len(), wallet_file.display());
        Ok(())
    }
}

#[async_trait]
impl StakeStore for LocalStakeStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn insert(&self, position: &StakePosition) -> Result<StakePosition, StoreError> {
        let mut positions = self.load(&position.owner).await?;
        positions.push(position.clone());
        self.save(&position.owner, &positions).await?;
        Ok(position.clone())
    }

    async fn update_claimed(&self, position: &StakePosition) -> Result<(), StoreError> {
        let mut positions = self.load(&position.owner).await?;
        match positions
            .iter_mut()
            .find(|p| p.id == position.id && p.owner == position.owner)
        {
            Some(stored) => stored.claimed = true,
            None => {
                // Position came from the remote store; record the claim so it is honored here too
                let mut claimed = position.clone();
                claimed.claimed = true;
                positions.push(claimed);
            }
        }
        self.save(&position.owner, &positions).await
    }

    async fn select_active(&self, owner: &str) -> Result<Vec<StakePosition>, StoreError> {
        let mut positions = self.load(owner).await?;
        positions.retain(|p| p.owner == owner);
        Ok(positions)
    }
}
