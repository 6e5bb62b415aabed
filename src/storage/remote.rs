// src/storage/remote.rs
use async_trait::async_trait;
use std::sync::Arc;

use crate::staking::StakePosition;
use crate::storage::{StakeStore, StoreError};
use crate::supabase::{parse_remote_stake_id, StakeRecord, SupabaseClient};

/// Stakes kept in the remote `stakes` table
pub struct RemoteStakeStore {
    client: Arc<SupabaseClient>,
}

impl RemoteStakeStore {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    /// Best-effort refresh of the wallet's `users.total_staked` rollup
    async fn refresh_user_rollup(&self, owner: &str) {
        let total_staked = match self.client.select_active_stakes(owner).await {
            Ok(rows) => rows.iter().map(|row| row.amount).sum::<f64>(),
            Err(e) => {
                log::warn!("⚠️ Could not total stakes for {}: {}", owner, e);
                return;
            }
        };

        if let Err(e) = self.client.upsert_user_total_staked(owner, total_staked).await {
            log::warn!("⚠️ Failed to update user rollup for {}: {}", owner, e);
        }
    }
}

#[async_trait]
impl StakeStore for RemoteStakeStore {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn insert(&self, position: &StakePosition) -> Result<StakePosition, StoreError> {
        let stored = self
            .client
            .insert_stake(&StakeRecord::from_position(position))
            .await?
            .into_position()
            .map_err(|e| StoreError::Unconfirmed(e.to_string()))?;
        log::debug!("Remote insert assigned {} for {}", stored.id, stored.owner);

        self.refresh_user_rollup(&stored.owner).await;
        Ok(stored)
    }

    async fn update_claimed(&self, position: &StakePosition) -> Result<(), StoreError> {
        // Ids minted by the local store never name a remote row
        let row_id = parse_remote_stake_id(&position.id).ok_or_else(|| {
            StoreError::InvalidRecord(format!("{} is not a remote stake id", position.id))
        })?;

        let updated = self.client.mark_stake_claimed(row_id, &position.owner).await?;
        if updated.is_empty() {
            return Err(StoreError::NotFound(position.id.clone()));
        }

        self.refresh_user_rollup(&position.owner).await;
        Ok(())
    }

    async fn select_active(&self, owner: &str) -> Result<Vec<StakePosition>, StoreError> {
        let rows = self.client.select_active_stakes(owner).await?;
        let positions = rows
            .into_iter()
            .filter_map(|row| match row.into_position() {
                Ok(position) => Some(position),
                Err(e) => {
                    log::warn!("⚠️ Skipping unreadable stake row for {}: {}", owner, e);
                    None
                }
            })
            .filter(|position| !position.claimed)
            .collect();
        Ok(positions)
    }
}
