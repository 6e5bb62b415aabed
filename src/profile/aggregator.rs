// src/profile/aggregator.rs
use async_trait::async_trait;
use std::sync::Arc;

use crate::profile::types::{ProfileAggregate, ProfileError};
use crate::storage::StoreError;
use crate::supabase::{PayoutRecord, StakeRecord, SupabaseClient, UserRecord};

/// Number of payouts included in a profile
pub const PAYOUT_HISTORY_LIMIT: usize = 50;

/// Where profile data comes from. Read-only.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_user(&self, wallet: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn fetch_active_stakes(&self, wallet: &str) -> Result<Vec<StakeRecord>, StoreError>;
    async fn fetch_payouts(&self, wallet: &str, limit: usize) -> Result<Vec<PayoutRecord>, StoreError>;
}

#[async_trait]
impl ProfileSource for SupabaseClient {
    async fn fetch_user(&self, wallet: &str) -> Result<Option<UserRecord>, StoreError> {
        self.select_user(wallet).await
    }

    async fn fetch_active_stakes(&self, wallet: &str) -> Result<Vec<StakeRecord>, StoreError> {
        self.select_active_stakes(wallet).await
    }

    async fn fetch_payouts(&self, wallet: &str, limit: usize) -> Result<Vec<PayoutRecord>, StoreError> {
        self.select_payouts(wallet, limit).await
    }
}

/// A wallet address is the base58 encoding of a 32-byte public key
pub fn is_valid_wallet_address(wallet: &str) -> bool {
    matches!(bs58::decode(wallet).into_vec(), Ok(bytes) if bytes.len() == 32)
}

pub struct ProfileAggregator {
    source: Option<Arc<dyn ProfileSource>>,
}

impl ProfileAggregator {
    /// Without a source every profile is empty
    pub fn new(source: Option<Arc<dyn ProfileSource>>) -> Self {
        Self { source }
    }

    pub async fn profile(&self, wallet: &str) -> Result<ProfileAggregate, ProfileError> {
        if !is_valid_wallet_address(wallet) {
            return Err(ProfileError::InvalidWallet(wallet.to_string()));
        }

        let Some(source) = &self.source else {
            return Ok(ProfileAggregate::empty(wallet));
        };

        let user = source.fetch_user(wallet).await.map_err(|e| {
            log::error!("❌ Error fetching user {}: {}", wallet, e);
            e
        })?;

        // Stakes and payouts are decoration; a failure there leaves the list empty
        let active_stakes = source.fetch_active_stakes(wallet).await.unwrap_or_else(|e| {
            log::error!("❌ Error fetching stakes for {}: {}", wallet, e);
            Vec::new()
        });
        let payout_history = source
            .fetch_payouts(wallet, PAYOUT_HISTORY_LIMIT)
            .await
            .unwrap_or_else(|e| {
                log::error!("❌ Error fetching payouts for {}: {}", wallet, e);
                Vec::new()
            });

        let mut profile = ProfileAggregate::empty(wallet);
        if let Some(user) = user {
            profile.total_earned = user.total_earned_sol;
            profile.total_staked = user.total_staked;
            profile.created_at = user.created_at;
        }
        profile.active_stakes = active_stakes;
        profile.payout_history = payout_history;
        Ok(profile)
    }
}
