// src/staking/engine.rs
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::{tier_for_days, Rating};
use crate::staking::types::{StakePosition, StakingError, WalletTotals};
use crate::storage::{StakeStore, StoreError};

/// Floating point slack when comparing a caller's multiplier with the rating table
const MULTIPLIER_TOLERANCE: f64 = 1e-9;

/// Creates, lists and closes stake positions on top of a [`StakeStore`]
pub struct StakingEngine {
    store: Arc<dyn StakeStore>,
    clock: Arc<dyn Clock>,
}

impl StakingEngine {
    pub fn new(store: Arc<dyn StakeStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Canonical wallet key. Every operation goes through this so reads and
    /// writes agree on the owner.
    fn owner_key(owner: &str) -> Result<&str, StakingError> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(StakingError::NotConnected);
        }
        Ok(owner)
    }

    /// Lock `amount` tokens for `lock_days` and return the new position id.
    ///
    /// `tier` and `multiplier` must match the rating table entry for `lock_days`;
    /// the multiplier is stored on the position and never looked up again.
    pub async fn create_stake(
        &self,
        owner: &str,
        amount: f64,
        tier: Rating,
        multiplier: f64,
        lock_days: u32,
    ) -> Result<String, StakingError> {
        let owner = Self::owner_key(owner)?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(StakingError::InvalidAmount(format!(
                "amount must be greater than zero, got {}",
                amount
            )));
        }

        let expected = tier_for_days(lock_days).ok_or(StakingError::InvalidDuration(lock_days))?;
        if expected.rating != tier || (expected.multiplier - multiplier).abs() > MULTIPLIER_TOLERANCE {
            return Err(StakingError::TierMismatch {
                tier,
                multiplier,
                days: lock_days,
            });
        }

        let position = StakePosition::new(owner, amount, tier, multiplier, lock_days, self.clock.now());
        let stored = self
            .store
            .insert(&position)
            .await
            .map_err(StakingError::Persistence)?;

        log::info!(
            "✅ Staked {} for {} days ({} x{}) as {}",
            amount,
            lock_days,
            tier,
            multiplier,
            stored.id
        );
        Ok(stored.id)
    }

    /// Stake using the rating table entry for `lock_days`
    pub async fn stake_for_duration(
        &self,
        owner: &str,
        amount: f64,
        lock_days: u32,
    ) -> Result<String, StakingError> {
        let tier = tier_for_days(lock_days).ok_or(StakingError::InvalidDuration(lock_days))?;
        self.create_stake(owner, amount, tier.rating, tier.multiplier, lock_days)
            .await
    }

    /// Close an unlocked position. Claimed or unknown ids are `NotFound`.
    pub async fn unstake(&self, owner: &str, stake_id: &str) -> Result<(), StakingError> {
        let owner = Self::owner_key(owner)?;

        let position = self
            .list_active_stakes(owner)
            .await?
            .into_iter()
            .find(|p| p.id == stake_id)
            .ok_or_else(|| StakingError::NotFound(stake_id.to_string()))?;

        let now = self.clock.now();
        if !position.is_unlocked(now) {
            return Err(StakingError::StillLocked(position.unlock_time));
        }

        self.store
            .update_claimed(&position)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(id) => StakingError::NotFound(id),
                other => StakingError::Persistence(other),
            })?;

        log::info!("✅ Unstaked {} ({} tokens) for {}", stake_id, position.amount, owner);
        Ok(())
    }

    /// Reward accrued so far by `position`. Zero once claimed.
    pub fn calculate_reward(&self, position: &StakePosition) -> f64 {
        position.reward_at(self.clock.now())
    }

    pub async fn list_active_stakes(&self, owner: &str) -> Result<Vec<StakePosition>, StakingError> {
        let owner = Self::owner_key(owner)?;
        let positions = self
            .store
            .select_active(owner)
            .await
            .map_err(StakingError::Persistence)?;
        Ok(positions
            .into_iter()
            .filter(|p| !p.claimed && p.owner == owner)
            .collect())
    }

    pub async fn totals(&self, owner: &str) -> Result<WalletTotals, StakingError> {
        let positions = self.list_active_stakes(owner).await?;
        Ok(WalletTotals::from_positions(&positions, self.clock.now()))
    }
}
