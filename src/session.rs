// src/session.rs
//! A connected wallet, its cached stake list and the timer that keeps it fresh

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use crate::refresh::{RefreshKind, RefreshScheduler};
use crate::staking::{StakePosition, StakingEngine, StakingError, WalletTotals};

pub struct WalletSession {
    engine: Arc<StakingEngine>,
    scheduler: RefreshScheduler,
    owner: Option<String>,
    stakes: Arc<RwLock<Vec<StakePosition>>>,
    refresh_period: Duration,
}

impl WalletSession {
    pub fn new(engine: Arc<StakingEngine>) -> Self {
        Self::with_refresh_period(engine, RefreshKind::Stakes.default_period())
    }

    pub fn with_refresh_period(engine: Arc<StakingEngine>, refresh_period: Duration) -> Self {
        Self {
            engine,
            scheduler: RefreshScheduler::new(),
            owner: None,
            stakes: Arc::new(RwLock::new(Vec::new())),
            refresh_period,
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.owner.is_some()
    }

    /// Snapshot of the connected wallet's active stakes. May lag the store
    /// by up to one refresh period.
    pub fn stakes(&self) -> Vec<StakePosition> {
        self.stakes.read().clone()
    }

    pub fn totals(&self) -> WalletTotals {
        WalletTotals::from_positions(&self.stakes.read(), self.engine.clock().now())
    }

    /// Attach `owner`, load its stakes and start the periodic refresh.
    /// Connecting while another wallet is attached disconnects it first.
    pub async fn connect(&mut self, owner: &str) -> Result<(), StakingError> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(StakingError::NotConnected);
        }
        if self.owner.is_some() {
            self.disconnect();
        }

        let positions = self.engine.list_active_stakes(owner).await?;
        log::info!("🔗 Wallet {} connected with {} active stakes", owner, positions.len());
        *self.stakes.write() = positions;
        self.owner = Some(owner.to_string());

        let engine = self.engine.clone();
        let stakes = self.stakes.clone();
        let key = owner.to_string();
        self.scheduler
            .schedule(RefreshKind::Stakes, owner, self.refresh_period, move || {
                let engine = engine.clone();
                let stakes = stakes.clone();
                let owner = key.clone();
                async move {
                    match engine.list_active_stakes(&owner).await {
                        Ok(positions) => *stakes.write() = positions,
                        Err(e) => log::warn!("⚠️ Stake refresh failed for {}: {}", owner, e),
                    }
                }
            });
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(owner) = self.owner.take() {
            let cancelled = self.scheduler.cancel_owner(&owner);
            self.stakes.write().clear();
            log::info!("🔌 Wallet {} disconnected, {} refresh tasks stopped", owner, cancelled);
        }
    }

    pub async fn stake(&self, amount: f64, lock_days: u32) -> Result<String, StakingError> {
        let owner = self.owner.as_deref().ok_or(StakingError::NotConnected)?;
        let id = self.engine.stake_for_duration(owner, amount, lock_days).await?;
        self.reload(owner).await;
        Ok(id)
    }

    pub async fn unstake(&self, stake_id: &str) -> Result<(), StakingError> {
        let owner = self.owner.as_deref().ok_or(StakingError::NotConnected)?;
        self.engine.unstake(owner, stake_id).await?;
        self.reload(owner).await;
        Ok(())
    }

    async fn reload(&self, owner: &str) {
        match self.engine.list_active_stakes(owner).await {
            Ok(positions) => *self.stakes.write() = positions,
            Err(e) => log::warn!("⚠️ Could not reload stakes for {}: {}", owner, e),
        }
    }
}
