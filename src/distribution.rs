// src/distribution.rs
//! Scheduled reward distribution trigger.
//!
//! Only the trigger exists. Gathering stakers, computing payouts and sending
//! SOL are not implemented; [`PendingDistributor`] accepts the run and reports it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
#[error("Distribution failed: {0}")]
pub struct DistributionError(pub String);

#[async_trait]
pub trait RewardDistributor: Send + Sync {
    async fn distribute(&self) -> Result<DistributionReport, DistributionError>;
}

/// Accepts every run without paying anything out
#[derive(Debug, Default)]
pub struct PendingDistributor;

#[async_trait]
impl RewardDistributor for PendingDistributor {
    async fn distribute(&self) -> Result<DistributionReport, DistributionError> {
        log::info!("🔄 Running daily reward distribution...");
        Ok(DistributionReport {
            success: true,
            message: "Rewards distributed".to_string(),
            timestamp: Utc::now(),
        })
    }
}
