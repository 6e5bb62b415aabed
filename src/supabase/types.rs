// src/supabase/types.rs
//! Row types for the `stakes`, `users` and `payouts` tables

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Rating;
use crate::staking::StakePosition;
use crate::storage::StoreError;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// A row of the `stakes` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub wallet_address: String,
    pub amount: f64,
    pub tier: String,
    pub multiplier: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub claimed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl StakeRecord {
    /// Row to insert for a new position. The database assigns `id` and `created_at`.
    pub fn from_position(position: &StakePosition) -> Self {
        Self {
            id: None,
            wallet_address: position.owner.clone(),
            amount: position.amount,
            tier: position.tier.to_string(),
            multiplier: position.multiplier,
            start_date: position.start_time,
            end_date: position.unlock_time,
            claimed: position.claimed,
            created_at: None,
        }
    }

    pub fn into_position(self) -> Result<StakePosition, StoreError> {
        let id = self
            .id
            .ok_or_else(|| StoreError::InvalidRecord("stake row without id".to_string()))?;
        let tier: Rating = self.tier.parse().map_err(StoreError::InvalidRecord)?;
        if self.end_date <= self.start_date {
            return Err(StoreError::InvalidRecord(format!(
                "stake {} ends before it starts",
                id
            )));
        }

        let span_ms = (self.end_date - self.start_date).num_milliseconds();
        let lock_days = (span_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;

        Ok(StakePosition {
            id: remote_stake_id(id),
            owner: self.wallet_address,
            amount: self.amount,
            tier,
            multiplier: self.multiplier,
            lock_days: u32::try_from(lock_days).map_err(|_| {
                StoreError::InvalidRecord(format!("stake {} has an oversized lock", id))
            })?,
            start_time: self.start_date,
            unlock_time: self.end_date,
            claimed: self.claimed,
        })
    }
}

/// Position ids for database rows are `stake_{row id}`
pub fn remote_stake_id(row_id: i64) -> String {
    format!("stake_{}", row_id)
}

/// Inverse of [`remote_stake_id`]. Locally generated ids do not parse.
pub fn parse_remote_stake_id(stake_id: &str) -> Option<i64> {
    stake_id.strip_prefix("stake_")?.parse().ok()
}

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub wallet_address: String,
    #[serde(default)]
    pub total_earned_sol: f64,
    #[serde(default)]
    pub total_staked: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutType {
    /// Paid for holding the token
    Hold,
    /// Paid for a locked stake
    Stake,
}

/// A row of the `payouts` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub wallet_address: String,
    pub amount_sol: f64,
    pub payout_type: PayoutType,
    pub multiplier: f64,
    #[serde(default)]
    pub created_at: Option<String>,
}
