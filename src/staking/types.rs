// src/staking/types.rs
//! Stake position model and derived wallet totals

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Rating, DAILY_REWARD_RATE};
use crate::storage::StoreError;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One locked stake. Only `claimed` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakePosition {
    pub id: String,
    pub owner: String,
    pub amount: f64,
    pub tier: Rating,
    /// Snapshot of the tier multiplier at creation time
    pub multiplier: f64,
    pub lock_days: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub unlock_time: DateTime<Utc>,
    pub claimed: bool,
}

impl StakePosition {
    /// Build a fresh, unclaimed position starting at `start_time`
    pub fn new(
        owner: &str,
        amount: f64,
        tier: Rating,
        multiplier: f64,
        lock_days: u32,
        start_time: DateTime<Utc>,
    ) -> Self {
        // Stored timestamps carry millisecond precision
        let start_time =
            DateTime::from_timestamp_millis(start_time.timestamp_millis()).unwrap_or(start_time);
        Self {
            id: generate_stake_id(start_time),
            owner: owner.to_string(),
            amount,
            tier,
            multiplier,
            lock_days,
            start_time,
            unlock_time: start_time + Duration::days(i64::from(lock_days)),
            claimed: false,
        }
    }

    /// Amount scaled by the tier multiplier, used for reward-share display
    pub fn weighted_amount(&self) -> f64 {
        self.amount * self.multiplier
    }

    pub fn is_unlocked(&self, now: DateTime<Utc>) -> bool {
        now >= self.unlock_time
    }

    /// Fractional days since the stake started, never negative
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> f64 {
        let elapsed_ms = (now - self.start_time).num_milliseconds().max(0);
        elapsed_ms as f64 / MILLIS_PER_DAY
    }

    /// Estimated reward accrued by `now`.
    ///
    /// This is a display estimate. It keeps growing after `unlock_time` and is not
    /// capped, so an expired lock keeps "earning" until the position is unstaked.
    pub fn reward_at(&self, now: DateTime<Utc>) -> f64 {
        if self.claimed {
            return 0.0;
        }
        self.amount * DAILY_REWARD_RATE * self.elapsed_days(now) * self.multiplier
    }
}

/// `stake_{unix_ms}_{9 random base36 chars}`
fn generate_stake_id(at: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("stake_{}_{}", at.timestamp_millis(), suffix)
}

/// Rollup over a wallet's active positions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTotals {
    pub total_staked: f64,
    pub total_reward: f64,
    pub total_weighted: f64,
    pub active_count: usize,
}

impl WalletTotals {
    pub fn from_positions(positions: &[StakePosition], now: DateTime<Utc>) -> Self {
        positions
            .iter()
            .filter(|position| !position.claimed)
            .fold(Self::default(), |mut totals, position| {
                totals.total_staked += position.amount;
                totals.total_reward += position.reward_at(now);
                totals.total_weighted += position.weighted_amount();
                totals.active_count += 1;
                totals
            })
    }
}

#[derive(Debug, Error)]
pub enum StakingError {
    #[error("Wallet not connected")]
    NotConnected,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid lock duration: {0} days")]
    InvalidDuration(u32),
    #[error("Tier {tier} with multiplier {multiplier} does not match a {days}-day lock")]
    TierMismatch {
        tier: Rating,
        multiplier: f64,
        days: u32,
    },
    #[error("Stake not found: {0}")]
    NotFound(String),
    #[error("Stake is still locked until {0}")]
    StillLocked(DateTime<Utc>),
    #[error("Persistence error: {0}")]
    Persistence(#[source] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(amount: f64, multiplier: f64, lock_days: u32) -> (StakePosition, DateTime<Utc>) {
        let start = Utc::now();
        let p = StakePosition::new("wallet", amount, Rating::BBB, multiplier, lock_days, start);
        (p, start)
    }

    #[test]
    fn test_new_position_fields() {
        let (p, start) = position(1000.0, 1.5, 30);
        assert!(p.id.starts_with("stake_"));
        assert_eq!(p.id.rsplit('_').next().unwrap().len(), 9);
        assert_eq!(p.unlock_time - p.start_time, Duration::days(30));
        assert!(p.unlock_time > p.start_time);
        assert_eq!(p.start_time.timestamp_millis(), start.timestamp_millis());
        assert!(!p.claimed);
    }

    #[test]
    fn test_ids_are_unique() {
        let at = Utc::now();
        let a = StakePosition::new("w", 1.0, Rating::B, 1.0, 7, at);
        let b = StakePosition::new("w", 1.0, Rating::B, 1.0, 7, at);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_reward_after_ten_days() {
        let (p, start) = position(1000.0, 1.5, 30);
        let reward = p.reward_at(start + Duration::days(10));
        assert!((reward - 15.0).abs() < 1e-9, "got {}", reward);
    }

    #[test]
    fn test_reward_is_fractional() {
        let (p, start) = position(1000.0, 1.0, 7);
        let reward = p.reward_at(start + Duration::hours(12));
        assert!((reward - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_reward_monotonic_and_uncapped() {
        let (p, start) = position(250.0, 2.0, 60);
        let mut last = 0.0;
        for day in [0, 1, 5, 30, 60, 61, 365] {
            let reward = p.reward_at(start + Duration::days(day));
            assert!(reward >= last);
            last = reward;
        }
        // Accrual continues past unlock
        assert!(p.reward_at(start + Duration::days(120)) > p.reward_at(start + Duration::days(60)));
    }

    #[test]
    fn test_reward_never_negative_before_start() {
        let (p, start) = position(100.0, 1.0, 7);
        assert_eq!(p.reward_at(start - Duration::days(1)), 0.0);
    }

    #[test]
    fn test_claimed_position_earns_nothing() {
        let (mut p, start) = position(1000.0, 1.5, 30);
        p.claimed = true;
        assert_eq!(p.reward_at(start + Duration::days(40)), 0.0);
    }

    #[test]
    fn test_weighted_amount() {
        let (p, _) = position(1000.0, 1.5, 30);
        assert_eq!(p.weighted_amount(), 1500.0);
    }

    #[test]
    fn test_totals_skip_claimed() {
        let start = Utc::now();
        let a = StakePosition::new("w", 500.0, Rating::B, 1.0, 7, start);
        let b = StakePosition::new("w", 2000.0, Rating::AA, 2.5, 90, start);
        let mut c = StakePosition::new("w", 999.0, Rating::B, 1.0, 7, start);
        c.claimed = true;

        let now = start + Duration::days(3);
        let totals = WalletTotals::from_positions(&[a.clone(), b.clone(), c], now);
        assert_eq!(totals.total_staked, 2500.0);
        assert_eq!(totals.active_count, 2);
        assert_eq!(totals.total_weighted, 500.0 + 5000.0);
        assert!((totals.total_reward - (a.reward_at(now) + b.reward_at(now))).abs() < 1e-9);
    }

    #[test]
    fn test_local_serialization_uses_millis() {
        let (p, _) = position(10.0, 1.5, 30);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["startTime"].as_i64().unwrap(), p.start_time.timestamp_millis());
        assert_eq!(json["lockDays"].as_u64().unwrap(), 30);
        assert_eq!(json["tier"], "BBB");
    }
}
