// src/profile/types.rs
use serde::Serialize;
use thiserror::Error;

use crate::storage::StoreError;
use crate::supabase::{PayoutRecord, StakeRecord};

/// Read-only summary of a wallet's history, as returned by the profile endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAggregate {
    pub wallet: String,
    pub total_earned: f64,
    /// As last reported by the backend, not recomputed from `active_stakes`
    pub total_staked: f64,
    pub active_stakes: Vec<StakeRecord>,
    /// Newest first
    pub payout_history: Vec<PayoutRecord>,
    pub created_at: Option<String>,
}

impl ProfileAggregate {
    pub fn empty(wallet: &str) -> Self {
        Self {
            wallet: wallet.to_string(),
            total_earned: 0.0,
            total_staked: 0.0,
            active_stakes: Vec::new(),
            payout_history: Vec::new(),
            created_at: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Invalid wallet address: {0}")]
    InvalidWallet(String),
    #[error("Failed to fetch profile: {0}")]
    Backend(#[from] StoreError),
}
