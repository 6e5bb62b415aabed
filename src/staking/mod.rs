// src/staking/mod.rs
//! Stake position lifecycle and reward accrual

mod engine;
mod types;

pub use engine::StakingEngine;
pub use types::*;
