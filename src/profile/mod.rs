// src/profile/mod.rs
//! Read-only wallet profile rollup

mod aggregator;
mod types;

pub use aggregator::{is_valid_wallet_address, ProfileAggregator, ProfileSource, PAYOUT_HISTORY_LIMIT};
pub use types::*;

#[cfg(test)]
pub(crate) use aggregator::tests as fixtures;
