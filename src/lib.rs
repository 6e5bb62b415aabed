//! Bond staking bookkeeping: rating tiers, stake positions with a remote
//! store and local fallback, wallet profiles and the distribution trigger.

pub mod clock;
pub mod config;
pub mod distribution;
pub mod profile;
pub mod refresh;
pub mod server;
pub mod session;
pub mod staking;
pub mod storage;
pub mod supabase;
