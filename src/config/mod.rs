pub mod tiers;

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

pub use tiers::{all_tiers, tier_for_days, tier_for_rating, Rating, RatingTier, DAILY_REWARD_RATE};

/// Remote (Supabase/PostgREST) store credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. https://xyz.supabase.co
    pub url: String,
    /// Anonymous API key
    pub anon_key: String,
}

impl SupabaseConfig {
    /// Load Supabase credentials from environment variables
    pub fn from_env() -> Self {
        Self {
            url: env_with_fallback("SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"),
            anon_key: env_with_fallback("SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"),
        }
    }

    /// Remote store is only used when both URL and key are present
    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase: SupabaseConfig,
    /// Directory holding the per-wallet fallback files
    pub storage_dir: PathBuf,
    pub bind_addr: SocketAddr,
    /// Bearer secret for the distribution trigger. Unset means every trigger is rejected.
    pub cron_secret: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let storage_dir = std::env::var("BOND_STORAGE_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_storage_dir);

        let bind_addr = std::env::var("BIND_ADDR")
            .ok()
            .and_then(|addr| match addr.parse() {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    log::warn!("⚠️ Ignoring invalid BIND_ADDR {}: {}", addr, e);
                    None
                }
            })
            .unwrap_or_else(default_bind_addr);

        Self {
            supabase: SupabaseConfig::from_env(),
            storage_dir,
            bind_addr,
            cron_secret: std::env::var("CRON_SECRET")
                .ok()
                .filter(|secret| !secret.is_empty()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase: SupabaseConfig::default(),
            storage_dir: default_storage_dir(),
            bind_addr: default_bind_addr(),
            cron_secret: None,
        }
    }
}

fn env_with_fallback(primary: &str, fallback: &str) -> String {
    std::env::var(primary)
        .or_else(|_| std::env::var(fallback))
        .unwrap_or_default()
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

/// `$HOME/.bond_staking`, or `./.bond_staking` when no home directory is set
pub fn default_storage_dir() -> PathBuf {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home_dir).join(".bond_staking")
}
