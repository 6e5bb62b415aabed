use env_logger::Env;
use std::error::Error;
use std::sync::Arc;

use bond_staking::config::AppConfig;
use bond_staking::distribution::PendingDistributor;
use bond_staking::profile::{ProfileAggregator, ProfileSource};
use bond_staking::server::{self, AppState};
use bond_staking::storage::build_stake_store;
use bond_staking::supabase::SupabaseClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    let store = build_stake_store(&config);
    log::info!("✅ Stake store ready ({})", store.name());

    let source: Option<Arc<dyn ProfileSource>> = if config.supabase.is_enabled() {
        Some(Arc::new(SupabaseClient::new(&config.supabase)))
    } else {
        log::warn!("⚠️ Supabase not configured, profiles will be empty");
        None
    };

    if config.cron_secret.is_none() {
        log::warn!("⚠️ CRON_SECRET not set, distribution trigger will reject every request");
    }

    let state = AppState::new(
        Arc::new(ProfileAggregator::new(source)),
        Arc::new(PendingDistributor),
        config.cron_secret.clone(),
    );

    server::serve(config.bind_addr, state).await?;
    Ok(())
}
