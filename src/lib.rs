pub mod console;
pub mod factory;
pub mod gateways;
pub mod interaction;
pub mod models;
pub mod settings;
pub mod store;
mod utils;

#[cfg(test)]
mod test_utils;

use anyhow::{Context, Result};
use settings::SettingsStore;

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var, defaults to info)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Trailmark starting up...");

    let settings_path = SettingsStore::default_path();
    let settings = SettingsStore::load(settings_path.clone())
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(console::run_console(settings))
}
