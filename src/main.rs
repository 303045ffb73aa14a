//! Rampweb main entry point

use anyhow::Context;
use rampweb_api::{start_server, AppState};
use rampweb_config::{Config, ConfigError};
use rampweb_core::{build_gateway, FileStore, TransactionsApp};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "rampweb")]
#[command(version = "0.1.0")]
#[command(about = "Review and approve employee card transactions", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

/// Load the config file; a missing file means defaults plus a warning to log
fn load_config(path: &Path) -> anyhow::Result<(Config, Option<String>)> {
    match Config::load(path) {
        Ok(config) => Ok((config, None)),
        Err(ConfigError::FileNotFound { path }) => {
            Ok((Config::default(), Some(format!("Config file {} not found, using defaults", path))))
        }
        Err(e) => {
            let details = e.to_details();
            Err(e).with_context(|| format!("Failed to load configuration from {}\n{}", path.display(), details))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let (config, warning) = load_config(&args.config)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();
    if let Some(warning) = warning {
        log::warn!("{}", warning);
    }
    log::info!(
        "Config loaded: gateway={}, storage={}",
        config.gateway.kind,
        config.storage.path.display()
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let gateway = build_gateway(&config.gateway)?;
        let store = FileStore::open(&config.storage.path)
            .with_context(|| format!("Failed to open storage file {}", config.storage.path.display()))?;
        log::info!("Approvals stored in {}", store.path().display());
        let store = Arc::new(store);
        let app = Arc::new(TransactionsApp::new(gateway.clone(), store, config.storage.approvals_key.clone()));

        match app.start().await {
            Ok(()) => log::info!("Initial load complete"),
            Err(e) => log::error!("Initial load failed: {}", e),
        }

        start_server(AppState { app, gateway, config }).await
    })
}
