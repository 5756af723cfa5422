use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use planner::catalog::{CatalogCache, HttpCatalogSource};
use planner::config::PlannerConfig;
use planner::db::PlanDbManager;
use planner::server::create_router;
use planner::types::PlannerState;

const CONFIG_ENV: &str = "PLANNER_CONFIG";

fn load_config() -> anyhow::Result<PlannerConfig> {
    match env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!("Loading configuration from {}", path.display());
            Ok(PlannerConfig::load(&path)?)
        }
        None => {
            info!("{} not set, using default configuration", CONFIG_ENV);
            let config = PlannerConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = load_config()?;

    std::fs::create_dir_all(&config.cache_dir)
        .with_context(|| format!("creating cache directory {}", config.cache_dir.display()))?;
    let source = HttpCatalogSource::new(&config.catalog)?;
    let catalog = CatalogCache::with_check_interval(&config.cache_dir, source, config.check_interval());
    let plans = PlanDbManager::open(&config.database_path)
        .with_context(|| format!("opening plan database {}", config.database_path.display()))?;

    let state = Arc::new(PlannerState::new(&config, catalog, plans));
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("binding {}", config.bind_address))?;
    info!("Planner listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
