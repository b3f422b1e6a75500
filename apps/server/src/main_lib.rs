use std::sync::{Arc, Mutex};

use fairvalue_core::valuation::ValuationEngine;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{config::Config, store::RunStore};

pub struct AppState {
    pub engine: ValuationEngine,
    // The engine itself is freely shared; only the SQLite connection needs
    // serialized access.
    pub store: Mutex<RunStore>,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store = RunStore::open(&config.db_path)?;
    tracing::info!("Run store at {}", config.db_path);
    Ok(Arc::new(AppState {
        engine: ValuationEngine::new(),
        store: Mutex::new(store),
    }))
}
