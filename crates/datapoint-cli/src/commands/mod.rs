//! Subcommands and the setup they share.

pub mod create;
pub mod list;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use datapoint_core::config::ServiceConfig;
use datapoint_core::logging_facility;
use datapoint_engine::Engine;
use datapoint_store::SqliteRecordStore;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// SQLite database file (overrides `database_path` from configuration)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Load configuration, start logging and open the store.
pub fn engine(global: &GlobalArgs) -> Result<Engine, Box<dyn std::error::Error>> {
    let config = ServiceConfig::load(global.config.as_deref())?;
    logging_facility::init(config.log_profile);

    let db_path = global
        .db
        .clone()
        .unwrap_or_else(|| config.database_path.clone());
    let store = SqliteRecordStore::open(&db_path)?;

    Ok(Engine::from_config(&config, Arc::new(store)))
}

pub fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
