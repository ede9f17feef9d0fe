//! Schema Bootstrap Tool
//!
//! Drops the star schema tables of a database and creates them again, empty.

use anyhow::{Context, Result};
use clap::Parser;
use sparkify_etl::config::{resolve_db_path, FileConfig};
use sparkify_etl::store::SqliteStarSchemaStore;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "create-tables")]
#[command(about = "Drop and recreate the Sparkify star schema tables")]
struct Args {
    /// Path to the SQLite database file
    #[arg(long = "db")]
    db_path: Option<PathBuf>,

    /// Optional TOML config file; its db_path overrides --db
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let db_path = resolve_db_path(args.db_path.as_deref(), file_config.db_path.as_deref())?;

    info!("Bootstrapping star schema in {:?}...", db_path);
    let store = SqliteStarSchemaStore::bootstrap(&db_path)?;
    let counts = store.table_counts()?;
    info!(
        "Tables ready: songs={}, artists={}, users={}, time={}, songplay={}",
        counts.songs, counts.artists, counts.users, counts.time, counts.songplay
    );

    Ok(())
}
