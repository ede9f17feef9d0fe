use anyhow::{Context, Result};
use clap::Parser;
use sparkify_etl::config::{AppConfig, CliConfig, FileConfig};
use sparkify_etl::pipeline::{process_data, DataKind, LoadSummary};
use sparkify_etl::store::SqliteStarSchemaStore;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sparkify-etl")]
#[command(about = "Load song and log data into the Sparkify star schema")]
struct CliArgs {
    /// Path to the SQLite database file. Created with the star schema if empty.
    #[clap(long = "db")]
    pub db_path: Option<PathBuf>,

    /// Directory holding the song-data files.
    #[clap(long)]
    pub song_data: Option<PathBuf>,

    /// Directory holding the event-log files.
    #[clap(long)]
    pub log_data: Option<PathBuf>,

    /// Extension of the data files.
    #[clap(long = "extension")]
    pub file_extension: Option<String>,

    /// Optional TOML config file. Its values override the command line.
    #[clap(long)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            song_data: self.song_data.clone(),
            log_data: self.log_data.clone(),
            file_extension: self.file_extension.clone(),
        }
    }
}

fn report(summary: &LoadSummary) {
    match summary {
        LoadSummary::Song(song) => {
            let skipped = song.artists.skipped.len() + song.songs.skipped.len();
            if song.dropped.total() > 0 || skipped > 0 {
                warn!(
                    "Song data: dropped {}, {} rows skipped",
                    song.dropped, skipped
                );
            }
        }
        LoadSummary::Log(log) => {
            let skipped =
                log.time.skipped.len() + log.users.skipped.len() + log.songplays.skipped.len();
            if log.dropped.total() > 0 || skipped > 0 {
                warn!("Log data: dropped {}, {} rows skipped", log.dropped, skipped);
            }
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

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

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening SQLite database at {:?}...", config.db_path);
    let store = SqliteStarSchemaStore::open(&config.db_path)?;

    info!("Processing song data in {:?}...", config.song_data);
    let songs = process_data(
        &store,
        &config.song_data,
        &config.file_extension,
        DataKind::Song,
    )?;
    report(&songs);

    info!("Processing log data in {:?}...", config.log_data);
    let logs = process_data(
        &store,
        &config.log_data,
        &config.file_extension,
        DataKind::Log,
    )?;
    report(&logs);

    let counts = store.table_counts()?;
    info!("");
    info!("Load Summary");
    info!("============");
    info!("  {} songs", counts.songs);
    info!("  {} artists", counts.artists);
    info!("  {} users", counts.users);
    info!("  {} time rows", counts.time);
    info!("  {} songplays", counts.songplay);

    Ok(())
}
