mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_SONG_DATA: &str = "data/song_data";
pub const DEFAULT_LOG_DATA: &str = "data/log_data";
pub const DEFAULT_FILE_EXTENSION: &str = "json";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub song_data: Option<PathBuf>,
    pub log_data: Option<PathBuf>,
    pub file_extension: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub file_extension: String,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = resolve_db_path(cli.db_path.as_deref(), file.db_path.as_deref())?;

        let song_data = file
            .song_data
            .map(PathBuf::from)
            .or_else(|| cli.song_data.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SONG_DATA));
        validate_data_dir("song_data", &song_data)?;

        let log_data = file
            .log_data
            .map(PathBuf::from)
            .or_else(|| cli.log_data.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DATA));
        validate_data_dir("log_data", &log_data)?;

        let file_extension = file
            .file_extension
            .or_else(|| cli.file_extension.clone())
            .map(|ext| ext.trim_start_matches('.').to_string())
            .unwrap_or_else(|| DEFAULT_FILE_EXTENSION.to_string());
        if file_extension.is_empty() {
            bail!("file_extension must not be empty");
        }

        Ok(Self {
            db_path,
            song_data,
            log_data,
            file_extension,
        })
    }
}

/// Resolves only the database path, for tools that do not read any data.
/// The TOML value overrides the CLI one.
pub fn resolve_db_path(cli_db_path: Option<&Path>, file_db_path: Option<&str>) -> Result<PathBuf> {
    let db_path = file_db_path
        .map(PathBuf::from)
        .or_else(|| cli_db_path.map(Path::to_path_buf))
        .ok_or_else(|| anyhow::anyhow!("db_path must be specified via --db or in config file"))?;

    // A bare file name lives in the working directory.
    let parent = match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        bail!("Database directory does not exist: {:?}", parent);
    }
    if db_path.is_dir() {
        bail!("db_path is a directory: {:?}", db_path);
    }
    Ok(db_path)
}

fn validate_data_dir(name: &str, dir: &Path) -> Result<()> {
    if !dir.exists() {
        bail!("{} directory does not exist: {:?}", name, dir);
    }
    if !dir.is_dir() {
        bail!("{} is not a directory: {:?}", name, dir);
    }
    Ok(())
}
