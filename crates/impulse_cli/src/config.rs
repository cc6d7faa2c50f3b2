//! Runtime configuration for the CLI.
//!
//! # Responsibility
//! - Resolve database path, log directory and log level.
//!
//! # Invariants
//! - Precedence is command-line flag, then environment, then platform default.
//! - Resolved paths are absolute.

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use impulse_core::default_log_level;
use std::path::{Path, PathBuf};

pub const DB_ENV: &str = "IMPULSE_CHECK_DB";
pub const LOG_DIR_ENV: &str = "IMPULSE_CHECK_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "IMPULSE_CHECK_LOG";

const DB_FILE_NAME: &str = "impulse_check.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub db: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Resolves configuration from flags, process environment and platform dirs.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let data_dir = ProjectDirs::from("", "", "impulse-check")
            .map(|dirs| dirs.data_dir().to_path_buf());
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        Self::resolve_with(overrides, |key| std::env::var(key).ok(), data_dir, &cwd)
    }

    fn resolve_with(
        overrides: Overrides,
        env: impl Fn(&str) -> Option<String>,
        data_dir: Option<PathBuf>,
        cwd: &Path,
    ) -> Result<Self> {
        let from_env = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        let default_dir = || {
            data_dir.clone().ok_or_else(|| {
                anyhow!("no home directory found; pass --db and --log-dir or set {DB_ENV}")
            })
        };

        let db_path = match overrides.db.or_else(|| from_env(DB_ENV).map(PathBuf::from)) {
            Some(path) => path,
            None => default_dir()?.join(DB_FILE_NAME),
        };
        let log_dir = match overrides
            .log_dir
            .or_else(|| from_env(LOG_DIR_ENV).map(PathBuf::from))
        {
            Some(path) => path,
            None => default_dir()?.join(LOG_DIR_NAME),
        };
        let log_level = overrides
            .log_level
            .or_else(|| from_env(LOG_LEVEL_ENV))
            .unwrap_or_else(|| default_log_level().to_string());

        Ok(Self {
            db_path: absolutize(cwd, db_path),
            log_dir: absolutize(cwd, log_dir),
            log_level,
        })
    }
}

fn absolutize(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
