use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, e.g. `PICKR_LOG=pickr=debug`.
pub const LOG_ENV: &str = "PICKR_LOG";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot open log file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("a global subscriber is already installed")]
    AlreadyInstalled,
}

pub fn open_log_file(path: &Path) -> Result<File, LogError> {
    let open = || -> std::io::Result<File> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    };

    open().map_err(|source| LogError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// The terminal belongs to the UI, so logs go to a file.
pub fn init_tracing(path: &Path, default_level: &str) -> Result<(), LogError> {
    let file = open_log_file(path)?;

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|_| LogError::AlreadyInstalled)
}
