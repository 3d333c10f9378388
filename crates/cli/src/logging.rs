//! Session logging. The terminal belongs to the operator, so events go to a
//! dated file under `logging.directory` instead of stdout.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use tracing::Level;

use mmi_core::config::{LogFormat, LoggingConfig};

pub fn log_file_path(directory: &Path, today: NaiveDate) -> PathBuf {
    directory.join(format!("mmi-{}.log", today.format("%Y-%m-%d")))
}

pub fn open_log_file(directory: &Path, today: NaiveDate) -> Result<(PathBuf, File)> {
    fs::create_dir_all(directory)
        .with_context(|| format!("cannot create log directory `{}`", directory.display()))?;
    let path = log_file_path(directory, today);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file `{}`", path.display()))?;
    Ok((path, file))
}

/// Installs the global subscriber and returns the file it writes to.
pub fn init(config: &LoggingConfig, today: NaiveDate) -> Result<PathBuf> {
    let log_level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let (path, file) = open_log_file(&config.directory, today)?;
    let writer = Mutex::new(file);

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_max_level(log_level)
        .with_writer(writer);
    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow!("cannot install log subscriber: {error}"))?;

    Ok(path)
}
