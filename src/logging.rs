// Logging setup.
// The terminal belongs to the UI, so tracing output goes to a file.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use crate::config::Config;
use crate::error::Result;

/// Install the global tracing subscriber and a panic hook that logs instead of printing.
pub fn init(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.log_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(&config.log_filter);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .init();

    std::panic::set_hook(Box::new(|info| {
        tracing::error!(%info, "panic");
    }));

    Ok(())
}
