//! Log initialization.
//!
//! The terminal belongs to the UI, so logs go to a file or nowhere.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Send logs to `path`, appending.
///
/// `RUST_LOG` takes precedence over `default_level`. Only the first call
/// installs a subscriber; later calls are no-ops.
pub fn init_file_logging(path: &Path, default_level: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let default_level = default_level.to_string();
    INIT.call_once(move || {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        // try_init: an embedding application may already own the global subscriber
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .try_init();
    });
    Ok(())
}
