use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install console and log-file output for the binaries.
///
/// `RUST_LOG` refines the filter; this crate logs at `info` by default. The
/// log file is appended to. If it cannot be opened, logging carries on with
/// the console only.
pub fn init(log_path: &Path) -> anyhow::Result<()> {
    let filter =
        EnvFilter::from_default_env().add_directive("spectra_addressbook=info".parse()?);

    let (file_layer, file_error) = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(file) => (
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(std::io::stdout),
        )
        .with(file_layer)
        .try_init()?;

    if let Some(e) = file_error {
        tracing::warn!("Log file {} unavailable: {}", log_path.display(), e);
    }

    Ok(())
}
