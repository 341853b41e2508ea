//! Logging initialization.
//!
//! Both binaries log through the `log` macros; tracing-subscriber does the
//! actual formatting and filtering (RUST_LOG, default info).

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber and the log→tracing bridge.
///
/// Safe to call once per process; a second call returns an error from the
/// underlying subscriber, which callers should treat as fatal misuse.
pub fn init_logger() -> Result<()> {
    tracing_log::LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
