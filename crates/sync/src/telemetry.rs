//! Tracing subscriber setup for hosts embedding the sync core.

use tracing_subscriber::EnvFilter;

use crate::error::Error;

/// Environment variable holding the filter directives (e.g. `seedlab_sync=debug`).
pub const LOG_ENV: &str = "SEEDLAB_LOG";

/// Installs a global fmt subscriber filtered by [`LOG_ENV`], defaulting to `info`.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), Error> {
	let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(true)
		.try_init()
		.map_err(|err| Error::Telemetry(err.to_string()))
}

/// Test variant writing through the libtest capture. Repeated calls are no-ops.
#[cfg(test)]
pub(crate) fn init_test_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("debug")))
		.with_test_writer()
		.try_init();
}
