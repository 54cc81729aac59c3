//! Tunables for the sync core, loadable from TOML.
//!
//! ```toml
//! validation_debounce_ms = 800
//! prediction_debounce_ms = 1000
//! max_concurrent_fetches = 8
//! finalized_statuses = ["FINALIZED", "COMPLETED", "DONE"]
//! auto_dismiss_cached = false
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::feed::StatusClassifier;

/// Default quiet period before a field check is sent.
pub const VALIDATION_DEBOUNCE: Duration = Duration::from_millis(800);

/// Default quiet period before a prediction is requested.
pub const PREDICTION_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Default cap on concurrent per-entity fetches during reconciliation.
pub const MAX_CONCURRENT_FETCHES: usize = 8;

/// Sync core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
	pub validation_debounce_ms: u64,
	pub prediction_debounce_ms: u64,
	pub max_concurrent_fetches: usize,
	/// Status codes classified as finalized (case-insensitive). Everything else is pending.
	pub finalized_statuses: Vec<String>,
	/// Whether a cached fallback status may trigger auto-dismissal.
	pub auto_dismiss_cached: bool,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			validation_debounce_ms: VALIDATION_DEBOUNCE.as_millis() as u64,
			prediction_debounce_ms: PREDICTION_DEBOUNCE.as_millis() as u64,
			max_concurrent_fetches: MAX_CONCURRENT_FETCHES,
			finalized_statuses: vec!["FINALIZED".into(), "COMPLETED".into(), "DONE".into()],
			auto_dismiss_cached: false,
		}
	}
}

impl SyncConfig {
	/// Parses and validates a TOML document. Missing keys take their defaults.
	pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(src)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_concurrent_fetches == 0 {
			return Err(ConfigError::InvalidValue {
				field: "max_concurrent_fetches",
				reason: "must be at least 1".into(),
			});
		}
		if let Some(pos) = self.finalized_statuses.iter().position(|s| s.trim().is_empty()) {
			return Err(ConfigError::InvalidValue {
				field: "finalized_statuses",
				reason: format!("entry {pos} is empty"),
			});
		}
		Ok(())
	}

	pub fn validation_debounce(&self) -> Duration {
		Duration::from_millis(self.validation_debounce_ms)
	}

	pub fn prediction_debounce(&self) -> Duration {
		Duration::from_millis(self.prediction_debounce_ms)
	}

	pub fn classifier(&self) -> StatusClassifier {
		StatusClassifier::new(self.finalized_statuses.iter().cloned())
	}
}
