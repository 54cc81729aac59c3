use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Form fields a completion-date prediction depends on.
///
/// Values are kept as typed; the predictor parses them. The tuple is usable
/// only when every component is non-empty after trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredictionInput {
	pub species: String,
	pub genus: String,
	pub start_date: String,
	pub climate: String,
}

impl PredictionInput {
	pub fn new(species: impl Into<String>, genus: impl Into<String>, start_date: impl Into<String>, climate: impl Into<String>) -> Self {
		Self {
			species: species.into(),
			genus: genus.into(),
			start_date: start_date.into(),
			climate: climate.into(),
		}
	}

	pub fn components(&self) -> [&str; 4] {
		[&self.species, &self.genus, &self.start_date, &self.climate]
	}

	pub fn is_complete(&self) -> bool {
		self.components().iter().all(|c| !c.trim().is_empty())
	}

	/// Two tuples only match when both are complete and every component is unchanged.
	pub fn matches(&self, other: &Self) -> bool {
		self.is_complete() && other.is_complete() && self == other
	}
}

/// Estimate returned by the predictor. Delivered to the form as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
	pub estimated_days: u32,
	/// Confidence in percent, 0..=100.
	pub confidence: f32,
	pub estimated_date: NaiveDate,
	pub method: String,
	#[serde(default)]
	pub details: serde_json::Value,
}
