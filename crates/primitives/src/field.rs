use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a form field validated against the server (e.g. `"codigo"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKey(String);

impl FieldKey {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for FieldKey {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl fmt::Display for FieldKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Server answer to a uniqueness/acceptability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
	pub available: bool,
	pub message: String,
}

impl Availability {
	pub fn new(available: bool, message: impl Into<String>) -> Self {
		Self {
			available,
			message: message.into(),
		}
	}
}

/// Validation state of one field as shown next to the input.
///
/// `available == None` is indeterminate: nothing typed yet, a check is
/// still running, or the last check failed transiently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
	pub field: FieldKey,
	pub available: Option<bool>,
	pub message: String,
}

impl ValidationResult {
	/// Message shown while a check is debouncing or in flight.
	pub const CHECKING: &'static str = "checking";
	/// Message shown when the server could not be asked.
	pub const UNVERIFIED: &'static str = "could not verify availability";

	/// Indeterminate result for an empty field.
	pub fn empty(field: FieldKey) -> Self {
		Self {
			field,
			available: None,
			message: String::new(),
		}
	}

	pub fn checking(field: FieldKey) -> Self {
		Self {
			field,
			available: None,
			message: Self::CHECKING.to_string(),
		}
	}

	pub fn unverified(field: FieldKey) -> Self {
		Self {
			field,
			available: None,
			message: Self::UNVERIFIED.to_string(),
		}
	}

	pub fn resolved(field: FieldKey, answer: Availability) -> Self {
		Self {
			field,
			available: Some(answer.available),
			message: answer.message,
		}
	}

	pub fn is_indeterminate(&self) -> bool {
		self.available.is_none()
	}
}
