use std::fmt;

use seedlab_primitives::FieldKey;

/// Identity under which debouncing and generation counting are tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskKey {
	/// Availability check for one form field.
	Field(FieldKey),
	/// The form's prediction request.
	Prediction,
	/// Reconciliation passes of a notification feed.
	Reconcile,
}

impl fmt::Display for TaskKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Field(field) => write!(f, "field:{field}"),
			Self::Prediction => f.write_str("prediction"),
			Self::Reconcile => f.write_str("reconcile"),
		}
	}
}
