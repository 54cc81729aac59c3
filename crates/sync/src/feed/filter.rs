use seedlab_primitives::{Status, SummaryRecord};
use serde::{Deserialize, Serialize};

/// Coarse workflow class of a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
	Pending,
	Finalized,
}

/// Splits status codes into finalized and pending.
///
/// Matching is case-insensitive. Any code not listed as finalized, including
/// codes the server introduces later, is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusClassifier {
	finalized: Vec<String>,
}

impl StatusClassifier {
	pub fn new(finalized: impl IntoIterator<Item = String>) -> Self {
		Self {
			finalized: finalized.into_iter().map(|code| code.trim().to_ascii_uppercase()).collect(),
		}
	}

	pub fn classify(&self, status: &Status) -> StatusClass {
		if self.finalized.iter().any(|code| status.is(code)) {
			StatusClass::Finalized
		} else {
			StatusClass::Pending
		}
	}

	pub fn is_finalized(&self, status: &Status) -> bool {
		self.classify(status) == StatusClass::Finalized
	}
}

/// Where a resolved status came from, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
	/// Optimistic patch from a transition that has not been reconciled yet.
	Provisional,
	/// Fetched from the entity service in the latest reconciliation pass.
	Confirmed,
	/// Embedded in the notification; the entity could not be fetched.
	Cached,
}

/// Best available status for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStatus {
	pub status: Status,
	pub source: StatusSource,
}

/// Record paired with its resolved status, as shown in a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
	pub record: SummaryRecord,
	pub status: ResolvedStatus,
	/// The entity's fetch failed in the latest pass.
	pub degraded: bool,
}

/// List filter tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedFilter {
	#[default]
	All,
	Pending,
	Finalized,
	Unread,
}

impl FeedFilter {
	pub fn matches(self, item: &FeedItem, classifier: &StatusClassifier) -> bool {
		match self {
			Self::All => true,
			Self::Pending => classifier.classify(&item.status.status) == StatusClass::Pending,
			Self::Finalized => classifier.classify(&item.status.status) == StatusClass::Finalized,
			Self::Unread => !item.record.read,
		}
	}
}

/// Per-tab totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedCounts {
	pub total: usize,
	pub pending: usize,
	pub finalized: usize,
	pub unread: usize,
}
