use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::EntityId;

/// Which external entity store an [`EntityRef`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
	Germination,
	Pollination,
}

impl EntityKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Germination => "germination",
			Self::Pollination => "pollination",
		}
	}
}

/// Weak reference into the external entity store.
///
/// Carries no ownership of the entity's lifecycle; it is only a lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
	pub kind: EntityKind,
	pub id: EntityId,
}

impl EntityRef {
	pub const fn new(kind: EntityKind, id: EntityId) -> Self {
		Self { kind, id }
	}

	pub const fn germination(id: u64) -> Self {
		Self::new(EntityKind::Germination, EntityId(id))
	}

	pub const fn pollination(id: u64) -> Self {
		Self::new(EntityKind::Pollination, EntityId(id))
	}
}

impl fmt::Display for EntityRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.kind.as_str(), self.id)
	}
}

/// Opaque workflow status code as reported by the server (e.g. `"IN_PROGRESS"`).
///
/// The sync core never interprets status codes beyond the finalized/pending
/// classification configured by the host.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(String);

impl Status {
	pub fn new(code: impl Into<String>) -> Self {
		Self(code.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Case-insensitive comparison against a status code.
	pub fn is(&self, code: &str) -> bool {
		self.0.trim().eq_ignore_ascii_case(code.trim())
	}
}

impl From<&str> for Status {
	fn from(code: &str) -> Self {
		Self::new(code)
	}
}

impl From<String> for Status {
	fn from(code: String) -> Self {
		Self(code)
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Authoritative state of one entity, fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStatus {
	pub entity_id: EntityId,
	pub status: Status,
	#[serde(default)]
	pub last_known_date: Option<NaiveDate>,
}

impl EntityStatus {
	pub fn new(entity_id: EntityId, status: impl Into<Status>) -> Self {
		Self {
			entity_id,
			status: status.into(),
			last_known_date: None,
		}
	}

	pub fn with_date(mut self, date: NaiveDate) -> Self {
		self.last_known_date = Some(date);
		self
	}
}
