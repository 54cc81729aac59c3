use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EntityRef, NotificationId, Status};

/// Notification-like summary that refers to one entity by weak reference.
///
/// `cached_status` is the status embedded in the notification when it was
/// produced; it may lag behind the entity's authoritative status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
	pub id: NotificationId,
	pub entity: EntityRef,
	pub cached_status: Status,
	#[serde(default)]
	pub read: bool,
	pub created_at: DateTime<Utc>,
}

impl SummaryRecord {
	pub fn new(id: NotificationId, entity: EntityRef, cached_status: impl Into<Status>, created_at: DateTime<Utc>) -> Self {
		Self {
			id,
			entity,
			cached_status: cached_status.into(),
			read: false,
			created_at,
		}
	}
}
