//! Remote boundary consumed by the sync core.
//!
//! Implementations wrap the HTTP API client. The core relies only on the
//! return shapes; timeouts and retries belong to the implementation.

use async_trait::async_trait;
use seedlab_primitives::{Availability, EntityRef, EntityStatus, FieldKey, NotificationId, PredictionInput, PredictionResult, Status, SummaryRecord};

use crate::error::RemoteError;

/// Uniqueness/acceptability check for a form field value.
#[async_trait]
pub trait AvailabilityCheck: Send + Sync {
	async fn check(&self, field: &FieldKey, value: &str) -> Result<Availability, RemoteError>;
}

/// Derived estimate for a complete prediction tuple.
#[async_trait]
pub trait Predictor: Send + Sync {
	async fn predict(&self, input: &PredictionInput) -> Result<PredictionResult, RemoteError>;
}

/// Authoritative entity store.
#[async_trait]
pub trait EntityService: Send + Sync {
	/// Fetches the current status of one entity.
	async fn fetch_entity(&self, entity: EntityRef) -> Result<EntityStatus, RemoteError>;

	/// Changes an entity's status, returning the stored result.
	async fn mutate_status(&self, entity: EntityRef, status: &Status, extra: Option<&serde_json::Value>) -> Result<EntityStatus, RemoteError>;
}

/// Source of notification summaries.
#[async_trait]
pub trait SummarySource: Send + Sync {
	async fn list_summaries(&self) -> Result<Vec<SummaryRecord>, RemoteError>;

	async fn mark_read(&self, id: NotificationId) -> Result<(), RemoteError>;
}
