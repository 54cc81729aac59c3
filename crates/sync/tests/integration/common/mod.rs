//! In-memory stand-in for the seedlab HTTP API.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;
use seedlab_primitives::{
	Availability, EntityRef, EntityStatus, FieldKey, NotificationId, PredictionInput, PredictionResult, Status, SummaryRecord,
};
use seedlab_sync::{AvailabilityCheck, EntityService, Predictor, RemoteError, SummarySource};

/// Lets every ready task run.
pub async fn settle() {
	for _ in 0..32 {
		tokio::task::yield_now().await;
	}
}

/// Scripted API: every call is recorded, answers come from the tables below.
#[derive(Default)]
pub struct StubApi {
	pub checks: Mutex<Vec<String>>,
	/// Artificial latency per checked value.
	pub check_latency: Mutex<HashMap<String, Duration>>,
	pub predictions: Mutex<Vec<PredictionInput>>,
	pub entities: Mutex<HashMap<EntityRef, Status>>,
	/// Entities whose fetch fails.
	pub unreachable: Mutex<HashSet<EntityRef>>,
	pub mutations: Mutex<Vec<(EntityRef, Status)>>,
	pub reject_mutations: Mutex<bool>,
	pub summaries: Mutex<Vec<SummaryRecord>>,
}

impl StubApi {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn set_entity(&self, entity: EntityRef, status: &str) {
		self.entities.lock().insert(entity, Status::new(status));
	}

	pub fn check_calls(&self) -> Vec<String> {
		self.checks.lock().clone()
	}

	pub fn prediction_calls(&self) -> usize {
		self.predictions.lock().len()
	}
}

#[async_trait]
impl AvailabilityCheck for StubApi {
	async fn check(&self, _field: &FieldKey, value: &str) -> Result<Availability, RemoteError> {
		self.checks.lock().push(value.to_string());
		let latency = self.check_latency.lock().get(value).copied().unwrap_or(Duration::from_millis(20));
		tokio::time::sleep(latency).await;
		Ok(Availability::new(true, "OK"))
	}
}

#[async_trait]
impl Predictor for StubApi {
	async fn predict(&self, input: &PredictionInput) -> Result<PredictionResult, RemoteError> {
		self.predictions.lock().push(input.clone());
		tokio::time::sleep(Duration::from_millis(20)).await;
		Ok(PredictionResult {
			estimated_days: 120,
			confidence: 80.0,
			estimated_date: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
			method: "historical".to_string(),
			details: serde_json::Value::Null,
		})
	}
}

#[async_trait]
impl EntityService for StubApi {
	async fn fetch_entity(&self, entity: EntityRef) -> Result<EntityStatus, RemoteError> {
		tokio::time::sleep(Duration::from_millis(10)).await;
		if self.unreachable.lock().contains(&entity) {
			return Err(RemoteError::transport("connection reset"));
		}
		let status = self.entities.lock().get(&entity).cloned().ok_or(RemoteError::NotFound)?;
		Ok(EntityStatus::new(entity.id, status))
	}

	async fn mutate_status(&self, entity: EntityRef, status: &Status, _extra: Option<&serde_json::Value>) -> Result<EntityStatus, RemoteError> {
		self.mutations.lock().push((entity, status.clone()));
		tokio::time::sleep(Duration::from_millis(30)).await;
		if *self.reject_mutations.lock() {
			return Err(RemoteError::rejected(422, "transition not allowed"));
		}
		self.entities.lock().insert(entity, status.clone());
		Ok(EntityStatus::new(entity.id, status.clone()))
	}
}

#[async_trait]
impl SummarySource for StubApi {
	async fn list_summaries(&self) -> Result<Vec<SummaryRecord>, RemoteError> {
		Ok(self.summaries.lock().clone())
	}

	async fn mark_read(&self, _id: NotificationId) -> Result<(), RemoteError> {
		Ok(())
	}
}

pub fn summary(id: u64, entity: EntityRef, cached: &str) -> SummaryRecord {
	let created_at = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
	SummaryRecord::new(NotificationId(id), entity, cached, created_at)
}
