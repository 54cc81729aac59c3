//! Scripted boundary implementations for unit tests.
//!
//! [`MockEndpoint`] either answers immediately through an auto-responder or
//! parks each call until the test resolves it by index, which lets tests
//! force responses to arrive in any order.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use seedlab_primitives::{
	Availability, EntityRef, EntityStatus, FieldKey, NotificationId, PredictionInput, PredictionResult, Status, SummaryRecord,
};
use tokio::sync::oneshot;

use crate::error::RemoteError;
use crate::remote::{AvailabilityCheck, EntityService, Predictor, SummarySource};

type Responder<Req, Resp> = Box<dyn Fn(&Req) -> Resp + Send + Sync>;

/// Lets every ready task run until the runtime would otherwise idle.
pub(crate) async fn settle() {
	for _ in 0..32 {
		tokio::task::yield_now().await;
	}
}

struct Call<Req, Resp> {
	req: Req,
	reply: Option<oneshot::Sender<Resp>>,
}

pub(crate) struct MockEndpoint<Req, Resp> {
	calls: Mutex<Vec<Call<Req, Resp>>>,
	auto: Mutex<Option<Responder<Req, Resp>>>,
}

impl<Req, Resp> MockEndpoint<Req, Resp>
where
	Req: Clone + Send,
	Resp: Send,
{
	/// Every call waits for [`Self::resolve`].
	pub(crate) fn deferred() -> Self {
		Self {
			calls: Mutex::new(Vec::new()),
			auto: Mutex::new(None),
		}
	}

	/// Every call is answered immediately by `respond`.
	pub(crate) fn auto(respond: impl Fn(&Req) -> Resp + Send + Sync + 'static) -> Self {
		let endpoint = Self::deferred();
		endpoint.set_auto(respond);
		endpoint
	}

	pub(crate) fn set_auto(&self, respond: impl Fn(&Req) -> Resp + Send + Sync + 'static) {
		*self.auto.lock() = Some(Box::new(respond));
	}

	pub(crate) fn set_deferred(&self) {
		*self.auto.lock() = None;
	}

	/// Records the call and waits for its answer; `on_drop` answers if the test drops it.
	pub(crate) async fn call(&self, req: Req, on_drop: impl FnOnce() -> Resp) -> Resp {
		let rx = {
			let auto = self.auto.lock();
			let mut calls = self.calls.lock();
			if let Some(respond) = auto.as_ref() {
				let resp = respond(&req);
				calls.push(Call { req, reply: None });
				return resp;
			}
			let (tx, rx) = oneshot::channel();
			calls.push(Call { req, reply: Some(tx) });
			rx
		};
		rx.await.unwrap_or_else(|_| on_drop())
	}

	pub(crate) fn resolve(&self, index: usize, resp: Resp) {
		let reply = self.calls.lock()[index].reply.take().expect("call already resolved or answered automatically");
		let _ = reply.send(resp);
	}

	pub(crate) fn requests(&self) -> Vec<Req> {
		self.calls.lock().iter().map(|c| c.req.clone()).collect()
	}

	pub(crate) fn call_count(&self) -> usize {
		self.calls.lock().len()
	}

	/// Number of calls still waiting for an answer.
	pub(crate) fn waiting(&self) -> usize {
		self.calls.lock().iter().filter(|c| c.reply.is_some()).count()
	}
}

fn dropped<T>() -> Result<T, RemoteError> {
	Err(RemoteError::transport("mock call dropped"))
}

pub(crate) struct MockChecker {
	pub(crate) endpoint: MockEndpoint<String, Result<Availability, RemoteError>>,
}

impl MockChecker {
	pub(crate) fn deferred() -> Arc<Self> {
		Arc::new(Self {
			endpoint: MockEndpoint::deferred(),
		})
	}
}

#[async_trait]
impl AvailabilityCheck for MockChecker {
	async fn check(&self, _field: &FieldKey, value: &str) -> Result<Availability, RemoteError> {
		self.endpoint.call(value.to_string(), dropped).await
	}
}

pub(crate) struct MockPredictor {
	pub(crate) endpoint: MockEndpoint<PredictionInput, Result<PredictionResult, RemoteError>>,
}

impl MockPredictor {
	pub(crate) fn deferred() -> Arc<Self> {
		Arc::new(Self {
			endpoint: MockEndpoint::deferred(),
		})
	}
}

#[async_trait]
impl Predictor for MockPredictor {
	async fn predict(&self, input: &PredictionInput) -> Result<PredictionResult, RemoteError> {
		self.endpoint.call(input.clone(), dropped).await
	}
}

pub(crate) struct MockEntities {
	pub(crate) fetch: MockEndpoint<EntityRef, Result<EntityStatus, RemoteError>>,
	pub(crate) mutate: MockEndpoint<(EntityRef, Status), Result<EntityStatus, RemoteError>>,
}

impl MockEntities {
	/// Fetches answer from `statuses`; unknown refs fail with `NotFound`. Mutations are deferred.
	pub(crate) fn with_statuses(statuses: &[(EntityRef, &str)]) -> Arc<Self> {
		let table: Vec<(EntityRef, String)> = statuses.iter().map(|(r, s)| (*r, s.to_string())).collect();
		let entities = Arc::new(Self {
			fetch: MockEndpoint::deferred(),
			mutate: MockEndpoint::deferred(),
		});
		entities.serve(table);
		entities
	}

	/// Replaces the fetch table.
	pub(crate) fn serve(&self, table: Vec<(EntityRef, String)>) {
		self.fetch.set_auto(move |entity| {
			table
				.iter()
				.find(|(r, _)| r == entity)
				.map(|(r, s)| EntityStatus::new(r.id, s.as_str()))
				.ok_or(RemoteError::NotFound)
		});
	}
}

#[async_trait]
impl EntityService for MockEntities {
	async fn fetch_entity(&self, entity: EntityRef) -> Result<EntityStatus, RemoteError> {
		self.fetch.call(entity, dropped).await
	}

	async fn mutate_status(&self, entity: EntityRef, status: &Status, _extra: Option<&serde_json::Value>) -> Result<EntityStatus, RemoteError> {
		self.mutate.call((entity, status.clone()), dropped).await
	}
}

pub(crate) struct MockSource {
	pub(crate) list: MockEndpoint<(), Result<Vec<SummaryRecord>, RemoteError>>,
	pub(crate) mark_read: MockEndpoint<NotificationId, Result<(), RemoteError>>,
}

impl MockSource {
	/// Lists `records`; marking as read succeeds.
	pub(crate) fn serving(records: Vec<SummaryRecord>) -> Arc<Self> {
		let source = Arc::new(Self {
			list: MockEndpoint::deferred(),
			mark_read: MockEndpoint::auto(|_| Ok(())),
		});
		source.serve(records);
		source
	}

	pub(crate) fn serve(&self, records: Vec<SummaryRecord>) {
		self.list.set_auto(move |_| Ok(records.clone()));
	}
}

#[async_trait]
impl SummarySource for MockSource {
	async fn list_summaries(&self) -> Result<Vec<SummaryRecord>, RemoteError> {
		self.list.call((), dropped).await
	}

	async fn mark_read(&self, id: NotificationId) -> Result<(), RemoteError> {
		self.mark_read.call(id, dropped).await
	}
}

pub(crate) fn record(id: u64, entity: EntityRef, cached: &str) -> SummaryRecord {
	let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap() + chrono::Duration::minutes(id as i64);
	SummaryRecord::new(NotificationId(id), entity, cached, created_at)
}

pub(crate) fn availability(available: bool, message: &str) -> Result<Availability, RemoteError> {
	Ok(Availability::new(available, message))
}

pub(crate) fn prediction(days: u32) -> PredictionResult {
	PredictionResult {
		estimated_days: days,
		confidence: 75.0,
		estimated_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(days as i64),
		method: "historical".to_string(),
		details: serde_json::Value::Null,
	}
}
