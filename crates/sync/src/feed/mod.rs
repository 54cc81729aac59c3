//! Notification feed: summary records merged with authoritative entity state.
//!
//! The feed keeps three layers per entity and resolves them in order:
//!
//! 1. the optimistic overlay written by [`NotificationFeed::transition`],
//! 2. the [`SyncMap`] of the latest applied reconciliation pass,
//! 3. the `cached_status` embedded in the notification itself.
//!
//! Reconciliation passes may overlap (a manual refresh racing the refresh
//! that follows a transition). Passes are ordered by a [`ResponseGuard`]
//! under [`TaskKey::Reconcile`]; only the most recently started pass may
//! replace the map. Applying a pass drops every overlay entry whose
//! transition is no longer pending.
//!
//! Lock order: the guard lock is taken before the state lock, never after.

mod filter;
mod transition;

use std::sync::Arc;

pub use filter::{FeedCounts, FeedFilter, FeedItem, ResolvedStatus, StatusClass, StatusClassifier, StatusSource};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use seedlab_primitives::{EntityRef, EntityStatus, NotificationId, Status, SummaryRecord};
use tokio::sync::mpsc;

use crate::config::SyncConfig;
use crate::error::FeedError;
use crate::guard::{Generation, ResponseGuard};
use crate::key::TaskKey;
use crate::metrics::SyncMetrics;
use crate::reconcile::{Reconciler, SyncMap};
use crate::remote::{EntityService, SummarySource};

/// Notifications for views that depend on the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
	/// A reconciliation pass replaced the sync map.
	Reconciled { resolved: usize, degraded: usize },
	/// A transition was accepted by the server.
	TransitionSettled { entity: EntityRef, status: EntityStatus },
	/// A transition failed and its optimistic patch was reverted.
	TransitionRolledBack { entity: EntityRef, attempted: Status, restored: Status },
}

/// Whether a reconciliation pass got to replace the sync map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
	Applied,
	/// A later pass was started before this one finished; its result was dropped.
	Superseded,
}

#[derive(Debug, Default)]
struct FeedState {
	records: Vec<SummaryRecord>,
	sync: SyncMap,
	overlay: FxHashMap<EntityRef, EntityStatus>,
	/// Entities with a mutation in flight, and the status being attempted.
	pending: FxHashMap<EntityRef, Status>,
	/// Notifications with a mark-read call in flight.
	marking: FxHashSet<NotificationId>,
	/// Bumped whenever `records` is replaced wholesale.
	records_epoch: u64,
}

impl FeedState {
	fn resolve(&self, record: &SummaryRecord) -> ResolvedStatus {
		if let Some(patch) = self.overlay.get(&record.entity) {
			return ResolvedStatus {
				status: patch.status.clone(),
				source: StatusSource::Provisional,
			};
		}
		match self.sync.get(&record.entity) {
			Some(confirmed) => ResolvedStatus {
				status: confirmed.status.clone(),
				source: StatusSource::Confirmed,
			},
			None => ResolvedStatus {
				status: record.cached_status.clone(),
				source: StatusSource::Cached,
			},
		}
	}

	fn item(&self, record: &SummaryRecord) -> FeedItem {
		FeedItem {
			record: record.clone(),
			status: self.resolve(record),
			degraded: self.sync.is_degraded(&record.entity),
		}
	}

	fn replace_records(&mut self, records: Vec<SummaryRecord>) {
		self.records = records;
		self.records_epoch += 1;
	}

	fn find_entity(&self, entity: &EntityRef) -> Option<&SummaryRecord> {
		self.records.iter().find(|r| r.entity == *entity)
	}
}

/// Shared handle to one notification list.
///
/// Cheap to clone; clones observe and mutate the same list.
#[derive(Clone)]
pub struct NotificationFeed {
	inner: Arc<FeedInner>,
}

struct FeedInner {
	source: Arc<dyn SummarySource>,
	service: Arc<dyn EntityService>,
	reconciler: Reconciler,
	guard: ResponseGuard<TaskKey>,
	state: Mutex<FeedState>,
	classifier: StatusClassifier,
	auto_dismiss_cached: bool,
	events: mpsc::UnboundedSender<FeedEvent>,
	metrics: Arc<SyncMetrics>,
}

impl std::fmt::Debug for NotificationFeed {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("NotificationFeed")
			.field("records", &state.records.len())
			.field("confirmed", &state.sync.len())
			.field("pending", &state.pending.len())
			.finish()
	}
}

impl NotificationFeed {
	/// Creates an empty feed and the receiving end of its event channel.
	pub fn new(
		source: Arc<dyn SummarySource>,
		service: Arc<dyn EntityService>,
		config: &SyncConfig,
		metrics: Arc<SyncMetrics>,
	) -> (Self, mpsc::UnboundedReceiver<FeedEvent>) {
		let (events, rx) = mpsc::unbounded_channel();
		let inner = FeedInner {
			reconciler: Reconciler::new(Arc::clone(&service), config.max_concurrent_fetches, Arc::clone(&metrics)),
			source,
			service,
			guard: ResponseGuard::new(Arc::clone(&metrics)),
			state: Mutex::new(FeedState::default()),
			classifier: config.classifier(),
			auto_dismiss_cached: config.auto_dismiss_cached,
			events,
			metrics,
		};
		(Self { inner: Arc::new(inner) }, rx)
	}

	/// Replaces the record list and reconciles it.
	///
	/// The new records are visible immediately with their cached statuses;
	/// confirmed statuses follow once the pass completes.
	pub async fn load(&self, records: Vec<SummaryRecord>) -> PassOutcome {
		let generation = self.inner.guard.issue(&TaskKey::Reconcile);
		self.inner.state.lock().replace_records(records.clone());
		self.inner.reconcile_pass(generation, records).await
	}

	/// Reads the summary batch from the source, then reconciles it.
	pub async fn refresh(&self) -> Result<PassOutcome, FeedError> {
		let inner = &self.inner;
		let generation = inner.guard.issue(&TaskKey::Reconcile);
		let records = inner.source.list_summaries().await.map_err(|err| {
			tracing::warn!(%generation, error = %err, "sync.feed.list_failed");
			FeedError::Source(err)
		})?;

		let stored = inner.guard.apply_if_current(&TaskKey::Reconcile, generation, || {
			inner.state.lock().replace_records(records.clone());
		});
		if stored.is_none() {
			return Ok(PassOutcome::Superseded);
		}
		Ok(inner.reconcile_pass(generation, records).await)
	}

	/// Best available status for `record`.
	pub fn resolve(&self, record: &SummaryRecord) -> ResolvedStatus {
		self.inner.state.lock().resolve(record)
	}

	/// Best available status of an entity in the current list.
	pub fn status_of(&self, entity: &EntityRef) -> Option<ResolvedStatus> {
		let state = self.inner.state.lock();
		state.find_entity(entity).map(|record| state.resolve(record))
	}

	pub fn is_pending(&self, entity: &EntityRef) -> bool {
		self.inner.state.lock().pending.contains_key(entity)
	}

	pub fn records(&self) -> Vec<SummaryRecord> {
		self.inner.state.lock().records.clone()
	}

	/// Snapshot of the latest applied sync map.
	pub fn sync_map(&self) -> SyncMap {
		self.inner.state.lock().sync.clone()
	}

	pub fn classifier(&self) -> &StatusClassifier {
		&self.inner.classifier
	}

	/// Records passing `filter`, in list order.
	pub fn view(&self, filter: FeedFilter) -> Vec<FeedItem> {
		let state = self.inner.state.lock();
		state
			.records
			.iter()
			.map(|record| state.item(record))
			.filter(|item| filter.matches(item, &self.inner.classifier))
			.collect()
	}

	pub fn counts(&self) -> FeedCounts {
		let state = self.inner.state.lock();
		let mut counts = FeedCounts {
			total: state.records.len(),
			..FeedCounts::default()
		};
		for record in &state.records {
			match self.inner.classifier.classify(&state.resolve(record).status) {
				StatusClass::Pending => counts.pending += 1,
				StatusClass::Finalized => counts.finalized += 1,
			}
			if !record.read {
				counts.unread += 1;
			}
		}
		counts
	}

	/// Unread notifications whose entity has reached a finalized status.
	///
	/// Only statuses confirmed by the entity service qualify; cached statuses
	/// qualify too when `auto_dismiss_cached` is configured. Provisional
	/// statuses never do.
	pub fn auto_dismissible(&self) -> Vec<NotificationId> {
		let state = self.inner.state.lock();
		state
			.records
			.iter()
			.filter(|record| !record.read)
			.filter(|record| {
				let resolved = state.resolve(record);
				let trusted = match resolved.source {
					StatusSource::Confirmed => true,
					StatusSource::Cached => self.inner.auto_dismiss_cached,
					StatusSource::Provisional => false,
				};
				trusted && self.inner.classifier.is_finalized(&resolved.status)
			})
			.map(|record| record.id)
			.collect()
	}

	/// Marks a notification as read, reverting the local flag if the server refuses.
	///
	/// Only one call per notification may be in flight. The revert is skipped
	/// when the list was reloaded meanwhile, since the reloaded flag came from
	/// the server.
	pub async fn mark_read(&self, id: NotificationId) -> Result<(), FeedError> {
		let epoch = {
			let mut state = self.inner.state.lock();
			if state.marking.contains(&id) {
				return Err(FeedError::MarkReadPending(id));
			}
			let record = state
				.records
				.iter_mut()
				.find(|r| r.id == id)
				.ok_or(FeedError::UnknownNotification(id))?;
			if record.read {
				return Ok(());
			}
			record.read = true;
			state.marking.insert(id);
			state.records_epoch
		};

		let outcome = self.inner.source.mark_read(id).await;

		let mut state = self.inner.state.lock();
		state.marking.remove(&id);
		let Err(source) = outcome else {
			return Ok(());
		};
		if state.records_epoch == epoch
			&& let Some(record) = state.records.iter_mut().find(|r| r.id == id)
		{
			record.read = false;
		}
		drop(state);
		tracing::warn!(%id, error = %source, "sync.feed.mark_read_failed");
		Err(FeedError::MarkRead { id, source })
	}

	/// Drops the list and discards every pass and transition still in flight.
	pub fn teardown(&self) {
		self.inner.guard.reset();
		let dropped = {
			let mut state = self.inner.state.lock();
			let dropped = std::mem::take(&mut *state);
			state.records_epoch = dropped.records_epoch + 1;
			dropped
		};
		tracing::debug!(records = dropped.records.len(), pending = dropped.pending.len(), "sync.feed.teardown");
	}
}

impl FeedInner {
	async fn reconcile_pass(&self, generation: Generation, records: Vec<SummaryRecord>) -> PassOutcome {
		let map = self.reconciler.reconcile(&records).await;
		let applied = self.guard.apply_if_current(&TaskKey::Reconcile, generation, || {
			let mut state = self.state.lock();
			let state = &mut *state;
			state.overlay.retain(|entity, _| state.pending.contains_key(entity));
			let counts = (map.len(), map.degraded_count());
			state.sync = map;
			counts
		});

		match applied {
			Some((resolved, degraded)) => {
				self.metrics.inc_reconcile_pass();
				tracing::debug!(%generation, resolved, degraded, "sync.feed.pass_applied");
				self.emit(FeedEvent::Reconciled { resolved, degraded });
				PassOutcome::Applied
			}
			None => PassOutcome::Superseded,
		}
	}

	fn emit(&self, event: FeedEvent) {
		if self.events.send(event).is_err() {
			tracing::trace!("sync.feed.event_dropped");
		}
	}
}
