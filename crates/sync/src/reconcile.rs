//! Reconciliation of notification summaries against authoritative entity state.
//!
//! [`Reconciler::reconcile`] fans out one fetch per distinct entity referenced
//! by the batch, runs them concurrently under a cap, and folds the answers
//! into a fresh [`SyncMap`]. A failing fetch only marks its entity degraded;
//! the pass itself always succeeds, and consumers fall back to the cached
//! status carried by the summary.

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use seedlab_primitives::{EntityRef, EntityStatus, SummaryRecord};
use seedlab_worker::{TaskClass, WorkerJoinSet};

use crate::error::RemoteError;
use crate::metrics::SyncMetrics;
use crate::remote::EntityService;

/// Authoritative statuses gathered by one reconciliation pass.
///
/// Rebuilt from scratch on every pass. Entities whose fetch failed have no
/// entry and are listed in [`Self::degraded`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncMap {
	entries: FxHashMap<EntityRef, EntityStatus>,
	degraded: FxHashSet<EntityRef>,
}

impl SyncMap {
	pub fn get(&self, entity: &EntityRef) -> Option<&EntityStatus> {
		self.entries.get(entity)
	}

	pub fn contains(&self, entity: &EntityRef) -> bool {
		self.entries.contains_key(entity)
	}

	/// Number of entities that resolved.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn is_degraded(&self, entity: &EntityRef) -> bool {
		self.degraded.contains(entity)
	}

	/// Entities whose fetch failed in this pass.
	pub fn degraded(&self) -> impl Iterator<Item = &EntityRef> {
		self.degraded.iter()
	}

	pub fn degraded_count(&self) -> usize {
		self.degraded.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&EntityRef, &EntityStatus)> {
		self.entries.iter()
	}
}

/// Fans out per-entity fetches for a batch of summaries.
#[derive(Clone)]
pub struct Reconciler {
	service: Arc<dyn EntityService>,
	max_concurrent: usize,
	metrics: Arc<SyncMetrics>,
}

impl std::fmt::Debug for Reconciler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Reconciler").field("max_concurrent", &self.max_concurrent).finish()
	}
}

impl Reconciler {
	pub fn new(service: Arc<dyn EntityService>, max_concurrent: usize, metrics: Arc<SyncMetrics>) -> Self {
		Self {
			service,
			max_concurrent,
			metrics,
		}
	}

	/// Fetches the authoritative status of every entity referenced by `records`.
	///
	/// Records referring to the same entity share one fetch. Never fails:
	/// rejected, mismatched, or panicked fetches mark their entity degraded.
	/// Must be called from within a Tokio runtime.
	pub async fn reconcile(&self, records: &[SummaryRecord]) -> SyncMap {
		let wanted: BTreeSet<EntityRef> = records.iter().map(|r| r.entity).collect();
		let mut map = SyncMap::default();
		if wanted.is_empty() {
			return map;
		}

		let mut fetches = WorkerJoinSet::with_limit(TaskClass::Background, self.max_concurrent);
		for &entity in &wanted {
			let service = Arc::clone(&self.service);
			fetches.spawn(async move { (entity, service.fetch_entity(entity).await) });
		}

		while let Some(joined) = fetches.join_next().await {
			match joined {
				Ok((entity, Ok(status))) if status.entity_id == entity.id => {
					map.entries.insert(entity, status);
				}
				Ok((entity, Ok(status))) => {
					tracing::warn!(%entity, returned = %status.entity_id, "sync.reconcile.id_mismatch");
				}
				Ok((entity, Err(err))) => log_fetch_failure(entity, &err),
				Err(err) => tracing::warn!(error = %err, "sync.reconcile.fetch_panicked"),
			}
		}

		for entity in wanted {
			if !map.entries.contains_key(&entity) {
				map.degraded.insert(entity);
			}
		}

		if !map.degraded.is_empty() {
			self.metrics.add_fetch_failures(map.degraded.len() as u64);
		}
		tracing::debug!(
			records = records.len(),
			resolved = map.len(),
			degraded = map.degraded_count(),
			"sync.reconcile.done"
		);
		map
	}
}

fn log_fetch_failure(entity: EntityRef, err: &RemoteError) {
	match err {
		RemoteError::NotFound => tracing::debug!(%entity, "sync.reconcile.entity_missing"),
		_ => tracing::warn!(%entity, error = %err, "sync.reconcile.fetch_failed"),
	}
}
