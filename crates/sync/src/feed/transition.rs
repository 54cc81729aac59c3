//! Optimistic status transitions.
//!
//! Per entity: `Confirmed(old) -> Pending(new) -> Confirmed(new) | Confirmed(old)`.
//! While pending, the attempted status is shown as a provisional overlay and
//! survives reconciliation passes. At most one transition per entity may be
//! pending; a second one is rejected.

use seedlab_primitives::{EntityRef, EntityStatus, Status};

use super::{FeedEvent, NotificationFeed};
use crate::error::TransitionError;
use crate::key::TaskKey;

impl NotificationFeed {
	/// Changes an entity's status, showing the new status before the server answers.
	///
	/// On success the server's answer replaces the optimistic patch and a
	/// refresh is run; a refresh that cannot read the batch is logged and the
	/// transition still succeeds. On failure the overlay is restored to exactly
	/// what it was before the call and the error carries the restored status.
	pub async fn transition(
		&self,
		entity: EntityRef,
		status: impl Into<Status>,
		extra: Option<serde_json::Value>,
	) -> Result<EntityStatus, TransitionError> {
		let inner = &self.inner;
		let attempted = status.into();

		let (prior_patch, shown) = {
			let mut state = inner.state.lock();
			if state.pending.contains_key(&entity) {
				return Err(TransitionError::AlreadyPending(entity));
			}
			let shown = match state.find_entity(&entity) {
				Some(record) => state.resolve(record).status,
				None => return Err(TransitionError::UnknownEntity(entity)),
			};
			let mut patch = EntityStatus::new(entity.id, attempted.clone());
			patch.last_known_date = state.sync.get(&entity).and_then(|s| s.last_known_date);
			let prior_patch = state.overlay.insert(entity, patch);
			state.pending.insert(entity, attempted.clone());
			(prior_patch, shown)
		};
		tracing::debug!(%entity, from = %shown, to = %attempted, "sync.transition.pending");

		match inner.service.mutate_status(entity, &attempted, extra.as_ref()).await {
			Ok(confirmed) => {
				// A pass started before the mutation committed may carry the old status.
				inner.guard.invalidate(&TaskKey::Reconcile);
				let live = {
					let mut state = inner.state.lock();
					let live = state.pending.remove(&entity).is_some();
					if live {
						state.overlay.insert(entity, confirmed.clone());
					}
					live
				};
				if !live {
					tracing::debug!(%entity, "sync.transition.settled_after_teardown");
					return Ok(confirmed);
				}

				tracing::debug!(%entity, status = %confirmed.status, "sync.transition.settled");
				inner.emit(FeedEvent::TransitionSettled {
					entity,
					status: confirmed.clone(),
				});
				if let Err(err) = self.refresh().await {
					tracing::warn!(%entity, error = %err, "sync.transition.refresh_failed");
				}
				Ok(confirmed)
			}
			Err(source) => {
				let restored = {
					let mut state = inner.state.lock();
					if state.pending.remove(&entity).is_some() {
						match prior_patch {
							Some(prior) => state.overlay.insert(entity, prior),
							None => state.overlay.remove(&entity),
						};
					}
					match state.find_entity(&entity) {
						Some(record) => state.resolve(record).status,
						None => shown,
					}
				};
				inner.metrics.inc_rollback();
				tracing::warn!(%entity, %attempted, %restored, error = %source, "sync.transition.rolled_back");
				inner.emit(FeedEvent::TransitionRolledBack {
					entity,
					attempted: attempted.clone(),
					restored: restored.clone(),
				});
				Err(TransitionError::Mutation {
					entity,
					attempted,
					restored,
					source,
				})
			}
		}
	}
}
