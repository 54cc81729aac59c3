use std::sync::Arc;

use seedlab_primitives::{EntityRef, Status};
use seedlab_sync::{FeedEvent, FeedFilter, NotificationFeed, PassOutcome, StatusSource, SyncConfig, SyncMetrics, TransitionError};

use crate::common::{StubApi, summary};

fn seeded_api() -> Arc<StubApi> {
	let api = StubApi::new();
	api.set_entity(EntityRef::germination(1), "IN_PROGRESS");
	api.set_entity(EntityRef::germination(2), "FINALIZED");
	api.set_entity(EntityRef::pollination(3), "PENDING");
	api.set_entity(EntityRef::pollination(4), "IN_PROGRESS");
	*api.summaries.lock() = vec![
		summary(1, EntityRef::germination(1), "PENDING"),
		summary(2, EntityRef::germination(2), "IN_PROGRESS"),
		summary(3, EntityRef::pollination(3), "PENDING"),
		summary(4, EntityRef::pollination(4), "FINALIZED"),
	];
	api
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn unreachable_entity_falls_back_to_cached_status() {
	let api = seeded_api();
	api.unreachable.lock().insert(EntityRef::pollination(4));
	let (feed, _events) = NotificationFeed::new(api.clone(), api.clone(), &SyncConfig::default(), Arc::new(SyncMetrics::new()));

	assert_eq!(feed.refresh().await.unwrap(), PassOutcome::Applied);

	let map = feed.sync_map();
	assert_eq!(map.len(), 3);
	assert!(map.is_degraded(&EntityRef::pollination(4)));
	let fallback = feed.status_of(&EntityRef::pollination(4)).unwrap();
	assert_eq!(fallback.status, Status::new("FINALIZED"));
	assert_eq!(fallback.source, StatusSource::Cached);

	// Cached statuses still drive filtering but not auto-dismissal.
	let finalized: Vec<_> = feed.view(FeedFilter::Finalized).iter().map(|item| item.record.id.0).collect();
	assert_eq!(finalized, vec![2, 4]);
	assert_eq!(feed.auto_dismissible().len(), 1);

	feed.refresh().await.unwrap();
	assert_eq!(feed.sync_map(), map);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn failed_done_transition_leaves_previous_status_visible() {
	let api = seeded_api();
	*api.reject_mutations.lock() = true;
	let metrics = Arc::new(SyncMetrics::new());
	let (feed, mut events) = NotificationFeed::new(api.clone(), api.clone(), &SyncConfig::default(), Arc::clone(&metrics));
	feed.refresh().await.unwrap();
	let before = feed.status_of(&EntityRef::germination(1)).unwrap();

	let err = feed.transition(EntityRef::germination(1), "DONE", None).await.unwrap_err();

	assert!(matches!(err, TransitionError::Mutation { .. }));
	assert_eq!(feed.status_of(&EntityRef::germination(1)), Some(before));
	assert_eq!(metrics.rollback_count(), 1);

	let mut last = None;
	while let Ok(event) = events.try_recv() {
		last = Some(event);
	}
	assert!(matches!(last, Some(FeedEvent::TransitionRolledBack { .. })));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn successful_transition_converges_with_server() {
	let api = seeded_api();
	let (feed, _events) = NotificationFeed::new(api.clone(), api.clone(), &SyncConfig::default(), Arc::new(SyncMetrics::new()));
	feed.refresh().await.unwrap();
	assert_eq!(feed.counts().finalized, 1);

	let confirmed = feed
		.transition(EntityRef::pollination(3), "DONE", Some(serde_json::json!({"note": "closed from dashboard"})))
		.await
		.unwrap();

	assert_eq!(confirmed.status, Status::new("DONE"));
	let resolved = feed.status_of(&EntityRef::pollination(3)).unwrap();
	assert_eq!(resolved.status, Status::new("DONE"));
	assert_eq!(resolved.source, StatusSource::Confirmed);
	assert_eq!(feed.counts().finalized, 2);
	assert_eq!(api.mutations.lock().len(), 1);
}
