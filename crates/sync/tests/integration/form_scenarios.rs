use std::sync::Arc;
use std::time::Duration;

use seedlab_primitives::{PredictionInput, ValidationResult};
use seedlab_sync::{FormSession, SyncConfig, SyncMetrics};
use tokio::time::sleep;

use crate::common::{StubApi, settle};

fn session() -> FormSession {
	FormSession::new(&SyncConfig::default(), Arc::new(SyncMetrics::new()))
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn typing_codigo_issues_one_check() {
	let api = StubApi::new();
	let session = session();
	let codigo = session.field_validator("codigo", api.clone());
	assert_eq!(codigo.current().available, None);

	codigo.validate("A");
	sleep(Duration::from_millis(50)).await;
	codigo.validate("AB");
	sleep(Duration::from_millis(50)).await;
	codigo.validate("ABC");
	sleep(Duration::from_millis(800)).await;
	settle().await;
	sleep(Duration::from_millis(50)).await;
	settle().await;

	assert_eq!(api.check_calls(), vec!["ABC".to_string()]);
	let result = codigo.current();
	assert_eq!(result.available, Some(true));
	assert_eq!(result.message, "OK");
	assert_eq!(session.metrics().timers_superseded_count(), 2);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn slow_answer_for_an_older_value_is_ignored() {
	let api = StubApi::new();
	api.check_latency.lock().insert("AB".into(), Duration::from_secs(2));
	let session = session();
	let codigo = session.field_validator("codigo", api.clone());
	let mut updates = codigo.subscribe();

	codigo.validate("AB");
	sleep(Duration::from_millis(900)).await;
	codigo.validate("ABC");
	sleep(Duration::from_millis(900)).await;
	settle().await;
	assert_eq!(codigo.current().available, Some(true));
	updates.borrow_and_update();

	sleep(Duration::from_secs(2)).await;
	settle().await;

	assert_eq!(api.check_calls(), vec!["AB".to_string(), "ABC".to_string()]);
	assert!(!updates.has_changed().unwrap());
	assert_eq!(session.metrics().stale_discarded_count(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn cattleya_prediction_waits_for_genus() {
	let api = StubApi::new();
	let session = session();
	let prediction = session.prediction(api.clone());

	prediction.update_inputs(PredictionInput::new("Cattleya", "", "2024-01-01", "I"));
	assert!(prediction.result().is_none());
	assert!(!prediction.is_loading());
	sleep(Duration::from_secs(3)).await;
	settle().await;
	assert_eq!(api.prediction_calls(), 0);

	prediction.update_inputs(PredictionInput::new("Cattleya", "trianae", "2024-01-01", "I"));
	assert!(prediction.is_loading());
	sleep(Duration::from_millis(990)).await;
	settle().await;
	assert_eq!(api.prediction_calls(), 0);

	sleep(Duration::from_millis(20)).await;
	settle().await;
	assert_eq!(api.prediction_calls(), 1);

	sleep(Duration::from_millis(30)).await;
	settle().await;
	assert_eq!(prediction.result().map(|r| r.estimated_days), Some(120));
	assert!(!prediction.is_loading());

	prediction.update_inputs(PredictionInput::new("Cattleya", "", "2024-01-01", "I"));
	assert!(prediction.result().is_none());
	sleep(Duration::from_secs(3)).await;
	settle().await;
	assert_eq!(api.prediction_calls(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn clearing_a_field_mid_flight_keeps_it_empty() {
	let api = StubApi::new();
	api.check_latency.lock().insert("X-9".into(), Duration::from_millis(500));
	let session = session();
	let codigo = session.field_validator("codigo", api.clone());

	codigo.validate("X-9");
	sleep(Duration::from_millis(850)).await;
	settle().await;
	assert_eq!(api.check_calls().len(), 1);

	codigo.validate("   ");
	sleep(Duration::from_secs(1)).await;
	settle().await;

	assert_eq!(codigo.current(), ValidationResult::empty("codigo".into()));
}
