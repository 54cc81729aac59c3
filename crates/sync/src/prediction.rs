//! Debounced recomputation of the completion-date prediction.
//!
//! The prediction depends on a tuple of form fields. Any empty component
//! clears the prediction on the spot and stales whatever is pending, so a
//! result computed from an older combination can never reappear. A new
//! complete tuple stales any request still in flight and sets the loading
//! flag; its own request goes out once the form has been quiet for the
//! debounce period.
//!
//! Predictions are advisory: a failed request clears the result and the
//! loading flag without surfacing an error.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use seedlab_primitives::{PredictionInput, PredictionResult};
use tokio::sync::watch;

use crate::debounce::DebounceScheduler;
use crate::guard::ResponseGuard;
use crate::key::TaskKey;
use crate::metrics::SyncMetrics;
use crate::remote::Predictor;

/// What the form renders for the prediction panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionState {
	pub result: Option<PredictionResult>,
	pub loading: bool,
}

/// Prediction pipeline for one form.
#[derive(Clone)]
pub struct PredictionPipeline {
	inner: Arc<PredictionInner>,
}

struct PredictionInner {
	delay: Duration,
	slot: watch::Sender<PredictionState>,
	/// Complete tuple most recently scheduled; `None` after a clear or failure.
	last_input: Mutex<Option<PredictionInput>>,
	scheduler: Arc<DebounceScheduler<TaskKey>>,
	guard: Arc<ResponseGuard<TaskKey>>,
	predictor: Arc<dyn Predictor>,
	metrics: Arc<SyncMetrics>,
}

impl std::fmt::Debug for PredictionPipeline {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PredictionPipeline").field("state", &*self.inner.slot.borrow()).finish()
	}
}

impl PredictionPipeline {
	pub(crate) fn new(
		delay: Duration,
		scheduler: Arc<DebounceScheduler<TaskKey>>,
		guard: Arc<ResponseGuard<TaskKey>>,
		predictor: Arc<dyn Predictor>,
		metrics: Arc<SyncMetrics>,
	) -> Self {
		let (slot, _) = watch::channel(PredictionState::default());
		Self {
			inner: Arc::new(PredictionInner {
				delay,
				slot,
				last_input: Mutex::new(None),
				scheduler,
				guard,
				predictor,
				metrics,
			}),
		}
	}

	/// Feeds the current dependent field values into the pipeline.
	pub fn update_inputs(&self, input: PredictionInput) {
		let inner = &self.inner;

		if !input.is_complete() {
			inner.scheduler.cancel(&TaskKey::Prediction);
			inner.guard.invalidate(&TaskKey::Prediction);
			*inner.last_input.lock() = None;
			inner.slot.send_if_modified(|state| {
				let changed = state.result.is_some() || state.loading;
				*state = PredictionState::default();
				changed
			});
			tracing::trace!("sync.prediction.cleared");
			return;
		}

		{
			let mut last = inner.last_input.lock();
			if last.as_ref().is_some_and(|prev| prev.matches(&input)) {
				return;
			}
			*last = Some(input.clone());
		}

		inner.guard.invalidate(&TaskKey::Prediction);
		inner.slot.send_modify(|state| state.loading = true);
		let task = Arc::clone(inner);
		inner.scheduler.schedule(TaskKey::Prediction, inner.delay, move || task.run_prediction(input));
	}

	pub fn current(&self) -> PredictionState {
		self.inner.slot.borrow().clone()
	}

	pub fn result(&self) -> Option<PredictionResult> {
		self.inner.slot.borrow().result.clone()
	}

	pub fn is_loading(&self) -> bool {
		self.inner.slot.borrow().loading
	}

	pub fn subscribe(&self) -> watch::Receiver<PredictionState> {
		self.inner.slot.subscribe()
	}
}

impl PredictionInner {
	async fn run_prediction(self: Arc<Self>, input: PredictionInput) {
		let generation = self.guard.issue(&TaskKey::Prediction);
		self.metrics.inc_request();
		tracing::debug!(%generation, species = %input.species, genus = %input.genus, "sync.prediction.issue");

		let outcome = self.predictor.predict(&input).await;

		self.guard.apply_if_current(&TaskKey::Prediction, generation, || match outcome {
			Ok(result) => {
				tracing::debug!(%generation, estimated_days = result.estimated_days, "sync.prediction.applied");
				self.slot.send_replace(PredictionState {
					result: Some(result),
					loading: false,
				});
			}
			Err(err) => {
				tracing::warn!(%generation, error = %err, "sync.prediction.failed");
				self.metrics.inc_remote_failure();
				*self.last_input.lock() = None;
				self.slot.send_replace(PredictionState::default());
			}
		});
	}
}
