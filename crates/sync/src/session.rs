//! Per-screen owner of the debounce timers and response generations.
//!
//! Every validator and prediction pipeline created from one [`FormSession`]
//! shares its scheduler and guard, so tearing the session down cancels every
//! pending timer and stales every in-flight request of the screen at once.

use std::sync::Arc;

use seedlab_primitives::FieldKey;

use crate::config::SyncConfig;
use crate::debounce::DebounceScheduler;
use crate::guard::ResponseGuard;
use crate::key::TaskKey;
use crate::metrics::SyncMetrics;
use crate::prediction::PredictionPipeline;
use crate::remote::{AvailabilityCheck, Predictor};
use crate::validation::FieldValidator;

#[derive(Debug)]
pub struct FormSession {
	scheduler: Arc<DebounceScheduler<TaskKey>>,
	guard: Arc<ResponseGuard<TaskKey>>,
	config: SyncConfig,
	metrics: Arc<SyncMetrics>,
}

impl FormSession {
	pub fn new(config: &SyncConfig, metrics: Arc<SyncMetrics>) -> Self {
		Self {
			scheduler: Arc::new(DebounceScheduler::new(Arc::clone(&metrics))),
			guard: Arc::new(ResponseGuard::new(Arc::clone(&metrics))),
			config: config.clone(),
			metrics,
		}
	}

	/// Creates the validation pipeline for `field`.
	///
	/// Creating a second validator for the same field makes both share one
	/// timer and one generation counter.
	pub fn field_validator(&self, field: impl Into<FieldKey>, checker: Arc<dyn AvailabilityCheck>) -> FieldValidator {
		FieldValidator::new(
			field.into(),
			self.config.validation_debounce(),
			Arc::clone(&self.scheduler),
			Arc::clone(&self.guard),
			checker,
			Arc::clone(&self.metrics),
		)
	}

	pub fn prediction(&self, predictor: Arc<dyn Predictor>) -> PredictionPipeline {
		PredictionPipeline::new(
			self.config.prediction_debounce(),
			Arc::clone(&self.scheduler),
			Arc::clone(&self.guard),
			predictor,
			Arc::clone(&self.metrics),
		)
	}

	/// Number of debounce timers that have not fired yet.
	pub fn pending_count(&self) -> usize {
		self.scheduler.pending_count()
	}

	pub fn metrics(&self) -> &Arc<SyncMetrics> {
		&self.metrics
	}

	/// Cancels every pending timer and discards every in-flight answer.
	pub fn teardown(&self) {
		let pending = self.scheduler.pending_count();
		self.scheduler.reset();
		self.guard.reset();
		tracing::debug!(pending, "sync.session.teardown");
	}
}

impl Drop for FormSession {
	fn drop(&mut self) {
		self.teardown();
	}
}
