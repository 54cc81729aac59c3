//! Debounced server-side validation of a single form field.
//!
//! Each keystroke-equivalent change goes through [`FieldValidator::validate`]:
//!
//! - An empty (after trimming) value resets the slot to indeterminate at once,
//!   clears the pending timer, and stales any in-flight check.
//! - Any other value stales every earlier check and marks the slot as
//!   checking, then (re)arms the field's debounce timer. When the timer
//!   fires, the check is issued under a fresh generation and its answer
//!   applied only if still current.
//!
//! Check failures never escape: a failed check that is still current leaves
//! the slot indeterminate with a generic message.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use seedlab_primitives::{FieldKey, ValidationResult};
use tokio::sync::watch;

use crate::debounce::DebounceScheduler;
use crate::guard::ResponseGuard;
use crate::key::TaskKey;
use crate::metrics::SyncMetrics;
use crate::remote::AvailabilityCheck;

/// Validation pipeline for one field, publishing into a watch slot.
///
/// Cheap to clone; clones share the slot and pending state.
#[derive(Clone)]
pub struct FieldValidator {
	inner: Arc<ValidatorInner>,
}

struct ValidatorInner {
	field: FieldKey,
	key: TaskKey,
	delay: Duration,
	slot: watch::Sender<ValidationResult>,
	/// Trimmed value of the last check scheduled or applied.
	last_value: Mutex<Option<String>>,
	scheduler: Arc<DebounceScheduler<TaskKey>>,
	guard: Arc<ResponseGuard<TaskKey>>,
	checker: Arc<dyn AvailabilityCheck>,
	metrics: Arc<SyncMetrics>,
}

impl std::fmt::Debug for FieldValidator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FieldValidator")
			.field("field", &self.inner.field)
			.field("current", &*self.inner.slot.borrow())
			.finish()
	}
}

impl FieldValidator {
	pub(crate) fn new(
		field: FieldKey,
		delay: Duration,
		scheduler: Arc<DebounceScheduler<TaskKey>>,
		guard: Arc<ResponseGuard<TaskKey>>,
		checker: Arc<dyn AvailabilityCheck>,
		metrics: Arc<SyncMetrics>,
	) -> Self {
		let (slot, _) = watch::channel(ValidationResult::empty(field.clone()));
		Self {
			inner: Arc::new(ValidatorInner {
				key: TaskKey::Field(field.clone()),
				field,
				delay,
				slot,
				last_value: Mutex::new(None),
				scheduler,
				guard,
				checker,
				metrics,
			}),
		}
	}

	pub fn field(&self) -> &FieldKey {
		&self.inner.field
	}

	/// Feeds the field's current raw value into the pipeline.
	pub fn validate(&self, value: &str) {
		let inner = &self.inner;
		let value = value.trim();

		if value.is_empty() {
			inner.scheduler.cancel(&inner.key);
			inner.guard.invalidate(&inner.key);
			*inner.last_value.lock() = None;
			inner.slot.send_replace(ValidationResult::empty(inner.field.clone()));
			tracing::trace!(field = %inner.field, "sync.validation.cleared");
			return;
		}

		{
			let mut last = inner.last_value.lock();
			if last.as_deref() == Some(value) {
				return;
			}
			*last = Some(value.to_string());
		}

		// Answers for earlier values stay stale while this one debounces.
		inner.guard.invalidate(&inner.key);
		inner.slot.send_replace(ValidationResult::checking(inner.field.clone()));

		let task = Arc::clone(inner);
		let value = value.to_string();
		inner.scheduler.schedule(inner.key.clone(), inner.delay, move || task.run_check(value));
	}

	/// Current validation state.
	pub fn current(&self) -> ValidationResult {
		self.inner.slot.borrow().clone()
	}

	/// Receiver notified on every slot change.
	pub fn subscribe(&self) -> watch::Receiver<ValidationResult> {
		self.inner.slot.subscribe()
	}
}

impl ValidatorInner {
	async fn run_check(self: Arc<Self>, value: String) {
		let generation = self.guard.issue(&self.key);
		self.metrics.inc_request();
		tracing::debug!(field = %self.field, %generation, "sync.validation.issue");

		let outcome = self.checker.check(&self.field, &value).await;
		let failed = outcome.is_err();
		let result = match outcome {
			Ok(answer) => ValidationResult::resolved(self.field.clone(), answer),
			Err(err) => {
				tracing::warn!(field = %self.field, %generation, error = %err, "sync.validation.check_failed");
				ValidationResult::unverified(self.field.clone())
			}
		};

		let applied = self.guard.apply_if_current(&self.key, generation, || {
			if failed {
				self.metrics.inc_remote_failure();
				// Let the same value be retried by the next change.
				*self.last_value.lock() = None;
			}
			self.slot.send_replace(result);
		});
		if applied.is_some() {
			tracing::debug!(field = %self.field, %generation, "sync.validation.applied");
		}
	}
}
