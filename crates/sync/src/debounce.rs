//! Keyed debounce timers.
//!
//! [`DebounceScheduler::schedule`] arms a timer for a key; scheduling the same
//! key again before it fires clears the previous timer and starts over. At
//! most one timer per key is live at any time, and only the timer still
//! registered for its key when the delay elapses runs its work.
//!
//! Timers are cancelled, never the work: once a timer fires, its work runs to
//! completion even if the key is rescheduled meanwhile. Ordering of results
//! is left to [`crate::guard::ResponseGuard`].
//!
//! Callers filter out empty or invalid inputs before scheduling; the
//! scheduler itself has no notion of validity.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use seedlab_worker::TaskClass;
use tokio_util::sync::CancellationToken;

use crate::metrics::SyncMetrics;

/// A live timer registered for one key.
struct Timer {
	id: u64,
	cancel: CancellationToken,
}

/// Keyed debounce scheduler.
///
/// Dropping the scheduler clears every pending timer.
pub struct DebounceScheduler<K> {
	timers: Arc<Mutex<FxHashMap<K, Timer>>>,
	next_id: AtomicU64,
	metrics: Arc<SyncMetrics>,
}

impl<K> fmt::Debug for DebounceScheduler<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DebounceScheduler").field("pending", &self.timers.lock().len()).finish()
	}
}

impl<K> DebounceScheduler<K>
where
	K: Eq + Hash + Clone + fmt::Display + Send + 'static,
{
	pub fn new(metrics: Arc<SyncMetrics>) -> Self {
		Self {
			timers: Arc::new(Mutex::new(FxHashMap::default())),
			next_id: AtomicU64::new(0),
			metrics,
		}
	}

	/// Runs `work` once `delay` passes without another `schedule` for `key`.
	///
	/// Must be called from within a Tokio runtime.
	pub fn schedule<F, Fut>(&self, key: K, delay: Duration, work: F)
	where
		F: FnOnce() -> Fut + Send + 'static,
		Fut: Future<Output = ()> + Send + 'static,
	{
		let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
		let cancel = CancellationToken::new();

		let previous = self.timers.lock().insert(key.clone(), Timer { id, cancel: cancel.clone() });
		if let Some(previous) = previous {
			previous.cancel.cancel();
			self.metrics.inc_timer_superseded();
			tracing::trace!(%key, superseded = previous.id, timer = id, "sync.debounce.superseded");
		} else {
			tracing::trace!(%key, timer = id, delay_ms = delay.as_millis() as u64, "sync.debounce.armed");
		}

		let timers = Arc::clone(&self.timers);
		seedlab_worker::spawn(TaskClass::Interactive, async move {
			tokio::select! {
				biased;
				_ = cancel.cancelled() => return,
				_ = tokio::time::sleep(delay) => {}
			}

			{
				let mut timers = timers.lock();
				match timers.get(&key) {
					Some(timer) if timer.id == id => {
						timers.remove(&key);
					}
					_ => return,
				}
			}

			tracing::trace!(%key, timer = id, "sync.debounce.fired");
			work().await;
		});
	}

	/// Clears the pending timer for `key` without running it.
	pub fn cancel(&self, key: &K) -> bool {
		let removed = self.timers.lock().remove(key);
		match removed {
			Some(timer) => {
				timer.cancel.cancel();
				tracing::trace!(%key, timer = timer.id, "sync.debounce.cancelled");
				true
			}
			None => false,
		}
	}

	/// Returns true if a timer for `key` has not fired yet.
	pub fn is_pending(&self, key: &K) -> bool {
		self.timers.lock().contains_key(key)
	}

	pub fn pending_count(&self) -> usize {
		self.timers.lock().len()
	}
}

impl<K> DebounceScheduler<K> {
	/// Clears every pending timer. In-flight work is unaffected.
	pub fn reset(&self) {
		let drained: Vec<Timer> = self.timers.lock().drain().map(|(_, timer)| timer).collect();
		if !drained.is_empty() {
			tracing::debug!(cleared = drained.len(), "sync.debounce.reset");
		}
		for timer in drained {
			timer.cancel.cancel();
		}
	}
}

impl<K> Drop for DebounceScheduler<K> {
	fn drop(&mut self) {
		self.reset();
	}
}
