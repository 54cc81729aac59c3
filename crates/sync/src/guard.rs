//! Generation-gated application of asynchronous results.
//!
//! Every request issues a generation for its key before it starts and checks
//! it before applying its result. Only the most recently issued generation
//! may apply; responses that resolve out of order are dropped. Superseded
//! requests are never cancelled, their results are just discarded.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::metrics::SyncMetrics;

/// Generation number issued for one request under one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for Generation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "g{}", self.0)
	}
}

/// Per-key generation counters.
///
/// Counters only move forward, including across [`Self::reset`], so a
/// generation handed out before a reset can never become current again.
pub struct ResponseGuard<K> {
	counters: Mutex<FxHashMap<K, u64>>,
	metrics: Arc<SyncMetrics>,
}

impl<K> fmt::Debug for ResponseGuard<K>
where
	K: fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResponseGuard").field("counters", &*self.counters.lock()).finish()
	}
}

impl<K> ResponseGuard<K>
where
	K: Eq + Hash + Clone + fmt::Display,
{
	pub fn new(metrics: Arc<SyncMetrics>) -> Self {
		Self {
			counters: Mutex::new(FxHashMap::default()),
			metrics,
		}
	}

	/// Increments and returns the generation for `key`.
	pub fn issue(&self, key: &K) -> Generation {
		let mut counters = self.counters.lock();
		let counter = counters.entry(key.clone()).or_insert(0);
		*counter += 1;
		Generation(*counter)
	}

	/// Returns whether `generation` is still the latest for `key`.
	pub fn is_current(&self, key: &K, generation: Generation) -> bool {
		self.counters.lock().get(key) == Some(&generation.0)
	}

	/// Makes every outstanding generation for `key` stale without issuing work.
	pub fn invalidate(&self, key: &K) {
		self.issue(key);
	}

	/// Runs `apply` only if `generation` is current for `key`.
	///
	/// The check and `apply` run under the counter lock, so no newer request
	/// can be issued in between. `apply` must not call back into this guard.
	pub fn apply_if_current<R>(&self, key: &K, generation: Generation, apply: impl FnOnce() -> R) -> Option<R> {
		let counters = self.counters.lock();
		if counters.get(key) != Some(&generation.0) {
			drop(counters);
			self.metrics.inc_stale();
			tracing::trace!(%key, %generation, "sync.guard.stale_discarded");
			return None;
		}
		Some(apply())
	}

	/// Invalidates every key. Used on teardown.
	pub fn reset(&self) {
		for counter in self.counters.lock().values_mut() {
			*counter += 1;
		}
	}
}
