//! Runtime counters for the sync core.
//!
//! All counters use relaxed ordering; they exist for debug displays and
//! tests, not for control flow.

use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counters, typically held in an `Arc` by every pipeline of a screen.
#[derive(Debug, Default)]
pub struct SyncMetrics {
	/// Debounce timers cleared before they fired.
	timers_superseded: AtomicU64,
	/// Remote checks and predictions issued.
	requests_issued: AtomicU64,
	/// Resolved results dropped because a newer request was issued.
	stale_discarded: AtomicU64,
	/// Checks and predictions that failed and degraded to indeterminate.
	remote_failures: AtomicU64,
	/// Per-entity fetches that failed during reconciliation.
	fetch_failures: AtomicU64,
	/// Reconciliation passes whose map was applied.
	reconcile_passes: AtomicU64,
	/// Optimistic patches reverted after a failed mutation.
	rollbacks: AtomicU64,
}

impl SyncMetrics {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn inc_timer_superseded(&self) {
		self.timers_superseded.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_request(&self) {
		self.requests_issued.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_stale(&self) {
		self.stale_discarded.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_remote_failure(&self) {
		self.remote_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub fn add_fetch_failures(&self, count: u64) {
		self.fetch_failures.fetch_add(count, Ordering::Relaxed);
	}

	pub fn inc_reconcile_pass(&self) {
		self.reconcile_passes.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_rollback(&self) {
		self.rollbacks.fetch_add(1, Ordering::Relaxed);
	}

	pub fn timers_superseded_count(&self) -> u64 {
		self.timers_superseded.load(Ordering::Relaxed)
	}

	pub fn requests_issued_count(&self) -> u64 {
		self.requests_issued.load(Ordering::Relaxed)
	}

	pub fn stale_discarded_count(&self) -> u64 {
		self.stale_discarded.load(Ordering::Relaxed)
	}

	pub fn remote_failure_count(&self) -> u64 {
		self.remote_failures.load(Ordering::Relaxed)
	}

	pub fn fetch_failure_count(&self) -> u64 {
		self.fetch_failures.load(Ordering::Relaxed)
	}

	pub fn reconcile_pass_count(&self) -> u64 {
		self.reconcile_passes.load(Ordering::Relaxed)
	}

	pub fn rollback_count(&self) -> u64 {
		self.rollbacks.load(Ordering::Relaxed)
	}
}
