use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::Instrument;

use crate::TaskClass;

/// Fan-out/fan-in set of classified tasks with an optional concurrency cap.
///
/// Tasks beyond the cap are spawned immediately but wait for a permit before
/// their future is polled, so at most `limit` of them run at once. Dropping
/// the set aborts every task still in it.
#[derive(Debug)]
pub struct WorkerJoinSet<T> {
	class: TaskClass,
	permits: Option<Arc<Semaphore>>,
	inner: JoinSet<T>,
}

impl<T> WorkerJoinSet<T>
where
	T: Send + 'static,
{
	/// Creates an empty, unbounded set for the given task class.
	pub fn new(class: TaskClass) -> Self {
		Self {
			class,
			permits: None,
			inner: JoinSet::new(),
		}
	}

	/// Creates an empty set running at most `limit` tasks concurrently.
	///
	/// A `limit` of zero is treated as one.
	pub fn with_limit(class: TaskClass, limit: usize) -> Self {
		Self {
			class,
			permits: Some(Arc::new(Semaphore::new(limit.max(1)))),
			inner: JoinSet::new(),
		}
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Spawns a future into the set on the current runtime.
	pub fn spawn<F>(&mut self, fut: F)
	where
		F: Future<Output = T> + Send + 'static,
	{
		tracing::trace!(worker_class = self.class.as_str(), pending = self.inner.len(), "worker.join_set.spawn");
		let span = tracing::trace_span!("worker.task", class = self.class.as_str());
		match self.permits.clone() {
			Some(permits) => {
				self.inner.spawn(
					async move {
						// Acquisition only fails on a closed semaphore; this one is never closed.
						let _permit = permits.acquire_owned().await.ok();
						fut.await
					}
					.instrument(span),
				);
			}
			None => {
				self.inner.spawn(fut.instrument(span));
			}
		}
	}

	/// Waits for the next completed task; `None` once the set is empty.
	pub async fn join_next(&mut self) -> Option<Result<T, JoinError>> {
		self.inner.join_next().await
	}
}
