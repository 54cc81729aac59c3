use std::future::Future;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::TaskClass;

/// Spawns an async task on the current Tokio runtime, tagged with its class.
///
/// The task runs inside a `worker.task` span so events emitted by the work
/// carry the class.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn");
	let span = tracing::trace_span!("worker.task", class = class.as_str());
	tokio::spawn(fut.instrument(span))
}
