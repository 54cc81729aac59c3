#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Synchronization core for seedlab's forms and notification screens.
//!
//! Two families of asynchronous derived state live here:
//!
//! - Debounced, race-free remote computations keyed off form fields:
//!   [`FieldValidator`] (availability checks) and [`PredictionPipeline`]
//!   (completion estimates). Both are created from a [`FormSession`], which
//!   owns the shared [`DebounceScheduler`] and [`ResponseGuard`] and tears
//!   them down together.
//! - Reconciliation of notification summaries against per-entity fetches:
//!   [`Reconciler`] builds a [`SyncMap`] with partial-failure tolerance and
//!   [`NotificationFeed`] layers cached, confirmed, and optimistic statuses,
//!   including optimistic status transitions with rollback.
//!
//! The remote API is abstracted by the traits in [`remote`]. All futures
//! must run inside a Tokio runtime; timers use `tokio::time`, so tests can
//! drive them with a paused clock.

pub mod config;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod guard;
pub mod key;
pub mod metrics;
pub mod prediction;
pub mod reconcile;
pub mod remote;
pub mod session;
pub mod telemetry;
#[cfg(test)]
mod test_support;
pub mod validation;

pub use config::SyncConfig;
pub use debounce::DebounceScheduler;
pub use error::{ConfigError, Error, FeedError, RemoteError, Result, TransitionError};
pub use feed::{
	FeedCounts, FeedEvent, FeedFilter, FeedItem, NotificationFeed, PassOutcome, ResolvedStatus, StatusClass, StatusClassifier, StatusSource,
};
pub use guard::{Generation, ResponseGuard};
pub use key::TaskKey;
pub use metrics::SyncMetrics;
pub use prediction::{PredictionPipeline, PredictionState};
pub use reconcile::{Reconciler, SyncMap};
pub use remote::{AvailabilityCheck, EntityService, Predictor, SummarySource};
pub use session::FormSession;
pub use telemetry::init_tracing;
pub use validation::FieldValidator;
