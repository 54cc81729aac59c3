//! Error types for the sync core.
//!
//! Only failures that would leave local state inconsistent with the server
//! reach callers: failed mutations and unreadable notification batches.
//! Transient check/prediction failures degrade to indeterminate slots and
//! stale responses are dropped silently; neither has an error variant here.

use seedlab_primitives::{EntityRef, NotificationId, Status};

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure reported by a remote boundary implementation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RemoteError {
	/// The request never produced a response (connection, timeout, cancelled).
	#[error("transport error: {0}")]
	Transport(String),
	/// The server answered with an error.
	#[error("server rejected request ({code}): {message}")]
	Rejected { code: u16, message: String },
	/// The requested entity or notification does not exist.
	#[error("not found")]
	NotFound,
	/// The response body could not be decoded.
	#[error("decode failed: {0}")]
	Decode(#[from] serde_json::Error),
}

impl RemoteError {
	pub fn transport(msg: impl Into<String>) -> Self {
		Self::Transport(msg.into())
	}

	pub fn rejected(code: u16, message: impl Into<String>) -> Self {
		Self::Rejected { code, message: message.into() }
	}
}

/// Notification feed failures.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FeedError {
	/// The summary batch could not be read.
	#[error("could not load notifications: {0}")]
	Source(#[source] RemoteError),
	/// The notification is not in the current list.
	#[error("unknown notification {0}")]
	UnknownNotification(NotificationId),
	/// A previous mark-read call for the notification has not finished yet.
	#[error("notification {0} is already being marked as read")]
	MarkReadPending(NotificationId),
	/// Marking a notification as read failed; the local flag was restored.
	#[error("could not mark notification {id} as read: {source}")]
	MarkRead {
		id: NotificationId,
		#[source]
		source: RemoteError,
	},
}

/// Status transition failures. Every variant leaves local state at the last
/// confirmed status or an unrelated pending transition.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransitionError {
	/// Another transition for the same entity has not settled yet.
	#[error("{0} already has a status change in progress; wait for it to finish")]
	AlreadyPending(EntityRef),
	/// No notification in the current list refers to the entity.
	#[error("{0} is not part of the current notification list")]
	UnknownEntity(EntityRef),
	/// The server refused or could not apply the change; the optimistic patch was rolled back.
	#[error("could not change {entity} to {attempted} (still {restored}): {source}")]
	Mutation {
		entity: EntityRef,
		attempted: Status,
		restored: Status,
		#[source]
		source: RemoteError,
	},
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The TOML document could not be parsed.
	#[error("invalid sync config: {0}")]
	Parse(#[from] toml::de::Error),
	/// A value is out of range.
	#[error("invalid value for '{field}': {reason}")]
	InvalidValue { field: &'static str, reason: String },
}

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	#[error(transparent)]
	Feed(#[from] FeedError),
	#[error(transparent)]
	Transition(#[from] TransitionError),
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A global tracing subscriber was already installed.
	#[error("tracing init failed: {0}")]
	Telemetry(String),
}
