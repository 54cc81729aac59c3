#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Core types for the seedlab sync core: entity references, notification
//! summaries, form-field validation results, and prediction payloads.

/// Authoritative entity status and weak entity references.
pub mod entity;
/// Form-field keys and validation results.
pub mod field;
/// Identifier types for notifications and entities.
pub mod ids;
/// Prediction inputs and results.
pub mod prediction;
/// Lightweight notification summaries.
pub mod record;

pub use entity::{EntityKind, EntityRef, EntityStatus, Status};
pub use field::{Availability, FieldKey, ValidationResult};
pub use ids::{EntityId, NotificationId};
pub use prediction::{PredictionInput, PredictionResult};
pub use record::SummaryRecord;
