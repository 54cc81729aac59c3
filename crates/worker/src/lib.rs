#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Task spawning primitives shared by the sync pipelines.
//!
//! Every task is tagged with a [`TaskClass`] so logs distinguish work that
//! feeds an input the user is typing into from background refresh work.

mod class;
mod join_set;
mod spawn;

pub use class::TaskClass;
pub use join_set::WorkerJoinSet;
pub use spawn::spawn;
