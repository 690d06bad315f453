//! Worker pool and per-number task body.
//!
//! - [`manager`] - [`WorkerPool`](manager::WorkerPool): permit pool, task
//!   spawning, and shutdown.
//! - [`worker`] - the deadline-checked unit of work each task runs.

pub mod manager;
pub(crate) mod worker;
