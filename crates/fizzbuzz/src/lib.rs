#![doc = include_str!("../README.md")]

mod classify;
mod deadline;
mod error;
mod evaluator;
mod pool;
mod range;

pub use crate::classify::*;
pub use crate::deadline::*;
pub use crate::error::*;
pub use crate::evaluator::*;
pub use crate::pool::manager::WorkerPool;
pub use crate::range::*;
