//! Bounded parallel evaluation of a FizzBuzz range.
//!
//! [`RangeEvaluator`] validates a requested range, fans one task per number
//! out onto its [`WorkerPool`], and fans the results back in to a pre-sized,
//! ordered buffer.
//!
//! ## Behavior
//!
//! - The buffer has exactly one slot per number, indexed by `n - from`, and
//!   starts out filled with empty strings.
//! - Before each task is spawned, the evaluator waits for a permit. At most
//!   `capacity` tasks are runnable at once; the rest wait on the spawning side.
//! - All tasks share one [`Deadline`]. A task that starts after it has elapsed
//!   leaves its slot empty. This is a degraded success, not an error.
//! - Each task returns its value through its own join handle and the evaluator
//!   writes it into the task's pre-assigned slot, so output order never
//!   depends on completion order.
//! - The evaluator always waits for every spawned task before returning.

use crate::{Deadline, Range, Result, WorkerPool};
use core::{fmt, time::Duration};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Per-request limits applied by a [`RangeEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest number of integers a single range may hold.
    pub max_range: usize,
    /// Time budget of one evaluation, measured from its start.
    pub timeout: Duration,
}

impl Limits {
    pub const fn new(max_range: usize, timeout: Duration) -> Self {
        Self { max_range, timeout }
    }
}

/// Evaluates FizzBuzz ranges on a shared [`WorkerPool`].
#[derive(Debug, Clone)]
pub struct RangeEvaluator {
    pool: Arc<WorkerPool>,
    limits: Limits,
}

impl RangeEvaluator {
    pub const fn new(pool: Arc<WorkerPool>, limits: Limits) -> Self {
        Self { pool, limits }
    }

    pub const fn limits(&self) -> Limits {
        self.limits
    }

    pub const fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Parses and validates the bounds of a request against
    /// [`Limits::max_range`].
    pub fn parse_range(&self, from: Option<&str>, to: Option<&str>) -> Result<Range> {
        Range::parse(from, to, self.limits.max_range)
    }

    /// Validates `from..=to` and evaluates it.
    ///
    /// All validation happens before any task is spawned.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`](crate::Error::InvalidInput) if a bound is
    ///   missing or not an integer, or if `from > to`.
    /// - [`Error::RangeTooLarge`](crate::Error::RangeTooLarge) if the range
    ///   exceeds [`Limits::max_range`].
    pub async fn evaluate(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        token: &CancellationToken,
    ) -> Result<Evaluation> {
        let range = self.parse_range(from, to)?;
        Ok(self.evaluate_range(range, token).await)
    }

    /// Evaluates an already validated range.
    ///
    /// `token` cancels the evaluation cooperatively: tasks that have not yet
    /// started when it fires leave their slots empty. Tokens obtained from
    /// [`WorkerPool::request_token`] are also cancelled by pool shutdown.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(from = range.from(), to = range.to())))]
    pub async fn evaluate_range(&self, range: Range, token: &CancellationToken) -> Evaluation {
        let _in_flight = self.pool.track();

        let mut slots = vec![String::new(); range.len()];
        let deadline = Arc::new(Deadline::after(self.limits.timeout, token.clone()));
        let mut offsets = Vec::with_capacity(range.len());
        let mut handles = Vec::with_capacity(range.len());

        for n in range.iter() {
            // Blocks while `capacity` tasks already hold a permit.
            let Some(permit) = self.pool.acquire().await else {
                #[cfg(feature = "tracing")]
                tracing::debug!("Worker pool closed; not spawning {n}..={}", range.to());
                break;
            };

            offsets.push(range.offset(n));
            handles.push(self.pool.spawn(n, Arc::clone(&deadline), permit));
        }

        let joined = futures::future::join_all(handles).await;

        for (offset, result) in offsets.into_iter().zip(joined) {
            match result {
                Ok(Some(value)) => slots[offset] = value,
                Ok(None) => {}
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Task for slot {offset} did not complete: {_e}");
                }
            }
        }

        let evaluation = Evaluation { range, slots };

        #[cfg(feature = "tracing")]
        {
            if !evaluation.is_complete() {
                tracing::debug!(
                    "{} of {} slots skipped after deadline",
                    evaluation.skipped(),
                    range.len()
                );
            }
        }

        evaluation
    }
}

/// The ordered result of evaluating a [`Range`].
///
/// Slot `i` holds the classification of `range.from() + i`, or an empty string
/// if that number was never evaluated. Since every classification is
/// non-empty, an empty slot always means "skipped".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    range: Range,
    slots: Vec<String>,
}

impl Evaluation {
    pub const fn range(&self) -> Range {
        self.range
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn into_slots(self) -> Vec<String> {
        self.slots
    }

    /// Number of slots left empty because their task never ran.
    pub fn skipped(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_empty()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|slot| !slot.is_empty())
    }

    /// Joins the slots with single spaces. Skipped slots show up as empty
    /// tokens, i.e. consecutive spaces.
    pub fn render(&self) -> String {
        self.slots.join(" ")
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests;
