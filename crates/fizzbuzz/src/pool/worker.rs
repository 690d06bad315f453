use crate::{Deadline, classify};
use tokio::sync::OwnedSemaphorePermit;

/// Body of a single evaluation task.
///
/// The deadline is consulted once, on entry. If it has already elapsed the
/// task skips `n` and returns `None`, leaving its slot empty; otherwise it
/// returns the classification of `n`. There is no second check: a task that
/// got past the entry check always finishes.
///
/// `_permit` is held for the lifetime of the task and released when it drops,
/// on both the skip and the compute path.
pub(crate) fn run_slot(
    n: i64,
    deadline: &Deadline,
    _permit: OwnedSemaphorePermit,
) -> Option<String> {
    if deadline.is_elapsed() {
        #[cfg(feature = "tracing")]
        tracing::trace!("Skipping {n}: deadline elapsed before start");
        return None;
    }

    Some(classify(n))
}
