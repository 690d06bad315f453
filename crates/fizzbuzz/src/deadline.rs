use core::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A request-scoped deadline shared by every task of one evaluation.
///
/// The deadline has elapsed once the timeout has passed **or** the request's
/// [`CancellationToken`] has been cancelled (client gone, service shutting
/// down). Tasks consult it exactly once, before doing any work; it never
/// interrupts a task that has already started.
#[derive(Debug, Clone)]
pub struct Deadline {
    expires_at: Instant,
    token: CancellationToken,
}

impl Deadline {
    /// Anchors a deadline `timeout` from now, tied to `token`.
    pub fn after(timeout: Duration, token: CancellationToken) -> Self {
        let now = Instant::now();
        Self {
            // Saturate instead of panicking on absurd timeouts.
            expires_at: now.checked_add(timeout).unwrap_or_else(|| far_future(now)),
            token,
        }
    }

    pub fn is_elapsed(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.expires_at
    }

    pub const fn expires_at(&self) -> Instant {
        self.expires_at
    }
}

fn far_future(now: Instant) -> Instant {
    // Roughly 30 years.
    now + Duration::from_secs(86_400 * 365 * 30)
}
