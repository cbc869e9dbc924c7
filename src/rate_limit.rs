//! Client-side pacing of requests.
//!
//! The limiter keeps the times of the last `queries_per_second` calls. A
//! caller reserves its slot under the lock before sleeping, so concurrent
//! callers on one client (or its clones) line up behind each other instead of
//! all observing the same free window.
//!
//! Only responses that end a call keep their slot. Attempts that are about to
//! be retried, and calls that fail outright, hand their slot back.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
struct Entry {
    at: Instant,
    ticket: u64,
}

#[derive(Debug, Default)]
struct Window {
    /// Sorted by `at`, oldest first.
    entries: VecDeque<Entry>,
    next_ticket: u64,
}

/// A rolling one-second window over recent call times.
#[derive(Debug)]
pub(crate) struct RateLimiter {
    capacity: usize,
    window: Mutex<Window>,
}

/// A reserved place in the window.
///
/// Dropping the slot without [`Slot::commit`] gives the place back, which
/// also covers a call future that is cancelled while it sleeps.
#[derive(Debug)]
pub(crate) struct Slot<'a> {
    limiter: &'a RateLimiter,
    ticket: Option<u64>,
}

impl Slot<'_> {
    /// Keeps the reservation in the window.
    pub(crate) fn commit(mut self) {
        self.ticket = None;
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.limiter.release(ticket);
        }
    }
}

impl RateLimiter {
    /// Creates a limiter allowing `queries_per_second` calls per rolling second.
    ///
    /// A ceiling of zero disables pacing.
    pub(crate) fn new(queries_per_second: usize) -> Self {
        Self {
            capacity: queries_per_second,
            window: Mutex::new(Window {
                entries: VecDeque::with_capacity(queries_per_second.min(1024)),
                next_ticket: 0,
            }),
        }
    }

    /// Reserves a slot and sleeps until it comes due.
    pub(crate) async fn acquire(&self) -> Slot<'_> {
        let (ticket, delay) = self.reserve_at(Instant::now());
        let slot = Slot {
            limiter: self,
            ticket,
        };
        if let Some(delay) = delay {
            tracing::debug!(
                delay_ms = delay.as_millis(),
                queries_per_second = self.capacity,
                "Pacing request to stay under the rate limit"
            );
            tokio::time::sleep(delay).await;
        }
        slot
    }

    /// Claims the earliest instant at or after `now` that keeps the window
    /// within capacity, returning its ticket and how long to wait for it.
    fn reserve_at(&self, now: Instant) -> (Option<u64>, Option<Duration>) {
        if self.capacity == 0 {
            return (None, None);
        }
        let mut window = self.window();
        let at = if window.entries.len() < self.capacity {
            now
        } else {
            match window.entries.pop_front() {
                Some(oldest) => now.max(oldest.at + WINDOW),
                None => now,
            }
        };

        let ticket = window.next_ticket;
        window.next_ticket = window.next_ticket.wrapping_add(1);
        let index = window.entries.partition_point(|entry| entry.at <= at);
        window.entries.insert(index, Entry { at, ticket });

        let delay = at.saturating_duration_since(now);
        (Some(ticket), (!delay.is_zero()).then_some(delay))
    }

    fn release(&self, ticket: u64) {
        self.window().entries.retain(|entry| entry.ticket != ticket);
    }

    fn window(&self) -> MutexGuard<'_, Window> {
        // The window is a plain list of instants; a panic elsewhere cannot corrupt it.
        self.window.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.window().entries.len()
    }
}
