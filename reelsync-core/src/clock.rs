//! Run deadline that stops counting while the operator is being asked
//! something.

use std::future::Future;
use std::pin::pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

use crate::error::{MigrateError, Result};

#[derive(Debug, Default)]
struct Paused {
    total: Duration,
    since: Option<Instant>,
}

impl Paused {
    fn elapsed(&self) -> Duration {
        self.total + self.since.map(|since| since.elapsed()).unwrap_or_default()
    }
}

/// Tracks time spent waiting on prompts so it can be left out of the
/// deadline.
#[derive(Debug, Default)]
pub(crate) struct PromptClock {
    paused: Mutex<Paused>,
}

impl PromptClock {
    fn lock(&self) -> MutexGuard<'_, Paused> {
        self.paused.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Total prompt time so far, including a prompt still open.
    pub(crate) fn paused(&self) -> Duration {
        self.lock().elapsed()
    }

    /// Stop the clock until the returned guard is dropped.
    pub(crate) fn pause(&self) -> PauseGuard<'_> {
        self.lock().since.get_or_insert_with(Instant::now);
        PauseGuard { clock: self }
    }

    /// Run `work`, failing with [`MigrateError::DeadlineExceeded`] once
    /// `limit` of non-prompt time has passed.
    pub(crate) async fn bound<T>(
        &self,
        limit: Duration,
        work: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let start = Instant::now();
        let mut work = pin!(work);
        loop {
            // While a prompt is open the target keeps moving forward, so
            // this only wakes up once per remaining budget.
            let deadline = start + limit + self.paused();
            tokio::select! {
                out = &mut work => return out,
                _ = sleep_until(deadline) => {
                    if Instant::now() >= start + limit + self.paused() {
                        return Err(MigrateError::DeadlineExceeded(limit));
                    }
                }
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct PauseGuard<'a> {
    clock: &'a PromptClock,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        let mut paused = self.clock.lock();
        if let Some(since) = paused.since.take() {
            paused.total += since.elapsed();
        }
    }
}
