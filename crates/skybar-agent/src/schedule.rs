//! Hour-aligned refresh scheduling.
//!
//! Each arm computes the next top-of-hour boundary from wall-clock now,
//! so a delayed fire never accumulates drift into later ones.

use chrono::{DateTime, Duration, Timelike, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Scheduling errors
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Calendar arithmetic failed computing the next refresh from {now}")]
    TimeArithmetic { now: DateTime<Utc> },
}

impl ScheduleError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ScheduleError::TimeArithmetic { .. } => {
                "Could not schedule the next refresh. Updates resume on the next location change."
            }
        }
    }
}

/// Compute the next top-of-hour boundary strictly after `now`:
/// advance one hour, then truncate minutes and seconds.
pub fn next_top_of_hour(now: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
    now.checked_add_signed(Duration::hours(1))
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .ok_or(ScheduleError::TimeArithmetic { now })
}

/// Owns the single outstanding refresh timer.
///
/// Arming replaces any previously armed timer. Invalidation is a
/// generation bump checked again at fire time, so a superseded callback
/// cannot run even if its sleep already expired when the abort lands.
#[derive(Debug)]
pub struct RefreshScheduler {
    generation: Arc<AtomicU64>,
    armed: Option<ArmedTimer>,
}

#[derive(Debug)]
struct ArmedTimer {
    handle: JoinHandle<()>,
    next_fire: DateTime<Utc>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            armed: None,
        }
    }

    /// Arm a one-shot refresh for the next top-of-hour boundary,
    /// cancelling any previously armed timer first.
    ///
    /// On success returns the instant the timer will fire. On failure no
    /// timer is armed and the caller decides how to keep updates alive.
    pub fn schedule_next<F>(
        &mut self,
        now: DateTime<Utc>,
        on_fire: F,
    ) -> Result<DateTime<Utc>, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        let next = next_top_of_hour(now)?;
        self.cancel();

        let generation = self.generation.load(Ordering::SeqCst);
        let generation_at_fire = Arc::clone(&self.generation);
        let delay = (next - now).to_std().unwrap_or_default();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation_at_fire.load(Ordering::SeqCst) == generation {
                on_fire();
            }
        });

        self.armed = Some(ArmedTimer {
            handle,
            next_fire: next,
        });
        tracing::debug!(next_fire = %next, "Armed hourly refresh");
        Ok(next)
    }

    /// Disarm without rearming. A cancelled timer's callback never runs.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(prev) = self.armed.take() {
            prev.handle.abort();
        }
    }

    /// When the armed timer will fire, if one is armed.
    pub fn next_fire(&self) -> Option<DateTime<Utc>> {
        self.armed.as_ref().map(|t| t.next_fire)
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}
