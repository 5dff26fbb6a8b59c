//! Per-root sliding-window rate limiting
//!
//! Each job carries its own window of recent fetch timestamps, so one
//! domain's backpressure never throttles another. Admission is a cooperative
//! poll: callers retry `try_admit` on a short fixed interval rather than
//! blocking, and must not hold the job lock across the sleep.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Width of the sliding admission window
pub const WINDOW: Duration = Duration::from_secs(1);

/// Delay between admission attempts while the window is full
pub const ADMIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Sliding buffer of recent fetch admission timestamps for one root
#[derive(Debug, Default)]
pub struct RateWindow {
    samples: VecDeque<Instant>,
}

impl RateWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts one admission at `now`
    ///
    /// Evicts samples older than the window from the head, then admits (and
    /// records `now`) only if fewer than `max_rps` samples remain.
    pub fn try_admit(&mut self, max_rps: u32, now: Instant) -> bool {
        while let Some(&oldest) = self.samples.front() {
            if now.duration_since(oldest) > WINDOW {
                self.samples.pop_front();
            } else {
                break;
            }
        }

        if (self.samples.len() as u32) < max_rps {
            self.samples.push_back(now);
            true
        } else {
            false
        }
    }

    /// Number of admissions currently inside the window
    pub fn in_window(&self) -> usize {
        self.samples.len()
    }
}
