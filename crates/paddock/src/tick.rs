//! # Tick Loop
//!
//! Fixed-rate timing and statistics for the director tick.
//!
//! ## Design
//!
//! The host waits on a tokio interval; this type only measures. A tick that
//! takes longer than its budget is counted as late, and the interval skips
//! the ticks it missed instead of bursting to catch up.

use std::time::{Duration, Instant};

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStats {
    /// Minimum tick duration observed.
    pub min_tick_us: u64,
    /// Maximum tick duration observed.
    pub max_tick_us: u64,
    /// Average tick duration (rolling).
    pub avg_tick_us: u64,
    /// Ticks that took longer than the budget.
    pub late_ticks: u64,
    /// Total ticks measured.
    pub total_ticks: u64,
}

impl TickStats {
    fn new(tick_duration: Duration) -> Self {
        Self {
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            avg_tick_us: duration_us(tick_duration),
            late_ticks: 0,
            total_ticks: 0,
        }
    }
}

/// Fixed-rate tick controller.
#[derive(Debug)]
pub struct TickLoop {
    /// Target tick duration.
    tick_duration: Duration,
    /// Total ticks started.
    tick_count: u64,
    /// Timing statistics.
    stats: TickStats,
}

impl TickLoop {
    /// Creates a tick loop running `tick_rate` times per second.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        let tick_duration = Duration::from_micros(1_000_000 / u64::from(tick_rate.max(1)));
        Self {
            tick_duration,
            tick_count: 0,
            stats: TickStats::new(tick_duration),
        }
    }

    /// Marks the start of a tick.
    #[must_use]
    pub fn begin_tick(&mut self) -> Instant {
        self.tick_count += 1;
        Instant::now()
    }

    /// Marks the end of a tick started at `start`.
    pub fn end_tick(&mut self, start: Instant) {
        let duration = start.elapsed();
        let duration_us = duration_us(duration);

        self.stats.total_ticks += 1;
        self.stats.min_tick_us = self.stats.min_tick_us.min(duration_us);
        self.stats.max_tick_us = self.stats.max_tick_us.max(duration_us);
        self.stats.avg_tick_us = (self.stats.avg_tick_us * 15 + duration_us) / 16;

        if duration > self.tick_duration {
            self.stats.late_ticks += 1;
        }
    }

    /// Total ticks started.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Timing statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Target tick duration.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Ticks between two statistics reports (every 5 seconds).
    #[must_use]
    pub fn report_interval(&self) -> u64 {
        (5_000_000 / duration_us(self.tick_duration).max(1)).max(1)
    }

    /// Resets statistics.
    pub fn reset_stats(&mut self) {
        self.stats = TickStats::new(self.tick_duration);
    }
}

fn duration_us(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
