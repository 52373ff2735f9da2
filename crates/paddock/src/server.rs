//! # Server Host
//!
//! Owns the data director and drives it at the configured tick rate until
//! the tick budget runs out or shutdown is requested.

use std::future::Future;

use anyhow::{Context, Result};
use paddock_data::{DataDirector, FlushStats};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::tick::TickLoop;

/// The game server process.
#[derive(Debug)]
pub struct PaddockServer {
    director: DataDirector,
    tick_loop: TickLoop,
}

impl PaddockServer {
    /// Opens the backing store and creates the director.
    ///
    /// # Errors
    ///
    /// Invalid data configuration or an unreachable backing store.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let director =
            DataDirector::from_config(&config.data).context("failed to start the data director")?;
        Ok(Self {
            director,
            tick_loop: TickLoop::new(config.tick_rate),
        })
    }

    /// The data director.
    pub fn director(&mut self) -> &mut DataDirector {
        &mut self.director
    }

    /// Tick timing.
    #[must_use]
    pub const fn tick_loop(&self) -> &TickLoop {
        &self.tick_loop
    }

    /// Runs one director tick.
    pub fn tick(&mut self) -> FlushStats {
        let start = self.tick_loop.begin_tick();
        let flushed = self.director.tick();
        self.tick_loop.end_tick(start);
        flushed
    }

    /// Ticks until `max_ticks` have run or `shutdown` resolves, then
    /// terminates the director.
    ///
    /// # Errors
    ///
    /// The backing store failed during the final flush.
    pub async fn run<F>(&mut self, max_ticks: Option<u64>, shutdown: F) -> Result<FlushStats>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.tick_loop.tick_duration());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let report_interval = self.tick_loop.report_interval();
        tokio::pin!(shutdown);

        info!(tick = ?self.tick_loop.tick_duration(), "server running");
        loop {
            if max_ticks.is_some_and(|max| self.tick_loop.tick_count() >= max) {
                info!(ticks = self.tick_loop.tick_count(), "tick budget reached");
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    let flushed = self.tick();
                    if flushed.flushed > 0 {
                        debug!(flushed = flushed.flushed, "entities persisted");
                    }
                }
                () = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
            }
            if self.tick_loop.tick_count() % report_interval == 0 {
                self.report();
            }
        }
        self.terminate()
    }

    /// Final flush and backing-store release.
    ///
    /// # Errors
    ///
    /// The backing store failed to terminate.
    pub fn terminate(&mut self) -> Result<FlushStats> {
        let stats = self
            .director
            .terminate()
            .context("failed to terminate the data director")?;
        if stats.failed > 0 {
            warn!(failed = stats.failed, "some entities were not saved");
        }
        self.report();
        Ok(stats)
    }

    fn report(&self) {
        let stats = self.tick_loop.stats();
        info!(
            ticks = stats.total_ticks,
            avg_us = stats.avg_tick_us,
            max_us = stats.max_tick_us,
            late = stats.late_ticks,
            "tick statistics"
        );
    }
}
