//! Fixed-interval driver: fetch, merge, then check for a day rollover.
//!
//! Cycles never overlap. The interval is a lower bound between cycle starts;
//! an overrunning cycle simply delays the next one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};

use crate::aggregator::MergeSummary;
use crate::app::{AppContext, ErrorCategory, Result};
use crate::config::format_interval;
use crate::domain::DayKey;
use crate::roll::RollOutcome;

/// What a completed cycle did.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub today: DayKey,
    pub merge: MergeSummary,
    pub roll: RollOutcome,
}

pub struct Poller {
    ctx: Arc<AppContext>,
    interval_secs: u64,
    running: Arc<AtomicBool>,
}

impl Poller {
    pub fn new(ctx: Arc<AppContext>, interval_secs: u64) -> Self {
        Self {
            ctx,
            interval_secs,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Run cycles until SIGINT/SIGTERM or [`Poller::stop`].
    ///
    /// Shutdown is only observed between cycles, so a cycle always commits
    /// or aborts as a unit.
    pub async fn run(&self) -> Result<()> {
        tracing::info!(
            "dailytop started (source: {}, interval: {}, PID: {})",
            self.ctx.config.source.key,
            format_interval(self.interval_secs),
            std::process::id()
        );

        let mut timer = interval(Duration::from_secs(self.interval_secs));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = timer.tick() => {}
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }

            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            self.run_logged().await;
        }

        tracing::info!("dailytop shutting down...");
        Ok(())
    }

    /// Run a single cycle and log its outcome; errors never escape.
    pub async fn run_logged(&self) -> Option<CycleReport> {
        let start = Utc::now();

        match self.run_cycle().await {
            Ok(report) => {
                let elapsed = Utc::now().signed_duration_since(start);
                tracing::info!(
                    "Cycle for {} complete: {} new, {} updated, {} unchanged, {} suppressed, {} malformed ({:.1}s)",
                    report.today,
                    report.merge.added,
                    report.merge.updated,
                    report.merge.unchanged,
                    report.merge.suppressed,
                    report.merge.malformed,
                    elapsed.num_milliseconds() as f64 / 1000.0
                );
                Some(report)
            }
            Err(e) => {
                match e.category() {
                    ErrorCategory::Fetch => {
                        tracing::warn!("Fetch failed, cycle skipped: {}", e)
                    }
                    ErrorCategory::Storage => {
                        tracing::error!("Storage failure, cycle aborted: {}", e)
                    }
                    _ => tracing::error!("Cycle failed: {}", e),
                }
                None
            }
        }
    }

    /// Fetch, merge into today's bucket, then check for rollover.
    ///
    /// A fetch or storage error returns before any later step runs.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let ctx = &self.ctx;
        let today = ctx.clock.today();

        let body = ctx.fetcher.fetch(&ctx.config.source.key).await?;
        let entries = ctx.normalizer.normalize(&body)?;
        let merge = ctx.aggregator.merge(ctx.store.as_ref(), &today, entries)?;
        let roll = ctx.roller.check(ctx.store.as_ref(), today).await?;

        Ok(CycleReport { today, merge, roll })
    }

    /// Stop the loop after the current cycle
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
        }
        _ => {
            tracing::warn!("Failed to install signal handlers; falling back to Ctrl-C");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
