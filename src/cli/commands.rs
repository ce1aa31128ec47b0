use std::path::PathBuf;
use std::sync::Arc;

use crate::app::{AppContext, DailyTopError, Result};
use crate::config::parse_interval;
use crate::domain::DayKey;
use crate::poller::Poller;
use crate::roll::{RollOutcome, Snapshot};
use crate::stats::StatsReport;
use crate::store::Store;

pub async fn run(ctx: Arc<AppContext>, interval: Option<&str>) -> Result<()> {
    let interval_secs = match interval {
        Some(s) => parse_interval(s).map_err(DailyTopError::Config)?,
        None => ctx.config.poll.interval_secs()?,
    };
    if interval_secs == 0 {
        return Err(DailyTopError::Config("Poll interval must be positive".into()));
    }

    Poller::new(ctx, interval_secs).run().await
}

pub async fn run_once(ctx: Arc<AppContext>) -> Result<()> {
    let poller = Poller::new(ctx, 0);
    let report = poller.run_cycle().await?;

    println!(
        "{}: {} new, {} updated, {} unchanged, {} suppressed, {} malformed",
        report.today,
        report.merge.added,
        report.merge.updated,
        report.merge.unchanged,
        report.merge.suppressed,
        report.merge.malformed
    );
    match report.roll {
        RollOutcome::FirstRun { today } => println!("Started tracking on {}", today),
        RollOutcome::SameDay => {}
        RollOutcome::Rolled {
            previous,
            exported,
            failed,
            ..
        } => {
            println!("Rolled over from {}", previous);
            for day in exported {
                println!("  exported {}", day);
            }
            for day in failed {
                println!("  export failed for {}", day);
            }
        }
    }

    Ok(())
}

pub fn status(ctx: &AppContext) -> Result<()> {
    match ctx.store.get_marker()? {
        Some(day) => println!("Current day: {}", day),
        None => println!("Current day: (not set)"),
    }
    println!("Today: {}", ctx.clock.today());

    let days = ctx.store.bucket_days()?;
    if days.is_empty() {
        println!("No stored buckets");
        return Ok(());
    }

    println!("{:<12} {:>8}", "Day", "Records");
    for day in days {
        println!("{:<12} {:>8}", day.label(), ctx.store.bucket_len(&day)?);
    }

    Ok(())
}

/// Export one stored bucket without touching the current-day marker.
pub fn export_day(ctx: &AppContext, day: &str) -> Result<()> {
    let day = DayKey::parse(day)?;
    if !ctx.store.has_bucket(&day)? {
        return Err(DailyTopError::Other(format!("No records stored for {}", day)));
    }

    let snapshot = Snapshot::finalize(ctx.store.as_ref(), &day)?;
    ctx.exporter.export(&snapshot.day, &snapshot.records)?;
    println!("Exported {} records for {}", snapshot.records.len(), day);

    Ok(())
}

pub fn stats(ctx: &AppContext, out: Option<PathBuf>) -> Result<()> {
    let out = out.unwrap_or_else(|| ctx.config.export.output_dir.clone());

    let report = StatsReport::from_store(ctx.store.as_ref())?;
    let paths = report.write_to(&out, &ctx.config.export.link_base)?;

    println!(
        "{} categories across {} records",
        report.categories.len(),
        report.category_list.len()
    );
    for path in paths {
        println!("Wrote {}", path.display());
    }

    Ok(())
}
