//! Day-boundary detection and finalization.
//!
//! The current-day marker lives in the store and is re-read every cycle,
//! so a restarted process picks up exactly where the previous one stopped.

use std::sync::Arc;

use crate::app::Result;
use crate::domain::{DayKey, ItemRecord};
use crate::export::{Exporter, Publisher};
use crate::store::Store;

/// Result of one roll check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollOutcome {
    /// No marker existed; `today` was recorded and nothing was exported.
    FirstRun { today: DayKey },
    SameDay,
    Rolled {
        previous: DayKey,
        today: DayKey,
        /// Days whose export succeeded, in calendar order
        exported: Vec<DayKey>,
        /// Days whose export failed; they are not retried automatically
        failed: Vec<DayKey>,
    },
}

/// A finalized bucket, best score first.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub day: DayKey,
    pub records: Vec<ItemRecord>,
}

impl Snapshot {
    /// Read a bucket and order it by score, descending. Equal scores keep
    /// their insertion order.
    pub fn finalize<S: Store + ?Sized>(store: &S, day: &DayKey) -> Result<Self> {
        let mut records = store.records(day)?;
        records.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(Self { day: *day, records })
    }
}

pub struct DayRoller {
    exporter: Arc<dyn Exporter + Send + Sync>,
    publisher: Option<Arc<dyn Publisher + Send + Sync>>,
}

impl DayRoller {
    pub fn new(
        exporter: Arc<dyn Exporter + Send + Sync>,
        publisher: Option<Arc<dyn Publisher + Send + Sync>>,
    ) -> Self {
        Self {
            exporter,
            publisher,
        }
    }

    /// Compare the stored marker with `today` and process at most one rollover.
    ///
    /// Snapshots are read and the marker is advanced before anything is
    /// exported, so a storage error aborts with no export and the rollover
    /// is retried next cycle. Export and publish failures are only logged.
    pub async fn check<S: Store + Sync + ?Sized>(
        &self,
        store: &S,
        today: DayKey,
    ) -> Result<RollOutcome> {
        let previous = match store.get_marker()? {
            None => {
                store.set_marker(&today)?;
                tracing::info!("No current-day marker; starting with {}", today);
                return Ok(RollOutcome::FirstRun { today });
            }
            Some(marker) if marker == today => return Ok(RollOutcome::SameDay),
            Some(marker) => marker,
        };

        tracing::info!("Day rolled over from {} to {}", previous, today);

        let snapshots = Self::days_to_export(store, previous, today)?
            .iter()
            .map(|day| Snapshot::finalize(store, day))
            .collect::<Result<Vec<_>>>()?;

        store.set_marker(&today)?;

        let mut exported = Vec::new();
        let mut failed = Vec::new();

        for snapshot in &snapshots {
            match self.export_snapshot(snapshot).await {
                Ok(()) => exported.push(snapshot.day),
                Err(e) => {
                    tracing::error!("Export of {} failed: {}", snapshot.day, e);
                    failed.push(snapshot.day);
                }
            }
        }

        Ok(RollOutcome::Rolled {
            previous,
            today,
            exported,
            failed,
        })
    }

    /// The previous marker day, followed by any bucket that exists strictly
    /// between it and `today`.
    fn days_to_export<S: Store + ?Sized>(
        store: &S,
        previous: DayKey,
        today: DayKey,
    ) -> Result<Vec<DayKey>> {
        let mut days = vec![previous];

        let mut cursor = previous.next();
        while let Some(day) = cursor {
            if day >= today {
                break;
            }
            if store.has_bucket(&day)? {
                tracing::warn!("Exporting skipped day {}", day);
                days.push(day);
            }
            cursor = day.next();
        }

        Ok(days)
    }

    async fn export_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        tracing::info!(
            "Exporting {} records for {}",
            snapshot.records.len(),
            snapshot.day
        );
        self.exporter.export(&snapshot.day, &snapshot.records)?;

        if let Some(ref publisher) = self.publisher {
            if let Err(e) = publisher.publish(&snapshot.day).await {
                tracing::warn!("Publishing {} failed: {}", snapshot.day, e);
            }
        }

        Ok(())
    }
}
