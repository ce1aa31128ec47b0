//! Merges freshly fetched listings into the current day's bucket.
//!
//! Every id keeps the best values it reached during the day: the highest
//! score and the lowest rank. Items already present in yesterday's bucket
//! are suppressed so long-lived posts do not dominate every snapshot.

use std::collections::HashMap;

use crate::app::Result;
use crate::domain::{DayKey, ItemRecord};
use crate::normalizer::ListingEntry;
use crate::store::Store;

/// Counts describing what one merge did to the bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Items tracked for the first time today
    pub added: usize,
    /// Tracked items whose score or rank improved, or whose metadata changed
    pub updated: usize,
    /// Tracked items the batch did not change
    pub unchanged: usize,
    /// Items skipped because they were in yesterday's bucket
    pub suppressed: usize,
    /// Entries skipped because they could not be parsed
    pub malformed: usize,
}

impl MergeSummary {
    pub fn written(&self) -> usize {
        self.added + self.updated
    }
}

struct Pending {
    record: ItemRecord,
    dirty: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// Merge a ranked batch into `today`'s bucket.
    ///
    /// Rank is the 1-based position in `entries`. All resulting writes are
    /// committed in a single atomic `put_all`; a storage error leaves the
    /// bucket untouched.
    pub fn merge<S: Store + ?Sized>(
        &self,
        store: &S,
        today: &DayKey,
        entries: Vec<ListingEntry>,
    ) -> Result<MergeSummary> {
        let yesterday = today.previous();
        let mut summary = MergeSummary::default();
        let mut pending: Vec<Pending> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();

        for (index, entry) in entries.into_iter().enumerate() {
            let rank = u32::try_from(index + 1).unwrap_or(u32::MAX);

            let candidate = match entry.and_then(|raw| ItemRecord::from_observation(raw, rank)) {
                Ok(candidate) => candidate,
                Err(e) => {
                    tracing::warn!("Skipping listing entry: {}", e);
                    summary.malformed += 1;
                    continue;
                }
            };

            if let Some(ref yesterday) = yesterday {
                if store.contains(yesterday, &candidate.id)? {
                    tracing::debug!(
                        "Suppressing {} (already ranked on {})",
                        candidate.id,
                        yesterday
                    );
                    summary.suppressed += 1;
                    continue;
                }
            }

            // Repeated id within the same batch folds into the pending record.
            if let Some(&slot) = by_id.get(&candidate.id) {
                let entry = &mut pending[slot];
                let merged = entry.record.merged_with(candidate);
                if merged != entry.record {
                    if !entry.dirty {
                        summary.unchanged -= 1;
                        summary.updated += 1;
                    }
                    entry.record = merged;
                    entry.dirty = true;
                }
                continue;
            }

            let slot = pending.len();
            by_id.insert(candidate.id.clone(), slot);

            match store.get(today, &candidate.id)? {
                Some(stored) => {
                    let merged = stored.merged_with(candidate);
                    let dirty = merged != stored;
                    if dirty {
                        summary.updated += 1;
                    } else {
                        summary.unchanged += 1;
                    }
                    pending.push(Pending {
                        record: merged,
                        dirty,
                    });
                }
                None => {
                    tracing::info!("Tracking new item: {}", candidate.display_title());
                    summary.added += 1;
                    pending.push(Pending {
                        record: candidate,
                        dirty: true,
                    });
                }
            }
        }

        let writes: Vec<ItemRecord> = pending
            .into_iter()
            .filter(|p| p.dirty)
            .map(|p| p.record)
            .collect();

        if !writes.is_empty() {
            store.put_all(today, &writes)?;
        }

        Ok(summary)
    }
}
