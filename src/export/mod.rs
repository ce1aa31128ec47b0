pub mod git;
pub mod markdown;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{DayKey, ItemRecord};

pub use git::GitPublisher;
pub use markdown::MarkdownExporter;

/// Receives a finalized day's records, already sorted by score (best first).
pub trait Exporter {
    fn export(&self, day: &DayKey, records: &[ItemRecord]) -> Result<()>;
}

/// Publishes the output of a successful export.
#[async_trait]
pub trait Publisher {
    async fn publish(&self, day: &DayKey) -> Result<()>;
}
