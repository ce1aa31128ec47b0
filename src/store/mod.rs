pub mod sqlite;

use crate::app::Result;
use crate::domain::{DayKey, ItemRecord};

pub use sqlite::SqliteStore;

/// Durable day-bucketed record storage plus the current-day marker.
pub trait Store {
    // Bucket operations
    fn put(&self, day: &DayKey, record: &ItemRecord) -> Result<()>;
    /// Write all records in one atomic unit: either every record lands or none do.
    fn put_all(&self, day: &DayKey, records: &[ItemRecord]) -> Result<usize>;
    fn get(&self, day: &DayKey, id: &str) -> Result<Option<ItemRecord>>;
    fn contains(&self, day: &DayKey, id: &str) -> Result<bool>;
    /// Visit the bucket's records in first-insertion order.
    fn for_each(&self, day: &DayKey, f: &mut dyn FnMut(ItemRecord) -> Result<()>) -> Result<()>;
    fn has_bucket(&self, day: &DayKey) -> Result<bool>;
    fn bucket_days(&self) -> Result<Vec<DayKey>>;
    fn bucket_len(&self, day: &DayKey) -> Result<usize>;

    // Marker operations
    fn get_marker(&self) -> Result<Option<DayKey>>;
    fn set_marker(&self, day: &DayKey) -> Result<()>;

    fn records(&self, day: &DayKey) -> Result<Vec<ItemRecord>> {
        let mut records = Vec::new();
        self.for_each(day, &mut |record| {
            records.push(record);
            Ok(())
        })?;
        Ok(records)
    }
}
