use std::fmt;

use chrono::{FixedOffset, Local, NaiveDate, Utc};

use crate::app::{DailyTopError, Result};

const STORAGE_FORMAT: &str = "%Y-%m-%d";
const LABEL_FORMAT: &str = "%m-%d-%Y";

/// A calendar day naming one bucket of records.
///
/// Stored as `YYYY-MM-DD` so keys sort chronologically; exported files use
/// the `MM-DD-YYYY` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Key used for persistence.
    pub fn storage_key(&self) -> String {
        self.0.format(STORAGE_FORMAT).to_string()
    }

    /// Label used for exported snapshot names.
    pub fn label(&self) -> String {
        self.0.format(LABEL_FORMAT).to_string()
    }

    pub fn year(&self) -> String {
        self.0.format("%Y").to_string()
    }

    pub fn month(&self) -> String {
        self.0.format("%m").to_string()
    }

    pub fn previous(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    pub fn next(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// Parse either the storage form (`2024-03-09`) or the label form (`03-09-2024`).
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, STORAGE_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(s, LABEL_FORMAT))
            .map(Self)
            .map_err(|_| DailyTopError::Other(format!("Invalid day: {}", s)))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Source of the current calendar day.
pub trait Clock: Send + Sync {
    fn today(&self) -> DayKey;
}

/// Wall clock pinned to one UTC offset for the lifetime of the process.
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Capture the local offset once, so DST changes cannot move the day mid-run.
    pub fn local() -> Self {
        Self {
            offset: *Local::now().offset(),
        }
    }

    pub fn with_offset_hours(hours: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(hours * 3600).ok_or_else(|| {
            DailyTopError::Config(format!("UTC offset out of range: {}h", hours))
        })?;
        Ok(Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Clock for SystemClock {
    fn today(&self) -> DayKey {
        DayKey(Utc::now().with_timezone(&self.offset).date_naive())
    }
}
