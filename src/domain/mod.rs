pub mod day;
pub mod item;

pub use day::{Clock, DayKey, SystemClock};
pub use item::{ItemRecord, RawItem};
