//! # dailytop
//!
//! Watches a ranked listing, remembers the best score and best position each
//! entry reached during the day, and publishes the day's leaderboard once the
//! calendar day rolls over.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Normalizer → Aggregator → Store → DayRoller → Exporter → Publisher
//! ```
//!
//! The [`poller`] drives one cycle every interval; cycles never overlap.
//!
//! ## Quick Start
//!
//! ```bash
//! # Poll until interrupted
//! dailytop run
//!
//! # One cycle, then exit
//! dailytop once
//!
//! # Re-export a stored day
//! dailytop export 06-14-2024
//! ```

/// Merges one observed listing into today's bucket.
///
/// Entries already recorded yesterday are suppressed. Scores keep their
/// maximum and ranks their minimum, so repeated merges are idempotent.
pub mod aggregator;

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// fetcher, exporter, and clock.
pub mod app;

/// Command-line interface using clap.
///
/// - `run [--interval]` - Poll until interrupted
/// - `once` - Run one cycle
/// - `status` - Show the marker and stored buckets
/// - `export <day>` - Export a stored bucket
/// - `stats [--out]` - Write category statistics
pub mod cli;

/// TOML configuration, loaded from `~/.config/dailytop/config.toml`.
pub mod config;

/// Core domain models: [`ItemRecord`](domain::ItemRecord) and
/// [`DayKey`](domain::DayKey).
pub mod domain;

/// Leaderboard rendering and publishing.
pub mod export;

/// HTTP retrieval of the ranked listing.
pub mod fetcher;

/// Listing decoding into per-entry results.
pub mod normalizer;

pub mod poller;

/// Day rollover detection and end-of-day export.
pub mod roll;

pub mod stats;

/// SQLite persistence for day buckets and the current-day marker.
pub mod store;
