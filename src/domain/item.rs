use chrono::{DateTime, TimeZone, Utc};
use html_escape::decode_html_entities;
use serde::{Deserialize, Serialize};

use crate::app::{DailyTopError, Result};

/// One entry of a fetched listing, as delivered by the source API.
///
/// Rank is not part of the payload: the position in the listing is the rank.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub thumbnail: String,
    pub score: i64,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub num_comments: i64,
    #[serde(default)]
    pub gilded: i64,
    #[serde(default)]
    pub created_utc: Option<f64>,
}

/// Durable per-day state of one ranked item.
///
/// `score` is the highest score and `rank` the best (lowest) position seen
/// for this id within the day. `rank` is persisted as `topPosition`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    pub subreddit: String,
    #[serde(default)]
    pub domain: String,
    pub url: String,
    pub permalink: String,
    pub thumbnail: String,
    pub score: i64,
    #[serde(rename = "topPosition")]
    pub rank: u32,
    pub over_18: bool,
    pub num_comments: i64,
    #[serde(default)]
    pub gilded: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl ItemRecord {
    /// Build a record from a listing entry observed at `rank` (1-based).
    pub fn from_observation(raw: RawItem, rank: u32) -> Result<Self> {
        let position = rank as usize;
        if rank == 0 {
            return Err(DailyTopError::MalformedItem {
                position,
                reason: "rank must be at least 1".into(),
            });
        }
        let id = raw.id.trim().to_string();
        if id.is_empty() {
            return Err(DailyTopError::MalformedItem {
                position,
                reason: "empty id".into(),
            });
        }

        let created_at = raw
            .created_utc
            .filter(|ts| ts.is_finite())
            .and_then(|ts| Utc.timestamp_opt(ts as i64, 0).single());

        Ok(Self {
            id,
            title: decode_html_entities(&raw.title).to_string(),
            author: raw.author,
            subreddit: raw.subreddit,
            domain: raw.domain,
            url: decode_html_entities(&raw.url).to_string(),
            permalink: raw.permalink,
            thumbnail: raw.thumbnail,
            score: raw.score,
            rank,
            over_18: raw.over_18,
            num_comments: raw.num_comments,
            gilded: raw.gilded,
            created_at,
        })
    }

    /// Fold a newer observation of the same item into this record.
    ///
    /// Descriptive fields follow the newer observation; score and rank keep
    /// the best values ever seen.
    pub fn merged_with(&self, observed: ItemRecord) -> ItemRecord {
        ItemRecord {
            score: self.score.max(observed.score),
            rank: self.rank.min(observed.rank),
            ..observed
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }

    /// Whether the thumbnail reference points at a real image.
    pub fn has_thumbnail(&self) -> bool {
        !matches!(self.thumbnail.as_str(), "" | "default" | "self")
    }
}
