use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use crate::app::{DailyTopError, Result};
use crate::config::ExportConfig;
use crate::domain::{DayKey, ItemRecord};
use crate::export::Exporter;

/// Writes one markdown leaderboard per finalized day at
/// `<output_dir>/<YYYY>/<MM>/<MM-DD-YYYY>.md`.
pub struct MarkdownExporter {
    output_dir: PathBuf,
    link_base: String,
    nsfw_image: String,
}

impl MarkdownExporter {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            link_base: config.link_base.trim_end_matches('/').to_string(),
            nsfw_image: config.nsfw_image.clone(),
        }
    }

    pub fn path_for(&self, day: &DayKey) -> PathBuf {
        self.output_dir
            .join(day.year())
            .join(day.month())
            .join(format!("{}.md", day.label()))
    }

    pub fn render(&self, records: &[ItemRecord]) -> String {
        let mut out = String::new();
        let base = &self.link_base;

        for (index, record) in records.iter().enumerate() {
            // Writing to a String cannot fail.
            let _ = writeln!(
                out,
                "## {}. [{}]({}{}) - {}",
                index + 1,
                record.display_title(),
                base,
                record.permalink,
                record.score
            );
            let _ = writeln!(
                out,
                "#### [r/{sub}]({base}/r/{sub}) - [u/{author}]({base}/u/{author}) - {comments} Comments - Top position achieved: {rank}",
                sub = record.subreddit,
                base = base,
                author = record.author,
                comments = record.num_comments,
                rank = record.rank
            );
            out.push('\n');

            if !record.has_thumbnail() {
                continue;
            }

            let image = if record.over_18 {
                &self.nsfw_image
            } else {
                &record.thumbnail
            };
            let _ = writeln!(
                out,
                "<a href=\"{}\"><img src=\"{}\"></img></a>\n",
                record.url, image
            );
        }

        out
    }
}

impl Exporter for MarkdownExporter {
    fn export(&self, day: &DayKey, records: &[ItemRecord]) -> Result<()> {
        let path = self.path_for(day);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DailyTopError::Export(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        fs::write(&path, self.render(records)).map_err(|e| {
            DailyTopError::Export(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::info!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }
}
