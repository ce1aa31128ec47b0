//! Cross-day statistics over every stored bucket.
//!
//! Produces a markdown table of categories ranked by how many records they
//! placed, and a flat category list for word-cloud tooling.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::Result;
use crate::domain::ItemRecord;
use crate::store::Store;

pub const COUNTS_FILE: &str = "counts.md";
pub const CATEGORIES_FILE: &str = "subreddits.txt";

#[derive(Debug, Clone)]
pub struct CategoryStats {
    pub name: String,
    pub total: usize,
    /// Highest-scoring record of the category
    pub top: ItemRecord,
}

#[derive(Debug, Clone, Default)]
pub struct StatsReport {
    pub categories: Vec<CategoryStats>,
    /// One entry per record, in store order
    pub category_list: Vec<String>,
}

impl StatsReport {
    pub fn build(records: Vec<ItemRecord>) -> Self {
        let category_list: Vec<String> = records.iter().map(|r| r.subreddit.clone()).collect();

        let mut groups: HashMap<String, (usize, ItemRecord)> = HashMap::new();
        for record in records {
            match groups.get_mut(&record.subreddit) {
                Some((total, top)) => {
                    *total += 1;
                    if record.score > top.score {
                        *top = record;
                    }
                }
                None => {
                    groups.insert(record.subreddit.clone(), (1, record));
                }
            }
        }

        let mut categories: Vec<CategoryStats> = groups
            .into_iter()
            .map(|(name, (total, top))| CategoryStats { name, total, top })
            .collect();
        categories.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

        Self {
            categories,
            category_list,
        }
    }

    /// Collect every record from every bucket in the store.
    pub fn from_store<S: Store + ?Sized>(store: &S) -> Result<Self> {
        let mut records = Vec::new();
        for day in store.bucket_days()? {
            store.for_each(&day, &mut |record| {
                records.push(record);
                Ok(())
            })?;
        }
        Ok(Self::build(records))
    }

    pub fn render_table(&self, link_base: &str) -> String {
        let base = link_base.trim_end_matches('/');
        let mut rows = vec![[
            "Subreddit".to_string(),
            "Total".to_string(),
            "Top Post".to_string(),
            "Score".to_string(),
        ]];
        for category in &self.categories {
            rows.push([
                category.name.clone(),
                category.total.to_string(),
                format!(
                    "[{}]({}{})",
                    escape_cell(category.top.display_title()),
                    base,
                    category.top.permalink
                ),
                category.top.score.to_string(),
            ]);
        }

        let mut widths = [0usize; 4];
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for (index, row) in rows.iter().enumerate() {
            out.push_str(&format_row(&row[..], &widths));
            if index == 0 {
                let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                out.push_str(&format_row(&rule[..], &widths));
            }
        }
        out
    }

    /// Write `counts.md` and `subreddits.txt` into `dir`, replacing earlier runs.
    pub fn write_to(&self, dir: &Path, link_base: &str) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;

        let counts = dir.join(COUNTS_FILE);
        fs::write(&counts, self.render_table(link_base))?;

        let list = dir.join(CATEGORIES_FILE);
        let mut content = self.category_list.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(&list, content)?;

        Ok(vec![counts, list])
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize; 4]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| format!(" {:<width$} ", cell.as_ref(), width = *width))
        .collect();
    format!("|{}|\n", padded.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{day, record};
    use crate::store::SqliteStore;

    fn in_category(id: &str, category: &str, score: i64) -> ItemRecord {
        let mut r = record(id, score, 1);
        r.subreddit = category.into();
        r
    }

    #[test]
    fn test_groups_sorted_by_count() {
        let report = StatsReport::build(vec![
            in_category("a", "pics", 10),
            in_category("b", "news", 50),
            in_category("c", "pics", 30),
            in_category("d", "gaming", 5),
            in_category("e", "pics", 20),
            in_category("f", "news", 1),
        ]);

        let names: Vec<&str> = report.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["pics", "news", "gaming"]);
        assert_eq!(report.categories[0].total, 3);
        assert_eq!(report.categories[0].top.id, "c");
        assert_eq!(report.categories[1].top.id, "b");
        assert_eq!(report.category_list.len(), 6);
    }

    #[test]
    fn test_render_table() {
        let report = StatsReport::build(vec![in_category("a", "pics", 10)]);
        let table = report.render_table("https://www.reddit.com");
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("| Subreddit "));
        assert!(lines[1].starts_with("| ---"));
        assert!(lines[2].contains("[Post a](https://www.reddit.com/r/pics/comments/a/post/)"));
        assert!(lines[2].trim_end().ends_with("| 10    |"));
    }

    #[test]
    fn test_from_store_spans_all_days() {
        let store = SqliteStore::in_memory().unwrap();
        store.put(&day(1), &in_category("a", "pics", 10)).unwrap();
        store.put(&day(2), &in_category("b", "pics", 20)).unwrap();
        store.put(&day(2), &in_category("c", "news", 5)).unwrap();

        let report = StatsReport::from_store(&store).unwrap();
        assert_eq!(report.category_list, vec!["pics", "pics", "news"]);
        assert_eq!(report.categories[0].name, "pics");
        assert_eq!(report.categories[0].total, 2);
    }

    #[test]
    fn test_write_to() {
        let dir = tempfile::tempdir().unwrap();
        let report = StatsReport::build(vec![
            in_category("a", "pics", 10),
            in_category("b", "news", 3),
        ]);

        let paths = report.write_to(dir.path(), "http://reddit.com").unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(
            fs::read_to_string(dir.path().join(CATEGORIES_FILE)).unwrap(),
            "pics\nnews\n"
        );
        assert!(fs::read_to_string(dir.path().join(COUNTS_FILE))
            .unwrap()
            .contains("| news"));
    }
}
