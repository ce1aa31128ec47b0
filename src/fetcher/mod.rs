pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;

/// Retrieves the raw ranked listing for a source key (e.g. a subreddit name).
///
/// The returned body lists entries best-first: position in the listing is
/// the 1-based rank. Rank must never be inferred from any other field.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, source_key: &str) -> Result<Vec<u8>>;
}
