use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::app::{DailyTopError, Result};
use crate::config::SourceConfig;
use crate::fetcher::Fetcher;

pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    limit: Option<u32>,
}

impl HttpFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        // A trailing slash makes `join` append instead of replacing the last segment.
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            limit: config.limit,
        })
    }

    /// Listing URL for a source key: `<base>/<key>.json[?limit=N]`.
    pub fn listing_url(&self, source_key: &str) -> Result<Url> {
        let key = source_key.trim().trim_matches('/');
        if key.is_empty() {
            return Err(DailyTopError::Config("Empty source key".into()));
        }

        let mut url = self.base_url.join(&format!("{}.json", key))?;
        if let Some(limit) = self.limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }
        Ok(url)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, source_key: &str) -> Result<Vec<u8>> {
        let url = self.listing_url(source_key)?;
        tracing::debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let body = response.bytes().await?.to_vec();
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, limit: Option<u32>) -> SourceConfig {
        SourceConfig {
            base_url: base_url.into(),
            limit,
            ..SourceConfig::default()
        }
    }

    #[test]
    fn test_listing_url() {
        let fetcher = HttpFetcher::new(&config("https://www.reddit.com/r/", None)).unwrap();
        assert_eq!(
            fetcher.listing_url("all").unwrap().as_str(),
            "https://www.reddit.com/r/all.json"
        );
    }

    #[test]
    fn test_listing_url_without_trailing_slash() {
        let fetcher = HttpFetcher::new(&config("https://www.reddit.com/r", Some(50))).unwrap();
        assert_eq!(
            fetcher.listing_url("/pics/").unwrap().as_str(),
            "https://www.reddit.com/r/pics.json?limit=50"
        );
    }

    #[test]
    fn test_empty_source_key_rejected() {
        let fetcher = HttpFetcher::new(&config("https://www.reddit.com/r/", None)).unwrap();
        assert!(fetcher.listing_url("  ").is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpFetcher::new(&config("not a url", None)).is_err());
    }
}
