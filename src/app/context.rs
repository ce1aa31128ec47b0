use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::app::Result;
use crate::config::Config;
use crate::domain::{Clock, SystemClock};
use crate::export::{Exporter, GitPublisher, MarkdownExporter, Publisher};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::roll::DayRoller;
use crate::store::sqlite::SqliteStore;

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub exporter: Arc<dyn Exporter + Send + Sync>,
    pub normalizer: Normalizer,
    pub aggregator: Aggregator,
    pub roller: DayRoller,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    /// Wire the production collaborators described by `config`.
    ///
    /// Failing to open the store is fatal: nothing else can run without it.
    pub fn new(config: Config) -> Result<Self> {
        let db_path = config.db_path()?;
        let store = Arc::new(SqliteStore::new(&db_path)?);
        tracing::debug!("Opened store at {}", db_path.display());

        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.source)?);
        let exporter: Arc<dyn Exporter + Send + Sync> =
            Arc::new(MarkdownExporter::new(&config.export));
        let publisher: Option<Arc<dyn Publisher + Send + Sync>> = if config.publish.enabled {
            Some(Arc::new(GitPublisher::new(
                config.export.output_dir.clone(),
                &config.publish,
            )))
        } else {
            None
        };
        let clock: Arc<dyn Clock> = match config.clock.utc_offset_hours {
            Some(hours) => Arc::new(SystemClock::with_offset_hours(hours)?),
            None => Arc::new(SystemClock::local()),
        };

        Ok(Self::with_parts(
            config, store, fetcher, exporter, publisher, clock,
        ))
    }

    pub fn with_parts(
        config: Config,
        store: Arc<SqliteStore>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        exporter: Arc<dyn Exporter + Send + Sync>,
        publisher: Option<Arc<dyn Publisher + Send + Sync>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let roller = DayRoller::new(exporter.clone(), publisher);

        Self {
            config,
            store,
            fetcher,
            exporter,
            normalizer: Normalizer::new(),
            aggregator: Aggregator::new(),
            roller,
            clock,
        }
    }
}
