use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::coordinator::BatchCoordinator;
use crate::extractor::{HtmlTextExtractor, TextExtractor};
use crate::fetcher::{FetchSettings, Fetcher};
use crate::metrics::MetricsCollector;

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub coordinator: Arc<BatchCoordinator>,
    pub metrics: Arc<MetricsCollector>,
}

impl AppState {
    /// Wire up fetcher, extractor and coordinator from configuration.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let metrics = Arc::new(MetricsCollector::new());

        let fetcher = Fetcher::new(FetchSettings::from(config.as_ref()), Arc::clone(&metrics))
            .context("failed to build the direct HTTP transport")?;

        let extractor: Arc<dyn TextExtractor> = Arc::new(HtmlTextExtractor::new(config.text_width));

        let coordinator = BatchCoordinator::new(
            Arc::new(fetcher),
            extractor,
            Arc::clone(&metrics),
            config.max_in_flight,
        );

        Ok(Self {
            config,
            coordinator: Arc::new(coordinator),
            metrics,
        })
    }
}
