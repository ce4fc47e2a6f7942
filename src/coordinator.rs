// =============================================================================
// coordinator.rs - ONE TASK PER URL, WAIT FOR ALL OF THEM
// =============================================================================
//
// A batch is a list of URLs. For every URL we spawn a fetch unit: a tokio
// task that fetches the page, turns it into text, and - if any text is left -
// drops it into the batch's result channel. Then we wait for every single
// unit to finish, close the channel, and drain it. That's the whole trick.
//
//   urls ──┬─► unit(fetch → extract) ──┐
//          ├─► unit(fetch → extract) ──┼─► bounded channel ─► Vec<String>
//          └─► unit(fetch → extract) ──┘         ▲
//                                                └─ drained after join_all
//
// The channel is sized to the batch, and a unit sends at most once, so no
// unit ever waits on it. Order of the output is whatever order the network
// felt like.
//
// Failures don't cross the unit boundary. A unit that can't fetch, gets an
// empty body, gets a page with no words, or even panics, just contributes
// nothing. The batch itself cannot fail.
//
// Each batch also owns a cancellation signal. If the batch future is dropped
// (typically because the HTTP client hung up), the signal fires and the
// units stop waiting on sockets nobody will ever read from.
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Sender;
use futures::future::join_all;
use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::extractor::TextExtractor;
use crate::fetcher::Fetcher;
use crate::metrics::MetricsCollector;

/// Runs batches. Cheap to share: everything inside is behind an `Arc`.
pub struct BatchCoordinator {
    fetcher: Arc<Fetcher>,
    extractor: Arc<dyn TextExtractor>,
    metrics: Arc<MetricsCollector>,

    /// Per-batch cap on units fetching at the same time. `None` = unbounded.
    max_in_flight: Option<usize>,
}

impl BatchCoordinator {
    pub fn new(
        fetcher: Arc<Fetcher>,
        extractor: Arc<dyn TextExtractor>,
        metrics: Arc<MetricsCollector>,
        max_in_flight: Option<usize>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            metrics,
            max_in_flight,
        }
    }

    /// Fetch every URL concurrently and return the non-empty texts, in no
    /// particular order.
    ///
    /// `proxy` is decided by the caller once per batch and applies to every
    /// unit in it. Completes once every unit has finished, which each fetch
    /// timeout bounds.
    pub async fn run_batch(&self, urls: Vec<String>, proxy: Option<String>) -> Vec<String> {
        let span = info_span!("batch", id = %Uuid::new_v4(), urls = urls.len());
        self.run(urls, proxy).instrument(span).await
    }

    async fn run(&self, urls: Vec<String>, proxy: Option<String>) -> Vec<String> {
        self.metrics.record_batch(urls.len());

        if urls.is_empty() {
            debug!("Empty batch, nothing to fetch");
            return Vec::new();
        }

        let started = Instant::now();
        let requested = urls.len();
        let client = self.fetcher.transport(proxy.as_deref());
        let permits = self.max_in_flight.map(|n| Arc::new(Semaphore::new(n)));

        let (result_tx, result_rx) = crossbeam_channel::bounded::<String>(requested);

        // Nobody ever sends on this. It fires when cancel_tx is dropped, either
        // below after the join or early if this future is dropped mid-batch.
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let handles: Vec<_> = urls
            .into_iter()
            .map(|url| {
                let unit = FetchUnit {
                    url,
                    client: client.clone(),
                    fetcher: Arc::clone(&self.fetcher),
                    extractor: Arc::clone(&self.extractor),
                    metrics: Arc::clone(&self.metrics),
                    results: result_tx.clone(),
                    permits: permits.clone(),
                };
                tokio::spawn(unit.run(cancel_rx.clone()).in_current_span())
            })
            .collect();

        // Only the units hold senders now, so the channel closes with the last
        // of them.
        drop(result_tx);
        drop(cancel_rx);

        for outcome in join_all(handles).await {
            if let Err(e) = outcome {
                if e.is_panic() {
                    self.metrics.increment_panicked();
                    error!(error = %e, "Fetch unit panicked, its URL is dropped");
                } else {
                    warn!(error = %e, "Fetch unit was aborted");
                }
            }
        }

        drop(cancel_tx);

        let contents: Vec<String> = result_rx.try_iter().collect();

        info!(
            requested = requested,
            extracted = contents.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch complete"
        );

        contents
    }
}

/// Everything one unit needs, owned outright. Units share nothing with each
/// other except the result sender.
struct FetchUnit {
    url: String,
    client: reqwest::Client,
    fetcher: Arc<Fetcher>,
    extractor: Arc<dyn TextExtractor>,
    metrics: Arc<MetricsCollector>,
    results: Sender<String>,
    permits: Option<Arc<Semaphore>>,
}

impl FetchUnit {
    async fn run(self, mut cancel: watch::Receiver<bool>) {
        tokio::select! {
            _ = self.work() => {}
            _ = cancel.changed() => {
                self.metrics.increment_cancelled();
                debug!(url = %self.url, "Batch abandoned, unit cancelled");
            }
        }
    }

    async fn work(&self) {
        let _permit = match &self.permits {
            Some(permits) => match permits.acquire().await {
                Ok(permit) => Some(permit),
                Err(_) => return,
            },
            None => None,
        };

        let body = self.fetcher.fetch_with(&self.client, &self.url).await;
        if body.is_empty() {
            return;
        }

        // html2text is CPU-bound; keep it off the async workers.
        let bytes = body.len();
        let extractor = Arc::clone(&self.extractor);
        let text = match tokio::task::spawn_blocking(move || extractor.extract(&body)).await {
            Ok(text) => text,
            Err(e) => {
                if e.is_panic() {
                    self.metrics.increment_panicked();
                    error!(url = %self.url, error = %e, "Extraction panicked, URL dropped");
                }
                String::new()
            }
        };
        if text.is_empty() {
            self.metrics.increment_empty_extractions();
            debug!(url = %self.url, bytes = bytes, "No text in body, URL dropped");
            return;
        }

        // Capacity is the batch size and each unit sends once, so the only
        // way this fails is a batch that has already gone away.
        match self.results.try_send(text) {
            Ok(()) => self.metrics.increment_extracted(),
            Err(e) => debug!(url = %self.url, error = %e, "Result has nowhere to go"),
        }
    }
}
