//! Pipeline orchestrator
//!
//! Drives the full run: bind the location once, walk every category
//! sequentially, union the discovered URL sets, then extract detail pages in
//! fixed-size batches under a second, tighter concurrency gate. Accepted
//! records accumulate behind a single appending lock until the target count
//! is reached or the input is exhausted.

use crate::classify;
use crate::config::Config;
use crate::crawler::location::bind_location;
use crate::crawler::walker::discover;
use crate::crawler::FetchClient;
use crate::extract::{Extractor, Product};
use crate::output::RunStats;
use crate::url::{dedup_key, DetailUrlMatcher};
use crate::Result;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use url::Url;

/// Everything a run produces: the accepted records plus aggregate statistics
#[derive(Debug)]
pub struct PipelineReport {
    pub products: Vec<Product>,
    pub stats: RunStats,
}

/// How one extraction task ended
enum TaskOutcome {
    Accepted,
    Rejected,
    Discarded,
    Skipped,
}

/// Runs the whole pipeline
///
/// The `stop` flag is shared with the caller: an external interrupt raises
/// it, and the pipeline raises it itself the moment the collection reaches
/// the target count. In-flight work finishes naturally either way and
/// everything collected so far is returned.
pub async fn run_pipeline(
    config: &Config,
    address: Option<&str>,
    stop: Arc<AtomicBool>,
) -> Result<PipelineReport> {
    let started_at = Utc::now();
    let base = Url::parse(&config.crawl.base_url)?;
    let matcher = DetailUrlMatcher::new(&config.crawl.detail_url_pattern)?;
    let client = Arc::new(FetchClient::new(config.fetch.clone()));

    // Bind the delivery location before any catalog traffic; the origin
    // scopes availability and pricing to the session's address.
    if let Some(input) = address {
        bind_location(&client, &base, &config.location, input).await;
    }

    // Discovery: categories run to completion one after another, so the only
    // concurrent load during this phase is the walker's own paging.
    let mut seen = HashSet::new();
    let mut queue: Vec<(Url, String)> = Vec::new();
    let mut categories_walked = 0;

    for category in &config.categories {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let walk = discover(&client, &base, &config.crawl, &matcher, category, &stop).await;
        categories_walked += 1;
        tracing::info!(
            "category '{}': {} URLs over {} pages ({:?})",
            category.path,
            walk.urls.len(),
            walk.pages_fetched,
            walk.end
        );
        for url in walk.urls.into_vec() {
            if seen.insert(dedup_key(&url)) {
                queue.push((url, category.label.clone()));
            }
        }
    }

    let urls_discovered = queue.len();
    if queue.is_empty() {
        tracing::warn!("no product URLs discovered, nothing to extract");
        let stats = RunStats::compute(&[], started_at, categories_walked, 0, 0, 0, 0);
        return Ok(PipelineReport {
            products: Vec::new(),
            stats,
        });
    }
    tracing::info!("{} unique detail URLs discovered", urls_discovered);

    // Extraction: batched, with a gate tighter than the fetch client's.
    let target = config.crawl.target_count;
    let extractor = Arc::new(Extractor::new(config.extract.clone()));
    let classifier = Arc::new(config.classifier.clone());
    let results: Arc<Mutex<Vec<Product>>> = Arc::new(Mutex::new(Vec::new()));
    let gate = Arc::new(Semaphore::new(
        config.extract.max_concurrent_extractions as usize,
    ));

    let mut extraction_attempts = 0;
    let mut rejected = 0;
    let mut discarded = 0;

    for batch in queue.chunks(config.extract.batch_size) {
        if stop.load(Ordering::Relaxed) {
            break;
        }

        let mut handles = Vec::with_capacity(batch.len());
        for (url, label) in batch.iter().cloned() {
            let client = Arc::clone(&client);
            let extractor = Arc::clone(&extractor);
            let classifier = Arc::clone(&classifier);
            let results = Arc::clone(&results);
            let gate = Arc::clone(&gate);
            let stop = Arc::clone(&stop);

            handles.push(tokio::spawn(async move {
                let _permit = gate.acquire_owned().await.expect("extraction gate closed");
                if stop.load(Ordering::Relaxed) {
                    return TaskOutcome::Skipped;
                }

                match extractor.extract(&client, &url, &label).await {
                    Some(product) => {
                        if classify::accept(&product, &classifier) {
                            let mut collected = results.lock().await;
                            if collected.len() < target {
                                collected.push(product);
                            }
                            if collected.len() >= target {
                                stop.store(true, Ordering::Relaxed);
                            }
                            TaskOutcome::Accepted
                        } else {
                            tracing::debug!("classifier rejected '{}'", product.name);
                            TaskOutcome::Rejected
                        }
                    }
                    None => TaskOutcome::Discarded,
                }
            }));
        }

        for handle in handles {
            match handle.await {
                Ok(TaskOutcome::Accepted) => extraction_attempts += 1,
                Ok(TaskOutcome::Rejected) => {
                    extraction_attempts += 1;
                    rejected += 1;
                }
                Ok(TaskOutcome::Discarded) => {
                    extraction_attempts += 1;
                    discarded += 1;
                }
                Ok(TaskOutcome::Skipped) => {}
                // A panicking task loses its URL, not the batch
                Err(e) => {
                    tracing::warn!("extraction task failed: {}", e);
                    extraction_attempts += 1;
                    discarded += 1;
                }
            }
        }

        {
            let collected = results.lock().await;
            tracing::info!("collected {}/{} records", collected.len(), target);
        }

        if stop.load(Ordering::Relaxed) {
            break;
        }

        // Self-imposed pause between batches
        tokio::time::sleep(Duration::from_millis(config.extract.batch_pause_ms)).await;
    }

    let products = {
        let mut collected = results.lock().await;
        std::mem::take(&mut *collected)
    };

    let stats = RunStats::compute(
        &products,
        started_at,
        categories_walked,
        urls_discovered,
        extraction_attempts,
        rejected,
        discarded,
    );

    Ok(PipelineReport { products, stats })
}
