//! Pagination walker: per-category product-URL discovery
//!
//! Walks a category listing page by page (`?page=N`), collecting every anchor
//! whose path matches the configured detail-URL shape. The origin repeats the
//! last listing page past the end instead of returning an empty page or an
//! error, so the walk watches for a page that contributes no previously-unseen
//! links (stall detection) in addition to the explicit stop signals.

use crate::config::{CategoryEntry, CrawlConfig};
use crate::crawler::FetchClient;
use crate::url::{resolve_href, DetailUrlMatcher, UrlSet};
use scraper::{Html, Selector};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use url::Url;

/// Why a category walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEnd {
    /// A page yielded zero previously-unseen detail links
    Stalled,

    /// The origin answered with a non-2xx status
    NonOkStatus(u16),

    /// The category's product cap was reached
    CapReached,

    /// The hard page ceiling was exhausted without another stop signal
    PageCeiling,

    /// A transport error ended the walk with whatever was found so far
    TransportError,

    /// The external stop flag was raised
    Stopped,
}

/// Result of walking one category
#[derive(Debug)]
pub struct CategoryWalk {
    /// Deduplicated product-detail URLs, in discovery order
    pub urls: UrlSet,

    /// Listing pages actually fetched
    pub pages_fetched: u32,

    /// The stop signal that ended the walk
    pub end: WalkEnd,
}

/// Discovers product-detail URLs for one category
///
/// Best-effort: a failed page fetch ends the walk and yields whatever was
/// found before the failure. Stall and non-2xx endings are logged distinctly
/// so live traffic can tell the two apart.
pub async fn discover(
    client: &FetchClient,
    base: &Url,
    crawl: &CrawlConfig,
    matcher: &DetailUrlMatcher,
    category: &CategoryEntry,
    stop: &AtomicBool,
) -> CategoryWalk {
    let mut urls = UrlSet::new();
    let mut pages_fetched = 0;
    let mut end = WalkEnd::PageCeiling;

    for page in 1..=crawl.page_ceiling {
        if stop.load(Ordering::Relaxed) {
            end = WalkEnd::Stopped;
            break;
        }

        let page_url = match listing_url(base, &category.path, page) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("category '{}': bad listing URL: {}", category.path, e);
                end = WalkEnd::TransportError;
                break;
            }
        };

        let response = match client.get(&page_url).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("category '{}' page {}: {}", category.path, page, e);
                end = WalkEnd::TransportError;
                break;
            }
        };
        pages_fetched += 1;

        if !response.is_success() {
            tracing::warn!(
                "category '{}' walk ended by HTTP {} on page {}",
                category.path,
                response.status,
                page
            );
            end = WalkEnd::NonOkStatus(response.status.as_u16());
            break;
        }

        let added = collect_detail_links(&response.body, &response.final_url, matcher, &mut urls);
        tracing::debug!(
            "category '{}' page {}: {} new links ({} total)",
            category.path,
            page,
            added,
            urls.len()
        );

        if added == 0 {
            tracing::info!(
                "category '{}' walk stalled on page {} with {} URLs (no unseen links)",
                category.path,
                page,
                urls.len()
            );
            end = WalkEnd::Stalled;
            break;
        }

        if urls.len() >= category.max_products {
            tracing::info!(
                "category '{}' reached its product cap ({}) on page {}",
                category.path,
                category.max_products,
                page
            );
            end = WalkEnd::CapReached;
            break;
        }

        // Deliberate self-rate-limit between listing pages, independent of
        // the fetch client's admission gate.
        if page < crawl.page_ceiling {
            tokio::time::sleep(Duration::from_millis(crawl.page_delay_ms)).await;
        }
    }

    if end == WalkEnd::PageCeiling {
        tracing::info!(
            "category '{}' hit the page ceiling ({}) with {} URLs",
            category.path,
            crawl.page_ceiling,
            urls.len()
        );
    }

    CategoryWalk {
        urls,
        pages_fetched,
        end,
    }
}

/// Builds the listing URL for a category page
fn listing_url(base: &Url, category_path: &str, page: u32) -> Result<Url, url::ParseError> {
    let mut url = base.join(category_path)?;
    url.query_pairs_mut().append_pair("page", &page.to_string());
    Ok(url)
}

/// Extracts matching detail links from a listing page into the running set
///
/// Returns the number of previously-unseen links added.
fn collect_detail_links(
    html: &str,
    page_url: &Url,
    matcher: &DetailUrlMatcher,
    urls: &mut UrlSet,
) -> usize {
    let document = Html::parse_document(html);
    let anchor = Selector::parse("a[href]").expect("static selector");

    let mut added = 0;
    for element in document.select(&anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_href(page_url, href) else {
            continue;
        };
        if matcher.is_detail(&resolved) && urls.insert(resolved) {
            added += 1;
        }
    }

    added
}
