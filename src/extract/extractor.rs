//! Detail-page extraction driver
//!
//! Fetches a product detail page, runs every field strategy over the parsed
//! document, and owns the retry-on-incomplete policy: composition is the
//! least reliable field in this catalog, so an empty composition triggers a
//! bounded re-fetch before the record is finalized.

use crate::config::ExtractConfig;
use crate::crawler::FetchClient;
use crate::extract::fields;
use crate::extract::nutrition;
use crate::extract::product::{Product, RawProduct};
use crate::extract::rules::ExtractionRules;
use scraper::Html;
use std::time::Duration;
use url::Url;

/// Runs the extraction strategy chains for detail pages
pub struct Extractor {
    rules: ExtractionRules,
    config: ExtractConfig,
}

impl Extractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            rules: ExtractionRules::new(),
            config,
        }
    }

    /// Extracts a product record from a detail page URL
    ///
    /// Returns None when the page answers non-2xx, when the fetch fails
    /// before any attempt succeeded, or when no attempt produced a name.
    /// An empty composition triggers up to `composition_retries` re-fetches
    /// with a short backoff; the final attempt's record wins.
    pub async fn extract(
        &self,
        client: &FetchClient,
        url: &Url,
        category: &str,
    ) -> Option<Product> {
        let attempts = self.config.composition_retries + 1;
        let mut last: Option<RawProduct> = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
            }

            let response = match client.get(url).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!("detail fetch failed for {}: {}", url, e);
                    // Keep whatever an earlier attempt produced
                    break;
                }
            };

            if !response.is_success() {
                tracing::debug!("detail page {} returned HTTP {}", url, response.status);
                return None;
            }

            let raw = self.extract_from_html(&response.body, url, category);
            let complete = raw.has_composition();
            last = Some(raw);

            if complete {
                break;
            }
            if attempt < attempts {
                tracing::debug!(
                    "composition empty for {}, re-fetching (attempt {}/{})",
                    url,
                    attempt + 1,
                    attempts
                );
            }
        }

        last.and_then(RawProduct::finalize)
    }

    /// Assembles a record from static page content
    ///
    /// Deterministic for identical inputs; all network and retry concerns
    /// live in [`Extractor::extract`].
    pub fn extract_from_html(&self, html: &str, url: &Url, category: &str) -> RawProduct {
        let document = Html::parse_document(html);
        let mut raw = RawProduct::new(url, category);

        raw.name = fields::extract_name(&document).unwrap_or_default();
        raw.price = fields::extract_price(&document, &self.rules);
        raw.photo_url = fields::extract_photo(&document, url);
        raw.composition = fields::extract_composition(&document);
        raw.tags = fields::extract_tags(&document);

        nutrition::structured_pass(&document, &mut raw, &self.rules);
        nutrition::table_pass(&document, &mut raw, &self.rules);
        nutrition::text_pass(&document, &mut raw, &self.rules);

        raw.portion_weight_g = fields::extract_weight(&document, &raw.name, &self.rules);

        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new(ExtractConfig {
            batch_size: 10,
            max_concurrent_extractions: 2,
            batch_pause_ms: 0,
            composition_retries: 1,
            retry_backoff_ms: 0,
        })
    }

    fn detail_url() -> Url {
        Url::parse("https://shop.example.ru/goods/salat-olivie.html").unwrap()
    }

    const DETAIL_PAGE: &str = r#"<html>
        <head><title>Салат Оливье</title></head>
        <body>
            <h1>Салат Оливье 250 г</h1>
            <span class="product-price">199 ₽</span>
            <img src="/upload/goods/salat-olivie.jpg" alt="Салат Оливье" width="600" height="400">
            <p>Состав: картофель, морковь, горошек, майонез</p>
            <table>
                <tr><td>Калорийность</td><td>215</td></tr>
                <tr><td>Белки</td><td>12,5</td></tr>
                <tr><td>Жиры</td><td>8</td></tr>
                <tr><td>Углеводы</td><td>20,4</td></tr>
            </table>
        </body>
    </html>"#;

    #[test]
    fn test_extract_from_html_assembles_record() {
        let raw = extractor().extract_from_html(DETAIL_PAGE, &detail_url(), "Готовая еда");

        assert_eq!(raw.id, "salat-olivie");
        assert_eq!(raw.name, "Салат Оливье 250 г");
        assert_eq!(raw.price, Some(199.0));
        assert_eq!(
            raw.photo_url.as_deref(),
            Some("https://shop.example.ru/upload/goods/salat-olivie.jpg")
        );
        assert_eq!(
            raw.composition.as_deref(),
            Some("Состав: картофель, морковь, горошек, майонез")
        );
        assert_eq!(raw.portion_weight_g, Some(250.0));
        assert_eq!(raw.energy_kcal, Some(215.0));
        assert_eq!(raw.protein_g, Some(12.5));
        assert_eq!(raw.fat_g, Some(8.0));
        assert_eq!(raw.carbs_g, Some(20.4));
    }

    #[test]
    fn test_extract_from_html_is_idempotent() {
        let extractor = extractor();
        let first = extractor.extract_from_html(DETAIL_PAGE, &detail_url(), "Готовая еда");
        let second = extractor.extract_from_html(DETAIL_PAGE, &detail_url(), "Готовая еда");
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_from_html_without_signals() {
        let raw = extractor().extract_from_html(
            "<html><body><p>страница без товара</p></body></html>",
            &detail_url(),
            "Готовая еда",
        );

        assert!(!raw.has_name());
        assert_eq!(raw.price, None);
        assert_eq!(raw.nutrition_filled(), 0);
        assert!(raw.finalize().is_none());
    }
}
