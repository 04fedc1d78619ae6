use serde::Deserialize;

/// Main configuration structure for Korzina
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub fetch: FetchConfig,
    pub crawl: CrawlConfig,
    pub extract: ExtractConfig,
    pub location: LocationConfig,
    pub output: OutputConfig,
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
}

/// Fetch client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of in-flight HTTP requests across the whole run
    #[serde(rename = "max-concurrent-requests", default = "default_concurrent_requests")]
    pub max_concurrent_requests: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Catalog discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Origin base URL of the catalog (e.g. "https://shop.example.ru")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Regex a URL path must match to count as a product detail page
    #[serde(rename = "detail-url-pattern", default = "default_detail_pattern")]
    pub detail_url_pattern: String,

    /// Hard per-category ceiling on listing pages requested
    #[serde(rename = "page-ceiling", default = "default_page_ceiling")]
    pub page_ceiling: u32,

    /// Delay between consecutive listing-page requests (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay")]
    pub page_delay_ms: u64,

    /// Default number of accepted records after which the run stops
    #[serde(rename = "target-count", default = "default_target_count")]
    pub target_count: usize,
}

/// Extraction stage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Number of detail URLs handed to each extraction batch
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Concurrent extraction tasks within a batch
    #[serde(rename = "max-concurrent-extractions", default = "default_concurrent_extractions")]
    pub max_concurrent_extractions: u32,

    /// Pause between extraction batches (milliseconds)
    #[serde(rename = "batch-pause-ms", default = "default_batch_pause")]
    pub batch_pause_ms: u64,

    /// Re-fetch attempts when the composition field comes back empty
    #[serde(rename = "composition-retries", default = "default_composition_retries")]
    pub composition_retries: u32,

    /// Backoff before a composition re-fetch (milliseconds)
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

/// Geographic session binding configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    /// External geocoding endpoint; queried with `?q=<address>&format=json`
    #[serde(rename = "geocode-url")]
    pub geocode_url: String,

    /// Path on the origin that binds a delivery location to the session
    #[serde(rename = "bind-path")]
    pub bind_path: String,

    /// Fallback coordinate when geocoding fails (central-city reference)
    #[serde(rename = "default-latitude")]
    pub default_latitude: f64,

    #[serde(rename = "default-longitude")]
    pub default_longitude: f64,
}

/// Output file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV export
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Path of the JSONL export
    #[serde(rename = "jsonl-path")]
    pub jsonl_path: String,
}

/// Category acceptance rules
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// URL path segments that mark a record as in-category unconditionally
    #[serde(rename = "url-segments", default)]
    pub url_segments: Vec<String>,

    /// Lower-cased name keywords that qualify a record
    #[serde(rename = "allow-keywords")]
    pub allow_keywords: Vec<String>,

    /// Lower-cased name keywords that disqualify an allow-matched record
    #[serde(rename = "deny-keywords", default)]
    pub deny_keywords: Vec<String>,
}

/// One catalog category to walk
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    /// Category listing path (e.g. "/catalog/gotovaja-eda/")
    pub path: String,

    /// Human-readable label stamped onto records from this category
    pub label: String,

    /// Per-category cap on discovered product URLs
    #[serde(rename = "max-products", default = "default_max_products")]
    pub max_products: usize,
}

fn default_concurrent_requests() -> u32 {
    8
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_detail_pattern() -> String {
    r"^/goods/.+\.html$".to_string()
}

fn default_page_ceiling() -> u32 {
    60
}

fn default_page_delay() -> u64 {
    150
}

fn default_target_count() -> usize {
    100
}

fn default_batch_size() -> usize {
    20
}

fn default_concurrent_extractions() -> u32 {
    6
}

fn default_batch_pause() -> u64 {
    500
}

fn default_composition_retries() -> u32 {
    1
}

fn default_retry_backoff() -> u64 {
    400
}

fn default_max_products() -> usize {
    500
}
