use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Matches URL paths against the configured product-detail shape
///
/// The catalog links every product detail page under a recognizable path
/// convention (by default `/goods/<slug>.html`). Listing pages, banners and
/// service links fall outside the pattern and are skipped during discovery.
#[derive(Debug, Clone)]
pub struct DetailUrlMatcher {
    pattern: Regex,
}

impl DetailUrlMatcher {
    /// Compiles a matcher from the configured pattern
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
        Ok(Self { pattern })
    }

    /// Returns true when the URL path looks like a product detail page
    pub fn is_detail(&self, url: &Url) -> bool {
        self.pattern.is_match(url.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> DetailUrlMatcher {
        DetailUrlMatcher::new(r"^/goods/.+\.html$").unwrap()
    }

    #[test]
    fn test_detail_url_matches() {
        let url = Url::parse("https://shop.example.ru/goods/salat-olivie.html").unwrap();
        assert!(matcher().is_detail(&url));
    }

    #[test]
    fn test_nested_detail_url_matches() {
        let url = Url::parse("https://shop.example.ru/goods/salaty/olivie-500g.html").unwrap();
        assert!(matcher().is_detail(&url));
    }

    #[test]
    fn test_listing_url_rejected() {
        let url = Url::parse("https://shop.example.ru/catalog/gotovaja-eda/?page=3").unwrap();
        assert!(!matcher().is_detail(&url));
    }

    #[test]
    fn test_service_url_rejected() {
        let url = Url::parse("https://shop.example.ru/goods/").unwrap();
        assert!(!matcher().is_detail(&url));
    }

    #[test]
    fn test_bad_pattern_is_config_error() {
        assert!(matches!(
            DetailUrlMatcher::new("([unclosed"),
            Err(ConfigError::InvalidPattern(_))
        ));
    }
}
