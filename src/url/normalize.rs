use url::Url;

/// Resolves an anchor href against a base URL and filters out non-page targets
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only anchors
/// - javascript:, mailto:, tel: schemes and data: URIs
/// - anything that does not resolve to http(s)
///
/// The fragment of the resolved URL is always dropped.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(mut absolute) => {
            if absolute.scheme() != "http" && absolute.scheme() != "https" {
                return None;
            }
            absolute.set_fragment(None);
            Some(absolute)
        }
        Err(_) => None,
    }
}

/// Produces the deduplication key for a URL: scheme, host, port and path
///
/// Query strings and fragments are ignored so that tracking parameters do not
/// create duplicate entries for the same detail page. A trailing slash is
/// trimmed from non-root paths.
pub fn dedup_key(url: &Url) -> String {
    let mut path = url.path();
    if path.len() > 1 {
        path = path.trim_end_matches('/');
    }

    match url.port() {
        Some(port) => format!(
            "{}://{}:{}{}",
            url.scheme(),
            url.host_str().unwrap_or(""),
            port,
            path
        ),
        None => format!("{}://{}{}", url.scheme(), url.host_str().unwrap_or(""), path),
    }
}
