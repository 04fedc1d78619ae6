//! Category membership classifier
//!
//! A pure predicate over a finalized record. A record whose source URL
//! carries one of the configured category segments is accepted outright;
//! everything else is decided by name keywords, where the allow-list is
//! recall-oriented and the deny-list corrects false positives from adjacent
//! product types that share vocabulary.

use crate::config::ClassifierConfig;
use crate::extract::Product;

/// Decides whether a record belongs to the target category
pub fn accept(product: &Product, rules: &ClassifierConfig) -> bool {
    // Rule 1: URL hint short-circuits the keyword checks
    if rules
        .url_segments
        .iter()
        .any(|segment| product.url.contains(segment.as_str()))
    {
        return true;
    }

    // Rule 2: allow-list, then deny-list, on the lower-cased name
    let name = product.name.to_lowercase();

    let allowed = rules
        .allow_keywords
        .iter()
        .any(|kw| name.contains(&kw.to_lowercase()));
    if !allowed {
        return false;
    }

    let denied = rules
        .deny_keywords
        .iter()
        .any(|kw| name.contains(&kw.to_lowercase()));

    !denied
}
