//! Aggregate run statistics
//!
//! Completeness reporting over the accepted records: how many carry a full
//! nutrition profile, a partial one, or none, and how many have composition
//! text. Used purely for reporting at the end of a run.

use crate::extract::Product;
use chrono::{DateTime, Utc};

/// Aggregate statistics for one pipeline run
#[derive(Debug, Clone)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Categories whose pagination walk ran
    pub categories_walked: usize,

    /// Unique detail URLs discovered across all categories
    pub urls_discovered: usize,

    /// Detail pages handed to the extraction stage
    pub extraction_attempts: usize,

    /// Records accepted by the classifier
    pub accepted: usize,

    /// Records the classifier turned away
    pub rejected: usize,

    /// URLs that produced no record (non-2xx, transport failure, no name)
    pub discarded: usize,

    /// Accepted records with all four nutrition fields
    pub nutrition_full: usize,

    /// Accepted records with exactly three nutrition fields
    pub nutrition_three: usize,

    /// Accepted records with one or two nutrition fields
    pub nutrition_partial: usize,

    /// Accepted records with no nutrition data at all
    pub nutrition_none: usize,

    /// Accepted records with non-empty composition text
    pub with_composition: usize,
}

impl RunStats {
    /// Builds the statistics from the final record collection and run counters
    pub fn compute(
        products: &[Product],
        started_at: DateTime<Utc>,
        categories_walked: usize,
        urls_discovered: usize,
        extraction_attempts: usize,
        rejected: usize,
        discarded: usize,
    ) -> Self {
        let mut nutrition_full = 0;
        let mut nutrition_three = 0;
        let mut nutrition_partial = 0;
        let mut nutrition_none = 0;
        let mut with_composition = 0;

        for product in products {
            match product.nutrition_filled() {
                4 => nutrition_full += 1,
                3 => nutrition_three += 1,
                1 | 2 => nutrition_partial += 1,
                _ => nutrition_none += 1,
            }
            if product.has_composition() {
                with_composition += 1;
            }
        }

        Self {
            started_at,
            finished_at: Utc::now(),
            categories_walked,
            urls_discovered,
            extraction_attempts,
            accepted: products.len(),
            rejected,
            discarded,
            nutrition_full,
            nutrition_three,
            nutrition_partial,
            nutrition_none,
            with_composition,
        }
    }
}

/// Prints the statistics report to stdout
pub fn print_report(stats: &RunStats) {
    let duration = stats.finished_at - stats.started_at;

    println!("=== Korzina Run Report ===\n");

    println!("Run:");
    println!("  Started:  {}", stats.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Finished: {}", stats.finished_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Duration: {}s", duration.num_seconds());
    println!();

    println!("Discovery:");
    println!("  Categories walked: {}", stats.categories_walked);
    println!("  Detail URLs found: {}", stats.urls_discovered);
    println!();

    println!("Extraction:");
    println!("  Pages processed: {}", stats.extraction_attempts);
    println!("  Accepted: {}", stats.accepted);
    println!("  Rejected by classifier: {}", stats.rejected);
    println!("  Discarded: {}", stats.discarded);
    println!();

    println!("Nutrition completeness (of {} accepted):", stats.accepted);
    println!(
        "  4/4 fields: {} ({})",
        stats.nutrition_full,
        percentage(stats.nutrition_full, stats.accepted)
    );
    println!(
        "  3/4 fields: {} ({})",
        stats.nutrition_three,
        percentage(stats.nutrition_three, stats.accepted)
    );
    println!(
        "  1-2/4 fields: {} ({})",
        stats.nutrition_partial,
        percentage(stats.nutrition_partial, stats.accepted)
    );
    println!(
        "  0/4 fields: {} ({})",
        stats.nutrition_none,
        percentage(stats.nutrition_none, stats.accepted)
    );
    println!(
        "  With composition: {} ({})",
        stats.with_composition,
        percentage(stats.with_composition, stats.accepted)
    );
}

fn percentage(part: usize, whole: usize) -> String {
    if whole == 0 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", (part as f64 / whole as f64) * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RawProduct;
    use url::Url;

    fn product(nutrition_fields: usize, composition: bool) -> Product {
        let url = Url::parse("https://shop.example.ru/goods/x.html").unwrap();
        let mut raw = RawProduct::new(&url, "Готовая еда");
        raw.name = "Салат".to_string();

        if nutrition_fields >= 1 {
            raw.energy_kcal = Some(215.0);
        }
        if nutrition_fields >= 2 {
            raw.protein_g = Some(12.5);
        }
        if nutrition_fields >= 3 {
            raw.fat_g = Some(8.0);
        }
        if nutrition_fields >= 4 {
            raw.carbs_g = Some(20.0);
        }
        if composition {
            raw.composition = Some("Состав: овощи".to_string());
        }

        raw.finalize().unwrap()
    }

    #[test]
    fn test_bucket_counts() {
        let products = vec![
            product(4, true),
            product(3, false),
            product(2, true),
            product(1, false),
            product(0, false),
        ];

        let stats = RunStats::compute(&products, Utc::now(), 1, 10, 8, 2, 1);

        assert_eq!(stats.accepted, 5);
        assert_eq!(stats.nutrition_full, 1);
        assert_eq!(stats.nutrition_three, 1);
        assert_eq!(stats.nutrition_partial, 2);
        assert_eq!(stats.nutrition_none, 1);
        assert_eq!(stats.with_composition, 2);
        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.discarded, 1);
    }

    #[test]
    fn test_percentage_formatting() {
        assert_eq!(percentage(1, 4), "25.0%");
        assert_eq!(percentage(0, 0), "0.0%");
        assert_eq!(percentage(2, 3), "66.7%");
    }
}
