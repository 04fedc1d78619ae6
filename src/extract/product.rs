//! Product record types
//!
//! [`RawProduct`] is the per-page accumulator that the extraction strategies
//! fill in; [`Product`] is the finalized record handed to the classifier and
//! the output writers. The shapes are identical, but a `Product` always
//! carries a non-empty name.

use serde::Serialize;
use url::Url;

/// In-progress extraction accumulator for one detail page
///
/// Numeric fields are `None` until some strategy fills them with a value
/// inside its plausible range; strategies never overwrite a filled field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProduct {
    pub id: String,
    pub name: String,
    pub price: Option<f64>,
    pub category: String,
    pub url: String,
    pub photo_url: Option<String>,
    pub composition: Option<String>,
    pub tags: Vec<String>,
    pub portion_weight_g: Option<f64>,
    pub energy_kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbs_g: Option<f64>,
}

impl RawProduct {
    /// Starts an empty accumulator for a detail page
    ///
    /// The identifier is derived from the last path segment of the URL.
    pub fn new(url: &Url, category: &str) -> Self {
        let id = url
            .path_segments()
            .and_then(|segments| segments.last())
            .map(|segment| segment.trim_end_matches(".html").to_string())
            .unwrap_or_default();

        Self {
            id,
            category: category.to_string(),
            url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn has_composition(&self) -> bool {
        self.composition
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    }

    /// Number of nutrition fields filled (0..=4)
    pub fn nutrition_filled(&self) -> usize {
        [self.energy_kcal, self.protein_g, self.fat_g, self.carbs_g]
            .iter()
            .filter(|field| field.is_some())
            .count()
    }

    /// Finalizes the accumulator; records without a name are discarded
    pub fn finalize(self) -> Option<Product> {
        if !self.has_name() {
            return None;
        }

        Some(Product {
            id: self.id,
            name: self.name.trim().to_string(),
            price: self.price,
            category: self.category,
            url: self.url,
            photo_url: self.photo_url,
            composition: self.composition,
            tags: self.tags,
            portion_weight_g: self.portion_weight_g,
            energy_kcal: self.energy_kcal,
            protein_g: self.protein_g,
            fat_g: self.fat_g,
            carbs_g: self.carbs_g,
        })
    }
}

/// A finalized product record
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Option<f64>,
    pub category: String,
    pub url: String,
    pub photo_url: Option<String>,
    pub composition: Option<String>,
    pub tags: Vec<String>,
    pub portion_weight_g: Option<f64>,
    pub energy_kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbs_g: Option<f64>,
}

impl Product {
    /// Number of nutrition fields filled (0..=4)
    pub fn nutrition_filled(&self) -> usize {
        [self.energy_kcal, self.protein_g, self.fat_g, self.carbs_g]
            .iter()
            .filter(|field| field.is_some())
            .count()
    }

    pub fn has_composition(&self) -> bool {
        self.composition
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_url() -> Url {
        Url::parse("https://shop.example.ru/goods/salat-olivie.html").unwrap()
    }

    #[test]
    fn test_id_from_url_slug() {
        let raw = RawProduct::new(&detail_url(), "Готовая еда");
        assert_eq!(raw.id, "salat-olivie");
        assert_eq!(raw.category, "Готовая еда");
        assert_eq!(raw.url, "https://shop.example.ru/goods/salat-olivie.html");
    }

    #[test]
    fn test_finalize_requires_name() {
        let raw = RawProduct::new(&detail_url(), "Готовая еда");
        assert!(raw.finalize().is_none());

        let mut raw = RawProduct::new(&detail_url(), "Готовая еда");
        raw.name = "  Салат Оливье  ".to_string();
        let product = raw.finalize().unwrap();
        assert_eq!(product.name, "Салат Оливье");
    }

    #[test]
    fn test_whitespace_name_is_not_a_name() {
        let mut raw = RawProduct::new(&detail_url(), "Готовая еда");
        raw.name = "   ".to_string();
        assert!(!raw.has_name());
        assert!(raw.finalize().is_none());
    }

    #[test]
    fn test_nutrition_filled_counts() {
        let mut raw = RawProduct::new(&detail_url(), "Готовая еда");
        assert_eq!(raw.nutrition_filled(), 0);

        raw.energy_kcal = Some(150.0);
        raw.protein_g = Some(12.5);
        assert_eq!(raw.nutrition_filled(), 2);

        raw.fat_g = Some(8.0);
        raw.carbs_g = Some(20.0);
        assert_eq!(raw.nutrition_filled(), 4);
    }

    #[test]
    fn test_has_composition() {
        let mut raw = RawProduct::new(&detail_url(), "Готовая еда");
        assert!(!raw.has_composition());

        raw.composition = Some("  ".to_string());
        assert!(!raw.has_composition());

        raw.composition = Some("Состав: картофель, морковь".to_string());
        assert!(raw.has_composition());
    }
}
