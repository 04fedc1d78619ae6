//! Per-field extraction strategies for scalar product attributes
//!
//! Each function is a pure scan over the parsed document. Strategies within a
//! function run in priority order and return the first value that survives
//! range validation; the caller never lets a later strategy overwrite an
//! earlier hit.

use crate::extract::rules::{parse_number, ExtractionRules, PORTION_GRAMS, PRICE_UNITS};
use scraper::{Html, Selector};
use url::Url;

/// Names longer than this are cut at a character boundary
pub const MAX_NAME_CHARS: usize = 200;

/// Composition candidates longer than this are navigation noise, not text
const MAX_COMPOSITION_CHARS: usize = 1000;

/// Marketing and navigation fragments that disqualify a composition candidate
const COMPOSITION_NOISE: &[&str] = &[
    "корзин",
    "доставк",
    "каталог",
    "меню",
    "скидк",
    "акци",
    "подписк",
    "cookie",
];

/// URL or alt-text substrings that mark an image as a product photo
const PHOTO_KEYWORDS: &[&str] = &["product", "goods", "tovar", "item", "upload", "catalog"];

/// URL or alt-text substrings that disqualify an image outright
const PHOTO_EXCLUDED: &[&str] = &[
    "logo",
    "icon",
    "favicon",
    "sprite",
    "banner",
    "placeholder",
    "loader",
    ".svg",
];

/// Extracts the product name: primary heading first, then title-class elements
pub fn extract_name(document: &Html) -> Option<String> {
    let selectors = [
        "h1",
        ".product-title",
        ".product-name",
        ".item-title",
        "[itemprop=\"name\"]",
    ];

    for selector in selectors {
        let Ok(parsed) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&parsed) {
            let text = element.text().collect::<String>();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !text.is_empty() {
                return Some(truncate_chars(&text, MAX_NAME_CHARS));
            }
        }
    }

    None
}

/// Extracts the price through the three-step chain:
/// price-like elements, embedded JSON blobs, free page text
pub fn extract_price(document: &Html, rules: &ExtractionRules) -> Option<f64> {
    // 1. Elements that look like a price widget
    let price_selector =
        Selector::parse("[class*=\"price\"], [id*=\"price\"], [data-price], [itemprop=\"price\"]")
            .expect("static selector");
    for element in document.select(&price_selector) {
        let text = element.text().collect::<String>();
        for caps in rules.price_element_pattern.captures_iter(&text) {
            if let Some(value) = parse_number(&caps[1]) {
                if PRICE_UNITS.contains(value) {
                    return Some(value);
                }
            }
        }
    }

    // 2. Embedded JSON blobs ("price":"199")
    let script_selector = Selector::parse("script").expect("static selector");
    for script in document.select(&script_selector) {
        let text = script.text().collect::<String>();
        for caps in rules.price_json_pattern.captures_iter(&text) {
            if let Some(value) = parse_number(&caps[1]) {
                if PRICE_UNITS.contains(value) {
                    return Some(value);
                }
            }
        }
    }

    // 3. Free page text ("199 руб", "249 ₽", "цена: 320")
    let page_text = document.root_element().text().collect::<String>();
    for pattern in &rules.price_text_patterns {
        for caps in pattern.captures_iter(&page_text) {
            if let Some(value) = parse_number(&caps[1]) {
                if PRICE_UNITS.contains(value) {
                    return Some(value);
                }
            }
        }
    }

    None
}

/// Picks the product photo
///
/// Keyword-qualified images win and only need to clear 50x50 when they carry
/// explicit dimensions; the generic fallback accepts any non-excluded image
/// that declares at least 100x100.
pub fn extract_photo(document: &Html, base_url: &Url) -> Option<String> {
    let img_selector = Selector::parse("img").expect("static selector");

    let candidates: Vec<_> = document
        .select(&img_selector)
        .filter_map(|img| {
            let value = img.value();
            let src = value
                .attr("src")
                .or_else(|| value.attr("data-src"))
                .or_else(|| value.attr("data-lazy-src"))?;
            let resolved = base_url.join(src).ok()?;
            let alt = value.attr("alt").unwrap_or("").to_lowercase();
            let haystack = format!("{} {}", resolved.as_str().to_lowercase(), alt);

            if PHOTO_EXCLUDED.iter().any(|kw| haystack.contains(kw)) {
                return None;
            }

            let dims = parse_dimensions(value.attr("width"), value.attr("height"));
            Some((resolved.to_string(), haystack, dims))
        })
        .collect();

    // Keyword path
    for (url, haystack, dims) in &candidates {
        if PHOTO_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
            if let Some((w, h)) = dims {
                if *w < 50 || *h < 50 {
                    continue;
                }
            }
            return Some(url.clone());
        }
    }

    // Generic fallback: explicit dimensions required
    for (url, _, dims) in &candidates {
        if let Some((w, h)) = dims {
            if *w >= 100 && *h >= 100 {
                return Some(url.clone());
            }
        }
    }

    None
}

/// Extracts the composition text
///
/// Scans block-level elements mentioning the composition keyword, drops
/// candidates polluted by navigation or marketing fragments, and prefers the
/// candidate that begins with the keyword itself.
pub fn extract_composition(document: &Html) -> Option<String> {
    let block_selector = Selector::parse("p, li, td, div").expect("static selector");

    let mut fallback: Option<String> = None;
    for element in document.select(&block_selector) {
        let text = element.text().collect::<String>();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let lower = text.to_lowercase();

        if !lower.contains("состав") || text.chars().count() > MAX_COMPOSITION_CHARS {
            continue;
        }
        if text.chars().count() < 10 {
            continue;
        }
        if COMPOSITION_NOISE.iter().any(|kw| lower.contains(kw)) {
            continue;
        }

        if lower.starts_with("состав") {
            return Some(text);
        }
        if fallback.is_none() {
            fallback = Some(text);
        }
    }

    fallback
}

/// Extracts the portion weight: a number with a gram unit inside 10..=2000 g
///
/// The product name is the most reliable carrier ("Салат Оливье 250 г"), then
/// elements labelled with a weight keyword, then the whole page text.
pub fn extract_weight(document: &Html, name: &str, rules: &ExtractionRules) -> Option<f64> {
    if let Some(value) = first_in_range_weight(name, rules) {
        return Some(value);
    }

    let block_selector = Selector::parse("p, li, td, span, div").expect("static selector");
    for element in document.select(&block_selector) {
        let text = element.text().collect::<String>();
        let lower = text.to_lowercase();
        if text.chars().count() > 200 || !(lower.contains("вес") || lower.contains("масса")) {
            continue;
        }
        if let Some(value) = first_in_range_weight(&text, rules) {
            return Some(value);
        }
    }

    let page_text = document.root_element().text().collect::<String>();
    first_in_range_weight(&page_text, rules)
}

fn first_in_range_weight(text: &str, rules: &ExtractionRules) -> Option<f64> {
    for caps in rules.weight_pattern.captures_iter(text) {
        if let Some(value) = parse_number(&caps[1]) {
            if PORTION_GRAMS.contains(value) {
                return Some(value);
            }
        }
    }
    None
}

/// Collects breadcrumb trail items as record tags
pub fn extract_tags(document: &Html) -> Vec<String> {
    let breadcrumb_selector =
        Selector::parse("[class*=\"breadcrumb\"] a, [itemtype*=\"BreadcrumbList\"] a")
            .expect("static selector");

    let mut tags = Vec::new();
    for element in document.select(&breadcrumb_selector) {
        let text = element.text().collect::<String>();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() && !tags.contains(&text) {
            tags.push(text);
        }
    }

    tags
}

/// Reads explicit `width`/`height` attributes, tolerating a `px` suffix
fn parse_dimensions(width: Option<&str>, height: Option<&str>) -> Option<(u32, u32)> {
    let w = width?.trim().trim_end_matches("px").parse().ok()?;
    let h = height?.trim().trim_end_matches("px").parse().ok()?;
    Some((w, h))
}

/// Cuts a string to at most `max` characters, never splitting a code point
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn base() -> Url {
        Url::parse("https://shop.example.ru/goods/salat.html").unwrap()
    }

    #[test]
    fn test_name_from_h1() {
        let html = r#"<html><body><h1> Салат  Оливье </h1></body></html>"#;
        assert_eq!(extract_name(&doc(html)), Some("Салат Оливье".to_string()));
    }

    #[test]
    fn test_name_from_title_class_when_no_h1() {
        let html = r#"<html><body><div class="product-title">Суп харчо</div></body></html>"#;
        assert_eq!(extract_name(&doc(html)), Some("Суп харчо".to_string()));
    }

    #[test]
    fn test_name_truncated_on_char_boundary() {
        let long = "Б".repeat(300);
        let html = format!("<html><body><h1>{}</h1></body></html>", long);
        let name = extract_name(&doc(&html)).unwrap();
        assert_eq!(name.chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn test_price_from_element() {
        let rules = ExtractionRules::new();
        let html = r#"<html><body><span class="product-price">199 ₽</span></body></html>"#;
        assert_eq!(extract_price(&doc(html), &rules), Some(199.0));
    }

    #[test]
    fn test_price_from_json_blob() {
        let rules = ExtractionRules::new();
        let html = r#"<html><body>
            <script>window.state = {"goods":{"id":"7","price":"249"}};</script>
        </body></html>"#;
        assert_eq!(extract_price(&doc(html), &rules), Some(249.0));
    }

    #[test]
    fn test_price_from_free_text() {
        let rules = ExtractionRules::new();
        let html = r#"<html><body><p>Вкусный салат всего за 320 руб</p></body></html>"#;
        assert_eq!(extract_price(&doc(html), &rules), Some(320.0));
    }

    #[test]
    fn test_price_out_of_range_skipped() {
        let rules = ExtractionRules::new();
        // 5 is below the plausible range; the in-range value further on wins
        let html = r#"<html><body>
            <span class="price-badge">5</span>
            <p>цена: 199</p>
        </body></html>"#;
        assert_eq!(extract_price(&doc(html), &rules), Some(199.0));
    }

    #[test]
    fn test_photo_keyword_path() {
        let html = r#"<html><body>
            <img src="/static/logo.png" alt="магазин">
            <img src="/upload/goods/salat-olivie.jpg" alt="Салат Оливье">
        </body></html>"#;
        assert_eq!(
            extract_photo(&doc(html), &base()),
            Some("https://shop.example.ru/upload/goods/salat-olivie.jpg".to_string())
        );
    }

    #[test]
    fn test_photo_keyword_path_rejects_tiny_images() {
        let html = r#"<html><body>
            <img src="/upload/goods/mini.jpg" width="32" height="32">
            <img src="/upload/goods/salat.jpg" width="600" height="400">
        </body></html>"#;
        assert_eq!(
            extract_photo(&doc(html), &base()),
            Some("https://shop.example.ru/upload/goods/salat.jpg".to_string())
        );
    }

    #[test]
    fn test_photo_generic_fallback_needs_dimensions() {
        let html = r#"<html><body>
            <img src="/media/photo1.jpg">
            <img src="/media/photo2.jpg" width="640" height="480">
        </body></html>"#;
        assert_eq!(
            extract_photo(&doc(html), &base()),
            Some("https://shop.example.ru/media/photo2.jpg".to_string())
        );
    }

    #[test]
    fn test_photo_excluded_keywords() {
        let html = r#"<html><body>
            <img src="/upload/goods/banner-sale.jpg" width="900" height="300">
        </body></html>"#;
        assert_eq!(extract_photo(&doc(html), &base()), None);
    }

    #[test]
    fn test_composition_prefers_keyword_prefix() {
        let html = r#"<html><body>
            <p>В салате состав простой и честный, подробности ниже</p>
            <p>Состав: картофель, морковь, горошек, майонез</p>
        </body></html>"#;
        assert_eq!(
            extract_composition(&doc(html)),
            Some("Состав: картофель, морковь, горошек, майонез".to_string())
        );
    }

    #[test]
    fn test_composition_falls_back_to_any_candidate() {
        let html = r#"<html><body>
            <p>Полный состав указан на упаковке продукта</p>
        </body></html>"#;
        assert_eq!(
            extract_composition(&doc(html)),
            Some("Полный состав указан на упаковке продукта".to_string())
        );
    }

    #[test]
    fn test_composition_rejects_noise() {
        let html = r#"<html><body>
            <div>Состав корзины можно изменить до оформления доставки</div>
        </body></html>"#;
        assert_eq!(extract_composition(&doc(html)), None);
    }

    #[test]
    fn test_weight_from_name() {
        let rules = ExtractionRules::new();
        let html = r#"<html><body></body></html>"#;
        assert_eq!(
            extract_weight(&doc(html), "Салат Оливье 250 г", &rules),
            Some(250.0)
        );
    }

    #[test]
    fn test_weight_from_labelled_element() {
        let rules = ExtractionRules::new();
        let html = r#"<html><body><li>Вес порции: 350 г</li></body></html>"#;
        assert_eq!(extract_weight(&doc(html), "Суп харчо", &rules), Some(350.0));
    }

    #[test]
    fn test_weight_out_of_range_rejected() {
        let rules = ExtractionRules::new();
        let html = r#"<html><body><li>Вес: 5000 г</li></body></html>"#;
        assert_eq!(extract_weight(&doc(html), "Мешок риса", &rules), None);
    }

    #[test]
    fn test_tags_from_breadcrumbs() {
        let html = r#"<html><body>
            <ul class="breadcrumbs">
                <li><a href="/">Главная</a></li>
                <li><a href="/catalog/">Каталог</a></li>
                <li><a href="/catalog/gotovaja-eda/">Готовая еда</a></li>
            </ul>
        </body></html>"#;
        assert_eq!(
            extract_tags(&doc(html)),
            vec!["Главная", "Каталог", "Готовая еда"]
        );
    }
}
