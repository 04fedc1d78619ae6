//! Nutrition extraction passes
//!
//! Three independent passes fill the four nutrition fields in priority order:
//! embedded structured metadata, then tabular markup, then free-text
//! heuristics. Each pass only fills fields the previous passes left empty,
//! and every parsed candidate is range-validated before acceptance.

use crate::extract::product::RawProduct;
use crate::extract::rules::{parse_number, ExtractionRules, FieldPatterns, NutritionField};
use scraper::{Html, Selector};
use serde_json::Value;

/// Type tags that mark an embedded object as nutrition data
const NUTRITION_TYPE_TAGS: &[&str] = &["NutritionInformation", "Nutrition"];

/// Free-text blocks longer than this are containers, not nutrition legends
const MAX_TEXT_BLOCK_CHARS: usize = 400;

fn field_value(raw: &RawProduct, field: NutritionField) -> Option<f64> {
    match field {
        NutritionField::Energy => raw.energy_kcal,
        NutritionField::Protein => raw.protein_g,
        NutritionField::Fat => raw.fat_g,
        NutritionField::Carbs => raw.carbs_g,
    }
}

fn set_field(raw: &mut RawProduct, field: NutritionField, value: f64) {
    let slot = match field {
        NutritionField::Energy => &mut raw.energy_kcal,
        NutritionField::Protein => &mut raw.protein_g,
        NutritionField::Fat => &mut raw.fat_g,
        NutritionField::Carbs => &mut raw.carbs_g,
    };
    *slot = Some(value);
}

/// Pass 1: embedded structured nutrition objects
///
/// Scans every `application/ld+json` script, walks the parsed value for
/// objects tagged `NutritionInformation`/`Nutrition`, and copies matching
/// properties directly.
pub fn structured_pass(document: &Html, raw: &mut RawProduct, rules: &ExtractionRules) {
    let selector =
        Selector::parse("script[type=\"application/ld+json\"]").expect("static selector");

    for script in document.select(&selector) {
        let text = script.text().collect::<String>();
        if text.trim().is_empty() {
            continue;
        }
        let Ok(parsed) = serde_json::from_str::<Value>(&text) else {
            continue;
        };

        let mut nodes = Vec::new();
        collect_nutrition_nodes(&parsed, &mut nodes);
        for node in nodes {
            apply_nutrition_node(node, raw, rules);
        }
    }
}

/// Recursively collects objects whose `@type` marks them as nutrition data
fn collect_nutrition_nodes<'a>(
    value: &'a Value,
    out: &mut Vec<&'a serde_json::Map<String, Value>>,
) {
    match value {
        Value::Object(map) => {
            if has_nutrition_type(map) {
                out.push(map);
            }
            for child in map.values() {
                collect_nutrition_nodes(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_nutrition_nodes(item, out);
            }
        }
        _ => {}
    }
}

fn has_nutrition_type(map: &serde_json::Map<String, Value>) -> bool {
    match map.get("@type") {
        Some(Value::String(tag)) => NUTRITION_TYPE_TAGS.contains(&tag.as_str()),
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(|t| t.as_str())
            .any(|t| NUTRITION_TYPE_TAGS.contains(&t)),
        _ => false,
    }
}

fn apply_nutrition_node(
    node: &serde_json::Map<String, Value>,
    raw: &mut RawProduct,
    rules: &ExtractionRules,
) {
    for field in NutritionField::ALL {
        if field_value(raw, field).is_some() {
            continue;
        }
        let entry = rules.for_field(field);
        for key in entry.json_keys {
            let Some(property) = node.get(*key) else {
                continue;
            };
            let parsed = match property {
                Value::Number(n) => n.as_f64(),
                // Values often carry a unit suffix ("150 ккал", "12.5 g")
                Value::String(s) => parse_number(s),
                _ => None,
            };
            if let Some(value) = parsed {
                if field.range().contains(value) {
                    set_field(raw, field, value);
                    break;
                }
            }
        }
    }
}

/// Pass 2: tabular markup
///
/// For every table row with two or more cells, the first cell's text is
/// matched against the field keywords and the value parsed from the adjacent
/// cell.
pub fn table_pass(document: &Html, raw: &mut RawProduct, rules: &ExtractionRules) {
    let table_selector = Selector::parse("table").expect("static selector");
    let row_selector = Selector::parse("tr").expect("static selector");
    let cell_selector = Selector::parse("td, th").expect("static selector");

    for table in document.select(&table_selector) {
        for row in table.select(&row_selector) {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect();
            if cells.len() < 2 {
                continue;
            }

            let label = cells[0].to_lowercase();
            for field in NutritionField::ALL {
                if field_value(raw, field).is_some() {
                    continue;
                }
                let entry = rules.for_field(field);
                if !entry.keywords.iter().any(|kw| label.contains(kw)) {
                    continue;
                }
                if let Some(value) = parse_number(&cells[1]) {
                    if field.range().contains(value) {
                        set_field(raw, field, value);
                    }
                }
            }
        }
    }
}

/// Pass 3: free-text heuristics
///
/// Scans text-bearing elements that mention a nutrition keyword with the
/// field's regex chain, then makes a final whole-page sweep for anything
/// still empty. Out-of-range candidates are skipped and scanning continues.
pub fn text_pass(document: &Html, raw: &mut RawProduct, rules: &ExtractionRules) {
    if raw.nutrition_filled() == 4 {
        return;
    }

    let block_selector = Selector::parse("p, li, td, span, div").expect("static selector");
    for element in document.select(&block_selector) {
        if raw.nutrition_filled() == 4 {
            return;
        }

        let text = element.text().collect::<String>();
        if text.chars().count() > MAX_TEXT_BLOCK_CHARS {
            continue;
        }
        let lower = text.to_lowercase();

        for field in NutritionField::ALL {
            if field_value(raw, field).is_some() {
                continue;
            }
            let entry = rules.for_field(field);
            if !entry.keywords.iter().any(|kw| lower.contains(kw)) {
                continue;
            }
            if let Some(value) = first_in_range(&text, entry) {
                set_field(raw, field, value);
            }
        }
    }

    // Whole-page sweep for fields no element-level scan could fill
    if raw.nutrition_filled() < 4 {
        let page_text = document.root_element().text().collect::<String>();
        for field in NutritionField::ALL {
            if field_value(raw, field).is_some() {
                continue;
            }
            let entry = rules.for_field(field);
            if let Some(value) = first_in_range(&page_text, entry) {
                set_field(raw, field, value);
            }
        }
    }
}

/// First candidate across the field's pattern chain that passes range checks
fn first_in_range(text: &str, entry: &FieldPatterns) -> Option<f64> {
    for pattern in &entry.patterns {
        for caps in pattern.captures_iter(text) {
            if let Some(value) = parse_number(&caps[1]) {
                if entry.field.range().contains(value) {
                    return Some(value);
                }
            }
        }
    }
    None
}
