//! Data-driven extraction rules
//!
//! Every free-text heuristic lives here as a table of keywords, ordered
//! regex chains and plausible value ranges. The strategies themselves stay
//! generic; adding a phrasing the catalog uses is a table edit, not a new
//! branch.

use regex::Regex;

/// A hard numeric bound used to reject obviously-wrong parsed values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Energy per 100 g, kcal
pub const ENERGY_KCAL: ValueRange = ValueRange {
    min: 10.0,
    max: 900.0,
};

/// Macronutrient grams per 100 g
pub const MACRO_GRAMS: ValueRange = ValueRange {
    min: 0.0,
    max: 100.0,
};

/// Price in currency units
pub const PRICE_UNITS: ValueRange = ValueRange {
    min: 10.0,
    max: 10_000.0,
};

/// Portion weight, grams
pub const PORTION_GRAMS: ValueRange = ValueRange {
    min: 10.0,
    max: 2000.0,
};

/// The four nutrition fields extracted per 100 g of product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NutritionField {
    Energy,
    Protein,
    Fat,
    Carbs,
}

impl NutritionField {
    pub const ALL: [NutritionField; 4] = [
        NutritionField::Energy,
        NutritionField::Protein,
        NutritionField::Fat,
        NutritionField::Carbs,
    ];

    pub fn range(self) -> ValueRange {
        match self {
            NutritionField::Energy => ENERGY_KCAL,
            _ => MACRO_GRAMS,
        }
    }
}

/// Extraction table entry for one nutrition field
#[derive(Debug)]
pub struct FieldPatterns {
    pub field: NutritionField,

    /// Substrings that mark a table label or text block as belonging to the
    /// field (matched against lower-cased text)
    pub keywords: &'static [&'static str],

    /// Property names used by embedded structured nutrition objects
    pub json_keys: &'static [&'static str],

    /// Free-text patterns, in priority order; capture group 1 is the value
    pub patterns: Vec<Regex>,
}

/// All compiled extraction tables; built once per run
#[derive(Debug)]
pub struct ExtractionRules {
    pub nutrition: Vec<FieldPatterns>,

    /// First number inside a price-like element's text
    pub price_element_pattern: Regex,

    /// `"price":"199"`-style values inside embedded JSON blobs
    pub price_json_pattern: Regex,

    /// Free-text price phrasings, in priority order
    pub price_text_patterns: Vec<Regex>,

    /// A number followed by a gram unit
    pub weight_pattern: Regex,
}

impl ExtractionRules {
    pub fn new() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("static extraction pattern");

        // The catalog shows nutrition in two phrasings: a labelled value
        // ("Белки 12,5 г") and a value-first inline legend ("12,5 Белки, г").
        let nutrition = vec![
            FieldPatterns {
                field: NutritionField::Energy,
                keywords: &["ккал", "калорийность", "энергетическая ценность"],
                json_keys: &["calories", "energy"],
                patterns: vec![
                    compile(r"(?i)калорийность[^\d]{0,20}(\d+(?:[.,]\d+)?)"),
                    compile(r"(?i)(\d+(?:[.,]\d+)?)\s*ккал"),
                ],
            },
            FieldPatterns {
                field: NutritionField::Protein,
                keywords: &["белк"],
                json_keys: &["proteinContent", "protein"],
                patterns: vec![
                    compile(r"(?i)белк\w*[^\d]{0,20}(\d+(?:[.,]\d+)?)"),
                    compile(r"(?i)(\d+(?:[.,]\d+)?)\s*белки,?\s*г"),
                ],
            },
            FieldPatterns {
                field: NutritionField::Fat,
                keywords: &["жир"],
                json_keys: &["fatContent", "fat"],
                patterns: vec![
                    compile(r"(?i)жир\w*[^\d]{0,20}(\d+(?:[.,]\d+)?)"),
                    compile(r"(?i)(\d+(?:[.,]\d+)?)\s*жиры,?\s*г"),
                ],
            },
            FieldPatterns {
                field: NutritionField::Carbs,
                keywords: &["углевод"],
                json_keys: &["carbohydrateContent", "carbohydrate"],
                patterns: vec![
                    compile(r"(?i)углевод\w*[^\d]{0,20}(\d+(?:[.,]\d+)?)"),
                    compile(r"(?i)(\d+(?:[.,]\d+)?)\s*углеводы,?\s*г"),
                ],
            },
        ];

        Self {
            nutrition,
            price_element_pattern: compile(r"(\d+(?:[.,]\d+)?)"),
            price_json_pattern: compile(r#""price"\s*:\s*"?(\d+(?:[.,]\d+)?)"?"#),
            price_text_patterns: vec![
                compile(r"(?i)(\d+(?:[.,]\d+)?)\s*руб"),
                compile(r"(\d+(?:[.,]\d+)?)\s*₽"),
                compile(r"(?i)цена[:\s]+(\d+(?:[.,]\d+)?)"),
            ],
            weight_pattern: compile(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:грамм\w*|гр|г)\b"),
        }
    }

    /// Table entry for one nutrition field
    pub fn for_field(&self, field: NutritionField) -> &FieldPatterns {
        self.nutrition
            .iter()
            .find(|entry| entry.field == field)
            .expect("every nutrition field has a table entry")
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses the first number in a text fragment, accepting comma decimals
pub fn parse_number(text: &str) -> Option<f64> {
    let mut start = None;
    let mut end = 0;

    for (i, c) in text.char_indices() {
        if c.is_ascii_digit() {
            if start.is_none() {
                start = Some(i);
            }
            end = i + c.len_utf8();
        } else if (c == '.' || c == ',') && start.is_some() {
            end = i + c.len_utf8();
        } else if start.is_some() {
            break;
        }
    }

    let start = start?;
    text[start..end]
        .trim_end_matches(['.', ','])
        .replace(',', ".")
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert!(ENERGY_KCAL.contains(150.0));
        assert!(!ENERGY_KCAL.contains(1500.0));
        assert!(!ENERGY_KCAL.contains(5.0));
        assert!(MACRO_GRAMS.contains(0.0));
        assert!(!MACRO_GRAMS.contains(101.0));
        assert!(PRICE_UNITS.contains(199.0));
        assert!(!PRICE_UNITS.contains(5.0));
        assert!(PORTION_GRAMS.contains(250.0));
        assert!(!PORTION_GRAMS.contains(5000.0));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("150 ккал"), Some(150.0));
        assert_eq!(parse_number("Белки: 12,5 г"), Some(12.5));
        assert_eq!(parse_number("12.5"), Some(12.5));
        assert_eq!(parse_number("цена 199."), Some(199.0));
        assert_eq!(parse_number("нет числа"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_energy_patterns() {
        let rules = ExtractionRules::new();
        let entry = rules.for_field(NutritionField::Energy);

        let caps = entry.patterns[0]
            .captures("Калорийность: 150 ккал")
            .unwrap();
        assert_eq!(&caps[1], "150");

        let caps = entry.patterns[1].captures("всего 215 ккал на порцию").unwrap();
        assert_eq!(&caps[1], "215");
    }

    #[test]
    fn test_protein_value_first_phrasing() {
        let rules = ExtractionRules::new();
        let entry = rules.for_field(NutritionField::Protein);

        let caps = entry.patterns[1].captures("12,5 Белки, г").unwrap();
        assert_eq!(&caps[1], "12,5");
    }

    #[test]
    fn test_price_text_patterns() {
        let rules = ExtractionRules::new();

        let caps = rules.price_text_patterns[0].captures("199 руб.").unwrap();
        assert_eq!(&caps[1], "199");

        let caps = rules.price_text_patterns[1].captures("249 ₽").unwrap();
        assert_eq!(&caps[1], "249");

        let caps = rules.price_text_patterns[2].captures("Цена: 320").unwrap();
        assert_eq!(&caps[1], "320");
    }

    #[test]
    fn test_price_json_pattern() {
        let rules = ExtractionRules::new();
        let blob = r#"{"id":"123","price":"199","currency":"RUB"}"#;
        let caps = rules.price_json_pattern.captures(blob).unwrap();
        assert_eq!(&caps[1], "199");

        let unquoted = r#"{"price": 249.5}"#;
        let caps = rules.price_json_pattern.captures(unquoted).unwrap();
        assert_eq!(&caps[1], "249.5");
    }

    #[test]
    fn test_weight_pattern_units() {
        let rules = ExtractionRules::new();

        let caps = rules.weight_pattern.captures("Вес: 250 г").unwrap();
        assert_eq!(&caps[1], "250");

        let caps = rules.weight_pattern.captures("порция 300 гр").unwrap();
        assert_eq!(&caps[1], "300");

        let caps = rules.weight_pattern.captures("500 грамм").unwrap();
        assert_eq!(&caps[1], "500");
    }
}
