//! CSV export of product records

use crate::extract::Product;
use crate::output::traits::{OutputResult, RecordWriter};
use std::io::Write;
use std::path::PathBuf;

const HEADER: &str = "id,name,price,category,url,photo_url,composition,tags,\
portion_weight_g,energy_kcal,protein_g,fat_g,carbs_g";

/// Writes records as a UTF-8 CSV file with a header row
pub struct CsvWriter {
    path: PathBuf,
}

impl CsvWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordWriter for CsvWriter {
    fn write_records(&self, products: &[Product]) -> OutputResult<()> {
        let mut file = std::fs::File::create(&self.path)?;
        writeln!(file, "{}", HEADER)?;

        for product in products {
            let row = [
                escape(&product.id),
                escape(&product.name),
                format_number(product.price),
                escape(&product.category),
                escape(&product.url),
                escape(product.photo_url.as_deref().unwrap_or("")),
                escape(product.composition.as_deref().unwrap_or("")),
                escape(&product.tags.join("; ")),
                format_number(product.portion_weight_g),
                format_number(product.energy_kcal),
                format_number(product.protein_g),
                format_number(product.fat_g),
                format_number(product.carbs_g),
            ];
            writeln!(file, "{}", row.join(","))?;
        }

        tracing::info!("wrote {} records to {}", products.len(), self.path.display());
        Ok(())
    }
}

/// Quotes a field when it contains a separator, quote or newline
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) => {
            if v.fract() == 0.0 {
                format!("{}", v as i64)
            } else {
                format!("{}", v)
            }
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RawProduct;
    use url::Url;

    fn sample_product() -> Product {
        let url = Url::parse("https://shop.example.ru/goods/salat-olivie.html").unwrap();
        let mut raw = RawProduct::new(&url, "Готовая еда");
        raw.name = "Салат Оливье, классический".to_string();
        raw.price = Some(199.0);
        raw.composition = Some("Состав: картофель, морковь".to_string());
        raw.tags = vec!["Каталог".to_string(), "Готовая еда".to_string()];
        raw.portion_weight_g = Some(250.0);
        raw.energy_kcal = Some(215.0);
        raw.protein_g = Some(12.5);
        raw.finalize().unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(Some(199.0)), "199");
        assert_eq!(format_number(Some(12.5)), "12.5");
        assert_eq!(format_number(None), "");
    }

    #[test]
    fn test_write_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");

        let writer = CsvWriter::new(&path);
        writer.write_records(&[sample_product()]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,name,price"));
        // Name with an embedded comma must be quoted
        assert!(lines[1].contains("\"Салат Оливье, классический\""));
        assert!(lines[1].contains("199"));
        assert!(lines[1].contains("12.5"));
    }
}
