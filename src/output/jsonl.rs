//! JSONL export of product records

use crate::extract::Product;
use crate::output::traits::{OutputResult, RecordWriter};
use std::io::Write;
use std::path::PathBuf;

/// Writes one JSON object per line
pub struct JsonlWriter {
    path: PathBuf,
}

impl JsonlWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordWriter for JsonlWriter {
    fn write_records(&self, products: &[Product]) -> OutputResult<()> {
        let mut file = std::fs::File::create(&self.path)?;

        for product in products {
            let line = serde_json::to_string(product)?;
            writeln!(file, "{}", line)?;
        }

        tracing::info!("wrote {} records to {}", products.len(), self.path.display());
        Ok(())
    }
}
