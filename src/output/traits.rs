//! Output writer trait and error types

use crate::extract::Product;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A sink for finalized product records
pub trait RecordWriter {
    /// Writes all records, replacing any previous content at the destination
    fn write_records(&self, products: &[Product]) -> OutputResult<()>;
}
