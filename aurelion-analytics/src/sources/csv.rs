//! CSV file source implementation.

use super::{CompressionType, DataSource};
use crate::error::{AurelionError, Result};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::arrow::datatypes::SchemaRef;
use datafusion::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Options for configuring CSV file reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Compression type (default: Auto)
    pub compression: CompressionType,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            compression: CompressionType::Auto,
            schema_infer_max_records: 1000,
        }
    }
}

/// A single CSV file on disk.
///
/// # Examples
///
/// ```rust,ignore
/// use aurelion_analytics::sources::{CsvSource, DataSource, TableName};
///
/// let source = CsvSource::new("BD/ventas.csv");
/// let snapshot = source.register(&ctx, TableName::Sales).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a new CSV source from a single file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, CsvOptions::default())
    }

    /// Creates a new CSV source with custom options.
    pub fn with_options(path: impl Into<PathBuf>, options: CsvOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true when the path points at an existing regular file.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Suffix DataFusion must match when listing the file, e.g. ".csv" or ".gz".
fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

#[async_trait]
impl DataSource for CsvSource {
    #[instrument(skip(self, ctx), fields(
        source.type = "csv",
        source.path = %self.path.display(),
        csv.delimiter = %self.options.delimiter as char,
        csv.has_header = self.options.has_header
    ))]
    async fn read_batches(&self, ctx: &SessionContext) -> Result<(SchemaRef, Vec<RecordBatch>)> {
        let path = self
            .path
            .to_str()
            .ok_or_else(|| AurelionError::Configuration("Path contains invalid UTF-8".to_string()))?;

        let compression = self.options.compression.resolve(path);
        let extension = file_extension(&self.path);

        info!(
            source.path = %path,
            csv.compression = ?compression,
            "Reading CSV data source"
        );

        let csv_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&extension)
            .file_compression_type(compression.to_file_compression());

        let df = ctx.read_csv(path, csv_options).await?;
        let schema = df.schema().inner().clone();
        let batches = df.collect().await?;

        Ok((schema, batches))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn description(&self) -> String {
        format!("CSV file: {}", self.path.display())
    }
}
