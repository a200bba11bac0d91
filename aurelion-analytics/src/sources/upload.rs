//! In-memory CSV source for uploaded files.

use super::{CsvOptions, DataSource};
use crate::error::Result;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::arrow::datatypes::SchemaRef;
use datafusion::prelude::SessionContext;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{info, instrument};

/// CSV content handed over as bytes rather than as a path.
#[derive(Clone)]
pub struct UploadedCsvSource {
    file_name: String,
    bytes: Vec<u8>,
    options: CsvOptions,
}

impl std::fmt::Debug for UploadedCsvSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedCsvSource")
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl UploadedCsvSource {
    /// Wraps uploaded bytes.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            options: CsvOptions::default(),
        }
    }

    /// Sets custom reading options. Compression settings are ignored.
    pub fn with_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    fn format(&self) -> Format {
        Format::default()
            .with_header(self.options.has_header)
            .with_delimiter(self.options.delimiter)
            .with_quote(self.options.quote)
    }
}

#[async_trait]
impl DataSource for UploadedCsvSource {
    #[instrument(skip(self, _ctx), fields(source.type = "upload", upload.name = %self.file_name))]
    async fn read_batches(&self, _ctx: &SessionContext) -> Result<(SchemaRef, Vec<RecordBatch>)> {
        info!(upload.bytes = self.bytes.len(), "Reading uploaded CSV");

        let (schema, _) = self.format().infer_schema(
            Cursor::new(self.bytes.as_slice()),
            Some(self.options.schema_infer_max_records),
        )?;
        let schema = Arc::new(schema);

        let reader = ReaderBuilder::new(schema.clone())
            .with_header(self.options.has_header)
            .with_delimiter(self.options.delimiter)
            .with_quote(self.options.quote)
            .build(Cursor::new(self.bytes.as_slice()))?;
        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

        Ok((schema, batches))
    }

    fn location(&self) -> String {
        format!("upload:{}", self.file_name)
    }

    fn description(&self) -> String {
        format!("Uploaded CSV: {} ({} bytes)", self.file_name, self.bytes.len())
    }
}
