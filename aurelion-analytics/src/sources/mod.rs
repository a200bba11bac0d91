//! Table sources for the Aurelion dataset.
//!
//! Every table is read completely into memory and registered with the
//! session's DataFusion context as an immutable [`MemTable`], so that parse
//! errors surface at load time and every later query sees the same snapshot.

use crate::error::{AurelionError, Result};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use datafusion::arrow::datatypes::SchemaRef;
use datafusion::datasource::file_format::file_compression_type::FileCompressionType;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

mod csv;
mod upload;

pub use csv::{CsvOptions, CsvSource};
pub use upload::UploadedCsvSource;

/// The four tables of the store dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    /// Customer master data
    Customers,
    /// Product catalog
    Products,
    /// Sale headers
    Sales,
    /// Sale line items
    SaleLines,
}

impl TableName {
    /// All tables, in the order they are loaded.
    pub const ALL: [TableName; 4] = [
        TableName::Customers,
        TableName::Products,
        TableName::Sales,
        TableName::SaleLines,
    ];

    /// Logical name used in errors and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Customers => "customers",
            TableName::Products => "products",
            TableName::Sales => "sales",
            TableName::SaleLines => "sale_lines",
        }
    }

    /// Name the table is registered under in the SQL context.
    pub fn sql_name(&self) -> &'static str {
        match self {
            TableName::Customers => "clientes",
            TableName::Products => "productos",
            TableName::Sales => "ventas",
            TableName::SaleLines => "detalle_ventas",
        }
    }

    /// File name looked up in the data directory.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            TableName::Customers => "clientes.csv",
            TableName::Products => "productos.csv",
            TableName::Sales => "ventas.csv",
            TableName::SaleLines => "detalle_ventas.csv",
        }
    }

    /// One-line definition shown next to the table's data dictionary.
    pub fn description(&self) -> &'static str {
        match self {
            TableName::Customers => {
                "Customer master with basic identification and signup data."
            }
            TableName::Products => "Product catalog with category and unit price.",
            TableName::Sales => "Sale headers with date, associated customer and payment method.",
            TableName::SaleLines => "Line items of each sale with quantities, prices and amounts.",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = AurelionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "customers" | "clientes" => Ok(TableName::Customers),
            "products" | "productos" => Ok(TableName::Products),
            "sales" | "ventas" => Ok(TableName::Sales),
            "sale_lines" | "detalle_ventas" => Ok(TableName::SaleLines),
            other => Err(AurelionError::Configuration(format!(
                "Unknown table '{other}'"
            ))),
        }
    }
}

/// A loaded, registered, immutable table.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    /// Which table this is
    pub table: TableName,
    /// Where the data came from
    pub location: String,
    /// Column names and declared types, in file order
    pub schema: SchemaRef,
    /// Number of data rows
    pub row_count: usize,
    /// When the snapshot was taken
    pub loaded_at: DateTime<Utc>,
}

impl TableSnapshot {
    /// Returns true when the table has a column with exactly this name.
    pub fn has_column(&self, column: &str) -> bool {
        self.schema.field_with_name(column).is_ok()
    }
}

/// A place table data can be read from.
///
/// Implementations only read; [`DataSource::register`] turns the batches into
/// a snapshot and attributes any failure to the table and location.
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Reads the complete source into memory.
    async fn read_batches(&self, ctx: &SessionContext) -> Result<(SchemaRef, Vec<RecordBatch>)>;

    /// Identifies the source in errors and logs.
    fn location(&self) -> String;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;

    /// Loads the source and registers it under the table's SQL name.
    #[instrument(skip(self, ctx), fields(table.name = %table, source.location = %self.location()))]
    async fn register(&self, ctx: &SessionContext, table: TableName) -> Result<TableSnapshot> {
        let location = self.location();
        let load_failure =
            |e: AurelionError| AurelionError::load_failure(table.as_str(), &location, e.to_string());

        let (schema, batches) = self.read_batches(ctx).await.map_err(load_failure)?;
        if schema.fields().is_empty() {
            return Err(AurelionError::load_failure(
                table.as_str(),
                &location,
                "no header row found",
            ));
        }

        let row_count = batches.iter().map(|b| b.num_rows()).sum();
        let provider = MemTable::try_new(schema.clone(), vec![batches])
            .map_err(|e| load_failure(e.into()))?;
        ctx.register_table(table.sql_name(), Arc::new(provider))?;

        debug!(
            table.name = %table,
            source = %self.description(),
            columns = schema.fields().len(),
            rows = row_count,
            "Table registered"
        );

        Ok(TableSnapshot {
            table,
            location,
            schema,
            row_count,
            loaded_at: Utc::now(),
        })
    }
}

/// Data supplied by the caller for a table whose default file is missing.
#[derive(Debug, Clone)]
pub enum AlternativeSource {
    /// A CSV file somewhere else on disk
    Path(PathBuf),
    /// The raw bytes of an uploaded CSV file
    Upload {
        /// Original file name, used to identify the upload
        file_name: String,
        /// File contents
        bytes: Vec<u8>,
    },
}

impl AlternativeSource {
    /// Builds the data source that reads this alternative.
    pub fn into_data_source(self, options: &CsvOptions) -> Box<dyn DataSource> {
        match self {
            AlternativeSource::Path(path) => {
                Box::new(CsvSource::with_options(path, options.clone()))
            }
            AlternativeSource::Upload { file_name, bytes } => Box::new(
                UploadedCsvSource::new(file_name, bytes).with_options(options.clone()),
            ),
        }
    }
}

/// Compression formats accepted for CSV files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionType {
    /// No compression
    None,
    /// Gzip compression
    Gzip,
    /// Bzip2 compression
    Bzip2,
    /// XZ compression
    Xz,
    /// Zstandard compression
    Zstd,
    /// Automatic detection based on file extension
    Auto,
}

impl CompressionType {
    /// Detects compression type from file path extension.
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_lowercase();
        if lower.ends_with(".gz") || lower.ends_with(".gzip") {
            Self::Gzip
        } else if lower.ends_with(".bz2") || lower.ends_with(".bzip2") {
            Self::Bzip2
        } else if lower.ends_with(".xz") {
            Self::Xz
        } else if lower.ends_with(".zst") || lower.ends_with(".zstd") {
            Self::Zstd
        } else {
            Self::None
        }
    }

    /// Resolves `Auto` against a concrete path.
    pub fn resolve(self, path: &str) -> Self {
        match self {
            Self::Auto => Self::from_path(path),
            other => other,
        }
    }

    pub(crate) fn to_file_compression(self) -> FileCompressionType {
        match self {
            Self::Gzip => FileCompressionType::GZIP,
            Self::Bzip2 => FileCompressionType::BZIP2,
            Self::Xz => FileCompressionType::XZ,
            Self::Zstd => FileCompressionType::ZSTD,
            Self::None | Self::Auto => FileCompressionType::UNCOMPRESSED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(TableName::Sales.sql_name(), "ventas");
        assert_eq!(TableName::SaleLines.default_file_name(), "detalle_ventas.csv");
        assert_eq!(TableName::Customers.to_string(), "customers");
        assert_eq!(TableName::ALL.len(), 4);
    }

    #[test]
    fn test_table_name_parsing() {
        assert_eq!("sales".parse::<TableName>().unwrap(), TableName::Sales);
        assert_eq!("Clientes".parse::<TableName>().unwrap(), TableName::Customers);
        assert_eq!(
            "detalle_ventas".parse::<TableName>().unwrap(),
            TableName::SaleLines
        );
        assert!("inventory".parse::<TableName>().is_err());
    }

    #[test]
    fn test_compression_detection() {
        assert_eq!(CompressionType::from_path("ventas.csv"), CompressionType::None);
        assert_eq!(CompressionType::from_path("ventas.csv.gz"), CompressionType::Gzip);
        assert_eq!(CompressionType::from_path("VENTAS.CSV.GZ"), CompressionType::Gzip);
        assert_eq!(CompressionType::from_path("ventas.csv.bz2"), CompressionType::Bzip2);
        assert_eq!(CompressionType::from_path("ventas.csv.xz"), CompressionType::Xz);
        assert_eq!(CompressionType::from_path("ventas.csv.zst"), CompressionType::Zstd);
    }

    #[test]
    fn test_compression_resolve() {
        assert_eq!(
            CompressionType::Auto.resolve("a.csv.zst"),
            CompressionType::Zstd
        );
        assert_eq!(CompressionType::None.resolve("a.csv.gz"), CompressionType::None);
    }
}
