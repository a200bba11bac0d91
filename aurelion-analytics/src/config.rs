//! Session configuration.
//!
//! [`AnalyticsConfig`] can be built in code, read from a JSON file, or taken
//! from the environment. Every field has a default matching the layout of the
//! store's data folder, so an empty JSON object is a valid configuration.

use crate::core::ContextConfig;
use crate::error::{AurelionError, Result};
use crate::sources::{CsvOptions, TableName};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default folder holding the four CSV files.
pub const DEFAULT_DATA_DIR: &str = "BD";

/// Default size of the customer ranking.
pub const DEFAULT_TOP_CUSTOMERS: usize = 10;

/// Environment variable overriding [`AnalyticsConfig::data_dir`].
pub const ENV_DATA_DIR: &str = "AURELION_DATA_DIR";

/// Environment variable overriding [`AnalyticsConfig::top_customers`].
pub const ENV_TOP_CUSTOMERS: &str = "AURELION_TOP_CUSTOMERS";

/// File name of each table inside the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableFiles {
    pub customers: String,
    pub products: String,
    pub sales: String,
    pub sale_lines: String,
}

impl Default for TableFiles {
    fn default() -> Self {
        Self {
            customers: TableName::Customers.default_file_name().to_string(),
            products: TableName::Products.default_file_name().to_string(),
            sales: TableName::Sales.default_file_name().to_string(),
            sale_lines: TableName::SaleLines.default_file_name().to_string(),
        }
    }
}

impl TableFiles {
    /// File name configured for `table`.
    pub fn file_for(&self, table: TableName) -> &str {
        match table {
            TableName::Customers => &self.customers,
            TableName::Products => &self.products,
            TableName::Sales => &self.sales,
            TableName::SaleLines => &self.sale_lines,
        }
    }
}

/// Column names the sales aggregations rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesColumns {
    /// Customer identifier, present in both customers and sales
    pub customer_id: String,
    /// Sale identifier in sales
    pub sale_id: String,
    /// Payment method label in sales
    pub payment_method: String,
    /// Customer columns carried into the joined sales view
    pub customer_attributes: Vec<String>,
}

impl Default for SalesColumns {
    fn default() -> Self {
        Self {
            customer_id: "id_cliente".to_string(),
            sale_id: "id_venta".to_string(),
            payment_method: "medio_pago".to_string(),
            customer_attributes: vec!["ciudad".to_string(), "fecha_alta".to_string()],
        }
    }
}

/// Everything an [`AnalysisSession`](crate::core::AnalysisSession) needs to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Folder holding the table files
    pub data_dir: PathBuf,
    /// File name per table
    pub files: TableFiles,
    /// Columns used by the aggregations
    pub columns: SalesColumns,
    /// Number of customers in the purchase-frequency ranking
    pub top_customers: usize,
    /// CSV reading options
    pub csv: CsvOptions,
    /// Query engine settings
    pub context: ContextConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            files: TableFiles::default(),
            columns: SalesColumns::default(),
            top_customers: DEFAULT_TOP_CUSTOMERS,
            csv: CsvOptions::default(),
            context: ContextConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Sets the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Sets the size of the customer ranking.
    pub fn with_top_customers(mut self, n: usize) -> Self {
        self.top_customers = n;
        self
    }

    /// Sets the columns used by the aggregations.
    pub fn with_columns(mut self, columns: SalesColumns) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the query engine settings.
    pub fn with_context(mut self, context: ContextConfig) -> Self {
        self.context = context;
        self
    }

    /// Default location of `table`.
    pub fn location_of(&self, table: TableName) -> PathBuf {
        self.data_dir.join(self.files.file_for(table))
    }

    /// Reads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Default configuration with overrides from the environment.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_TOP_CUSTOMERS) {
            self.top_customers = raw.trim().parse().map_err(|_| {
                AurelionError::Configuration(format!(
                    "{ENV_TOP_CUSTOMERS} must be a non-negative integer, got '{raw}'"
                ))
            })?;
        }
        Ok(self)
    }
}
