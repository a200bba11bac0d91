//! Data dictionaries: one classified entry per column, in schema order.

use super::scale::{MeasurementScale, ScaleClassifier};
use datafusion::arrow::datatypes::Schema;
use serde::{Deserialize, Serialize};

/// A column's name, declared type and inferred scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEntry {
    pub column: String,
    pub declared_type: String,
    pub scale: MeasurementScale,
}

/// The classified columns of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDictionary {
    /// Table the dictionary describes
    pub table: String,
    /// Optional definition of the table
    pub description: Option<String>,
    /// Entries in the table's column order
    pub columns: Vec<ColumnEntry>,
}

impl DataDictionary {
    /// Classifies every field of `schema`, keeping the field order.
    pub fn from_schema(table: impl Into<String>, schema: &Schema) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|field| ColumnEntry {
                column: field.name().clone(),
                declared_type: field.data_type().to_string(),
                scale: ScaleClassifier::classify(field.name(), field.data_type()),
            })
            .collect();

        Self {
            table: table.into(),
            description: None,
            columns,
        }
    }

    /// Attaches a table definition.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Looks up the entry for a column.
    pub fn get(&self, column: &str) -> Option<&ColumnEntry> {
        self.columns.iter().find(|entry| entry.column == column)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns with the given scale, in schema order.
    pub fn columns_with_scale(&self, scale: MeasurementScale) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(move |entry| entry.scale == scale)
            .map(|entry| entry.column.as_str())
    }
}
