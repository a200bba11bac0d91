//! Rendering of dictionaries and rankings for presentation.
//!
//! The analysis results are plain serde types; a presenter can serialize them
//! itself or use one of the formatters here. [`MarkdownFormatter`] produces
//! tables ready for a dashboard or a README, [`JsonFormatter`] produces
//! machine-readable output.
//!
//! # Examples
//!
//! ```rust
//! use aurelion_analytics::analyzers::{PaymentMethodCount, PaymentMethodRanking};
//! use aurelion_analytics::formatters::{MarkdownFormatter, ReportFormatter};
//!
//! let ranking = PaymentMethodRanking {
//!     methods: vec![PaymentMethodCount { payment_method: "qr".to_string(), sales: 3 }],
//! };
//! let markdown = MarkdownFormatter::new().format_payment_ranking(&ranking).unwrap();
//! assert!(markdown.contains("| qr | 3 |"));
//! ```

use crate::analyzers::{CustomerRanking, DataDictionary, PaymentMethodRanking};
use crate::error::{ErrorContext, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

/// Configuration options for formatting reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Emit a heading or title above each report
    pub include_title: bool,
    /// Include dataset totals next to the customer ranking
    pub include_totals: bool,
    /// Include table descriptions above dictionaries
    pub include_descriptions: bool,
    /// Maximum number of ranking rows to render (`None` for all)
    pub max_rows: Option<usize>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_title: true,
            include_totals: true,
            include_descriptions: true,
            max_rows: None,
        }
    }
}

impl FormatterConfig {
    /// Only the tables, without titles, totals or descriptions.
    pub fn minimal() -> Self {
        Self {
            include_title: false,
            include_totals: false,
            include_descriptions: false,
            max_rows: None,
        }
    }

    /// Sets whether to emit titles.
    pub fn with_title(mut self, include: bool) -> Self {
        self.include_title = include;
        self
    }

    /// Sets whether to include dataset totals.
    pub fn with_totals(mut self, include: bool) -> Self {
        self.include_totals = include;
        self
    }

    /// Limits the number of ranking rows.
    pub fn with_max_rows(mut self, max: usize) -> Self {
        self.max_rows = Some(max);
        self
    }

    fn row_limit(&self, len: usize) -> usize {
        self.max_rows.map_or(len, |max| max.min(len))
    }
}

/// Renders analysis results into a string.
pub trait ReportFormatter {
    /// Renders a table's data dictionary.
    fn format_dictionary(&self, dictionary: &DataDictionary) -> Result<String>;

    /// Renders the top customers and, optionally, the dataset totals.
    fn format_customer_ranking(&self, ranking: &CustomerRanking) -> Result<String>;

    /// Renders the payment-method ranking.
    fn format_payment_ranking(&self, ranking: &PaymentMethodRanking) -> Result<String>;
}

/// Formats reports as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    /// Creates a new JSON formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn to_value<T: Serialize>(value: &T) -> Result<Value> {
        serde_json::to_value(value).context("Failed to serialize report")
    }

    fn render(&self, value: &Value) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        text.context("Failed to serialize report")
    }

    fn truncate(&self, value: &mut Value, key: &str) {
        if let Some(Value::Array(rows)) = value.get_mut(key) {
            let limit = self.config.row_limit(rows.len());
            rows.truncate(limit);
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format_dictionary(&self, dictionary: &DataDictionary) -> Result<String> {
        let mut value = Self::to_value(dictionary)?;
        if !self.config.include_descriptions {
            if let Some(object) = value.as_object_mut() {
                object.remove("description");
            }
        }
        self.render(&value)
    }

    fn format_customer_ranking(&self, ranking: &CustomerRanking) -> Result<String> {
        let mut value = Self::to_value(ranking)?;
        self.truncate(&mut value, "top_customers");
        if !self.config.include_totals {
            if let Some(object) = value.as_object_mut() {
                object.remove("total_customers");
                object.remove("total_sales");
            }
        }
        self.render(&value)
    }

    fn format_payment_ranking(&self, ranking: &PaymentMethodRanking) -> Result<String> {
        let mut value = Self::to_value(ranking)?;
        self.truncate(&mut value, "methods");
        self.render(&value)
    }
}

/// Formats reports as Markdown tables.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    /// Creates a new Markdown formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    /// Creates a new Markdown formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the heading level (1-6) used for titles.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }

    fn heading(&self, output: &mut String, title: &str) -> Result<()> {
        if self.config.include_title {
            let hashes = "#".repeat(self.heading_level as usize);
            writeln!(output, "{hashes} {title}")?;
            writeln!(output)?;
        }
        Ok(())
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Escapes pipes so cell content cannot break the table.
fn cell(value: &str) -> String {
    value.replace('|', "\\|")
}

impl ReportFormatter for MarkdownFormatter {
    fn format_dictionary(&self, dictionary: &DataDictionary) -> Result<String> {
        let mut output = String::new();
        self.heading(&mut output, &format!("Data dictionary: {}", dictionary.table))?;

        if self.config.include_descriptions {
            if let Some(description) = &dictionary.description {
                writeln!(output, "{description}")?;
                writeln!(output)?;
            }
        }

        writeln!(output, "| Column | Type | Scale |")?;
        writeln!(output, "|--------|------|-------|")?;
        for entry in &dictionary.columns {
            writeln!(
                output,
                "| {} | {} | {} |",
                cell(&entry.column),
                cell(&entry.declared_type),
                entry.scale
            )?;
        }
        Ok(output)
    }

    fn format_customer_ranking(&self, ranking: &CustomerRanking) -> Result<String> {
        let mut output = String::new();
        self.heading(&mut output, "Top customers by purchases")?;

        if self.config.include_totals {
            writeln!(output, "- Total customers: {}", ranking.total_customers)?;
            writeln!(output, "- Total sales: {}", ranking.total_sales)?;
            writeln!(output)?;
        }

        writeln!(output, "| # | Customer | Purchases |")?;
        writeln!(output, "|---|----------|-----------|")?;
        let limit = self.config.row_limit(ranking.top_customers.len());
        for (i, entry) in ranking.top_customers.iter().take(limit).enumerate() {
            writeln!(
                output,
                "| {} | {} | {} |",
                i + 1,
                cell(&entry.customer_id),
                entry.purchases
            )?;
        }
        Ok(output)
    }

    fn format_payment_ranking(&self, ranking: &PaymentMethodRanking) -> Result<String> {
        let mut output = String::new();
        self.heading(&mut output, "Payment methods")?;

        writeln!(output, "| Payment method | Sales |")?;
        writeln!(output, "|----------------|-------|")?;
        let limit = self.config.row_limit(ranking.methods.len());
        for entry in ranking.methods.iter().take(limit) {
            writeln!(output, "| {} | {} |", cell(&entry.payment_method), entry.sales)?;
        }
        Ok(output)
    }
}
