//! Prelude for commonly used types and traits in aurelion-analytics.

pub use crate::analyzers::{
    CustomerRanking, DataDictionary, MeasurementScale, PaymentMethodRanking, ScaleClassifier,
};
pub use crate::config::AnalyticsConfig;
pub use crate::core::{AnalysisSession, TableResolution};
pub use crate::error::{AurelionError, ErrorContext, Result};
pub use crate::formatters::{FormatterConfig, JsonFormatter, MarkdownFormatter, ReportFormatter};
pub use crate::logging::LogConfig;
pub use crate::sources::{AlternativeSource, TableName, TableSnapshot};
