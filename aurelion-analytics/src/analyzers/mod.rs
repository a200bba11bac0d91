//! Analyses over the loaded tables.
//!
//! - [`scale`]: measurement-scale classification of columns
//! - [`dictionary`]: per-table data dictionaries built from the classifier
//! - [`sales`]: distinct-order rankings of customers and payment methods
//! - [`ranking`]: the result types returned by the rankings

pub mod dictionary;
pub mod ranking;
pub mod sales;
pub mod scale;

pub use dictionary::{ColumnEntry, DataDictionary};
pub use ranking::{CustomerPurchases, CustomerRanking, PaymentMethodCount, PaymentMethodRanking};
pub use sales::SalesAnalyzer;
pub use scale::{MeasurementScale, ScaleClassifier, ScaleRule};
