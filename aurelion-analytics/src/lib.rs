//! # Aurelion Analytics
//!
//! Retail analytics for the Tienda Aurelion store dataset: customers,
//! products, sales and sale line items, each stored as a CSV file. Built on
//! DataFusion; every table is loaded once per session into an in-memory
//! snapshot and queried with SQL.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aurelion_analytics::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let mut session = AnalysisSession::new(AnalyticsConfig::from_env()?)?;
//!
//! for dictionary in session.data_dictionaries().await? {
//!     println!("{}", MarkdownFormatter::new().format_dictionary(&dictionary)?);
//! }
//!
//! let customers = session.customer_purchase_ranking().await?;
//! let payments = session.payment_method_ranking().await?;
//! println!("{}", MarkdownFormatter::new().format_customer_ranking(&customers)?);
//! println!("{}", MarkdownFormatter::new().format_payment_ranking(&payments)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Missing files
//!
//! A table whose file is absent is never replaced by an empty one. The
//! session reports [`TableResolution::NeedsInput`](core::TableResolution) and
//! the caller decides where the data comes from:
//!
//! ```rust,no_run
//! use aurelion_analytics::prelude::*;
//!
//! # async fn example(session: &mut AnalysisSession, upload: Vec<u8>) -> Result<()> {
//! if session.resolve(TableName::Sales).await.needs_input() {
//!     session
//!         .supply_source(
//!             TableName::Sales,
//!             AlternativeSource::Upload { file_name: "ventas.csv".into(), bytes: upload },
//!         )
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`sources`]: table names, CSV and upload sources, snapshots
//! - [`analyzers`]: measurement-scale classification, dictionaries, rankings
//! - [`core`]: the DataFusion context and the analysis session
//! - [`formatters`]: Markdown and JSON rendering
//! - [`config`], [`logging`], [`error`]: ambient plumbing

pub mod analyzers;
pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod security;
pub mod sources;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
