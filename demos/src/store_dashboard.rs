//! Full walkthrough over the sample store dataset.
//!
//! This example shows how to:
//! - Load every table and print its data dictionary
//! - Preview the first rows of a table
//! - Rank customers and payment methods
//! - Render the same reports as JSON
//!
//! Point `AURELION_DATA_DIR` at a folder with the four CSV files to run it on
//! real data; otherwise a sample dataset is written to a temporary folder.
//!
//! Run with:
//! ```bash
//! cargo run --example store_dashboard
//! ```

use aurelion_analytics::config::ENV_DATA_DIR;
use aurelion_analytics::logging::setup::{init_logging, LoggingConfig};
use aurelion_analytics::prelude::*;
use aurelion_analytics::test_fixtures::write_sample_dataset;
use datafusion::arrow::util::pretty::pretty_format_batches;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default())?;

    let mut config = AnalyticsConfig::from_env()?;
    // Held until the end of main so the sample files outlive the session
    let sample_dir = match std::env::var(ENV_DATA_DIR) {
        Ok(_) => None,
        Err(_) => {
            let dir = tempfile::tempdir()?;
            write_sample_dataset(dir.path())?;
            config = config.with_data_dir(dir.path());
            Some(dir)
        }
    };

    let mut session = AnalysisSession::new(config)?.with_log_config(LogConfig::verbose());
    let markdown = MarkdownFormatter::new();

    println!("# Tienda Aurelion\n");

    for dictionary in session.data_dictionaries().await? {
        println!("{}", markdown.format_dictionary(&dictionary)?);
    }

    let preview = session.preview(TableName::Sales, 5).await?;
    println!("First sales:\n{}\n", pretty_format_batches(&preview)?);

    let customers = session.customer_purchase_ranking().await?;
    println!("{}", markdown.format_customer_ranking(&customers)?);

    let payments = session.payment_method_ranking().await?;
    println!("{}", markdown.format_payment_ranking(&payments)?);

    let joined = session.sales_with_customers().await?;
    println!("Sales with customer attributes:");
    joined.limit(0, Some(5))?.show().await?;

    let json = JsonFormatter::with_config(FormatterConfig::minimal()).with_pretty(false);
    println!("\n{}", json.format_payment_ranking(&payments)?);

    drop(sample_dir);
    Ok(())
}
