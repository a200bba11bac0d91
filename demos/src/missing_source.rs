//! What happens when a table's file is missing.
//!
//! The session never substitutes an empty table. It stops at `NeedsInput`
//! for the missing table and resumes once the caller supplies the data, here
//! as the bytes of an "uploaded" file.
//!
//! Run with:
//! ```bash
//! cargo run --example missing_source
//! ```

use aurelion_analytics::logging::setup::{init_logging, LoggingConfig};
use aurelion_analytics::prelude::*;
use aurelion_analytics::test_fixtures::{session_for, write_sample_dataset_except, SAMPLE_SALES};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::development())?;

    let dir = tempfile::tempdir()?;
    write_sample_dataset_except(dir.path(), &[TableName::Sales])?;
    let mut session = session_for(dir.path())?;

    for resolution in session.resolve_all().await {
        match resolution {
            TableResolution::Resolved(snapshot) => {
                println!("{:<10} loaded, {} rows", snapshot.table, snapshot.row_count)
            }
            TableResolution::NeedsInput { table, attempted } => {
                println!("{table:<10} missing, tried {attempted}")
            }
            TableResolution::Failed { table, reason, .. } => {
                println!("{table:<10} failed: {reason}")
            }
        }
    }

    // Every request touching sales reports the missing file instead of empty numbers.
    if let Err(err) = session.payment_method_ranking().await {
        println!("\nPayment ranking unavailable: {err}");
    }

    println!("\nUploading ventas.csv ...");
    session
        .supply_source(
            TableName::Sales,
            AlternativeSource::Upload {
                file_name: "ventas.csv".to_string(),
                bytes: SAMPLE_SALES.as_bytes().to_vec(),
            },
        )
        .await?
        .into_result()?;

    let payments = session.payment_method_ranking().await?;
    println!(
        "\n{}",
        MarkdownFormatter::new().format_payment_ranking(&payments)?
    );

    Ok(())
}
