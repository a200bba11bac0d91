//! Integration tests for table resolution within a session.

use arrow::array::{Array, Int64Array};
use aurelion_analytics::prelude::*;
use aurelion_analytics::core::JOINED_SALES_VIEW;
use aurelion_analytics::test_fixtures::{
    session_for, write_sample_dataset, write_sample_dataset_except, write_table, SAMPLE_SALES,
};
use std::fs;
use tempfile::TempDir;

fn sample_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_sample_dataset(dir.path()).unwrap();
    dir
}

#[tokio::test]
async fn test_all_tables_resolve() {
    let dir = sample_dir();
    let mut session = session_for(dir.path()).unwrap();

    let resolutions = session.resolve_all().await;
    let rows: Vec<usize> = resolutions
        .into_iter()
        .map(|r| r.into_result().unwrap().row_count)
        .collect();
    assert_eq!(rows, vec![6, 5, 10, 12]);
    assert_eq!(session.context().registered_tables(), TableName::ALL.to_vec());
}

#[tokio::test]
async fn test_missing_sales_halts_at_needs_input() {
    let dir = TempDir::new().unwrap();
    write_sample_dataset_except(dir.path(), &[TableName::Sales]).unwrap();
    let mut session = session_for(dir.path()).unwrap();

    let resolution = session.resolve(TableName::Sales).await;
    let TableResolution::NeedsInput { table, attempted } = resolution else {
        panic!("expected NeedsInput");
    };
    assert_eq!(table, TableName::Sales);
    assert!(attempted.ends_with("ventas.csv"));

    // Nothing that depends on sales produces a result.
    let err = session.customer_purchase_ranking().await.unwrap_err();
    match err {
        AurelionError::MissingSource { table, location } => {
            assert_eq!(table, "sales");
            assert_eq!(location, attempted);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(session.payment_method_ranking().await.is_err());
    assert!(!session.context().has_table(TableName::Sales));

    // Other tables are unaffected.
    assert!(session.resolve(TableName::Customers).await.is_resolved());
    assert!(session.status(TableName::Sales).unwrap().needs_input());
}

#[tokio::test]
async fn test_uploaded_sales_unblock_the_session() {
    let dir = TempDir::new().unwrap();
    write_sample_dataset_except(dir.path(), &[TableName::Sales]).unwrap();
    let mut session = session_for(dir.path()).unwrap();
    assert!(session.resolve(TableName::Sales).await.needs_input());

    let resolution = session
        .supply_source(
            TableName::Sales,
            AlternativeSource::Upload {
                file_name: "ventas_enero.csv".to_string(),
                bytes: SAMPLE_SALES.as_bytes().to_vec(),
            },
        )
        .await
        .unwrap();
    let snapshot = resolution.into_result().unwrap();
    assert_eq!(snapshot.location, "upload:ventas_enero.csv");
    assert_eq!(snapshot.row_count, 10);

    let ranking = session.payment_method_ranking().await.unwrap();
    assert_eq!(ranking.total_sales(), 10);
}

#[tokio::test]
async fn test_alternative_path() {
    let dir = TempDir::new().unwrap();
    write_sample_dataset_except(dir.path(), &[TableName::Sales]).unwrap();
    let elsewhere = TempDir::new().unwrap();
    let export = elsewhere.path().join("export.csv");
    fs::write(&export, SAMPLE_SALES).unwrap();

    let mut session = session_for(dir.path()).unwrap();
    session.resolve(TableName::Sales).await;
    let snapshot = session
        .supply_source(TableName::Sales, AlternativeSource::Path(export.clone()))
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(snapshot.location, export.display().to_string());
}

#[tokio::test]
async fn test_malformed_file_is_cached_failure() {
    let dir = sample_dir();
    write_table(
        dir.path(),
        TableName::Products,
        "id_producto,nombre_producto\n1,Yerba,Almacen,extra\n2,Azucar\n",
    )
    .unwrap();
    let mut session = session_for(dir.path()).unwrap();

    let first = session.resolve(TableName::Products).await;
    let TableResolution::Failed { location, .. } = &first else {
        panic!("expected Failed, got {first:?}");
    };
    assert!(location.ends_with("productos.csv"));

    // Fixing the file on disk does not trigger a reload.
    write_table(
        dir.path(),
        TableName::Products,
        aurelion_analytics::test_fixtures::SAMPLE_PRODUCTS,
    )
    .unwrap();
    let err = session.table(TableName::Products).await.unwrap_err();
    assert!(matches!(err, AurelionError::LoadFailure { ref table, .. } if table == "products"));

    // A failed table accepts an alternative.
    let fixed = dir.path().join("productos.csv");
    let resolution = session
        .supply_source(TableName::Products, AlternativeSource::Path(fixed))
        .await
        .unwrap();
    assert!(resolution.is_resolved());
}

#[tokio::test]
async fn test_failing_alternative_names_its_location() {
    let dir = TempDir::new().unwrap();
    let mut session = session_for(dir.path()).unwrap();
    session.resolve(TableName::Customers).await;

    let missing = dir.path().join("nowhere").join("clientes.csv");
    let resolution = session
        .supply_source(TableName::Customers, AlternativeSource::Path(missing.clone()))
        .await
        .unwrap();
    match resolution {
        TableResolution::Failed { location, .. } => {
            assert_eq!(location, missing.display().to_string())
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_supply_for_resolved_table_is_rejected() {
    let dir = sample_dir();
    let mut session = session_for(dir.path()).unwrap();
    let before = session.table(TableName::Sales).await.unwrap();

    let err = session
        .supply_source(
            TableName::Sales,
            AlternativeSource::Upload {
                file_name: "other.csv".to_string(),
                bytes: b"id_venta\n1\n".to_vec(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AurelionError::Configuration(_)));

    let after = session.table(TableName::Sales).await.unwrap();
    assert!(std::sync::Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn test_data_dictionaries() {
    let dir = sample_dir();
    let mut session = session_for(dir.path()).unwrap();

    let dictionaries = session.data_dictionaries().await.unwrap();
    let tables: Vec<_> = dictionaries.iter().map(|d| d.table.as_str()).collect();
    assert_eq!(tables, vec!["customers", "products", "sales", "sale_lines"]);

    let sales = &dictionaries[2];
    assert_eq!(
        sales.get("id_venta").unwrap().scale,
        MeasurementScale::NominalIdentifier
    );
    assert_eq!(
        sales.get("medio_pago").unwrap().scale,
        MeasurementScale::NominalCategorical
    );
    assert_eq!(sales.get("fecha").unwrap().scale, MeasurementScale::Temporal);

    let lines = &dictionaries[3];
    assert_eq!(lines.get("importe").unwrap().scale, MeasurementScale::Ratio);
    assert_eq!(
        lines.get("precio_unitario").unwrap().scale,
        MeasurementScale::Ratio
    );
}

#[tokio::test]
async fn test_preview() {
    let dir = sample_dir();
    let mut session = session_for(dir.path()).unwrap();

    let batches = session.preview(TableName::SaleLines, 3).await.unwrap();
    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(rows, 3);
}

#[tokio::test]
async fn test_joined_view_keeps_dangling_sales() {
    let dir = sample_dir();
    let mut session = session_for(dir.path()).unwrap();

    let joined = session.sales_with_customers().await.unwrap();
    let schema = joined.schema().clone();
    assert!(schema.field_with_unqualified_name("ciudad").is_ok());
    assert!(schema.field_with_unqualified_name("fecha_alta").is_ok());
    let rows: usize = joined
        .collect()
        .await
        .unwrap()
        .iter()
        .map(|b| b.num_rows())
        .sum();
    assert_eq!(rows, 10);

    let batches = session
        .context()
        .inner()
        .sql(&format!(
            "SELECT id_venta FROM {JOINED_SALES_VIEW} WHERE ciudad IS NULL"
        ))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    let ids: Vec<i64> = batches
        .iter()
        .flat_map(|b| {
            let col = b.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
            (0..col.len()).map(|i| col.value(i)).collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(ids, vec![108]);
}
