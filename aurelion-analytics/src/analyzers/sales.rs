//! Distinct-order aggregations over sales and customers.
//!
//! Both rankings count *distinct* sale ids per group, so a sale that shows up
//! on several joined rows is counted once. Rows whose grouping key is null do
//! not form a group. Ties are broken by the group key in ascending order,
//! which makes repeated runs over the same snapshot return identical output.

use super::ranking::{CustomerPurchases, CustomerRanking, PaymentMethodCount, PaymentMethodRanking};
use crate::config::{SalesColumns, DEFAULT_TOP_CUSTOMERS};
use crate::error::{AurelionError, Result};
use crate::log_query;
use crate::logging::{truncate_field, LogConfig};
use crate::security::SqlSecurity;
use crate::sources::{TableName, TableSnapshot};
use arrow::array::Int64Array;
use arrow::record_batch::RecordBatch;
use datafusion::arrow::util::display::array_value_to_string;
use datafusion::prelude::*;
use tracing::{debug, instrument};

/// Runs the customer and payment-method rankings.
///
/// # Examples
///
/// ```rust,ignore
/// use aurelion_analytics::analyzers::SalesAnalyzer;
/// use aurelion_analytics::config::SalesColumns;
///
/// let analyzer = SalesAnalyzer::new(SalesColumns::default()).with_top_n(10);
/// let ranking = analyzer
///     .customer_purchase_ranking(ctx.inner(), &customers, &sales)
///     .await?;
/// for entry in &ranking.top_customers {
///     println!("{}: {}", entry.customer_id, entry.purchases);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SalesAnalyzer {
    columns: SalesColumns,
    top_n: usize,
    log: LogConfig,
}

impl SalesAnalyzer {
    /// Creates an analyzer using the given column names.
    pub fn new(columns: SalesColumns) -> Self {
        Self {
            columns,
            top_n: DEFAULT_TOP_CUSTOMERS,
            log: LogConfig::default(),
        }
    }

    /// Sets how many customers the purchase ranking keeps.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Sets the logging behaviour.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Returns the column names in use.
    pub fn columns(&self) -> &SalesColumns {
        &self.columns
    }

    /// Returns the size of the customer ranking.
    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Quoted column name, or `SchemaMismatch` when the table lacks it.
    fn require(&self, snapshot: &TableSnapshot, column: &str) -> Result<String> {
        if !snapshot.has_column(column) {
            return Err(AurelionError::schema_mismatch(
                snapshot.table.as_str(),
                column,
            ));
        }
        SqlSecurity::escape_identifier(column)
    }

    fn table_ident(table: TableName) -> Result<String> {
        SqlSecurity::escape_identifier(table.sql_name())
    }

    /// SQL for the top-N customers by distinct purchases.
    pub fn customer_ranking_sql(
        &self,
        customers: &TableSnapshot,
        sales: &TableSnapshot,
    ) -> Result<String> {
        let sale_customer = self.require(sales, &self.columns.customer_id)?;
        let sale_id = self.require(sales, &self.columns.sale_id)?;
        let customer_id = self.require(customers, &self.columns.customer_id)?;
        let sales_table = Self::table_ident(sales.table)?;
        let customers_table = Self::table_ident(customers.table)?;

        Ok(format!(
            "SELECT s.{sale_customer} AS customer_id, COUNT(DISTINCT s.{sale_id}) AS purchases \
             FROM {sales_table} AS s \
             LEFT JOIN {customers_table} AS c ON s.{sale_customer} = c.{customer_id} \
             WHERE s.{sale_customer} IS NOT NULL \
             GROUP BY s.{sale_customer} \
             ORDER BY purchases DESC, customer_id ASC \
             LIMIT {}",
            self.top_n
        ))
    }

    /// SQL for the distinct sales per payment method.
    pub fn payment_ranking_sql(&self, sales: &TableSnapshot) -> Result<String> {
        let method = self.require(sales, &self.columns.payment_method)?;
        let sale_id = self.require(sales, &self.columns.sale_id)?;
        let sales_table = Self::table_ident(sales.table)?;

        Ok(format!(
            "SELECT {method} AS payment_method, COUNT(DISTINCT {sale_id}) AS sale_count \
             FROM {sales_table} \
             WHERE {method} IS NOT NULL \
             GROUP BY {method} \
             ORDER BY sale_count DESC, payment_method ASC"
        ))
    }

    /// SQL for every sale with the configured customer attributes attached.
    ///
    /// Sales whose customer id has no match keep their row with null attributes.
    pub fn joined_sales_sql(
        &self,
        customers: &TableSnapshot,
        sales: &TableSnapshot,
    ) -> Result<String> {
        let sale_customer = self.require(sales, &self.columns.customer_id)?;
        let customer_id = self.require(customers, &self.columns.customer_id)?;
        let sales_table = Self::table_ident(sales.table)?;
        let customers_table = Self::table_ident(customers.table)?;

        let mut projection = vec!["s.*".to_string()];
        for attribute in &self.columns.customer_attributes {
            let quoted = self.require(customers, attribute)?;
            if sales.has_column(attribute) {
                let alias = SqlSecurity::escape_identifier(&format!("customer_{attribute}"))?;
                projection.push(format!("c.{quoted} AS {alias}"));
            } else {
                projection.push(format!("c.{quoted}"));
            }
        }

        Ok(format!(
            "SELECT {} FROM {sales_table} AS s \
             LEFT JOIN {customers_table} AS c ON s.{sale_customer} = c.{customer_id}",
            projection.join(", ")
        ))
    }

    /// Ranks customers by number of distinct sales and reports dataset totals.
    #[instrument(skip_all, fields(top_n = self.top_n))]
    pub async fn customer_purchase_ranking(
        &self,
        ctx: &SessionContext,
        customers: &TableSnapshot,
        sales: &TableSnapshot,
    ) -> Result<CustomerRanking> {
        let sql = self.customer_ranking_sql(customers, sales)?;
        log_query!(
            self.log,
            sql = %truncate_field(&sql, self.log.max_field_length),
            "Customer ranking query"
        );

        let top_customers = ranked_rows(&run(ctx, &sql).await?)?
            .into_iter()
            .map(|(customer_id, purchases)| CustomerPurchases {
                customer_id,
                purchases,
            })
            .collect::<Vec<_>>();

        let total_customers = self
            .distinct_count(ctx, customers, &self.columns.customer_id)
            .await?;
        let total_sales = self.distinct_count(ctx, sales, &self.columns.sale_id).await?;

        debug!(
            ranked = top_customers.len(),
            total_customers, total_sales, "Customer ranking computed"
        );

        Ok(CustomerRanking {
            top_customers,
            total_customers,
            total_sales,
        })
    }

    /// Ranks every payment method by number of distinct sales.
    #[instrument(skip_all)]
    pub async fn payment_method_ranking(
        &self,
        ctx: &SessionContext,
        sales: &TableSnapshot,
    ) -> Result<PaymentMethodRanking> {
        let sql = self.payment_ranking_sql(sales)?;
        log_query!(
            self.log,
            sql = %truncate_field(&sql, self.log.max_field_length),
            "Payment method ranking query"
        );

        let methods = ranked_rows(&run(ctx, &sql).await?)?
            .into_iter()
            .map(|(payment_method, sales)| PaymentMethodCount {
                payment_method,
                sales,
            })
            .collect::<Vec<_>>();

        debug!(methods = methods.len(), "Payment method ranking computed");
        Ok(PaymentMethodRanking { methods })
    }

    /// Sales left-joined to customers, as a lazily evaluated DataFrame.
    pub async fn sales_with_customers(
        &self,
        ctx: &SessionContext,
        customers: &TableSnapshot,
        sales: &TableSnapshot,
    ) -> Result<DataFrame> {
        let sql = self.joined_sales_sql(customers, sales)?;
        log_query!(
            self.log,
            sql = %truncate_field(&sql, self.log.max_field_length),
            "Joined sales query"
        );
        Ok(ctx.sql(&sql).await?)
    }

    /// Number of distinct non-null values of `column` in `snapshot`.
    pub async fn distinct_count(
        &self,
        ctx: &SessionContext,
        snapshot: &TableSnapshot,
        column: &str,
    ) -> Result<u64> {
        let quoted = self.require(snapshot, column)?;
        let table = Self::table_ident(snapshot.table)?;
        let sql = format!("SELECT COUNT(DISTINCT {quoted}) AS n FROM {table}");

        let batches = run(ctx, &sql).await?;
        let value = batches
            .iter()
            .find(|batch| batch.num_rows() > 0)
            .map(|batch| int64_column(batch, 0).map(|counts| counts.value(0)))
            .transpose()?
            .unwrap_or(0);
        Ok(value as u64)
    }
}

async fn run(ctx: &SessionContext, sql: &str) -> Result<Vec<RecordBatch>> {
    Ok(ctx.sql(sql).await?.collect().await?)
}

fn int64_column(batch: &RecordBatch, index: usize) -> Result<&Int64Array> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| AurelionError::Internal(format!("Expected Int64 array for column {index}")))
}

/// Reads (group key, count) rows in result order.
fn ranked_rows(batches: &[RecordBatch]) -> Result<Vec<(String, u64)>> {
    let mut rows = Vec::new();
    for batch in batches {
        let keys = batch.column(0);
        let counts = int64_column(batch, 1)?;
        for row in 0..batch.num_rows() {
            rows.push((array_value_to_string(keys, row)?, counts.value(row) as u64));
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{DataSource, UploadedCsvSource};

    async fn load(ctx: &SessionContext, table: TableName, csv: &str) -> TableSnapshot {
        UploadedCsvSource::new(table.default_file_name(), csv)
            .register(ctx, table)
            .await
            .unwrap()
    }

    async fn fixture() -> (SessionContext, TableSnapshot, TableSnapshot) {
        let ctx = SessionContext::new();
        let customers = load(
            &ctx,
            TableName::Customers,
            "id_cliente,nombre_cliente,ciudad,fecha_alta\n\
             C1,Ana,Rosario,2023-01-10\n\
             C2,Luis,Córdoba,2023-02-11\n\
             C3,Eva,Mendoza,2023-03-12\n",
        )
        .await;
        let sales = load(
            &ctx,
            TableName::Sales,
            "id_venta,fecha,id_cliente,medio_pago\n\
             S1,2024-01-01,C1,tarjeta\n\
             S2,2024-01-02,C1,tarjeta\n\
             S3,2024-01-03,C2,qr\n",
        )
        .await;
        (ctx, customers, sales)
    }

    #[tokio::test]
    async fn test_customer_ranking() {
        let (ctx, customers, sales) = fixture().await;
        let analyzer = SalesAnalyzer::new(SalesColumns::default());

        let ranking = analyzer
            .customer_purchase_ranking(&ctx, &customers, &sales)
            .await
            .unwrap();

        assert_eq!(
            ranking.top_customers,
            vec![
                CustomerPurchases {
                    customer_id: "C1".to_string(),
                    purchases: 2
                },
                CustomerPurchases {
                    customer_id: "C2".to_string(),
                    purchases: 1
                },
            ]
        );
        assert_eq!(ranking.total_customers, 3);
        assert_eq!(ranking.total_sales, 3);
    }

    #[tokio::test]
    async fn test_payment_ranking() {
        let (ctx, _, sales) = fixture().await;
        let analyzer = SalesAnalyzer::new(SalesColumns::default());

        let ranking = analyzer.payment_method_ranking(&ctx, &sales).await.unwrap();
        assert_eq!(
            ranking.methods,
            vec![
                PaymentMethodCount {
                    payment_method: "tarjeta".to_string(),
                    sales: 2
                },
                PaymentMethodCount {
                    payment_method: "qr".to_string(),
                    sales: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_payment_column() {
        let ctx = SessionContext::new();
        let sales = load(&ctx, TableName::Sales, "id_venta,id_cliente\nS1,C1\n").await;
        let analyzer = SalesAnalyzer::new(SalesColumns::default());

        let err = analyzer.payment_method_ranking(&ctx, &sales).await.unwrap_err();
        match err {
            AurelionError::SchemaMismatch { table, column } => {
                assert_eq!(table, "sales");
                assert_eq!(column, "medio_pago");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_customer_column_in_sales() {
        let (ctx, customers, _) = fixture().await;
        let sales = load(&ctx, TableName::Sales, "id_venta,medio_pago\nS1,qr\n").await;
        let analyzer = SalesAnalyzer::new(SalesColumns::default());

        let err = analyzer
            .customer_purchase_ranking(&ctx, &customers, &sales)
            .await
            .unwrap_err();
        assert!(
            matches!(err, AurelionError::SchemaMismatch { ref column, .. } if column == "id_cliente")
        );
    }

    #[test]
    fn test_generated_sql_quotes_identifiers() {
        let schema = std::sync::Arc::new(datafusion::arrow::datatypes::Schema::new(vec![
            datafusion::arrow::datatypes::Field::new(
                "id_venta",
                datafusion::arrow::datatypes::DataType::Utf8,
                true,
            ),
            datafusion::arrow::datatypes::Field::new(
                "medio_pago",
                datafusion::arrow::datatypes::DataType::Utf8,
                true,
            ),
        ]));
        let sales = TableSnapshot {
            table: TableName::Sales,
            location: "memory".to_string(),
            schema,
            row_count: 0,
            loaded_at: chrono::Utc::now(),
        };

        let sql = SalesAnalyzer::new(SalesColumns::default())
            .payment_ranking_sql(&sales)
            .unwrap();
        assert!(sql.contains("COUNT(DISTINCT \"id_venta\")"));
        assert!(sql.contains("FROM \"ventas\""));
        assert!(sql.contains("ORDER BY sale_count DESC, payment_method ASC"));
    }
}
