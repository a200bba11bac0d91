//! Per-session table resolution and the analyses built on top of it.
//!
//! An [`AnalysisSession`] owns one DataFusion context and a memo of every
//! table it has tried to load. A table is read at most once per session; the
//! outcome, good or bad, is kept until the session is dropped. When a table's
//! default file is absent the session stops at [`TableResolution::NeedsInput`]
//! and waits for the caller to [`supply_source`](AnalysisSession::supply_source).

use super::context::AnalyticsContext;
use crate::analyzers::{CustomerRanking, DataDictionary, PaymentMethodRanking, SalesAnalyzer};
use crate::config::AnalyticsConfig;
use crate::error::{AurelionError, Result};
use crate::log_data_op;
use crate::logging::{truncate_field, LogConfig};
use crate::sources::{AlternativeSource, CsvSource, DataSource, TableName, TableSnapshot};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::DataFrame;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Name of the joined sales and customers view in the SQL context.
pub const JOINED_SALES_VIEW: &str = "ventas_clientes";

/// Outcome of asking for a table.
#[derive(Debug, Clone)]
pub enum TableResolution {
    /// The table is loaded and registered.
    Resolved(Arc<TableSnapshot>),
    /// The default file does not exist; an alternative source is required.
    NeedsInput {
        table: TableName,
        /// Location that was tried
        attempted: String,
    },
    /// Data was found but could not be loaded.
    Failed {
        table: TableName,
        location: String,
        reason: String,
    },
}

impl TableResolution {
    /// Returns true for [`TableResolution::Resolved`].
    pub fn is_resolved(&self) -> bool {
        matches!(self, TableResolution::Resolved(_))
    }

    /// Returns true when the session is waiting for an alternative source.
    pub fn needs_input(&self) -> bool {
        matches!(self, TableResolution::NeedsInput { .. })
    }

    /// The table this outcome is about.
    pub fn table(&self) -> TableName {
        match self {
            TableResolution::Resolved(snapshot) => snapshot.table,
            TableResolution::NeedsInput { table, .. } | TableResolution::Failed { table, .. } => {
                *table
            }
        }
    }

    /// Converts the outcome into the snapshot or the matching error.
    pub fn into_result(self) -> Result<Arc<TableSnapshot>> {
        match self {
            TableResolution::Resolved(snapshot) => Ok(snapshot),
            TableResolution::NeedsInput { table, attempted } => {
                Err(AurelionError::missing_source(table.as_str(), attempted))
            }
            TableResolution::Failed {
                table,
                location,
                reason,
            } => Err(AurelionError::load_failure(table.as_str(), location, reason)),
        }
    }
}

#[derive(Debug, Clone)]
enum TableState {
    Loaded(Arc<TableSnapshot>),
    AwaitingSource { attempted: String },
    Failed { location: String, reason: String },
}

impl TableState {
    fn to_resolution(&self, table: TableName) -> TableResolution {
        match self {
            TableState::Loaded(snapshot) => TableResolution::Resolved(Arc::clone(snapshot)),
            TableState::AwaitingSource { attempted } => TableResolution::NeedsInput {
                table,
                attempted: attempted.clone(),
            },
            TableState::Failed { location, reason } => TableResolution::Failed {
                table,
                location: location.clone(),
                reason: reason.clone(),
            },
        }
    }
}

/// One analysis session over the store dataset.
///
/// # Examples
///
/// ```rust,no_run
/// use aurelion_analytics::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let mut session = AnalysisSession::new(AnalyticsConfig::default().with_data_dir("BD"))?;
///
/// if let TableResolution::NeedsInput { attempted, .. } = session.resolve(TableName::Sales).await {
///     println!("{attempted} is missing, using an export instead");
///     session
///         .supply_source(TableName::Sales, AlternativeSource::Path("export/ventas.csv".into()))
///         .await?;
/// }
///
/// let ranking = session.customer_purchase_ranking().await?;
/// println!("{} customers, {} sales", ranking.total_customers, ranking.total_sales);
/// # Ok(())
/// # }
/// ```
pub struct AnalysisSession {
    context: AnalyticsContext,
    config: AnalyticsConfig,
    log: LogConfig,
    tables: HashMap<TableName, TableState>,
    analyzer: SalesAnalyzer,
}

impl AnalysisSession {
    /// Creates a session; nothing is read until a table is asked for.
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        let context = AnalyticsContext::with_config(config.context.clone())?;
        let analyzer = SalesAnalyzer::new(config.columns.clone()).with_top_n(config.top_customers);

        Ok(Self {
            context,
            config,
            log: LogConfig::default(),
            tables: HashMap::new(),
            analyzer,
        })
    }

    /// Sets the logging behaviour for the session and its analyzer.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.analyzer = self.analyzer.with_log_config(log.clone());
        self.log = log;
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn context(&self) -> &AnalyticsContext {
        &self.context
    }

    /// Memoized outcome for `table`, or `None` if it was never asked for.
    pub fn status(&self, table: TableName) -> Option<TableResolution> {
        self.tables.get(&table).map(|state| state.to_resolution(table))
    }

    /// Resolves a table from its default location.
    ///
    /// The first call reads the file; later calls return the memoized outcome
    /// without touching the filesystem.
    #[instrument(skip(self), fields(table.name = %table))]
    pub async fn resolve(&mut self, table: TableName) -> TableResolution {
        if let Some(state) = self.tables.get(&table) {
            return state.to_resolution(table);
        }

        let source = CsvSource::with_options(self.config.location_of(table), self.config.csv.clone());
        let state = if source.exists() {
            self.load(table, &source).await
        } else {
            let attempted = source.location();
            warn!(
                table.name = %table,
                source.location = %attempted,
                "Default source missing, waiting for an alternative"
            );
            TableState::AwaitingSource { attempted }
        };

        let resolution = state.to_resolution(table);
        self.tables.insert(table, state);
        resolution
    }

    /// Resolves every table in [`TableName::ALL`] order.
    pub async fn resolve_all(&mut self) -> Vec<TableResolution> {
        let mut resolutions = Vec::with_capacity(TableName::ALL.len());
        for table in TableName::ALL {
            resolutions.push(self.resolve(table).await);
        }
        resolutions
    }

    /// Loads `table` from an alternative source.
    ///
    /// Only a table that is waiting for input or that failed to load accepts
    /// an alternative. Anything else is a [`AurelionError::Configuration`]
    /// error and leaves the session unchanged.
    #[instrument(skip(self, source), fields(table.name = %table))]
    pub async fn supply_source(
        &mut self,
        table: TableName,
        source: AlternativeSource,
    ) -> Result<TableResolution> {
        match self.tables.get(&table) {
            Some(TableState::AwaitingSource { .. }) | Some(TableState::Failed { .. }) => {}
            Some(TableState::Loaded(snapshot)) => {
                return Err(AurelionError::Configuration(format!(
                    "Table '{table}' is already loaded from '{}'",
                    snapshot.location
                )));
            }
            None => {
                return Err(AurelionError::Configuration(format!(
                    "Table '{table}' has not been resolved yet; resolve it before supplying a source"
                )));
            }
        }

        let source = source.into_data_source(&self.config.csv);
        let state = self.load(table, source.as_ref()).await;
        let resolution = state.to_resolution(table);
        self.tables.insert(table, state);
        Ok(resolution)
    }

    async fn load(&mut self, table: TableName, source: &dyn DataSource) -> TableState {
        match self.context.register_source(table, source).await {
            Ok(snapshot) => {
                log_data_op!(
                    self.log,
                    table.name = %table,
                    source.location = %snapshot.location,
                    rows = snapshot.row_count,
                    "Table loaded"
                );
                TableState::Loaded(Arc::new(snapshot))
            }
            Err(err) => {
                warn!(
                    table.name = %table,
                    error = %truncate_field(&err.to_string(), self.log.max_field_length),
                    "Table failed to load"
                );
                let reason = match err {
                    AurelionError::LoadFailure { message, .. } => message,
                    other => other.to_string(),
                };
                TableState::Failed {
                    location: source.location(),
                    reason,
                }
            }
        }
    }

    /// Resolved snapshot of `table`, or the error explaining why there is none.
    pub async fn table(&mut self, table: TableName) -> Result<Arc<TableSnapshot>> {
        self.resolve(table).await.into_result()
    }

    /// Data dictionary of one table, with its description.
    pub async fn data_dictionary(&mut self, table: TableName) -> Result<DataDictionary> {
        let snapshot = self.table(table).await?;
        Ok(DataDictionary::from_schema(table.as_str(), &snapshot.schema)
            .with_description(table.description()))
    }

    /// Data dictionaries of all four tables.
    pub async fn data_dictionaries(&mut self) -> Result<Vec<DataDictionary>> {
        let mut dictionaries = Vec::with_capacity(TableName::ALL.len());
        for table in TableName::ALL {
            dictionaries.push(self.data_dictionary(table).await?);
        }
        Ok(dictionaries)
    }

    /// First `rows` rows of a table.
    pub async fn preview(&mut self, table: TableName, rows: usize) -> Result<Vec<RecordBatch>> {
        let snapshot = self.table(table).await?;
        let batches = self
            .context
            .inner()
            .table(snapshot.table.sql_name())
            .await?
            .limit(0, Some(rows))?
            .collect()
            .await?;
        Ok(batches)
    }

    /// Sales left-joined to customers. Also registers the result as
    /// [`JOINED_SALES_VIEW`].
    pub async fn sales_with_customers(&mut self) -> Result<DataFrame> {
        let customers = self.table(TableName::Customers).await?;
        let sales = self.table(TableName::Sales).await?;
        let ctx = self.context.inner();

        let joined = self
            .analyzer
            .sales_with_customers(ctx, &customers, &sales)
            .await?;
        if !ctx.table_exist(JOINED_SALES_VIEW)? {
            ctx.register_table(JOINED_SALES_VIEW, joined.clone().into_view())?;
        }
        Ok(joined)
    }

    /// Top customers by distinct sales, with dataset totals.
    pub async fn customer_purchase_ranking(&mut self) -> Result<CustomerRanking> {
        let customers = self.table(TableName::Customers).await?;
        let sales = self.table(TableName::Sales).await?;
        self.analyzer
            .customer_purchase_ranking(self.context.inner(), &customers, &sales)
            .await
    }

    /// All payment methods by distinct sales.
    pub async fn payment_method_ranking(&mut self) -> Result<PaymentMethodRanking> {
        let sales = self.table(TableName::Sales).await?;
        self.analyzer
            .payment_method_ranking(self.context.inner(), &sales)
            .await
    }
}
