//! DataFusion context management.
//!
//! [`AnalyticsContext`] wraps DataFusion's [`SessionContext`] with the
//! settings used for one analysis session and keeps track of which tables
//! have been registered.

use crate::error::Result;
use crate::sources::{DataSource, TableName, TableSnapshot};
use datafusion::execution::context::{SessionConfig, SessionContext};
use datafusion::execution::memory_pool::{FairSpillPool, MemoryPool};
use datafusion::execution::runtime_env::RuntimeEnvBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::instrument;

/// Configuration for creating an [`AnalyticsContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Batch size for query execution
    pub batch_size: usize,
    /// Target number of partitions for parallel execution
    pub target_partitions: usize,
    /// Maximum memory for query execution (in bytes)
    pub max_memory: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            batch_size: 8192,
            target_partitions: num_cpus::get().max(1),
            max_memory: 512 * 1024 * 1024, // 512MB
        }
    }
}

/// A managed DataFusion context for one analysis session.
///
/// # Examples
///
/// ```rust,ignore
/// use aurelion_analytics::core::AnalyticsContext;
///
/// let ctx = AnalyticsContext::new()?;
/// let df = ctx.inner().sql("SELECT COUNT(*) FROM ventas").await?;
/// ```
pub struct AnalyticsContext {
    inner: SessionContext,
    tables: BTreeSet<TableName>,
    config: ContextConfig,
}

impl AnalyticsContext {
    /// Creates a new context with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ContextConfig::default())
    }

    /// Creates a new context with custom configuration.
    #[instrument(skip(config))]
    pub fn with_config(config: ContextConfig) -> Result<Self> {
        let session_config = SessionConfig::new()
            .with_batch_size(config.batch_size)
            .with_target_partitions(config.target_partitions.max(1))
            .with_information_schema(true);

        let memory_pool = Arc::new(FairSpillPool::new(config.max_memory)) as Arc<dyn MemoryPool>;

        let runtime_env = RuntimeEnvBuilder::new()
            .with_memory_pool(memory_pool)
            .build()
            .map(Arc::new)?;

        let inner = SessionContext::new_with_config_rt(session_config, runtime_env);

        Ok(Self {
            inner,
            tables: BTreeSet::new(),
            config,
        })
    }

    /// Returns a reference to the underlying DataFusion [`SessionContext`].
    pub fn inner(&self) -> &SessionContext {
        &self.inner
    }

    /// Returns the configuration used to create this context.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Returns the tables registered so far, in load order of [`TableName::ALL`].
    pub fn registered_tables(&self) -> Vec<TableName> {
        self.tables.iter().copied().collect()
    }

    /// Checks if a table is registered.
    pub fn has_table(&self, table: TableName) -> bool {
        self.tables.contains(&table)
    }

    /// Loads a source and registers it as `table`.
    pub async fn register_source(
        &mut self,
        table: TableName,
        source: &dyn DataSource,
    ) -> Result<TableSnapshot> {
        let snapshot = source.register(&self.inner, table).await?;
        self.tables.insert(table);
        Ok(snapshot)
    }
}
