//! Session and query-engine plumbing.

pub mod context;
pub mod session;

pub use context::{AnalyticsContext, ContextConfig};
pub use session::{AnalysisSession, TableResolution, JOINED_SALES_VIEW};
