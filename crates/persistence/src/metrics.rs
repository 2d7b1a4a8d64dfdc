//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record a repository operation's duration.
pub fn record_query_duration(operation: &str, table: &str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "operation" => operation.to_string(),
        "table" => table.to_string()
    )
    .record(duration_secs);
}

/// Record database connection pool metrics.
///
/// Called from the readiness probe so the gauges follow pool health.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one repository operation.
///
/// ```ignore
/// let timer = QueryTimer::for_table("get", "locations");
/// let result = run_query().await;
/// timer.record();
/// ```
pub struct QueryTimer {
    operation: String,
    table: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(operation: impl Into<String>) -> Self {
        Self::for_table(operation, "")
    }

    pub fn for_table(operation: impl Into<String>, table: &'static str) -> Self {
        Self {
            operation: operation.into(),
            table,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_query_duration(&self.operation, self.table, duration);
    }
}
