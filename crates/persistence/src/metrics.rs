//! Database metrics collection.

use metrics::histogram;
use std::time::Instant;

/// Times a repository query and records its duration as a histogram.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new("find_chamado_by_id");
/// let result = sqlx::query_as::<_, TicketEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Records the elapsed duration under `db_query_duration_seconds`.
    pub fn record(self) {
        histogram!(
            "db_query_duration_seconds",
            "query" => self.query_name
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_records_without_panicking() {
        let timer = QueryTimer::new("test_query");
        timer.record();
    }
}
