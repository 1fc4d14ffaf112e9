//! Query statistics for one request, plus the text formatter.
//!
//! `QueryStats::collect` is a pure fold over the request's related events;
//! the formatting methods are pure functions of the counters. Nothing here
//! touches the terminal, so the whole module is unit-testable.

use crate::model::event::SqlOperation;
use crate::model::request::RequestAggregate;

/// Aggregate query counters for a single request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QueryStats {
    pub total_queries: usize,
    /// Sum of query durations, milliseconds.
    pub total_time: f64,
    pub cached_queries: usize,
    pub select: usize,
    pub insert: usize,
    pub update: usize,
    pub delete: usize,
    /// TRANSACTION, BEGIN, COMMIT, ROLLBACK and SAVEPOINT all count here.
    pub transaction: usize,
}

impl QueryStats {
    /// Fold the request's sql/cache events into counters.
    pub fn collect(request: &RequestAggregate) -> Self {
        let mut stats = QueryStats {
            total_queries: request.query_count(),
            total_time: request.total_query_time(),
            cached_queries: request.cached_query_count(),
            ..QueryStats::default()
        };

        for query in request.queries().filter_map(|e| e.query()) {
            match query.operation {
                Some(op) if op.is_transactional() => stats.transaction += 1,
                Some(SqlOperation::Select) => stats.select += 1,
                Some(SqlOperation::Insert) => stats.insert += 1,
                Some(SqlOperation::Update) => stats.update += 1,
                Some(SqlOperation::Delete) => stats.delete += 1,
                _ => {}
            }
        }
        stats
    }

    /// `"N queries (X.Yms total, Z cached)"` — the parenthetical appears
    /// only when there is something to say.
    pub fn summary_line(&self) -> String {
        let mut parts = vec![format!("{} queries", self.total_queries)];

        if self.total_time > 0.0 {
            let mut time_part = format!("{:.1}ms total", self.total_time);
            if self.cached_queries > 0 {
                time_part.push_str(&format!(", {} cached", self.cached_queries));
            }
            parts.push(format!("({time_part})"));
        } else if self.cached_queries > 0 {
            parts.push(format!("({} cached)", self.cached_queries));
        }

        parts.join(" ")
    }

    /// `"a SELECT, b INSERT, ..."` with zero counts omitted. Empty string
    /// when every count is zero.
    pub fn breakdown_line(&self) -> String {
        let parts: Vec<String> = [
            (self.select, "SELECT"),
            (self.insert, "INSERT"),
            (self.update, "UPDATE"),
            (self.delete, "DELETE"),
            (self.transaction, "TRANSACTION"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .collect();

        parts.join(", ")
    }

    /// Multi-line summary used by the copy handler.
    pub fn text_summary(&self) -> String {
        let mut lines = vec!["Query Summary:".to_string()];
        if self.total_queries > 0 {
            lines.push(self.summary_line());
            let breakdown = self.breakdown_line();
            if !breakdown.is_empty() {
                lines.push(breakdown);
            }
        }
        lines.join("\n")
    }
}
