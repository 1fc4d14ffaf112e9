//! Typed log events parsed from JSON-lines.
//!
//! A [`LogEvent`] is immutable after construction. Query-derived fields
//! (operation, duration, cache hit) are computed once from the final content
//! at construction time and never recomputed.

use crate::wrap::strip_ansi;
use chrono::{DateTime, Utc};

// ===== EventKind =====

/// Classification of one log line - exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A request summary line (method + path + status all present).
    HttpRequest,
    /// A SQL statement line.
    Sql,
    /// A cache-store operation line (content contains "CACHE").
    Cache,
    /// A call-stack annotation line (the `↳` marker).
    SqlCallLine,
    /// Anything else that still parsed as a JSON object.
    Other,
}

// ===== SqlOperation =====

/// SQL operation keyword, extracted from query content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlOperation {
    Select,
    Insert,
    Update,
    Delete,
    Transaction,
    Begin,
    Commit,
    Rollback,
    Savepoint,
}

impl SqlOperation {
    /// All operations in extraction-precedence order: the first keyword from
    /// this list found in the content wins.
    pub const ALL: [SqlOperation; 9] = [
        SqlOperation::Select,
        SqlOperation::Insert,
        SqlOperation::Update,
        SqlOperation::Delete,
        SqlOperation::Transaction,
        SqlOperation::Begin,
        SqlOperation::Commit,
        SqlOperation::Rollback,
        SqlOperation::Savepoint,
    ];

    /// The keyword as it appears in log content.
    pub fn keyword(self) -> &'static str {
        match self {
            SqlOperation::Select => "SELECT",
            SqlOperation::Insert => "INSERT",
            SqlOperation::Update => "UPDATE",
            SqlOperation::Delete => "DELETE",
            SqlOperation::Transaction => "TRANSACTION",
            SqlOperation::Begin => "BEGIN",
            SqlOperation::Commit => "COMMIT",
            SqlOperation::Rollback => "ROLLBACK",
            SqlOperation::Savepoint => "SAVEPOINT",
        }
    }

    /// Whether this operation counts under "transaction" in the breakdown.
    pub fn is_transactional(self) -> bool {
        matches!(
            self,
            SqlOperation::Transaction
                | SqlOperation::Begin
                | SqlOperation::Commit
                | SqlOperation::Rollback
                | SqlOperation::Savepoint
        )
    }
}

// ===== QueryData =====

/// Derived fields of a sql/cache event, computed once at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryData {
    /// First operation keyword (in [`SqlOperation::ALL`] order) found in the
    /// ANSI-stripped content, if any.
    pub operation: Option<SqlOperation>,
    /// Duration parsed from a `(<number>ms)` substring, 0 when absent.
    pub duration_ms: f64,
    /// True for a cache event whose content contains "CACHE".
    pub is_cache_hit: bool,
}

impl QueryData {
    fn extract(kind: EventKind, content: &str) -> Self {
        let clean = strip_ansi(content);
        let operation = SqlOperation::ALL
            .into_iter()
            .find(|op| clean.contains(op.keyword()));
        QueryData {
            operation,
            duration_ms: extract_duration_ms(&clean),
            is_cache_hit: kind == EventKind::Cache && clean.contains("CACHE"),
        }
    }
}

/// Parse the first `(<number>ms)` group out of already-stripped content.
fn extract_duration_ms(text: &str) -> f64 {
    let mut search = 0;
    while let Some(open) = text[search..].find('(') {
        let start = search + open + 1;
        let Some(close) = text[start..].find(')') else {
            break;
        };
        let inner = &text[start..start + close];
        if let Some(num) = inner.strip_suffix("ms") {
            if !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
                if let Ok(v) = num.parse::<f64>() {
                    return v;
                }
            }
        }
        search = start;
    }
    0.0
}

// ===== LogEvent =====

/// A classified log line. Immutable after construction.
#[derive(Debug, Clone)]
pub struct LogEvent {
    kind: EventKind,
    correlation_id: Option<String>,
    timestamp: DateTime<Utc>,
    content: String,
    query: Option<QueryData>,
}

impl LogEvent {
    /// Build an event, deriving query data for sql/cache kinds.
    pub fn new(
        kind: EventKind,
        correlation_id: Option<String>,
        timestamp: DateTime<Utc>,
        content: String,
    ) -> Self {
        let query = match kind {
            EventKind::Sql | EventKind::Cache => Some(QueryData::extract(kind, &content)),
            _ => None,
        };
        Self {
            kind,
            correlation_id,
            timestamp,
            content,
            query,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Raw content, possibly containing ANSI escape sequences.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Derived query fields; `Some` exactly for sql/cache kinds.
    pub fn query(&self) -> Option<&QueryData> {
        self.query.as_ref()
    }

    pub fn is_query(&self) -> bool {
        self.query.is_some()
    }
}

// ===== Tests =====
