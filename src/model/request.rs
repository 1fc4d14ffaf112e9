//! Request aggregates: one HTTP request plus its related log events.

use crate::model::event::{EventKind, LogEvent};
use chrono::{DateTime, Utc};
use serde_json::Value;

// ===== Params =====

/// Request parameters, parsed permissively.
///
/// A JSON object stays structured; a JSON-encoded string is re-parsed and,
/// when that fails or yields a non-object, kept as plain text.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Object(serde_json::Map<String, Value>),
    Text(String),
}

impl Params {
    /// Parse from the raw `params` field of a log line.
    pub fn from_value(value: &Value) -> Option<Params> {
        match value {
            Value::Null => None,
            Value::Object(map) => Some(Params::Object(map.clone())),
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(Value::Object(map)) => Some(Params::Object(map)),
                _ => Some(Params::Text(s.clone())),
            },
            other => Some(Params::Text(other.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Params::Object(map) => map.is_empty(),
            Params::Text(s) => s.is_empty(),
        }
    }

    /// Human-readable single-line rendering, `{ key: value, ... }` style.
    /// Nested maps are capped at depth 2 and shown as `{...}` below that.
    pub fn display(&self) -> String {
        match self {
            Params::Object(map) => format_map(map, 1),
            Params::Text(s) => s.clone(),
        }
    }
}

fn format_map(map: &serde_json::Map<String, Value>, depth: usize) -> String {
    if map.is_empty() {
        return "{}".to_string();
    }
    let pairs: Vec<String> = map
        .iter()
        .map(|(key, value)| format!("{key}: {}", format_value(value, depth)))
        .collect();
    format!("{{ {} }}", pairs.join(", "))
}

fn format_value(value: &Value, depth: usize) -> String {
    match value {
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(_) if depth > 2 => "{...}".to_string(),
        Value::Object(map) => format_map(map, depth + 1),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(|v| format_value(v, depth)).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ===== RequestAggregate =====

/// An HTTP request with its correlated log events attached in arrival order.
///
/// The aggregate is the unique owner of its related events. The related
/// sequence is append-only; every other field is fixed at construction.
#[derive(Debug, Clone)]
pub struct RequestAggregate {
    correlation_id: String,
    timestamp: DateTime<Utc>,
    method: String,
    path: String,
    status: Option<u16>,
    duration_ms: Option<f64>,
    controller: Option<String>,
    action: Option<String>,
    params: Option<Params>,
    related: Vec<LogEvent>,
}

impl RequestAggregate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        correlation_id: String,
        timestamp: DateTime<Utc>,
        method: String,
        path: String,
        status: Option<u16>,
        duration_ms: Option<f64>,
        controller: Option<String>,
        action: Option<String>,
        params: Option<Params>,
    ) -> Self {
        Self {
            correlation_id,
            timestamp,
            method,
            path,
            status,
            duration_ms,
            controller,
            action,
            params,
            related: Vec::new(),
        }
    }

    /// Append a related event. Http-request events are never attached; a
    /// request does not own another request.
    pub fn push_related(&mut self, event: LogEvent) {
        if event.kind() != EventKind::HttpRequest {
            self.related.push(event);
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn duration_ms(&self) -> Option<f64> {
        self.duration_ms
    }

    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// Related events in arrival order.
    pub fn related(&self) -> &[LogEvent] {
        &self.related
    }

    // ===== Derived counters =====
    //
    // Recomputed from the related sequence on demand; the sequence is
    // append-only so these are always current.

    /// Iterator over sql/cache events.
    pub fn queries(&self) -> impl Iterator<Item = &LogEvent> {
        self.related.iter().filter(|e| e.is_query())
    }

    pub fn query_count(&self) -> usize {
        self.queries().count()
    }

    pub fn cached_query_count(&self) -> usize {
        self.queries()
            .filter(|e| e.kind() == EventKind::Cache)
            .count()
    }

    /// Sum of query durations in milliseconds.
    pub fn total_query_time(&self) -> f64 {
        self.queries()
            .filter_map(|e| e.query())
            .map(|q| q.duration_ms)
            .sum()
    }

    // ===== Status predicates =====

    pub fn success(&self) -> bool {
        matches!(self.status, Some(s) if (200..300).contains(&s))
    }

    pub fn client_error(&self) -> bool {
        matches!(self.status, Some(s) if (400..500).contains(&s))
    }

    pub fn server_error(&self) -> bool {
        matches!(self.status, Some(s) if s >= 500)
    }
}

// ===== Tests =====
