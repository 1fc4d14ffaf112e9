//! Line classifier: one raw JSON-lines record to a typed event.
//!
//! Parsing is deliberately forgiving. Anything that is not a JSON object is
//! dropped (`None`) so a corrupt line can never halt ingestion. Field-level
//! problems degrade instead of failing: a bad timestamp becomes the
//! ingestion time, missing params become `None`.
//!
//! Kind decision order is significant and first-match-wins:
//! http_request, then cache, then sql, then call line, else other.

use crate::model::{EventKind, LogEvent, Params, RequestAggregate};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// The call-stack marker, plus its mojibake form. Log producers that went
/// through a legacy single-byte encoding emit the marker as three characters.
pub(crate) const CALL_MARKERS: [&str; 2] = ["↳", "â†³"];

/// SQL keywords that classify a message line as a query, matched as whole
/// words.
const SQL_KEYWORDS: [&str; 9] = [
    "SELECT",
    "INSERT",
    "UPDATE",
    "DELETE",
    "TRANSACTION",
    "BEGIN",
    "COMMIT",
    "ROLLBACK",
    "SAVEPOINT",
];

/// One successfully classified line.
///
/// Request summary lines become the aggregate they will anchor; everything
/// else is a plain event waiting to be attached to one.
#[derive(Debug, Clone)]
pub enum ClassifiedLine {
    Request(Box<RequestAggregate>),
    Event(LogEvent),
}

impl ClassifiedLine {
    /// Correlation id, when the line carried one.
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            ClassifiedLine::Request(req) => Some(req.correlation_id()),
            ClassifiedLine::Event(event) => event.correlation_id(),
        }
    }
}

/// Classify one raw line. Returns `None` for anything that does not parse
/// as a JSON object.
pub fn classify_line(raw: &str) -> Option<ClassifiedLine> {
    let value: Value = serde_json::from_str(raw.trim()).ok()?;
    let obj = value.as_object()?;

    let timestamp = parse_timestamp(obj.get("timestamp"));
    let correlation_id = obj
        .get("request_id")
        .and_then(Value::as_str)
        .map(String::from);
    let message = obj.get("message").and_then(Value::as_str).unwrap_or("");

    if is_http_request(obj) {
        // A request line without a correlation id can never be grouped;
        // degrade it to a plain event that the correlator will discard.
        if let Some(id) = correlation_id {
            return Some(ClassifiedLine::Request(Box::new(build_request(
                obj, id, timestamp,
            ))));
        }
        return Some(ClassifiedLine::Event(LogEvent::new(
            EventKind::HttpRequest,
            None,
            timestamp,
            message.to_string(),
        )));
    }

    let kind = if message.contains("CACHE") {
        EventKind::Cache
    } else if SQL_KEYWORDS.iter().any(|kw| contains_word(message, kw)) {
        EventKind::Sql
    } else if CALL_MARKERS.iter().any(|m| message.contains(m)) {
        EventKind::SqlCallLine
    } else {
        EventKind::Other
    };

    Some(ClassifiedLine::Event(LogEvent::new(
        kind,
        correlation_id,
        timestamp,
        message.to_string(),
    )))
}

/// Classify a batch, dropping whatever does not parse.
pub fn classify_lines<S: AsRef<str>>(lines: &[S]) -> Vec<ClassifiedLine> {
    lines
        .iter()
        .filter_map(|line| classify_line(line.as_ref()))
        .collect()
}

fn is_http_request(obj: &serde_json::Map<String, Value>) -> bool {
    ["method", "path", "status"]
        .iter()
        .all(|field| obj.get(*field).is_some_and(|v| !v.is_null()))
}

fn build_request(
    obj: &serde_json::Map<String, Value>,
    correlation_id: String,
    timestamp: DateTime<Utc>,
) -> RequestAggregate {
    let str_field = |name: &str| obj.get(name).and_then(Value::as_str).map(String::from);

    RequestAggregate::new(
        correlation_id,
        timestamp,
        str_field("method").unwrap_or_default(),
        str_field("path").unwrap_or_default(),
        obj.get("status")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok()),
        obj.get("duration").and_then(Value::as_f64),
        str_field("controller"),
        str_field("action"),
        obj.get("params").and_then(Params::from_value),
    )
}

fn parse_timestamp(value: Option<&Value>) -> DateTime<Utc> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Substring match constrained to word boundaries (alphanumeric or `_`
/// neighbours disqualify a hit).
pub(crate) fn contains_word(haystack: &str, word: &str) -> bool {
    let boundary = |c: Option<char>| c.is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(word) {
        let at = start + pos;
        let end = at + word.len();
        if boundary(haystack[..at].chars().next_back()) && boundary(haystack[end..].chars().next())
        {
            return true;
        }
        start = end;
    }
    false
}

// ===== Tests =====
