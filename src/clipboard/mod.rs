//! Clipboard integration and copy-text construction.
//!
//! The sink is best-effort by contract: a clipboard that is missing,
//! locked, or headless must never surface an error into the session. The
//! text builders are pure and carry all the interesting behavior - fenced
//! request summaries and lossless entry reconstruction via the builder's
//! source back-references.

use crate::model::{QueryStats, RequestAggregate};
use crate::parser::{contains_word, CALL_MARKERS};
use crate::state::{AppState, FocusPane};
use crate::view_state::detail::{entry_ids, DetailLine};
use crate::wrap::strip_ansi;

// ===== Sink =====

/// Accepts a single string to place on the system clipboard.
pub trait ClipboardSink {
    /// Returns whether the copy took; failure is not an error.
    fn copy(&mut self, text: &str) -> bool;
}

/// The OS clipboard via `arboard`. All failures are swallowed.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn copy(&mut self, text: &str) -> bool {
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => match clipboard.set_text(text.to_string()) {
                Ok(()) => true,
                Err(error) => {
                    tracing::debug!(%error, "clipboard copy failed");
                    false
                }
            },
            Err(error) => {
                tracing::debug!(%error, "clipboard unavailable");
                false
            }
        }
    }
}

// ===== Copy text builders =====

/// Copy text for whatever is selected in the focused pane.
pub fn copy_text_for(state: &AppState, lines: &[DetailLine]) -> Option<String> {
    let request = state.current_request()?;
    match state.focused_pane() {
        FocusPane::Left => Some(request_copy_text(request)),
        FocusPane::Right => detail_entry_copy_text(request, lines, state.detail_selected_entry),
    }
}

/// A fenced, human-pasteable summary of one request.
pub fn request_copy_text(request: &RequestAggregate) -> String {
    let mut content = vec!["```".to_string()];

    let mut headline = format!("{} {}", request.method(), request.path());
    if let Some(status) = request.status() {
        headline.push_str(&format!(" {status}"));
    }
    content.push(headline);

    if let Some(duration) = request.duration_ms() {
        content.push(format!("Duration: {duration}ms"));
    }
    if let Some(controller) = request.controller() {
        content.push(format!("Controller: {controller}"));
    }
    if let Some(action) = request.action() {
        content.push(format!("Action: {action}"));
    }
    content.push(format!("Request ID: {}", request.correlation_id()));
    content.push(format!("Timestamp: {}", request.timestamp().to_rfc3339()));
    if let Some(params) = request.params().filter(|p| !p.is_empty()) {
        content.push(format!("Params: {}", params.display()));
    }

    if !request.related().is_empty() {
        content.push(String::new());
        content.push(QueryStats::collect(request).text_summary());
    }

    content.push("```".to_string());
    content.join("\n")
}

/// Copy text for the selected detail entry.
///
/// The entry's first physical line carries a back-reference to the source
/// event, so the original (unwrapped) content is reconstructed losslessly.
/// A SQL entry is fenced as a ```sql block and joined with its companion
/// call line when the entry group has one.
pub fn detail_entry_copy_text(
    request: &RequestAggregate,
    lines: &[DetailLine],
    selected_entry: usize,
) -> Option<String> {
    let ids = entry_ids(lines);
    let &entry_id = ids.get(selected_entry)?;
    let entry_lines: Vec<&DetailLine> = lines
        .iter()
        .filter(|l| l.entry_id == Some(entry_id))
        .collect();

    if let Some(index) = entry_lines.iter().find_map(|l| l.source) {
        let content = request.related().get(index)?.content();
        let clean = strip_ansi(content).trim().to_string();
        if !is_sql_text(&clean) {
            return Some(clean);
        }
        return Some(match companion_call_line(&entry_lines) {
            Some(call) => format!("```sql\n{clean}\n{call}\n```"),
            None => format!("```sql\n{clean}\n```"),
        });
    }

    // No back-reference (header entries): rejoin the wrapped display lines.
    let joined = entry_lines
        .iter()
        .map(|l| strip_ansi(&l.text).trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let collapsed = collapse_whitespace(&joined);
    if collapsed.is_empty() {
        return None;
    }
    Some(if is_sql_text(&collapsed) {
        format!("```sql\n{collapsed}\n```")
    } else {
        collapsed
    })
}

/// The cleaned text of the call line inside an entry group, if any.
fn companion_call_line(entry_lines: &[&DetailLine]) -> Option<String> {
    entry_lines.iter().find_map(|line| {
        let clean = strip_ansi(&line.text).trim().to_string();
        CALL_MARKERS
            .iter()
            .any(|m| clean.starts_with(m))
            .then_some(clean)
    })
}

/// Case-insensitive whole-word SQL keyword check.
fn is_sql_text(text: &str) -> bool {
    let upper = text.to_uppercase();
    [
        "SELECT",
        "INSERT",
        "UPDATE",
        "DELETE",
        "TRANSACTION",
        "BEGIN",
        "COMMIT",
        "ROLLBACK",
        "SAVEPOINT",
    ]
    .iter()
    .any(|kw| contains_word(&upper, kw))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ===== Tests =====
