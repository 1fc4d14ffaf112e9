//! Substring filters for the request list and the detail pane.

use crate::model::{EventKind, LogEvent, RequestAggregate};

/// One pane's filter: editing flag plus accumulated text.
///
/// `active` means the filter is in editing mode and receives keystrokes;
/// the text keeps filtering after editing ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    active: bool,
    text: String,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True when there is filter text to apply.
    pub fn is_present(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn enter_mode(&mut self) {
        self.active = true;
    }

    pub fn exit_mode(&mut self) {
        self.active = false;
    }

    pub fn push_char(&mut self, ch: char) {
        self.text.push(ch);
    }

    pub fn pop_char(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.text.clear();
    }

    /// Case-insensitive substring match.
    pub fn matches(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.text.to_lowercase())
    }

    /// Text with a block cursor appended while editing.
    pub fn cursor_display(&self) -> String {
        if self.active {
            format!("{}█", self.text)
        } else {
            self.text.clone()
        }
    }
}

/// Does the request match the filter on any of its display fields?
///
/// Fields considered: path, method, controller, action, stringified status,
/// correlation id.
pub fn request_matches(filter: &Filter, request: &RequestAggregate) -> bool {
    filter.matches(request.path())
        || filter.matches(request.method())
        || request.controller().is_some_and(|c| filter.matches(c))
        || request.action().is_some_and(|a| filter.matches(a))
        || request
            .status()
            .is_some_and(|s| filter.matches(&s.to_string()))
        || filter.matches(request.correlation_id())
}

/// Indices of related events passing the detail filter, with companion
/// inclusion: a matching call line pulls in the query right after it, and a
/// matching query pulls in the call line right before it. Results are
/// deduplicated and in original order.
pub fn filter_related_indices(related: &[LogEvent], filter: &Filter) -> Vec<usize> {
    if !filter.is_present() {
        return (0..related.len()).collect();
    }

    let mut matched = vec![false; related.len()];
    for (index, event) in related.iter().enumerate() {
        if !filter.matches(event.content()) {
            continue;
        }
        matched[index] = true;
        match event.kind() {
            EventKind::SqlCallLine => {
                if index + 1 < related.len() {
                    matched[index + 1] = true;
                }
            }
            EventKind::Sql | EventKind::Cache => {
                if index > 0 && related[index - 1].kind() == EventKind::SqlCallLine {
                    matched[index - 1] = true;
                }
            }
            _ => {}
        }
    }

    matched
        .iter()
        .enumerate()
        .filter_map(|(i, &hit)| hit.then_some(i))
        .collect()
}

// ===== Tests =====
