//! Memoization of built detail lines.
//!
//! The key carries every input that can change the output: the aggregate's
//! identity, how many related events it has (the sequence is append-only,
//! so the count is a complete version stamp), the detail filter text, and
//! the pane width. An unchanged key returns the identical `Rc` — no
//! recomputation, observable by pointer identity.

use crate::model::RequestAggregate;
use crate::state::filter::Filter;
use crate::view_state::detail::{build_detail_lines, DetailLine};
use std::rc::Rc;

/// Everything that affects the rendered detail lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailCacheKey {
    correlation_id: String,
    related_len: usize,
    filter_text: String,
    width: u16,
}

impl DetailCacheKey {
    fn new(request: &RequestAggregate, filter: &Filter, width: u16) -> Self {
        Self {
            correlation_id: request.correlation_id().to_string(),
            related_len: request.related().len(),
            filter_text: filter.text().to_string(),
            width,
        }
    }
}

/// Single-slot cache for the currently selected request's detail lines.
///
/// Owned by the render loop; never shared.
#[derive(Debug, Default)]
pub struct DetailCache {
    key: Option<DetailCacheKey>,
    lines: Rc<Vec<DetailLine>>,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the detail lines, rebuilding only when the key changed.
    pub fn lines_for(
        &mut self,
        request: &RequestAggregate,
        filter: &Filter,
        width: u16,
    ) -> Rc<Vec<DetailLine>> {
        let key = DetailCacheKey::new(request, filter, width);
        if self.key.as_ref() == Some(&key) {
            return Rc::clone(&self.lines);
        }
        self.lines = Rc::new(build_detail_lines(request, filter, width));
        self.key = Some(key);
        Rc::clone(&self.lines)
    }

    /// Drop the cached lines; the next lookup rebuilds.
    pub fn invalidate(&mut self) {
        self.key = None;
    }
}

// ===== Tests =====
