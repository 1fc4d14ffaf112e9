//! Application state and transitions.
//!
//! [`AppState`] is the single owned state struct passed explicitly into the
//! render and input-handling routines. Every transition is a method that
//! runs to completion before the next event is considered; there is no
//! ambient or shared state.

use crate::model::RequestAggregate;
use crate::parser::ClassifiedLine;
use crate::state::filter::{request_matches, Filter};
use crate::state::sort::SortMode;
use crate::view_state::detail::{entry_ids, entry_line_span, DetailLine};

// ===== FocusPane =====

/// Which pane has keyboard focus - exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusPane {
    /// The request list.
    #[default]
    Left,
    /// The request details.
    Right,
}

// ===== ClearedBatch =====

/// The single pending undo generation produced by `clear_requests`.
///
/// Holds the cleared requests plus the exact selection/scroll snapshot taken
/// at the first clear. Consecutive clears accumulate into the same batch;
/// undo is one-shot.
#[derive(Debug, Clone)]
pub struct ClearedBatch {
    requests: Vec<RequestAggregate>,
    selected: usize,
    scroll_offset: usize,
    detail_scroll_offset: usize,
    detail_selected_entry: usize,
}

// ===== AppState =====

/// All interactive state of the viewer.
#[derive(Debug)]
pub struct AppState {
    requests: Vec<RequestAggregate>,
    /// Selected row in the filtered request list.
    pub selected: usize,
    /// First visible row of the left pane.
    pub scroll_offset: usize,
    /// First visible line of the detail pane.
    pub detail_scroll_offset: usize,
    /// Selected logical entry in the detail pane. May run past the end;
    /// corrected lazily against the current entry count on render.
    pub detail_selected_entry: usize,
    /// Keep the newest request selected as data arrives.
    pub auto_scroll: bool,
    focused_pane: FocusPane,
    main_filter: Filter,
    detail_filter: Filter,
    sort: SortMode,
    cleared: Option<ClearedBatch>,
    text_selection_mode: bool,
    running: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            detail_scroll_offset: 0,
            detail_selected_entry: 0,
            auto_scroll: true,
            focused_pane: FocusPane::Left,
            main_filter: Filter::new(),
            detail_filter: Filter::new(),
            sort: SortMode::default(),
            cleared: None,
            text_selection_mode: false,
            running: true,
        }
    }

    // ===== Lifecycle =====

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    // ===== Data ingestion =====

    /// Merge a classified batch into the live request list.
    ///
    /// This is the only writer of the aggregate list and of the related
    /// sequences inside it; it runs on the render loop as batches are
    /// drained from the tailer channel.
    pub fn ingest(&mut self, batch: Vec<ClassifiedLine>) {
        crate::correlate::merge_batch(&mut self.requests, batch);
    }

    /// The live (uncleared, unfiltered) request list.
    pub fn requests(&self) -> &[RequestAggregate] {
        &self.requests
    }

    // ===== Focus =====

    pub fn focused_pane(&self) -> FocusPane {
        self.focused_pane
    }

    pub fn left_pane_focused(&self) -> bool {
        self.focused_pane == FocusPane::Left
    }

    pub fn right_pane_focused(&self) -> bool {
        self.focused_pane == FocusPane::Right
    }

    pub fn switch_to_left_pane(&mut self) {
        self.focused_pane = FocusPane::Left;
    }

    pub fn switch_to_right_pane(&mut self) {
        self.focused_pane = FocusPane::Right;
    }

    pub fn toggle_focus(&mut self) {
        self.focused_pane = match self.focused_pane {
            FocusPane::Left => FocusPane::Right,
            FocusPane::Right => FocusPane::Left,
        };
    }

    // ===== Modes =====

    pub fn toggle_auto_scroll(&mut self) {
        self.auto_scroll = !self.auto_scroll;
    }

    /// Text-selection mode suspends mouse capture so the terminal's own
    /// selection works; the view layer reads this flag.
    pub fn text_selection_mode(&self) -> bool {
        self.text_selection_mode
    }

    pub fn toggle_text_selection_mode(&mut self) {
        self.text_selection_mode = !self.text_selection_mode;
    }

    pub fn cycle_sort_mode(&mut self) {
        self.sort = self.sort.cycle();
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    // ===== Filters =====

    pub fn main_filter(&self) -> &Filter {
        &self.main_filter
    }

    pub fn detail_filter(&self) -> &Filter {
        &self.detail_filter
    }

    /// Begin editing the focused pane's filter. Only one filter can ever be
    /// active: entering is gated on focus and exiting deactivates both.
    pub fn enter_filter_mode(&mut self) {
        match self.focused_pane {
            FocusPane::Left => self.main_filter.enter_mode(),
            FocusPane::Right => self.detail_filter.enter_mode(),
        }
    }

    pub fn exit_filter_mode(&mut self) {
        self.main_filter.exit_mode();
        self.detail_filter.exit_mode();
    }

    /// True while either filter is in editing mode.
    pub fn filter_editing(&self) -> bool {
        self.main_filter.is_active() || self.detail_filter.is_active()
    }

    pub fn push_filter_char(&mut self, ch: char) {
        if self.main_filter.is_active() {
            self.main_filter.push_char(ch);
        } else if self.detail_filter.is_active() {
            self.detail_filter.push_char(ch);
        }
    }

    pub fn backspace_filter(&mut self) {
        if self.main_filter.is_active() {
            self.main_filter.pop_char();
        } else if self.detail_filter.is_active() {
            self.detail_filter.pop_char();
        }
    }

    /// Reset the focused pane's filter along with its scroll state.
    pub fn clear_filter(&mut self) {
        match self.focused_pane {
            FocusPane::Left => {
                self.main_filter.clear();
                self.selected = 0;
                self.scroll_offset = 0;
            }
            FocusPane::Right => {
                self.detail_filter.clear();
                self.detail_scroll_offset = 0;
                self.detail_selected_entry = 0;
            }
        }
    }

    // ===== Request list =====

    /// Requests passing the main filter, in the current sort order.
    pub fn filtered_requests(&self) -> Vec<&RequestAggregate> {
        let filtered: Vec<&RequestAggregate> = if self.main_filter.is_present() {
            self.requests
                .iter()
                .filter(|req| request_matches(&self.main_filter, req))
                .collect()
        } else {
            self.requests.iter().collect()
        };
        self.sort.sort(filtered)
    }

    /// The currently selected request, when the selection is in range.
    pub fn current_request(&self) -> Option<&RequestAggregate> {
        self.filtered_requests().into_iter().nth(self.selected)
    }

    // ===== Navigation =====

    /// Move the focused pane's selection up one step. A manual move on the
    /// left pane disables auto-scroll.
    pub fn navigate_up(&mut self) {
        match self.focused_pane {
            FocusPane::Left => {
                self.selected = self.selected.saturating_sub(1);
                self.auto_scroll = false;
            }
            FocusPane::Right => {
                self.detail_selected_entry = self.detail_selected_entry.saturating_sub(1);
            }
        }
    }

    /// Move the focused pane's selection down one step.
    ///
    /// The left selection clamps against the filtered count; the right
    /// entry index increments freely and is corrected on the next render,
    /// because the entry count depends on the live filter and width.
    pub fn navigate_down(&mut self) {
        match self.focused_pane {
            FocusPane::Left => {
                let count = self.filtered_requests().len();
                self.selected = (self.selected + 1).min(count.saturating_sub(1));
                self.auto_scroll = false;
            }
            FocusPane::Right => {
                self.detail_selected_entry += 1;
            }
        }
    }

    pub fn reset_detail_selection(&mut self) {
        self.detail_selected_entry = 0;
        self.detail_scroll_offset = 0;
    }

    // ===== Scroll adjustment (called on every draw) =====

    /// Keep the left selection inside the viewport.
    pub fn adjust_scroll_for_selection(&mut self, visible_height: usize) {
        if !self.left_pane_focused() {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected + 1 - visible_height;
        }
    }

    /// While auto-scroll is on, pin the selection to the newest filtered
    /// row and keep it bottom-visible.
    pub fn adjust_auto_scroll(&mut self, visible_height: usize) {
        let count = self.filtered_requests().len();
        if !self.auto_scroll || count == 0 {
            return;
        }
        self.selected = count - 1;
        self.scroll_offset = (self.selected + 1).saturating_sub(visible_height);
    }

    /// Clamp the left scroll offset to the filtered list.
    pub fn adjust_scroll_bounds(&mut self, visible_height: usize) {
        let count = self.filtered_requests().len();
        let max_offset = count.saturating_sub(visible_height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    /// Clamp the detail scroll offset to the rendered line count.
    pub fn adjust_detail_scroll_bounds(&mut self, total_lines: usize, visible_height: usize) {
        let max_offset = total_lines.saturating_sub(visible_height);
        self.detail_scroll_offset = self.detail_scroll_offset.min(max_offset);
    }

    /// Correct the entry selection against the current entry enumeration
    /// and scroll the whole selected entry into view.
    ///
    /// The entry's last line extends through trailing separators, so a
    /// multi-line entry is never cut in half by the scroll boundary.
    pub fn adjust_detail_scroll_for_entry_selection(
        &mut self,
        visible_height: usize,
        lines: &[DetailLine],
    ) {
        if !self.right_pane_focused() {
            return;
        }

        let ids = entry_ids(lines);
        let max_entry = ids.len().saturating_sub(1);
        self.detail_selected_entry = self.detail_selected_entry.min(max_entry);

        let Some(&selected_id) = ids.get(self.detail_selected_entry) else {
            return;
        };
        let Some((first, last)) = entry_line_span(lines, selected_id) else {
            return;
        };

        if first < self.detail_scroll_offset {
            self.detail_scroll_offset = first;
        } else if last >= self.detail_scroll_offset + visible_height {
            self.detail_scroll_offset = last + 1 - visible_height;
        }
    }

    // ===== Clear / undo =====

    /// Move the live request list into the pending cleared batch.
    ///
    /// With a batch already pending, the newly cleared requests are appended
    /// to it and the original snapshot is kept - one accumulating undo
    /// generation, never two.
    pub fn clear_requests(&mut self) {
        let requests = std::mem::take(&mut self.requests);
        match &mut self.cleared {
            Some(batch) => batch.requests.extend(requests),
            None => {
                self.cleared = Some(ClearedBatch {
                    requests,
                    selected: self.selected,
                    scroll_offset: self.scroll_offset,
                    detail_scroll_offset: self.detail_scroll_offset,
                    detail_selected_entry: self.detail_selected_entry,
                });
            }
        }

        self.selected = 0;
        self.scroll_offset = 0;
        self.detail_scroll_offset = 0;
        self.detail_selected_entry = 0;
    }

    /// Restore the pending cleared batch, followed by requests that arrived
    /// after the clear, and the exact snapshot taken at clear time. One-shot.
    pub fn undo_clear_requests(&mut self) {
        let Some(batch) = self.cleared.take() else {
            return;
        };

        let mut restored = batch.requests;
        restored.append(&mut self.requests);
        self.requests = restored;
        self.selected = batch.selected;
        self.scroll_offset = batch.scroll_offset;
        self.detail_scroll_offset = batch.detail_scroll_offset;
        self.detail_selected_entry = batch.detail_selected_entry;
    }

    pub fn can_undo_clear(&self) -> bool {
        self.cleared.is_some()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "app_state_tests.rs"]
mod tests;
