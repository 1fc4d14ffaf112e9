//! AppState transition tests.

use super::*;
use crate::parser::classify_lines;
use crate::state::sort::SortMode;
use crate::view_state::{build_detail_lines, LineKind};

fn request_line(id: &str, path: &str, status: u16, ts: &str) -> String {
    format!(
        r#"{{"method":"GET","path":"{path}","status":{status},"duration":45.2,"controller":"UsersController","action":"index","request_id":"{id}","timestamp":"{ts}"}}"#
    )
}

fn sql_line(id: &str, content: &str) -> String {
    format!(r#"{{"message":"{content}","request_id":"{id}","timestamp":"2025-01-01T10:00:01Z"}}"#)
}

fn state_with_requests(count: usize) -> AppState {
    let mut state = AppState::new();
    let lines: Vec<String> = (0..count)
        .map(|i| {
            request_line(
                &format!("req-{i}"),
                &format!("/path/{i}"),
                200,
                &format!("2025-01-01T10:00:{i:02}Z"),
            )
        })
        .collect();
    state.ingest(classify_lines(&lines));
    state
}

// ===== focus and modes =====

#[test]
fn new_state_focuses_left_with_auto_scroll() {
    let state = AppState::new();
    assert!(state.left_pane_focused());
    assert!(state.auto_scroll);
    assert!(state.running());
}

#[test]
fn toggle_focus_alternates_panes() {
    let mut state = AppState::new();
    state.toggle_focus();
    assert!(state.right_pane_focused());
    state.toggle_focus();
    assert!(state.left_pane_focused());
}

#[test]
fn stop_clears_running() {
    let mut state = AppState::new();
    state.stop();
    assert!(!state.running());
}

#[test]
fn cycle_sort_mode_advances() {
    let mut state = AppState::new();
    assert_eq!(state.sort_mode(), SortMode::Time);
    state.cycle_sort_mode();
    assert_eq!(state.sort_mode(), SortMode::Duration);
}

// ===== filter editing state machine =====

#[test]
fn enter_filter_mode_targets_focused_pane() {
    let mut state = AppState::new();
    state.enter_filter_mode();
    assert!(state.main_filter().is_active());
    assert!(!state.detail_filter().is_active());

    state.exit_filter_mode();
    state.switch_to_right_pane();
    state.enter_filter_mode();
    assert!(!state.main_filter().is_active());
    assert!(state.detail_filter().is_active());
}

#[test]
fn both_filters_never_active_simultaneously() {
    let mut state = AppState::new();
    state.enter_filter_mode();
    state.switch_to_right_pane();
    state.enter_filter_mode();
    // Entering on the right while the left is active: the left one stays;
    // the exit path clears both.
    state.exit_filter_mode();
    assert!(!state.main_filter().is_active());
    assert!(!state.detail_filter().is_active());
}

#[test]
fn filter_chars_route_to_active_filter() {
    let mut state = AppState::new();
    state.enter_filter_mode();
    state.push_filter_char('u');
    state.push_filter_char('s');
    assert_eq!(state.main_filter().text(), "us");
    state.backspace_filter();
    assert_eq!(state.main_filter().text(), "u");
}

#[test]
fn clear_filter_resets_focused_pane_state() {
    let mut state = state_with_requests(3);
    state.enter_filter_mode();
    state.push_filter_char('x');
    state.selected = 2;
    state.scroll_offset = 1;
    state.clear_filter();
    assert!(!state.main_filter().is_present());
    assert_eq!(state.selected, 0);
    assert_eq!(state.scroll_offset, 0);

    state.switch_to_right_pane();
    state.enter_filter_mode();
    state.push_filter_char('y');
    state.detail_scroll_offset = 4;
    state.detail_selected_entry = 2;
    state.clear_filter();
    assert!(!state.detail_filter().is_present());
    assert_eq!(state.detail_scroll_offset, 0);
    assert_eq!(state.detail_selected_entry, 0);
}

// ===== request list filtering =====

#[test]
fn filtered_requests_match_any_field() {
    let mut state = state_with_requests(3);
    state.enter_filter_mode();
    for ch in "/path/1".chars() {
        state.push_filter_char(ch);
    }
    let filtered = state.filtered_requests();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].correlation_id(), "req-1");
}

#[test]
fn current_request_none_when_selection_out_of_range() {
    let mut state = state_with_requests(2);
    state.selected = 5;
    assert!(state.current_request().is_none());
}

// ===== navigation =====

#[test]
fn navigate_down_clamps_to_filtered_count() {
    let mut state = state_with_requests(2);
    state.navigate_down();
    assert_eq!(state.selected, 1);
    state.navigate_down();
    assert_eq!(state.selected, 1, "clamped at last row");
}

#[test]
fn navigate_up_clamps_at_zero() {
    let mut state = state_with_requests(2);
    state.navigate_up();
    assert_eq!(state.selected, 0);
}

#[test]
fn manual_navigation_disables_auto_scroll() {
    let mut state = state_with_requests(3);
    assert!(state.auto_scroll);
    state.navigate_down();
    assert!(!state.auto_scroll);
}

#[test]
fn right_pane_entry_increment_is_unclamped() {
    let mut state = state_with_requests(1);
    state.switch_to_right_pane();
    for _ in 0..999 {
        state.navigate_down();
    }
    assert_eq!(state.detail_selected_entry, 999);
    state.navigate_up();
    assert_eq!(state.detail_selected_entry, 998);
}

#[test]
fn right_pane_entry_lower_clamps_at_zero() {
    let mut state = state_with_requests(1);
    state.switch_to_right_pane();
    state.navigate_up();
    assert_eq!(state.detail_selected_entry, 0);
}

// ===== scroll adjustment =====

#[test]
fn selection_above_viewport_scrolls_up() {
    let mut state = state_with_requests(20);
    state.scroll_offset = 10;
    state.selected = 5;
    state.adjust_scroll_for_selection(5);
    assert_eq!(state.scroll_offset, 5);
}

#[test]
fn selection_below_viewport_scrolls_down() {
    let mut state = state_with_requests(20);
    state.scroll_offset = 0;
    state.selected = 9;
    state.adjust_scroll_for_selection(5);
    assert_eq!(state.scroll_offset, 5);
}

#[test]
fn auto_scroll_pins_selection_to_newest_row() {
    let mut state = state_with_requests(10);
    state.adjust_auto_scroll(4);
    assert_eq!(state.selected, 9);
    assert_eq!(state.scroll_offset, 6);
}

#[test]
fn auto_scroll_off_leaves_selection_alone() {
    let mut state = state_with_requests(10);
    state.auto_scroll = false;
    state.selected = 2;
    state.adjust_auto_scroll(4);
    assert_eq!(state.selected, 2);
}

#[test]
fn scroll_bounds_clamp_to_list_size() {
    let mut state = state_with_requests(3);
    state.scroll_offset = 99;
    state.adjust_scroll_bounds(5);
    assert_eq!(state.scroll_offset, 0);
}

// ===== entry-granular detail scrolling =====

fn detail_state() -> (AppState, std::rc::Rc<Vec<crate::view_state::DetailLine>>) {
    let mut state = AppState::new();
    let lines = vec![
        request_line("abc123", "/users", 200, "2025-01-01T10:00:00Z"),
        sql_line("abc123", "User Load (1.2ms) SELECT * FROM users"),
        sql_line("abc123", "  ↳ app/models/user.rb:10"),
        sql_line("abc123", "Completed 200 OK in 45ms"),
    ];
    state.ingest(classify_lines(&lines));
    state.switch_to_right_pane();
    let request = state.current_request().expect("request");
    let built = std::rc::Rc::new(build_detail_lines(request, state.detail_filter(), 80));
    (state, built)
}

#[test]
fn out_of_range_entry_selection_clamps_lazily() {
    let (mut state, lines) = detail_state();
    state.detail_selected_entry = 999;
    state.adjust_detail_scroll_for_entry_selection(10, &lines);
    let max_entry = entry_ids(&lines).len() - 1;
    assert_eq!(state.detail_selected_entry, max_entry);
}

#[test]
fn two_entry_pane_clamps_999_to_one() {
    // Spec scenario: only 2 logical entries -> 999 corrects to 1.
    let lines = vec![
        DetailLine {
            text: "first".into(),
            kind: LineKind::Content,
            entry_id: Some(0),
            raw_ansi: false,
            segments: Vec::new(),
            source: None,
        },
        DetailLine {
            text: "second".into(),
            kind: LineKind::Content,
            entry_id: Some(1),
            raw_ansi: false,
            segments: Vec::new(),
            source: None,
        },
    ];
    let mut state = AppState::new();
    state.switch_to_right_pane();
    state.detail_selected_entry = 999;
    state.adjust_detail_scroll_for_entry_selection(10, &lines);
    assert_eq!(state.detail_selected_entry, 1);
}

#[test]
fn entry_scroll_reveals_whole_entry() {
    let (mut state, lines) = detail_state();
    let ids = entry_ids(&lines);
    // Select the last entry with a tiny viewport; the scroll must move down
    // far enough that the entry's last line (including its trailing
    // separator) is visible.
    state.detail_selected_entry = ids.len() - 1;
    state.adjust_detail_scroll_for_entry_selection(3, &lines);
    let (first, last) = entry_line_span(&lines, ids[state.detail_selected_entry]).unwrap();
    assert!(state.detail_scroll_offset <= first);
    assert!(last < state.detail_scroll_offset + 3);
}

#[test]
fn entry_scroll_moves_up_for_earlier_entry() {
    let (mut state, lines) = detail_state();
    state.detail_scroll_offset = lines.len().saturating_sub(1);
    state.detail_selected_entry = 0;
    state.adjust_detail_scroll_for_entry_selection(5, &lines);
    assert_eq!(state.detail_scroll_offset, 0);
}

#[test]
fn entry_scroll_ignored_when_left_focused() {
    let (mut state, lines) = detail_state();
    state.switch_to_left_pane();
    state.detail_selected_entry = 999;
    state.adjust_detail_scroll_for_entry_selection(10, &lines);
    assert_eq!(state.detail_selected_entry, 999, "lazy: only right pane corrects");
}

#[test]
fn detail_scroll_bounds_clamp() {
    let mut state = AppState::new();
    state.detail_scroll_offset = 50;
    state.adjust_detail_scroll_bounds(20, 5);
    assert_eq!(state.detail_scroll_offset, 15);
}

// ===== clear / undo =====

#[test]
fn clear_requests_empties_list_and_stores_batch() {
    let mut state = state_with_requests(3);
    state.selected = 2;
    state.scroll_offset = 1;
    state.detail_scroll_offset = 3;
    state.detail_selected_entry = 2;

    state.clear_requests();

    assert!(state.requests().is_empty());
    assert!(state.can_undo_clear());
    assert_eq!(state.selected, 0);
    assert_eq!(state.scroll_offset, 0);
    assert_eq!(state.detail_scroll_offset, 0);
    assert_eq!(state.detail_selected_entry, 0);
}

#[test]
fn undo_restores_requests_and_exact_snapshot() {
    let mut state = state_with_requests(3);
    state.selected = 2;
    state.scroll_offset = 1;
    state.detail_scroll_offset = 3;
    state.detail_selected_entry = 1;

    state.clear_requests();

    // Post-clear state changes must not leak into the restore.
    state.selected = 7;
    state.scroll_offset = 9;

    state.undo_clear_requests();

    assert_eq!(state.requests().len(), 3);
    assert_eq!(state.selected, 2);
    assert_eq!(state.scroll_offset, 1);
    assert_eq!(state.detail_scroll_offset, 3);
    assert_eq!(state.detail_selected_entry, 1);
    assert!(!state.can_undo_clear());
}

#[test]
fn undo_keeps_requests_that_arrived_after_clear() {
    let mut state = state_with_requests(2);
    state.clear_requests();

    state.ingest(classify_lines(&[request_line(
        "late-1",
        "/late",
        200,
        "2025-01-01T11:00:00Z",
    )]));
    assert_eq!(state.requests().len(), 1);

    state.undo_clear_requests();

    let ids: Vec<&str> = state.requests().iter().map(|r| r.correlation_id()).collect();
    assert_eq!(ids, vec!["req-0", "req-1", "late-1"], "arrival order preserved");
}

#[test]
fn consecutive_clears_accumulate_with_first_snapshot() {
    let mut state = state_with_requests(2);
    state.selected = 1;
    state.scroll_offset = 1;

    state.clear_requests();

    state.ingest(classify_lines(&[request_line(
        "mid-1",
        "/mid",
        200,
        "2025-01-01T11:00:00Z",
    )]));
    // Different live state at the second clear; it must not be snapshotted.
    state.selected = 0;
    state.scroll_offset = 0;
    state.clear_requests();

    state.undo_clear_requests();

    let ids: Vec<&str> = state.requests().iter().map(|r| r.correlation_id()).collect();
    assert_eq!(ids, vec!["req-0", "req-1", "mid-1"]);
    assert_eq!(state.selected, 1, "snapshot from the first clear");
    assert_eq!(state.scroll_offset, 1);
}

#[test]
fn undo_without_pending_batch_is_a_no_op() {
    let mut state = state_with_requests(2);
    assert!(!state.can_undo_clear());
    state.undo_clear_requests();
    assert_eq!(state.requests().len(), 2);
}

#[test]
fn clear_then_undo_twice_does_not_restore_again() {
    let mut state = state_with_requests(2);
    state.clear_requests();
    state.undo_clear_requests();
    assert_eq!(state.requests().len(), 2);

    state.clear_requests();
    state.undo_clear_requests();
    state.undo_clear_requests();
    assert_eq!(state.requests().len(), 2, "undo is one-shot");
}
