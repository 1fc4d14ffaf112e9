//! Left pane: the request list.

use crate::state::AppState;
use crate::view::styles::Styles;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

/// Rows available for request lines inside the borders, after the filter
/// line when one is shown. Scroll adjustment and rendering must agree on
/// this number.
pub fn visible_height(area: Rect, state: &AppState) -> usize {
    let mut height = usize::from(area.height.saturating_sub(2));
    if filter_line_shown(state) {
        height = height.saturating_sub(1);
    }
    height
}

fn filter_line_shown(state: &AppState) -> bool {
    state.main_filter().is_active() || state.main_filter().is_present()
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, styles: &Styles) {
    let filtered = state.filtered_requests();

    let mut title = format!(" Requests ({}) - {} ", filtered.len(), state.sort_mode().label());
    if state.auto_scroll {
        title.push_str("[auto] ");
    }
    let title_style = if state.left_pane_focused() {
        styles.focused_title()
    } else {
        styles.unfocused_title()
    };

    let block = Block::bordered().title(Span::styled(title, title_style));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    if filter_line_shown(state) {
        lines.push(Line::from(Span::styled(
            format!("Filter: {}", state.main_filter().cursor_display()),
            styles.filter(),
        )));
    }

    let height = visible_height(area, state);
    let window = filtered
        .iter()
        .enumerate()
        .skip(state.scroll_offset)
        .take(height);

    for (index, request) in window {
        let selected = index == state.selected;
        let status = request
            .status()
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        let duration = request
            .duration_ms()
            .map_or_else(String::new, |d| format!(" {d}ms"));

        let mut spans = vec![
            Span::raw(format!("{} ", request.timestamp().format("%H:%M:%S"))),
            Span::styled(
                format!("{:<6} ", request.method()),
                styles.method(request.method()),
            ),
            Span::raw(format!("{} ", request.path())),
            Span::styled(status, styles.status(request.status().unwrap_or(0))),
            Span::raw(duration),
        ];

        if selected {
            let highlight = styles.selection();
            spans = spans
                .into_iter()
                .map(|span| Span::styled(span.content, span.style.patch(highlight)))
                .collect();
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

// ===== Tests =====
