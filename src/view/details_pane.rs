//! Right pane: details of the selected request.
//!
//! Renders the pre-built [`DetailLine`] sequence through the scroll window.
//! Raw-ANSI lines are decoded into styled spans at draw time; rows of the
//! selected entry are repainted as a highlight with their ANSI stripped so
//! the selection stays readable.

use crate::state::AppState;
use crate::view::styles::Styles;
use crate::view_state::detail::{entry_ids, DetailLine};
use crate::wrap::{strip_ansi, tokenize, Token};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

/// Rows available for detail lines inside the borders.
pub fn visible_height(area: Rect) -> usize {
    usize::from(area.height.saturating_sub(2))
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    lines: &[DetailLine],
    styles: &Styles,
) {
    let title_style = if state.right_pane_focused() {
        styles.focused_title()
    } else {
        styles.unfocused_title()
    };
    let mut block = Block::bordered().title(Span::styled(" Request Details ", title_style));

    let detail_filter = state.detail_filter();
    if detail_filter.is_active() || detail_filter.is_present() {
        block = block.title_top(
            Line::from(Span::styled(
                format!("Filter: {} ", detail_filter.cursor_display()),
                styles.filter(),
            ))
            .right_aligned(),
        );
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let ids = entry_ids(lines);
    let selected_id = state
        .right_pane_focused()
        .then(|| ids.get(state.detail_selected_entry).copied())
        .flatten();

    let height = visible_height(area);
    let rows: Vec<Line> = lines
        .iter()
        .skip(state.detail_scroll_offset)
        .take(height)
        .map(|line| {
            let highlighted =
                !line.is_separator() && line.entry_id.is_some() && line.entry_id == selected_id;
            render_line(line, highlighted, usize::from(inner.width), styles)
        })
        .collect();

    frame.render_widget(Paragraph::new(rows), inner);
}

fn render_line(
    line: &DetailLine,
    highlighted: bool,
    pane_width: usize,
    styles: &Styles,
) -> Line<'static> {
    if highlighted {
        // Repaint the whole row; ANSI is stripped so the highlight reads.
        let mut text = strip_ansi(&line.text);
        let pad = pane_width.saturating_sub(crate::wrap::visible_width(&text));
        text.push_str(&" ".repeat(pad));
        return Line::from(Span::styled(text, styles.selection()));
    }

    if !line.segments.is_empty() {
        let spans = line
            .segments
            .iter()
            .map(|seg| Span::styled(seg.text.clone(), styles.segment_for(seg.style, &seg.text)))
            .collect::<Vec<_>>();
        return Line::from(spans);
    }

    if line.raw_ansi {
        return Line::from(ansi_spans(&line.text, styles));
    }

    Line::from(line.text.clone())
}

/// Decode embedded SGR sequences into styled spans. Each escape replaces
/// the active style, matching how the producers emit color.
fn ansi_spans(text: &str, styles: &Styles) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut current = ratatui::style::Style::default();
    for token in tokenize(text) {
        match token {
            Token::Escape(esc) => current = styles.sgr(esc),
            Token::Text(seg) if !seg.is_empty() => {
                spans.push(Span::styled(seg.to_string(), current));
            }
            Token::Text(_) => {}
        }
    }
    spans
}

// ===== Tests =====
