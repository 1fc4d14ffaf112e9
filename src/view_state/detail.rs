//! Detail pane line builder.
//!
//! Builds the full ordered sequence of display lines for one request: a
//! header block, a query summary, and the related-events block. Pure —
//! everything is a function of (request, detail filter, pane width), which
//! is exactly the cache key used by [`super::cache::DetailCache`].
//!
//! Lines are grouped into logical entries by `entry_id`; a multi-line field
//! or log event shares one id, and navigation moves over ids rather than
//! physical lines. Separator lines carry no id and are skipped by entry
//! enumeration.

use crate::model::{EventKind, QueryStats, RequestAggregate};
use crate::state::filter::{filter_related_indices, Filter};
use crate::wrap::{has_ansi, wrap_ansi, wrap_plain};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

// ===== Line model =====

/// Physical line category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A line with display text.
    Content,
    /// An empty line inside an entry (keeps the entry's id).
    Blank,
    /// An empty line between entries. Carries no entry id and is excluded
    /// from entry enumeration.
    Separator,
}

/// Semantic style for a pre-styled header segment. The view layer maps
/// these to concrete terminal styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStyle {
    /// Field label, e.g. `Path: `.
    Label,
    /// Section title, e.g. `Related Logs:`.
    Title,
    /// Plain value text.
    Value,
    /// HTTP method, colored by verb.
    Method,
    /// Status code, colored by class.
    Status(u16),
    /// Query-summary body text.
    Summary,
    /// De-emphasized, e.g. the filtered `(n/m shown)` count.
    Dim,
}

/// A styled run within a header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: SegmentStyle,
}

impl Segment {
    fn new(text: impl Into<String>, style: SegmentStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// One physical display line of the detail pane.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailLine {
    /// Display text. For `raw_ansi` lines this still contains the escape
    /// sequences; the view parses them at draw time.
    pub text: String,
    pub kind: LineKind,
    /// Logical entry this line belongs to. `None` only for separators.
    pub entry_id: Option<usize>,
    /// True when `text` embeds ANSI escape sequences.
    pub raw_ansi: bool,
    /// Styled segments for header lines; empty for plain lines.
    pub segments: Vec<Segment>,
    /// Index into the request's related events, set on the first physical
    /// line of an event group for lossless reconstruction by the copy
    /// handler.
    pub source: Option<usize>,
}

impl DetailLine {
    fn blank(entry_id: usize) -> Self {
        Self {
            text: String::new(),
            kind: LineKind::Blank,
            entry_id: Some(entry_id),
            raw_ansi: false,
            segments: Vec::new(),
            source: None,
        }
    }

    fn separator() -> Self {
        Self {
            text: String::new(),
            kind: LineKind::Separator,
            entry_id: None,
            raw_ansi: false,
            segments: Vec::new(),
            source: None,
        }
    }

    fn plain(text: impl Into<String>, entry_id: usize) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Content,
            entry_id: Some(entry_id),
            raw_ansi: false,
            segments: Vec::new(),
            source: None,
        }
    }

    fn styled(segments: Vec<Segment>, entry_id: usize) -> Self {
        Self {
            text: segments.iter().map(|s| s.text.as_str()).collect(),
            kind: LineKind::Content,
            entry_id: Some(entry_id),
            raw_ansi: false,
            segments,
            source: None,
        }
    }

    pub fn is_separator(&self) -> bool {
        self.kind == LineKind::Separator
    }
}

// ===== Entry enumeration =====

/// Unique entry ids in order of first appearance, separators excluded.
pub fn entry_ids(lines: &[DetailLine]) -> Vec<usize> {
    let mut ids = Vec::new();
    for line in lines {
        if let Some(id) = line.entry_id.filter(|_| !line.is_separator()) {
            if ids.last() != Some(&id) && !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// First and last physical line index of an entry. The last line extends
/// through separator lines that immediately follow the entry, so scrolling
/// an entry into view includes its trailing gap.
pub fn entry_line_span(lines: &[DetailLine], entry_id: usize) -> Option<(usize, usize)> {
    let first = lines.iter().position(|l| l.entry_id == Some(entry_id))?;
    let mut last = first;
    for (i, line) in lines.iter().enumerate().skip(first + 1) {
        if line.entry_id == Some(entry_id) || line.is_separator() {
            last = i;
        } else {
            break;
        }
    }
    Some((first, last))
}

// ===== Builder =====

const PATH_PREFIX: &str = "Path: ";
const PARAMS_INDENT: &str = "  ";

/// Build the detail pane lines for one request at the given pane width.
pub fn build_detail_lines(
    request: &RequestAggregate,
    filter: &Filter,
    width: u16,
) -> Vec<DetailLine> {
    let width = usize::from(width);
    // Margin for the border and scrollbar, then padding inside it.
    let max_width = width.saturating_sub(6).max(1);
    let content_width = width.saturating_sub(8).max(1);

    let mut lines = Vec::new();
    let mut entry_id = 0;

    lines.push(DetailLine::blank(entry_id));

    entry_id += 1;
    lines.push(DetailLine::styled(
        vec![
            Segment::new("Method: ", SegmentStyle::Label),
            Segment::new(request.method(), SegmentStyle::Method),
        ],
        entry_id,
    ));

    entry_id += 1;
    push_path_lines(&mut lines, request, max_width, entry_id);
    entry_id += 1;
    push_status_line(&mut lines, request, entry_id);
    entry_id += 1;
    push_controller_line(&mut lines, request, entry_id);
    entry_id += 1;
    lines.push(DetailLine::styled(
        vec![
            Segment::new("Request ID: ", SegmentStyle::Label),
            Segment::new(request.correlation_id(), SegmentStyle::Value),
        ],
        entry_id,
    ));
    entry_id += 1;
    push_params_lines(&mut lines, request, max_width, entry_id);
    entry_id += 1;
    push_related_section(&mut lines, request, filter, content_width, entry_id);

    lines
}

fn push_path_lines(
    lines: &mut Vec<DetailLine>,
    request: &RequestAggregate,
    max_width: usize,
    entry_id: usize,
) {
    let first_width = max_width.saturating_sub(PATH_PREFIX.len()).max(1);
    let chunks = slice_columns(request.path(), first_width, max_width);
    let mut chunks = chunks.into_iter();

    let first = chunks.next().unwrap_or_default();
    lines.push(DetailLine::styled(
        vec![
            Segment::new(PATH_PREFIX, SegmentStyle::Label),
            Segment::new(first, SegmentStyle::Value),
        ],
        entry_id,
    ));
    for chunk in chunks {
        lines.push(DetailLine::plain(chunk, entry_id));
    }
}

fn push_status_line(lines: &mut Vec<DetailLine>, request: &RequestAggregate, entry_id: usize) {
    let Some(status) = request.status() else {
        return;
    };
    let mut segments = vec![
        Segment::new("Status: ", SegmentStyle::Label),
        Segment::new(status.to_string(), SegmentStyle::Status(status)),
    ];
    if let Some(duration) = request.duration_ms() {
        segments.push(Segment::new(" | Duration: ", SegmentStyle::Label));
        segments.push(Segment::new(format!("{duration}ms"), SegmentStyle::Value));
    }
    lines.push(DetailLine::styled(segments, entry_id));
}

fn push_controller_line(lines: &mut Vec<DetailLine>, request: &RequestAggregate, entry_id: usize) {
    let Some(controller) = request.controller() else {
        return;
    };
    let target = format!("{controller}#{}", request.action().unwrap_or_default());
    lines.push(DetailLine::styled(
        vec![
            Segment::new("Controller: ", SegmentStyle::Label),
            Segment::new(target, SegmentStyle::Value),
        ],
        entry_id,
    ));
}

fn push_params_lines(
    lines: &mut Vec<DetailLine>,
    request: &RequestAggregate,
    max_width: usize,
    entry_id: usize,
) {
    let Some(params) = request.params() else {
        return;
    };
    lines.push(DetailLine::blank(entry_id));
    lines.push(DetailLine::styled(
        vec![Segment::new("Params:", SegmentStyle::Title)],
        entry_id,
    ));

    let line_width = max_width.saturating_sub(PARAMS_INDENT.len()).max(1);
    for chunk in slice_columns(&params.display(), line_width, line_width) {
        lines.push(DetailLine::plain(format!("{PARAMS_INDENT}{chunk}"), entry_id));
    }
}

fn push_related_section(
    lines: &mut Vec<DetailLine>,
    request: &RequestAggregate,
    filter: &Filter,
    content_width: usize,
    mut entry_id: usize,
) {
    let related = request.related();
    if related.is_empty() {
        return;
    }

    let shown = filter_related_indices(related, filter);
    let stats = QueryStats::collect(request);

    lines.push(DetailLine::blank(entry_id));
    lines.push(DetailLine::styled(
        vec![Segment::new("Query Summary:", SegmentStyle::Title)],
        entry_id,
    ));
    if stats.total_queries > 0 {
        lines.push(DetailLine::styled(
            vec![Segment::new(
                format!("  {}", stats.summary_line()),
                SegmentStyle::Summary,
            )],
            entry_id,
        ));
        let breakdown = stats.breakdown_line();
        if !breakdown.is_empty() {
            lines.push(DetailLine::styled(
                vec![Segment::new(format!("  {breakdown}"), SegmentStyle::Summary)],
                entry_id,
            ));
        }
    }

    entry_id += 1;
    lines.push(DetailLine::blank(entry_id));
    if filter.is_present() {
        lines.push(DetailLine::styled(
            vec![
                Segment::new("Related Logs ", SegmentStyle::Title),
                Segment::new(
                    format!("({}/{} shown)", shown.len(), related.len()),
                    SegmentStyle::Dim,
                ),
                Segment::new(":", SegmentStyle::Title),
            ],
            entry_id,
        ));
    } else {
        lines.push(DetailLine::styled(
            vec![Segment::new("Related Logs:", SegmentStyle::Title)],
            entry_id,
        ));
    }

    // Group a sql/cache event with an immediately following call line under
    // one entry id. Pairing looks at the *filtered* sequence, matching the
    // companion-inclusion rule of the filter itself.
    let mut i = 0;
    while i < shown.len() {
        let index = shown[i];
        let event = &related[index];
        let next = shown.get(i + 1).map(|&n| (n, &related[n]));
        entry_id += 1;

        let is_query = matches!(event.kind(), EventKind::Sql | EventKind::Cache);
        let paired_call = next
            .filter(|(_, n)| is_query && n.kind() == EventKind::SqlCallLine)
            .map(|(n, _)| n);

        if let Some(call_index) = paired_call {
            push_event_lines(lines, related[index].content(), entry_id, index, content_width);
            push_event_lines(
                lines,
                related[call_index].content(),
                entry_id,
                call_index,
                content_width,
            );
            lines.push(DetailLine::separator());
            i += 2;
        } else {
            push_event_lines(lines, event.content(), entry_id, index, content_width);
            if !is_query {
                lines.push(DetailLine::blank(entry_id));
            }
            i += 1;
        }
    }
}

/// Render one event's content as padded, wrapped physical lines. The first
/// line keeps the back-reference to the source event.
fn push_event_lines(
    lines: &mut Vec<DetailLine>,
    content: &str,
    entry_id: usize,
    source: usize,
    content_width: usize,
) {
    let ansi = has_ansi(content);
    let chunks = if ansi {
        wrap_ansi(content, content_width)
    } else {
        wrap_plain(content, content_width)
    };
    for (i, chunk) in chunks.into_iter().enumerate() {
        let mut line = DetailLine::plain(format!("  {chunk}"), entry_id);
        line.raw_ansi = ansi;
        if i == 0 {
            line.source = Some(source);
        }
        lines.push(line);
    }
}

/// Hard-slice text into display-column chunks: the first chunk is at most
/// `first_width` columns, later chunks at most `rest_width`. No space
/// preference — header fields break exactly at the width like the path and
/// params fields do.
fn slice_columns(text: &str, first_width: usize, rest_width: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    let mut budget = first_width.max(1);
    loop {
        if UnicodeWidthStr::width(remaining) <= budget {
            chunks.push(remaining.to_string());
            break;
        }
        let mut cols = 0;
        let mut end = remaining.len();
        for (idx, ch) in remaining.char_indices() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if cols + w > budget {
                end = idx;
                break;
            }
            cols += w;
        }
        if end == 0 {
            end = remaining
                .chars()
                .next()
                .map_or(remaining.len(), |c| c.len_utf8());
        }
        chunks.push(remaining[..end].to_string());
        remaining = &remaining[end..];
        budget = rest_width.max(1);
    }
    chunks
}

// ===== Tests =====
