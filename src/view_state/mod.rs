//! Pure display-state computation: detail line building and its cache.

pub mod cache;
pub mod detail;

pub use cache::DetailCache;
pub use detail::{build_detail_lines, entry_ids, entry_line_span, DetailLine, LineKind, Segment, SegmentStyle};
