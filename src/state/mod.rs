//! Interactive state: navigation, filters, sort.

pub mod app_state;
pub mod filter;
pub mod sort;

pub use app_state::{AppState, ClearedBatch, FocusPane};
pub use filter::{filter_related_indices, request_matches, Filter};
pub use sort::SortMode;
