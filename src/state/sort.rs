//! Sort modes for the request list.

use crate::model::RequestAggregate;
use std::cmp::Ordering;

/// Cyclable sort mode. Time keeps arrival order (timestamp ascending);
/// Duration and Status put the slowest / most errored requests first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    Time,
    Duration,
    Status,
}

impl SortMode {
    pub fn cycle(self) -> Self {
        match self {
            SortMode::Time => SortMode::Duration,
            SortMode::Duration => SortMode::Status,
            SortMode::Status => SortMode::Time,
        }
    }

    /// Short label for the pane title.
    pub fn label(self) -> &'static str {
        match self {
            SortMode::Time => "time",
            SortMode::Duration => "duration",
            SortMode::Status => "status",
        }
    }

    /// Stable-sort the filtered request list for display.
    pub fn sort<'a>(self, mut requests: Vec<&'a RequestAggregate>) -> Vec<&'a RequestAggregate> {
        match self {
            SortMode::Time => requests.sort_by_key(|r| r.timestamp()),
            SortMode::Duration => requests.sort_by(|a, b| {
                let (a, b) = (a.duration_ms().unwrap_or(0.0), b.duration_ms().unwrap_or(0.0));
                b.partial_cmp(&a).unwrap_or(Ordering::Equal)
            }),
            SortMode::Status => {
                requests.sort_by(|a, b| b.status().unwrap_or(0).cmp(&a.status().unwrap_or(0)))
            }
        }
        requests
    }
}
