//! Pure integration between parsing, correlation, and the event loop.
//!
//! These functions connect the tailer's output to the application state
//! without doing any I/O themselves, so the whole ingestion path is
//! testable without a terminal or a live file.

use crate::parser::{classify_lines, ClassifiedLine};
use crate::state::AppState;
use std::sync::mpsc::Receiver;

/// Classify a batch of raw lines and merge it into the application state.
///
/// Used for the initial whole-file read; incremental growth arrives
/// pre-classified from the tail thread.
pub fn ingest_raw_lines(state: &mut AppState, lines: &[String]) {
    state.ingest(classify_lines(lines));
}

/// Drain every pending batch from the tailer channel into the state.
///
/// Non-blocking; returns the number of batches merged so the caller knows
/// whether anything changed since the last draw.
pub fn drain_batches(state: &mut AppState, rx: &Receiver<Vec<ClassifiedLine>>) -> usize {
    let mut drained = 0;
    for batch in rx.try_iter() {
        state.ingest(batch);
        drained += 1;
    }
    drained
}
