//! Log input: file tailing and the background tail loop.
//!
//! The tail loop is the only concurrency in the program. It owns the file
//! handle and offset exclusively and hands classified batches to the render
//! loop over an unbounded channel; the render loop never blocks the tailer
//! and vice versa. The loop exits when the receiver is dropped.

mod file;

pub use file::LogTailer;

use crate::parser::{classify_lines, ClassifiedLine};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

/// Poll cadence for the tail loop.
///
/// Two duty cycles: a long sleep while the file is quiet and a short one
/// right after activity, so bursts drain promptly without busy-spinning on
/// an idle file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub idle: Duration,
    pub active: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            idle: Duration::from_millis(500),
            active: Duration::from_millis(10),
        }
    }
}

/// Spawn the tail loop on its own thread.
///
/// Each productive poll is classified and sent as one ordered batch.
/// Classification happens on this thread (it is pure); correlation happens
/// on the consuming side, which owns the aggregate list.
pub fn spawn_tailer(
    mut tailer: LogTailer,
    intervals: PollIntervals,
) -> Receiver<Vec<ClassifiedLine>> {
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name("reqtail-tailer".into())
        .spawn(move || loop {
            match tailer.poll() {
                Ok(lines) if !lines.is_empty() => {
                    let batch = classify_lines(&lines);
                    if !batch.is_empty() && tx.send(batch).is_err() {
                        break;
                    }
                    thread::sleep(intervals.active);
                }
                Ok(_) => thread::sleep(intervals.idle),
                Err(error) => {
                    tracing::warn!(%error, "tail poll failed; retrying");
                    thread::sleep(intervals.idle);
                }
            }
        })
        .expect("spawning the tailer thread cannot fail with a valid name");

    rx
}

// ===== Tests =====
