//! Byte-offset log file tailing.
//!
//! [`LogTailer`] owns the file path and the absolute byte offset of the last
//! consumed position. Growth is detected by comparing the current file size
//! to the offset; a file that shrinks (truncation, rotation) is treated as
//! "no new data" and the offset is kept. After a rotation the tailer stays
//! stuck until the new file outgrows the old offset — documented behavior,
//! not recovered from.

use crate::model::error::InputError;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A file tailer that never re-delivers a byte.
#[derive(Debug)]
pub struct LogTailer {
    path: PathBuf,
    offset: u64,
}

impl LogTailer {
    /// Open a tailer positioned at the start of the file.
    ///
    /// # Errors
    ///
    /// `InputError::FileNotFound` if the file does not exist. This is the
    /// startup-fatal condition: the operator gets the message before the
    /// terminal is put into raw mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            offset: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset of the last consumed position.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the whole file as the starting dataset and move the offset to
    /// end-of-file.
    pub fn initial_read(&mut self) -> Result<Vec<String>, InputError> {
        self.offset = 0;
        self.read_from_offset().map_err(InputError::from)
    }

    /// Read only the bytes appended since the last read.
    ///
    /// Returns an empty batch when the file has not grown (or has shrunk,
    /// or has disappeared). Never rewinds the offset.
    pub fn poll(&mut self) -> std::io::Result<Vec<String>> {
        let size = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        if size <= self.offset {
            return Ok(Vec::new());
        }
        self.read_from_offset()
    }

    fn read_from_offset(&mut self) -> std::io::Result<Vec<String>> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(self.offset))?;

        let mut buf = Vec::new();
        let read = file.read_to_end(&mut buf)?;
        self.offset += read as u64;

        if buf.is_empty() {
            return Ok(Vec::new());
        }

        // Tolerate legacy encodings: replace invalid sequences instead of
        // failing the batch.
        let text = String::from_utf8_lossy(&buf);
        Ok(text.split('\n').map(str::to_string).filter(|l| !l.is_empty()).collect())
    }
}

// ===== Tests =====
