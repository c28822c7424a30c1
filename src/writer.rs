//! Append-only JSON record log.
//!
//! Every record is written as a complete JSON object followed by a `,`. The
//! file as a whole is therefore not a JSON document until a reader wraps it
//! in brackets; [`read_records`] does exactly that. Existing consumers rely on
//! the raw concatenation, so the writer never wraps it itself.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::LogError;

pub const RECORD_SEPARATOR: char = ',';

#[derive(Clone, Copy, Debug, Default)]
pub struct LogWriter;

impl LogWriter {
    pub fn new() -> Self {
        LogWriter
    }

    /// Serialize `record` and append it plus the separator to `path`,
    /// creating missing parent directories.
    pub fn append<T: Serialize>(&self, path: &Path, record: &T) -> Result<(), LogError> {
        let mut entry = serde_json::to_string(record).map_err(LogError::Serialize)?;
        entry.push(RECORD_SEPARATOR);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| LogError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LogError::io(path, e))?;
        file.write_all(entry.as_bytes())
            .map_err(|e| LogError::io(path, e))
    }
}

/// Read every record from a log file written by [`LogWriter`].
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LogError> {
    let raw = fs::read_to_string(path).map_err(|e| LogError::io(path, e))?;
    let body = raw.trim_end();
    let body = body.strip_suffix(RECORD_SEPARATOR).unwrap_or(body);
    serde_json::from_str(&format!("[{body}]")).map_err(|source| LogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
