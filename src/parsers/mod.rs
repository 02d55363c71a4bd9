pub mod gcov;
pub mod gcov_json;
pub mod gocover;
pub mod lcov;
pub mod llvm;
pub mod record;

use std::io::BufRead;

use crate::detect::Format;
use crate::error::{CovError, Result};
use crate::model::{FileData, FileDataSet};

/// Every format decoder implements this trait.
pub trait Decoder {
    /// Which format this decoder understands.
    fn format(&self) -> Format;

    /// Decode one input stream into `set`. On a malformed record the error
    /// is returned immediately; records applied before it stay applied.
    fn decode(&self, set: &mut FileDataSet, reader: &mut dyn BufRead) -> Result<()>;
}

/// Look up the file selected by the last file marker, or fail if a
/// per-file record shows up before any marker.
pub(crate) fn current_file<'a>(
    set: &'a mut FileDataSet,
    current: Option<&str>,
    kind: &str,
) -> Result<&'a mut FileData> {
    match current {
        Some(name) => Ok(set.file_data(name)),
        None => Err(CovError::OrphanRecord {
            kind: kind.to_string(),
        }),
    }
}

/// Keep I/O failures (including gzip corruption surfaced while reading)
/// apart from malformed JSON.
pub(crate) fn json_error(e: serde_json::Error) -> CovError {
    if e.is_io() {
        CovError::Io(e.into())
    } else {
        CovError::Json(e)
    }
}
