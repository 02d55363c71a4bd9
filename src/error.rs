use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("can't parse {kind} record '{payload}': {reason}")]
    Record {
        kind: String,
        payload: String,
        reason: String,
    },

    #[error("{kind} record appears before any file record")]
    OrphanRecord { kind: String },

    #[error("format error: missing mode record")]
    MissingMode,

    #[error("incorrect type for JSON data from LLVM: '{0}'")]
    UnsupportedExportType(String),

    #[error("unrecognized file extension: '{0}'")]
    UnknownExtension(String),

    #[error("unknown format: '{0}'. Supported: gcov, lcov, gcov-json, llvm, go")]
    UnknownFormat(String),

    #[error("cannot convert region data for '{0}': line data is already present")]
    LineDataPresent(String),

    #[error("can't load coverage data from '{}'", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: Box<CovError>,
    },
}

impl CovError {
    /// Build a malformed-record error for the given record type and payload.
    pub fn record(kind: &str, payload: &str, reason: impl Into<String>) -> Self {
        CovError::Record {
            kind: kind.to_string(),
            payload: payload.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the path of the input being decoded.
    pub fn in_input(self, path: impl Into<PathBuf>) -> Self {
        CovError::Input {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CovError>;
