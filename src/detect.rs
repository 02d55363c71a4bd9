/// Selection of a decoder for an input file.
///
/// The file extension alone decides the format:
///   .gcov → gcov intermediate text
///   .info → LCOV
///   .gz   → gcov JSON (gzip)
///   .json → LLVM export
///   .out  → Go coverage profile
use std::path::Path;

use crate::config::Config;
use crate::error::{CovError, Result};
use crate::parsers::gcov::GcovDecoder;
use crate::parsers::gcov_json::GcovJsonDecoder;
use crate::parsers::gocover::GocoverDecoder;
use crate::parsers::lcov::LcovDecoder;
use crate::parsers::llvm::LlvmDecoder;
use crate::parsers::Decoder;

/// Supported coverage formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Gcov,
    Lcov,
    GcovJson,
    Llvm,
    GoProfile,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Gcov,
        Format::Lcov,
        Format::GcovJson,
        Format::Llvm,
        Format::GoProfile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Gcov => "gcov",
            Format::Lcov => "lcov",
            Format::GcovJson => "gcov-json",
            Format::Llvm => "llvm",
            Format::GoProfile => "go",
        }
    }

    /// Map a file extension (without the dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "gcov" => Some(Format::Gcov),
            "info" => Some(Format::Lcov),
            "gz" => Some(Format::GcovJson),
            "json" => Some(Format::Llvm),
            "out" => Some(Format::GoProfile),
            _ => None,
        }
    }

    /// Classify a path by its extension. An unknown or missing extension
    /// is an error naming the extension.
    pub fn from_path(path: &Path) -> Result<Format> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Format::from_extension(&ext).ok_or(CovError::UnknownExtension(ext))
    }

    /// Build the decoder for this format. Only LCOV reads the configuration
    /// (for its source root).
    pub fn decoder(&self, config: &Config) -> Box<dyn Decoder> {
        match self {
            Format::Gcov => Box::new(GcovDecoder),
            Format::Lcov => Box::new(LcovDecoder::new(config.source_root().map(Path::to_path_buf))),
            Format::GcovJson => Box::new(GcovJsonDecoder),
            Format::Llvm => Box::new(LlvmDecoder),
            Format::GoProfile => Box::new(GocoverDecoder),
        }
    }
}

impl std::str::FromStr for Format {
    type Err = CovError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CovError::UnknownFormat(s.to_string()))
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
