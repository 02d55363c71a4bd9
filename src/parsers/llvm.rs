/// Decoder for `llvm-cov export -format=text` JSON.
///
/// Reference: https://llvm.org/docs/CommandGuide/llvm-cov.html#llvm-cov-export
///
/// The top-level `type` must be `llvm.coverage.json.export`. Within each
/// `data[]` entry:
///   - `files[].segments` is a list of `[line, col, count, hasCount,
///     isRegionEntry, ...]` tuples. Each segment that enters a region with a
///     count covers the lines up to and including the next segment's line.
///   - `functions[]` carries `name`, `count`, `regions[0][0]` (start line)
///     and `filenames[0]`.
///
/// Segments are recorded as region data; lines are derived later.
use std::fmt;
use std::io::BufRead;

use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::{json_error, Decoder};
use crate::detect::Format;
use crate::error::{CovError, Result};
use crate::model::{FileDataSet, Region, MAX_REGION_LINES};

/// The only export type this decoder accepts.
pub const EXPORT_TYPE: &str = "llvm.coverage.json.export";

/// LLVM coverage export decoder.
pub struct LlvmDecoder;

impl Decoder for LlvmDecoder {
    fn format(&self) -> Format {
        Format::Llvm
    }

    fn decode(&self, set: &mut FileDataSet, reader: &mut dyn BufRead) -> Result<()> {
        decode(set, reader)
    }
}

#[derive(Debug, Deserialize)]
struct Export {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    data: Vec<ExportData>,
}

#[derive(Debug, Deserialize)]
struct ExportData {
    #[serde(default)]
    files: Vec<ExportFile>,
    #[serde(default)]
    functions: Vec<ExportFunction>,
}

#[derive(Debug, Deserialize)]
struct ExportFile {
    filename: String,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct ExportFunction {
    name: String,
    count: u64,
    #[serde(default)]
    regions: Vec<Vec<u64>>,
    #[serde(default)]
    filenames: Vec<String>,
}

/// One entry of a file's `segments` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub line: u32,
    pub column: u32,
    pub count: u64,
    pub has_count: bool,
    pub is_region_entry: bool,
}

impl<'de> Deserialize<'de> for Segment {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SegmentVisitor)
    }
}

/// Reads the positional array. Elements past the fifth (newer LLVM
/// releases append `isGapRegion`) are skipped.
struct SegmentVisitor;

impl<'de> Visitor<'de> for SegmentVisitor {
    type Value = Segment;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of at least 5 segment elements")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Segment, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let missing = |i: usize| <A::Error as de::Error>::invalid_length(i, &"at least 5 elements");
        let segment = Segment {
            line: seq.next_element()?.ok_or_else(|| missing(0))?,
            column: seq.next_element()?.ok_or_else(|| missing(1))?,
            count: seq.next_element()?.ok_or_else(|| missing(2))?,
            has_count: seq.next_element()?.ok_or_else(|| missing(3))?,
            is_region_entry: seq.next_element()?.ok_or_else(|| missing(4))?,
        };
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(segment)
    }
}

/// Decode an LLVM JSON export from `reader` into `set`.
pub fn decode(set: &mut FileDataSet, reader: &mut dyn BufRead) -> Result<()> {
    let export: Export = serde_json::from_reader(reader).map_err(json_error)?;
    if export.kind != EXPORT_TYPE {
        return Err(CovError::UnsupportedExportType(export.kind));
    }

    for data in export.data {
        for file in &data.files {
            let current = set.file_data(&file.filename);
            for pair in file.segments.windows(2) {
                let (seg, next) = (pair[0], pair[1]);
                if seg.is_region_entry && seg.has_count {
                    let region = Region::new(seg.line, seg.column, next.line, next.column);
                    if region.line_count() > MAX_REGION_LINES {
                        return Err(CovError::record(
                            "segment",
                            &file.filename,
                            format!(
                                "region {}..{} spans more than {MAX_REGION_LINES} lines",
                                seg.line, next.line
                            ),
                        ));
                    }
                    current.append_region_data(region, seg.count);
                }
            }
        }

        for func in &data.functions {
            let filename = func.filenames.first().ok_or_else(|| {
                CovError::record("function", &func.name, "no filenames")
            })?;
            let start = func
                .regions
                .first()
                .and_then(|region| region.first())
                .ok_or_else(|| CovError::record("function", &func.name, "no regions"))?;
            let start_line = u32::try_from(*start).map_err(|e| {
                CovError::record("function", &func.name, format!("invalid start line: {e}"))
            })?;
            set.file_data(filename)
                .append_function_data(&func.name, start_line, func.count);
        }
    }
    Ok(())
}
