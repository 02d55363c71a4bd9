/// Decoder for gcc's gzip-compressed JSON format (`gcov --json-format`,
/// gcc 9 and later), usually named `<source>.gcov.json.gz`.
///
/// Reference: https://gcc.gnu.org/onlinedocs/gcc/Invoking-Gcov.html
///
/// Only the fields below are read; everything else is ignored:
///   { "files": [ { "file": "...",
///                  "functions": [ { "name", "start_line", "execution_count" } ],
///                  "lines": [ { "line_number", "count",
///                               "branches": [ { "count" } ] } ] } ] }
use std::io::BufRead;

use flate2::bufread::GzDecoder;
use serde::Deserialize;

use super::{json_error, Decoder};
use crate::detect::Format;
use crate::error::Result;
use crate::model::{BranchStatus, FileDataSet};

/// gcov JSON (gzip) decoder.
pub struct GcovJsonDecoder;

impl Decoder for GcovJsonDecoder {
    fn format(&self) -> Format {
        Format::GcovJson
    }

    fn decode(&self, set: &mut FileDataSet, reader: &mut dyn BufRead) -> Result<()> {
        decode(set, reader)
    }
}

#[derive(Debug, Deserialize)]
struct GcovData {
    #[serde(default)]
    files: Vec<GcovFile>,
}

#[derive(Debug, Deserialize)]
struct GcovFile {
    file: String,
    #[serde(default)]
    functions: Vec<GcovFunction>,
    #[serde(default)]
    lines: Vec<GcovLine>,
}

#[derive(Debug, Deserialize)]
struct GcovFunction {
    name: String,
    start_line: u32,
    execution_count: u64,
}

#[derive(Debug, Deserialize)]
struct GcovLine {
    line_number: u32,
    count: u64,
    #[serde(default)]
    branches: Vec<GcovBranch>,
}

#[derive(Debug, Deserialize)]
struct GcovBranch {
    count: u64,
}

/// Decompress and decode a gcov JSON document from `reader` into `set`.
pub fn decode(set: &mut FileDataSet, reader: &mut dyn BufRead) -> Result<()> {
    let gz = GzDecoder::new(reader);
    let data: GcovData = serde_json::from_reader(gz).map_err(json_error)?;
    apply(set, data);
    Ok(())
}

fn apply(set: &mut FileDataSet, data: GcovData) {
    for file in data.files {
        let current = set.file_data(&file.file);

        for func in &file.functions {
            current.append_function_data(&func.name, func.start_line, func.execution_count);
        }

        for line in &file.lines {
            current.append_line_count_data(line.line_number, line.count);
            for branch in &line.branches {
                let status = if branch.count > 0 {
                    BranchStatus::Taken
                } else {
                    BranchStatus::NotTaken
                };
                current.append_branch_data(line.line_number, status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CovError;
    use crate::model::{Coverage, FuncData};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(bytes).unwrap();
        enc.finish().unwrap()
    }

    const SAMPLE: &str = r#"{
        "gcc_version": "9.1.0",
        "data_file": "example",
        "format_version": "1",
        "files": [{
            "file": "example.c",
            "functions": [{
                "name": "main", "demangled_name": "main",
                "start_line": 28, "start_column": 5, "end_line": 38, "end_column": 1,
                "blocks": 6, "blocks_executed": 5, "execution_count": 1
            }],
            "lines": [
                {"line_number": 28, "count": 1, "unexecuted_block": false, "function_name": "main",
                 "branches": []},
                {"line_number": 30, "count": 1, "unexecuted_block": false,
                 "branches": [
                    {"count": 1, "fallthrough": true, "throw": false},
                    {"count": 0, "fallthrough": false, "throw": false}
                 ]},
                {"line_number": 32, "count": 0, "unexecuted_block": true}
            ]
        }]
    }"#;

    #[test]
    fn test_decode_gzip_json() {
        let bytes = gzip(SAMPLE.as_bytes());
        let mut set = FileDataSet::new();
        decode(&mut set, &mut &bytes[..]).unwrap();

        let file = set.get("example.c").unwrap();
        assert_eq!(
            file.func_data["main"],
            FuncData {
                start_line: 28,
                hit_count: 1
            }
        );
        assert_eq!(file.line_coverage(), Coverage::new(2, 3));
        assert_eq!(file.branch_coverage(), Coverage::new(1, 2));
        assert_eq!(
            file.branch_data[&30],
            vec![BranchStatus::Taken, BranchStatus::NotTaken]
        );
    }

    #[test]
    fn test_decode_rejects_uncompressed() {
        let mut set = FileDataSet::new();
        let err = decode(&mut set, &mut SAMPLE.as_bytes()).unwrap_err();
        assert!(matches!(err, CovError::Io(_)), "{err}");
    }

    #[test]
    fn test_decode_rejects_bad_shape() {
        let bytes = gzip(br#"{"files": [{"file": "a.c", "lines": [{"line_number": "x", "count": 1}]}]}"#);
        let mut set = FileDataSet::new();
        let err = decode(&mut set, &mut &bytes[..]).unwrap_err();
        assert!(matches!(err, CovError::Json(_)), "{err}");
    }
}
