/// Decoder for the gcov intermediate text format (`gcov -i`, gcc 4.9 to 8).
///
/// Reference: https://gcc.gnu.org/onlinedocs/gcc-8.1.0/gcc/Invoking-Gcov.html
///
/// Key records:
///   version:<gcc version>
///   file:<source file>
///   function:<start>,<hits>,<name>              (gcc < 8)
///   function:<start>,<end>,<hits>,<name>        (gcc >= 8)
///   lcount:<line>,<hits>[,<has unexecuted block>]
///   branch:<line>,<taken|nottaken|notexec>
///
/// Unknown record types are ignored.
use std::io::BufRead;

use super::record::{for_each_line, parse_field, split_fields, split_record};
use super::{current_file, Decoder};
use crate::detect::Format;
use crate::error::{CovError, Result};
use crate::model::{BranchStatus, FileDataSet};

/// gcov intermediate format decoder.
pub struct GcovDecoder;

impl Decoder for GcovDecoder {
    fn format(&self) -> Format {
        Format::Gcov
    }

    fn decode(&self, set: &mut FileDataSet, reader: &mut dyn BufRead) -> Result<()> {
        decode(set, reader)
    }
}

/// A parsed `function` record.
#[derive(Debug, PartialEq, Eq)]
pub struct FunctionRecord<'a> {
    pub name: &'a str,
    pub start_line: u32,
    pub hit_count: u64,
}

/// Decode gcov intermediate records from `reader` into `set`.
pub fn decode(set: &mut FileDataSet, reader: &mut dyn BufRead) -> Result<()> {
    let mut current: Option<String> = None;

    for_each_line(reader, |line| {
        let (kind, value) = split_record(line);
        match kind {
            "file" => {
                set.file_data(value);
                current = Some(value.to_string());
            }
            "function" => {
                let record = parse_function_record(value)?;
                current_file(set, current.as_deref(), kind)?.append_function_data(
                    record.name,
                    record.start_line,
                    record.hit_count,
                );
            }
            "lcount" => {
                let (line_no, hits) = parse_lcount_record(value)?;
                current_file(set, current.as_deref(), kind)?.append_line_count_data(line_no, hits);
            }
            "branch" => {
                let (line_no, status) = parse_branch_record(value)?;
                current_file(set, current.as_deref(), kind)?.append_branch_data(line_no, status);
            }
            // "version", blank lines, and record types from newer gcc releases.
            _ => {}
        }
        Ok(())
    })
}

/// `function:<start>,<hits>,<name>` or `function:<start>,<end>,<hits>,<name>`.
/// The hit count is always the second-to-last field and the name the last.
pub fn parse_function_record(value: &str) -> Result<FunctionRecord<'_>> {
    let fields = split_fields(value);
    let (start, hits, name) = match fields.as_slice() {
        [start, hits, name] | [start, _, hits, name] => (*start, *hits, *name),
        _ => {
            return Err(CovError::record(
                "function",
                value,
                format!("expected 3 or 4 fields, found {}", fields.len()),
            ))
        }
    };
    Ok(FunctionRecord {
        name,
        start_line: parse_field("function", value, "start line", start)?,
        hit_count: parse_field("function", value, "hit count", hits)?,
    })
}

/// `lcount:<line>,<hits>` with an optional third field that is ignored.
pub fn parse_lcount_record(value: &str) -> Result<(u32, u64)> {
    let fields = split_fields(value);
    match fields.as_slice() {
        [line, hits] | [line, hits, _] => Ok((
            parse_field("lcount", value, "line number", line)?,
            parse_field("lcount", value, "hit count", hits)?,
        )),
        _ => Err(CovError::record(
            "lcount",
            value,
            format!("expected 2 or 3 fields, found {}", fields.len()),
        )),
    }
}

/// `branch:<line>,<taken|nottaken|notexec>`.
pub fn parse_branch_record(value: &str) -> Result<(u32, BranchStatus)> {
    let fields = split_fields(value);
    let [line, status] = fields.as_slice() else {
        return Err(CovError::record(
            "branch",
            value,
            format!("expected 2 fields, found {}", fields.len()),
        ));
    };
    let line_no = parse_field("branch", value, "line number", line)?;
    let status = match *status {
        "taken" => BranchStatus::Taken,
        "nottaken" => BranchStatus::NotTaken,
        "notexec" => BranchStatus::NotExecuted,
        other => {
            return Err(CovError::record(
                "branch",
                value,
                format!("unrecognized branch status '{other}'"),
            ))
        }
    };
    Ok((line_no, status))
}
