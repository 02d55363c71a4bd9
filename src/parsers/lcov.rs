/// Decoder for the LCOV `.info` format.
///
/// Reference: https://ltp.sourceforge.net/coverage/lcov/geninfo.1.php
///
/// Key records:
///   TN:<test name>
///   SF:<absolute path to source file>
///   FN:<line>,<function name>            (lcov 2.x: FN:<line>,<end line>,<name>)
///   FNDA:<execution count>,<function name>
///   FNF:<number of functions found>
///   FNH:<number of functions hit>
///   DA:<line number>,<execution count>[,<checksum>]
///   BRDA:<line>,<block>,<branch>,<taken>   ("-" means 0)
///   BRF:<branches found>
///   BRH:<branches hit>
///   LF:<lines found>
///   LH:<lines hit>
///   end_of_record
use std::io::BufRead;
use std::path::PathBuf;

use super::record::{for_each_line, parse_field, split_fields, split_record};
use super::{current_file, Decoder};
use crate::detect::Format;
use crate::error::{CovError, Result};
use crate::model::{BranchStatus, FileDataSet};
use crate::postprocess::strip_source_root;

/// LCOV format decoder.
///
/// `SF` paths that are absolute and lie under `source_root` are stored
/// relative to it.
#[derive(Debug, Clone, Default)]
pub struct LcovDecoder {
    source_root: Option<PathBuf>,
}

impl LcovDecoder {
    pub fn new(source_root: Option<PathBuf>) -> Self {
        Self { source_root }
    }

    fn source_name(&self, path: &str) -> String {
        self.source_root
            .as_deref()
            .and_then(|root| strip_source_root(path, root))
            .unwrap_or_else(|| path.to_string())
    }
}

impl Decoder for LcovDecoder {
    fn format(&self) -> Format {
        Format::Lcov
    }

    fn decode(&self, set: &mut FileDataSet, reader: &mut dyn BufRead) -> Result<()> {
        let mut current: Option<String> = None;

        for_each_line(reader, |line| {
            let (kind, value) = split_record(line.trim_end());
            match kind {
                "SF" => {
                    let name = self.source_name(value);
                    set.file_data(&name);
                    current = Some(name);
                }
                "FN" => {
                    let (name, start_line) = parse_fn_record(value)?;
                    current_file(set, current.as_deref(), kind)?
                        .append_function_data(name, start_line, 0);
                }
                "FNDA" => {
                    let (name, hits) = parse_fnda_record(value)?;
                    current_file(set, current.as_deref(), kind)?
                        .append_function_data(name, 0, hits);
                }
                "DA" => {
                    let (line_no, hits) = parse_da_record(value)?;
                    current_file(set, current.as_deref(), kind)?
                        .append_line_count_data(line_no, hits);
                }
                "BRDA" => {
                    let (line_no, status) = parse_brda_record(value)?;
                    current_file(set, current.as_deref(), kind)?
                        .append_branch_data(line_no, status);
                }
                "end_of_record" => current = None,
                // TN and the LF/LH/FNF/FNH/BRF/BRH summaries; we derive these from the data.
                _ => {}
            }
            Ok(())
        })
    }
}

/// Decode LCOV records without any source root.
pub fn decode(set: &mut FileDataSet, reader: &mut dyn BufRead) -> Result<()> {
    LcovDecoder::default().decode(set, reader)
}

/// `FN:<line>,<name>` or `FN:<line>,<end line>,<name>`. The end line must
/// be numeric; it is not kept.
pub fn parse_fn_record(value: &str) -> Result<(&str, u32)> {
    let fields = split_fields(value);
    match fields.as_slice() {
        [start, name] => Ok((*name, parse_field("FN", value, "start line", start)?)),
        [start, end, name] => {
            parse_field::<u32>("FN", value, "end line", end)?;
            Ok((*name, parse_field("FN", value, "start line", start)?))
        }
        _ => Err(CovError::record(
            "FN",
            value,
            format!("expected 2 or 3 fields, found {}", fields.len()),
        )),
    }
}

/// `FNDA:<hits>,<name>`.
pub fn parse_fnda_record(value: &str) -> Result<(&str, u64)> {
    let fields = split_fields(value);
    let [hits, name] = fields.as_slice() else {
        return Err(CovError::record(
            "FNDA",
            value,
            format!("expected 2 fields, found {}", fields.len()),
        ));
    };
    Ok((*name, parse_field("FNDA", value, "hit count", hits)?))
}

/// `DA:<line>,<hits>` with an optional trailing checksum.
pub fn parse_da_record(value: &str) -> Result<(u32, u64)> {
    let fields = split_fields(value);
    match fields.as_slice() {
        [line, hits] | [line, hits, _] => Ok((
            parse_field("DA", value, "line number", line)?,
            parse_field("DA", value, "hit count", hits)?,
        )),
        _ => Err(CovError::record(
            "DA",
            value,
            format!("expected 2 or 3 fields, found {}", fields.len()),
        )),
    }
}

/// `BRDA:<line>,<block>,<branch>,<taken>`. Block and branch numbers are not
/// kept; `taken` of `-` or `0` is not taken, any positive count is taken.
pub fn parse_brda_record(value: &str) -> Result<(u32, BranchStatus)> {
    let fields = split_fields(value);
    let [line, _block, _branch, taken] = fields.as_slice() else {
        return Err(CovError::record(
            "BRDA",
            value,
            format!("expected 4 fields, found {}", fields.len()),
        ));
    };
    let line_no = parse_field("BRDA", value, "line number", line)?;
    let status = if *taken == "-" {
        BranchStatus::NotTaken
    } else {
        match parse_field::<u64>("BRDA", value, "taken count", taken)? {
            0 => BranchStatus::NotTaken,
            _ => BranchStatus::Taken,
        }
    };
    Ok((line_no, status))
}
