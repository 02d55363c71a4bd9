/// Decoder for Go's `-coverprofile` format.
///
/// Reference: https://go.dev/blog/cover
///
/// Format:
///   mode: set|count|atomic
///   <file>:<startLine>.<startCol>,<endLine>.<endCol> <numStatements> <count>
///
/// Each block is stored as a region with the block's hit count. Lines are
/// inferred later by region-to-line conversion, which keeps region
/// coverage available for Go profiles.
use std::io::BufRead;

use tracing::debug;

use super::record::{for_each_line, parse_field};
use super::Decoder;
use crate::detect::Format;
use crate::error::{CovError, Result};
use crate::model::{FileDataSet, Region, MAX_REGION_LINES};

const KIND: &str = "block";

/// Go coverage profile decoder.
pub struct GocoverDecoder;

impl Decoder for GocoverDecoder {
    fn format(&self) -> Format {
        Format::GoProfile
    }

    fn decode(&self, set: &mut FileDataSet, reader: &mut dyn BufRead) -> Result<()> {
        decode(set, reader)
    }
}

/// A line/column location in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// A parsed block from a single line of the coverage profile.
#[derive(Debug, PartialEq, Eq)]
pub struct Block<'a> {
    pub filename: &'a str,
    pub start: Position,
    pub end: Position,
    pub statements: u32,
    pub count: u64,
}

impl Block<'_> {
    pub fn region(&self) -> Region {
        Region::new(self.start.line, self.start.column, self.end.line, self.end.column)
    }
}

/// Decode a Go coverage profile from `reader` into `set`. The first
/// non-blank line must be the `mode:` header.
pub fn decode(set: &mut FileDataSet, reader: &mut dyn BufRead) -> Result<()> {
    let mut seen_mode = false;

    for_each_line(reader, |line| {
        if line.trim().is_empty() {
            return Ok(());
        }
        if !seen_mode {
            let mode = line.strip_prefix("mode:").ok_or(CovError::MissingMode)?;
            debug!(mode = mode.trim(), "go coverage profile");
            seen_mode = true;
            return Ok(());
        }

        let block = parse_block_line(line)?;
        set.file_data(block.filename)
            .append_region_data(block.region(), block.count);
        Ok(())
    })?;

    if seen_mode {
        Ok(())
    } else {
        Err(CovError::MissingMode)
    }
}

/// Parse a single block line.
///
/// Format: `<file>:<startLine>.<startCol>,<endLine>.<endCol> <numStmt> <count>`
/// Separators are strict: exactly one space between the trailing fields.
pub fn parse_block_line(line: &str) -> Result<Block<'_>> {
    let fail = |reason: &str| CovError::record(KIND, line, reason);

    let (filename, rest) = line
        .split_once(':')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| fail("could not find separator ':'"))?;
    let (start, rest) = rest
        .split_once(',')
        .ok_or_else(|| fail("could not find separator ','"))?;
    let (end, rest) = rest
        .split_once(' ')
        .ok_or_else(|| fail("could not find separator ' ' after position"))?;
    let (statements, count) = rest
        .split_once(' ')
        .ok_or_else(|| fail("could not find separator ' ' after statement count"))?;

    let block = Block {
        filename,
        start: parse_position(line, start)?,
        end: parse_position(line, end)?,
        statements: parse_field(KIND, line, "statement count", statements)?,
        count: parse_field(KIND, line, "hit count", count)?,
    };
    if block.region().line_count() > MAX_REGION_LINES {
        return Err(fail("block spans too many lines"));
    }
    Ok(block)
}

/// `<line>.<column>`.
pub fn parse_position(line: &str, field: &str) -> Result<Position> {
    let (line_no, column) = field
        .split_once('.')
        .ok_or_else(|| CovError::record(KIND, line, format!("missing '.' in position '{field}'")))?;
    Ok(Position {
        line: parse_field(KIND, line, "line", line_no)?,
        column: parse_field(KIND, line, "column", column)?,
    })
}
