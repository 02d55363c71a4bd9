//! Tokenizer shared by the line-oriented formats (gcov, lcov).
//!
//! A record is `<type>:<payload>`, and a payload is a list of fields
//! separated by `,` with no quoting or escaping.

use std::fmt::Display;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::{CovError, Result};

/// Split a line at the first `:` into (record type, payload). A line without
/// a `:` is all type and no payload.
pub fn split_record(line: &str) -> (&str, &str) {
    line.split_once(':').unwrap_or((line, ""))
}

/// Split a payload on every `,`. An empty payload yields one empty field.
pub fn split_fields(payload: &str) -> Vec<&str> {
    payload.split(',').collect()
}

/// Parse one field of a record, reporting the record on failure.
pub(crate) fn parse_field<T>(kind: &str, payload: &str, what: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| CovError::record(kind, payload, format!("invalid {what} '{value}': {e}")))
}

/// Feed each line of `reader` to `f`, without its line terminator.
/// Bytes that are not UTF-8 (Latin-1 paths, for instance) are replaced
/// with U+FFFD. Stops at the first error, either from reading or from `f`.
pub(crate) fn for_each_line(
    reader: &mut dyn BufRead,
    mut f: impl FnMut(&str) -> Result<()>,
) -> Result<()> {
    let mut raw_line = Vec::new();
    loop {
        raw_line.clear();
        let n = reader.read_until(b'\n', &mut raw_line)?;
        if n == 0 {
            break; // EOF
        }
        let line = String::from_utf8_lossy(&raw_line);
        f(line.trim_end_matches(['\n', '\r']))?;
    }
    Ok(())
}
