//! Roll-up of a finished `FileDataSet` into per-file and per-function
//! statistics, ready to be rendered.

use std::collections::BTreeMap;

use crate::model::{Coverage, FileDataSet};

pub const DEFAULT_TITLE: &str = "covnorm";

/// Aggregated statistics for a set of files, plus metadata about the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    /// Identifier of the test run (build number, CI job, ...).
    pub test_id: Option<String>,
    /// Identifier of the source revision.
    pub src_id: Option<String>,

    pub lines: Coverage,
    pub funcs: Coverage,
    pub branches: Coverage,
    pub regions: Coverage,
    /// Sorted by name.
    pub files: Vec<FileStatistics>,
    /// Sorted by name, then filename.
    pub functions: Vec<FuncStatistics>,
}

/// Coverage statistics for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatistics {
    pub name: String,
    pub lines: Coverage,
    pub funcs: Coverage,
    pub branches: Coverage,
    pub regions: Coverage,
    /// Inclusive ranges of lines that were never hit.
    pub missed: Vec<(u32, u32)>,
}

/// Data for one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncStatistics {
    pub name: String,
    pub filename: String,
    pub start_line: u32,
    pub hit_count: u64,
}

impl Default for Report {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            test_id: None,
            src_id: None,
            lines: Coverage::default(),
            funcs: Coverage::default(),
            branches: Coverage::default(),
            regions: Coverage::default(),
            files: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Build a report with the default title from `set`.
    #[must_use]
    pub fn collect(set: &FileDataSet) -> Self {
        let mut report = Self::default();
        report.collect_statistics(set);
        report
    }

    /// Replace the statistics in this report with those computed from `set`,
    /// keeping the metadata.
    pub fn collect_statistics(&mut self, set: &FileDataSet) {
        let mut files = Vec::with_capacity(set.len());
        let mut functions = Vec::new();

        for (name, data) in set {
            files.push(FileStatistics {
                name: name.clone(),
                lines: data.line_coverage(),
                funcs: data.func_coverage(),
                branches: data.branch_coverage(),
                regions: data.region_coverage(),
                missed: missed_ranges(&data.line_data),
            });
            functions.extend(data.func_data.iter().map(|(func, f)| FuncStatistics {
                name: func.clone(),
                filename: name.clone(),
                start_line: f.start_line,
                hit_count: f.hit_count,
            }));
        }

        // The set iterates in filename order, so only functions need sorting.
        functions.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.filename.cmp(&b.filename)));

        self.lines = files.iter().map(|f| f.lines).sum();
        self.funcs = files.iter().map(|f| f.funcs).sum();
        self.branches = files.iter().map(|f| f.branches).sum();
        self.regions = files.iter().map(|f| f.regions).sum();
        self.files = files;
        self.functions = functions;
    }
}

/// Maximum number of consecutive lines without data that can be bridged
/// when coalescing missed lines into ranges.
const MAX_BRIDGE_GAP: u32 = 2;

/// Coalesce the lines with zero hits into inclusive `(start, end)` ranges.
///
/// A gap between two missed lines is bridged when it is at most
/// [`MAX_BRIDGE_GAP`] lines wide and none of the gap lines carry data.
#[must_use]
pub fn missed_ranges(line_data: &BTreeMap<u32, u64>) -> Vec<(u32, u32)> {
    let mut ranges: Vec<(u32, u32)> = Vec::new();

    for (&line, _) in line_data.iter().filter(|&(_, &hits)| hits == 0) {
        if let Some((_, end)) = ranges.last_mut() {
            let gap = line - *end - 1;
            if gap <= MAX_BRIDGE_GAP && line_data.range(*end + 1..line).next().is_none() {
                *end = line;
                continue;
            }
        }
        ranges.push((line, line));
    }
    ranges
}

/// Format ranges in compact notation, e.g. "1, 3-5, 8".
#[must_use]
pub fn format_ranges(ranges: &[(u32, u32)]) -> String {
    ranges
        .iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BranchStatus, Region};

    fn lines(pairs: &[(u32, u64)]) -> BTreeMap<u32, u64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_missed_ranges_empty() {
        assert_eq!(missed_ranges(&BTreeMap::new()), Vec::<(u32, u32)>::new());
        assert!(missed_ranges(&lines(&[(1, 1), (2, 4)])).is_empty());
    }

    #[test]
    fn test_missed_ranges_consecutive() {
        assert_eq!(missed_ranges(&lines(&[(1, 0), (2, 0), (3, 0)])), vec![(1, 3)]);
    }

    #[test]
    fn test_missed_ranges_bridges_lines_without_data() {
        // Lines 3 and 4 carry no data.
        assert_eq!(
            missed_ranges(&lines(&[(1, 0), (2, 0), (5, 0), (6, 0)])),
            vec![(1, 6)]
        );
        // Three lines is too wide.
        assert_eq!(
            missed_ranges(&lines(&[(1, 0), (2, 0), (6, 0), (7, 0)])),
            vec![(1, 2), (6, 7)]
        );
    }

    #[test]
    fn test_missed_ranges_no_bridge_over_hit_line() {
        assert_eq!(
            missed_ranges(&lines(&[(1, 0), (2, 0), (3, 5), (4, 0), (5, 0)])),
            vec![(1, 2), (4, 5)]
        );
    }

    #[test]
    fn test_format_ranges() {
        assert_eq!(format_ranges(&[]), "");
        assert_eq!(format_ranges(&[(5, 5)]), "5");
        assert_eq!(format_ranges(&[(1, 1), (3, 5), (10, 10)]), "1, 3-5, 10");
    }

    #[test]
    fn test_collect() {
        let mut set = FileDataSet::new();
        let b = set.file_data("b.c");
        b.append_line_count_data(1, 1);
        b.append_line_count_data(2, 0);
        b.append_function_data("main", 1, 1);
        b.append_branch_data(1, BranchStatus::Taken);
        b.append_branch_data(1, BranchStatus::NotTaken);
        let a = set.file_data("a.c");
        a.append_line_count_data(4, 3);
        a.append_function_data("helper", 4, 0);
        a.append_function_data("main", 3, 2);
        set.file_data("c.go")
            .append_region_data(Region::new(1, 1, 2, 1), 1);

        let report = Report::collect(&set);

        assert_eq!(report.title, DEFAULT_TITLE);
        assert_eq!(
            report.files.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["a.c", "b.c", "c.go"]
        );
        assert_eq!(report.files[1].missed, vec![(2, 2)]);
        assert_eq!(report.lines, Coverage::new(2, 3));
        assert_eq!(report.funcs, Coverage::new(2, 3));
        assert_eq!(report.branches, Coverage::new(1, 2));
        assert_eq!(report.regions, Coverage::new(1, 1));
        assert_eq!(
            report
                .functions
                .iter()
                .map(|f| (f.name.as_str(), f.filename.as_str()))
                .collect::<Vec<_>>(),
            vec![("helper", "a.c"), ("main", "a.c"), ("main", "b.c")]
        );
    }

    #[test]
    fn test_collect_keeps_metadata() {
        let mut report = Report::new("nightly");
        report.test_id = Some("build-42".to_string());
        report.collect_statistics(&FileDataSet::new());
        assert_eq!(report.title, "nightly");
        assert_eq!(report.test_id.as_deref(), Some("build-42"));
        assert!(!report.lines.is_valid());
        assert!(report.files.is_empty());
    }
}
