//! Uniform in-memory representation of coverage data, independent of any
//! specific format. Decoders accumulate into a `FileDataSet`, which is then
//! post-processed and handed to the report collector.

use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::error::{CovError, Result};

/// Counts of exercised vs. countable units in some scope.
///
/// A coverage with `total == 0` is *invalid*: there is nothing to measure,
/// so `percent`, `q` and `rating` all return `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Coverage {
    pub hits: u64,
    pub total: u64,
}

impl Coverage {
    #[must_use]
    pub const fn new(hits: u64, total: u64) -> Self {
        Self { hits, total }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.total != 0
    }

    /// Percentage of units that were exercised.
    #[must_use]
    pub fn percent(&self) -> Option<f64> {
        self.is_valid()
            .then(|| self.hits as f64 * 100.0 / self.total as f64)
    }

    /// Percentage of units that were not exercised.
    #[must_use]
    pub fn q(&self) -> Option<f64> {
        self.percent().map(|p| 100.0 - p)
    }

    /// Classify the coverage. Boundaries are compared in integer arithmetic
    /// so that e.g. 45/50 is exactly 90%.
    #[must_use]
    pub fn rating(&self) -> Option<Rating> {
        if !self.is_valid() {
            return None;
        }
        let scaled = u128::from(self.hits) * 100;
        let total = u128::from(self.total);
        Some(if scaled >= 90 * total {
            Rating::High
        } else if scaled >= 75 * total {
            Rating::Medium
        } else {
            Rating::Low
        })
    }

    /// Fold the counts of a sub-scope into this one.
    pub fn accumulate(&mut self, delta: Coverage) {
        *self += delta;
    }
}

impl Add for Coverage {
    type Output = Coverage;

    fn add(self, rhs: Coverage) -> Coverage {
        Coverage {
            hits: self.hits + rhs.hits,
            total: self.total + rhs.total,
        }
    }
}

impl AddAssign for Coverage {
    fn add_assign(&mut self, rhs: Coverage) {
        self.hits += rhs.hits;
        self.total += rhs.total;
    }
}

impl Sum for Coverage {
    fn sum<I: Iterator<Item = Coverage>>(iter: I) -> Self {
        iter.fold(Coverage::default(), Add::add)
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent() {
            Some(p) => write!(f, "{}/{} ({p:.1}%)", self.hits, self.total),
            None => f.write_str("n/a"),
        }
    }
}

/// Coarse classification of a coverage percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rating {
    Low,
    Medium,
    High,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Low => "low",
            Rating::Medium => "medium",
            Rating::High => "high",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single branch occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchStatus {
    Taken,
    NotTaken,
    NotExecuted,
}

/// Decoders reject regions touching more lines than this, so that
/// region-to-line conversion stays bounded.
pub const MAX_REGION_LINES: u64 = 1 << 20;

/// An inclusive source range. Used as an exact-match key: two regions are
/// the same region only when all four fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Region {
    pub start_line: u32,
    pub start_byte: u32,
    pub end_line: u32,
    pub end_byte: u32,
}

impl Region {
    #[must_use]
    pub const fn new(start_line: u32, start_byte: u32, end_line: u32, end_byte: u32) -> Self {
        Self {
            start_line,
            start_byte,
            end_line,
            end_byte,
        }
    }

    /// Every line touched by the region, both ends included.
    pub fn lines(&self) -> std::ops::RangeInclusive<u32> {
        self.start_line..=self.end_line
    }

    /// Number of lines touched by the region; zero if it ends before it starts.
    #[must_use]
    pub fn line_count(&self) -> u64 {
        if self.end_line < self.start_line {
            0
        } else {
            u64::from(self.end_line - self.start_line) + 1
        }
    }
}

/// A function's declared position and cumulative hit count.
/// `start_line == 0` means the position is not known (yet).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuncData {
    pub start_line: u32,
    pub hit_count: u64,
}

/// Lines attributed to all functions declared at one start line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionRange {
    pub start_line: u32,
    /// `None` when this is the last function in the file: it runs to EOF.
    pub end_line: Option<u32>,
}

impl FunctionRange {
    #[must_use]
    pub fn contains(&self, line: u32) -> bool {
        line >= self.start_line && self.end_line.map_or(true, |end| line <= end)
    }
}

/// Per-function line listing for one distinct start line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionListing {
    pub range: FunctionRange,
    /// Every function name declared at this start line, sorted.
    pub names: Vec<String>,
    /// `(line, hits)` for each line with data inside the range.
    pub lines: Vec<(u32, u64)>,
}

/// Coverage data for a single source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileData {
    pub filename: String,
    /// Line number → cumulative hit count.
    pub line_data: BTreeMap<u32, u64>,
    /// Function name → declaration and cumulative hit count.
    pub func_data: BTreeMap<String, FuncData>,
    /// Line number → branch outcomes, in input order.
    pub branch_data: BTreeMap<u32, Vec<BranchStatus>>,
    /// Region → cumulative hit count.
    pub region_data: BTreeMap<Region, u64>,
}

impl FileData {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    pub fn append_line_count_data(&mut self, line: u32, hits: u64) {
        let count = self.line_data.entry(line).or_insert(0);
        *count = count.saturating_add(hits);
    }

    /// Sum `hits` into the named function. The start line is recorded the
    /// first time a non-zero one is supplied, so declaration and hit count
    /// may arrive in separate calls.
    pub fn append_function_data(&mut self, name: &str, start_line: u32, hits: u64) {
        let entry = self.func_data.entry(name.to_string()).or_default();
        entry.hit_count = entry.hit_count.saturating_add(hits);
        if entry.start_line == 0 {
            entry.start_line = start_line;
        }
    }

    pub fn append_branch_data(&mut self, line: u32, status: BranchStatus) {
        self.branch_data.entry(line).or_default().push(status);
    }

    pub fn append_region_data(&mut self, region: Region, hits: u64) {
        let count = self.region_data.entry(region).or_insert(0);
        *count = count.saturating_add(hits);
    }

    #[must_use]
    pub fn line_coverage(&self) -> Coverage {
        count_nonzero(self.line_data.values().copied())
    }

    #[must_use]
    pub fn func_coverage(&self) -> Coverage {
        count_nonzero(self.func_data.values().map(|f| f.hit_count))
    }

    #[must_use]
    pub fn branch_coverage(&self) -> Coverage {
        self.branch_data
            .values()
            .flatten()
            .fold(Coverage::default(), |mut acc, status| {
                acc.total += 1;
                if *status == BranchStatus::Taken {
                    acc.hits += 1;
                }
                acc
            })
    }

    #[must_use]
    pub fn region_coverage(&self) -> Coverage {
        count_nonzero(self.region_data.values().copied())
    }

    /// Infer line counts from the region data.
    ///
    /// Fails when line data is already present: adding region-derived
    /// counts on top of directly supplied ones would double count.
    pub fn convert_region_to_line_data(&mut self) -> Result<()> {
        if !self.line_data.is_empty() {
            return Err(CovError::LineDataPresent(self.filename.clone()));
        }
        for (region, &hits) in &self.region_data {
            for line in region.lines() {
                let count = self.line_data.entry(line).or_insert(0);
                *count = count.saturating_add(hits);
            }
        }
        Ok(())
    }

    /// Additively fold another file's data into this one.
    pub fn merge(&mut self, other: FileData) {
        for (line, hits) in other.line_data {
            self.append_line_count_data(line, hits);
        }
        for (name, func) in other.func_data {
            self.append_function_data(&name, func.start_line, func.hit_count);
        }
        for (line, statuses) in other.branch_data {
            self.branch_data.entry(line).or_default().extend(statuses);
        }
        for (region, hits) in other.region_data {
            self.append_region_data(region, hits);
        }
    }

    /// Line ranges attributed to functions, one per distinct start line.
    ///
    /// Functions sharing a start line (compiler-duplicated symbols, for
    /// instance) collapse into a single range. This loses the distinction
    /// between those names for line attribution; their hit counts remain
    /// separate in `func_data`. Functions with an unknown start line are
    /// not attributed any lines.
    #[must_use]
    pub fn function_ranges(&self) -> Vec<FunctionRange> {
        let starts: BTreeSet<u32> = self
            .func_data
            .values()
            .map(|f| f.start_line)
            .filter(|&line| line != 0)
            .collect();

        let mut ranges = Vec::with_capacity(starts.len());
        let mut iter = starts.into_iter().peekable();
        while let Some(start_line) = iter.next() {
            let end_line = iter.peek().map(|next| next - 1);
            ranges.push(FunctionRange {
                start_line,
                end_line,
            });
        }
        ranges
    }

    /// Per-function line listings, visiting each distinct start line once.
    #[must_use]
    pub fn function_listings(&self) -> Vec<FunctionListing> {
        self.function_ranges()
            .into_iter()
            .map(|range| {
                let names = self
                    .func_data
                    .iter()
                    .filter(|(_, f)| f.start_line == range.start_line)
                    .map(|(name, _)| name.clone())
                    .collect();
                let upper = range.end_line.unwrap_or(u32::MAX);
                let lines = self
                    .line_data
                    .range(range.start_line..=upper)
                    .map(|(&line, &hits)| (line, hits))
                    .collect();
                FunctionListing {
                    range,
                    names,
                    lines,
                }
            })
            .collect()
    }
}

fn count_nonzero(values: impl Iterator<Item = u64>) -> Coverage {
    values.fold(Coverage::default(), |mut acc, v| {
        acc.total += 1;
        if v != 0 {
            acc.hits += 1;
        }
        acc
    })
}

/// Filename → `FileData`. Entries are created lazily on first reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDataSet {
    files: BTreeMap<String, FileData>,
}

impl FileDataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for `filename`, creating an empty one if needed.
    pub fn file_data(&mut self, filename: &str) -> &mut FileData {
        self.files
            .entry(filename.to_string())
            .or_insert_with(|| FileData::new(filename))
    }

    pub fn get(&self, filename: &str) -> Option<&FileData> {
        self.files.get(filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.files.contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FileData> {
        self.files.iter()
    }

    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, String, FileData> {
        self.files.iter_mut()
    }

    pub fn remove(&mut self, filename: &str) -> Option<FileData> {
        self.files.remove(filename)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &FileData) -> bool) {
        self.files.retain(|name, data| keep(name.as_str(), data));
    }

    /// Store `data` under its filename, merging with any existing entry.
    pub fn insert(&mut self, data: FileData) {
        match self.files.entry(data.filename.clone()) {
            btree_map::Entry::Occupied(mut slot) => slot.get_mut().merge(data),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(data);
            }
        }
    }

    #[must_use]
    pub fn line_coverage(&self) -> Coverage {
        self.files.values().map(FileData::line_coverage).sum()
    }

    #[must_use]
    pub fn func_coverage(&self) -> Coverage {
        self.files.values().map(FileData::func_coverage).sum()
    }

    #[must_use]
    pub fn branch_coverage(&self) -> Coverage {
        self.files.values().map(FileData::branch_coverage).sum()
    }

    #[must_use]
    pub fn region_coverage(&self) -> Coverage {
        self.files.values().map(FileData::region_coverage).sum()
    }

    /// Convert region data to line data for every file that has regions.
    /// Files carrying only line data are left untouched.
    pub fn convert_region_to_line_data(&mut self) -> Result<()> {
        self.files
            .values_mut()
            .filter(|data| !data.region_data.is_empty())
            .try_for_each(FileData::convert_region_to_line_data)
    }
}

impl<'a> IntoIterator for &'a FileDataSet {
    type Item = (&'a String, &'a FileData);
    type IntoIter = btree_map::Iter<'a, String, FileData>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl IntoIterator for FileDataSet {
    type Item = (String, FileData);
    type IntoIter = btree_map::IntoIter<String, FileData>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl FromIterator<FileData> for FileDataSet {
    fn from_iter<I: IntoIterator<Item = FileData>>(iter: I) -> Self {
        let mut set = FileDataSet::new();
        for data in iter {
            set.insert(data);
        }
        set
    }
}
