//! Steps applied to a fully decoded `FileDataSet` before reporting, so that
//! data from different toolchains can be combined.

use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::model::FileDataSet;

/// If `path` lies under `root`, return it relative to `root`.
pub fn strip_source_root(path: &str, root: &Path) -> Option<String> {
    let relative = Path::new(path).strip_prefix(root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(relative.to_string_lossy().into_owned())
}

/// Rewrite every filename under `root` to be relative to it. Entries that
/// collide after renaming are merged.
pub fn normalize_source_filenames(set: &mut FileDataSet, root: &Path) {
    let renames: Vec<(String, String)> = set
        .filenames()
        .filter_map(|name| strip_source_root(name, root).map(|rel| (name.to_string(), rel)))
        .collect();

    for (old, new) in renames {
        if let Some(mut data) = set.remove(&old) {
            data.filename = new;
            set.insert(data);
        }
    }
}

/// Drop files with absolute paths unless `include_external` is set.
pub fn filter_external(set: &mut FileDataSet, include_external: bool) {
    if include_external {
        return;
    }
    set.retain(|name, _| !Path::new(name).is_absolute());
}

/// Drop files whose name matches `pattern`. An empty pattern does nothing.
/// An invalid pattern is reported as a warning and leaves the set as is.
///
/// Returns whether the filter was applied.
pub fn filter_excluded(set: &mut FileDataSet, pattern: &str) -> bool {
    if pattern.is_empty() {
        return true;
    }
    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("did not apply filter to exclude files: {e}");
            return false;
        }
    };
    set.retain(|name, _| !re.is_match(name));
    true
}

/// Run the post-processing pipeline: normalize filenames, filter, then
/// derive line data from regions.
pub fn process(set: &mut FileDataSet, config: &Config) -> Result<()> {
    if let Some(root) = config.source_root() {
        normalize_source_filenames(set, root);
    }
    filter_external(set, config.include_external);
    if let Some(pattern) = config.exclude.as_deref() {
        filter_excluded(set, pattern);
    }
    set.convert_region_to_line_data()?;
    debug!(files = set.len(), "post-processing complete");
    Ok(())
}
