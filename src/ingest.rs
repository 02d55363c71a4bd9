use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::detect::Format;
use crate::error::{CovError, Result};
use crate::model::FileDataSet;

/// Decode a single file with the given format, accumulating into `set`.
///
/// Errors are wrapped with the path of the file. Records decoded before a
/// failure remain in `set`.
pub fn load_file(set: &mut FileDataSet, path: &Path, format: Format, config: &Config) -> Result<()> {
    debug!(path = %path.display(), %format, "decoding");
    decode_file(set, path, format, config).map_err(|e| e.in_input(path))?;
    debug!(path = %path.display(), files = set.len(), "decoded");
    Ok(())
}

fn decode_file(set: &mut FileDataSet, path: &Path, format: Format, config: &Config) -> Result<()> {
    let mut reader = BufReader::new(File::open(path)?);
    format.decoder(config).decode(set, &mut reader)
}

/// Load a file or a directory.
///
/// A file is decoded with the configured format override or, failing that,
/// the format its extension selects. A directory is expanded to its entries
/// with a known extension; other entries are skipped. Expansion is not
/// recursive. Returns the number of files decoded.
pub fn load_path(set: &mut FileDataSet, path: &Path, config: &Config) -> Result<usize> {
    if path.is_dir() {
        return load_dir(set, path, config);
    }
    let format = match config.format {
        Some(format) => format,
        None => Format::from_path(path).map_err(|e| e.in_input(path))?,
    };
    load_file(set, path, format, config)?;
    Ok(1)
}

fn load_dir(set: &mut FileDataSet, dir: &Path, config: &Config) -> Result<usize> {
    let mut entries = fs::read_dir(dir)
        .and_then(|rd| {
            rd.map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<PathBuf>>>()
        })
        .map_err(|e| CovError::from(e).in_input(dir))?;
    entries.sort();

    let mut count = 0;
    for path in entries {
        if path.is_dir() {
            debug!(path = %path.display(), "skipping subdirectory");
            continue;
        }
        match Format::from_path(&path) {
            Ok(format) => {
                load_file(set, &path, format, config)?;
                count += 1;
            }
            Err(_) => debug!(path = %path.display(), "skipping file with unknown extension"),
        }
    }
    Ok(count)
}

/// Load every path in order, stopping at the first error.
///
/// Returns the total number of files decoded.
pub fn load_paths<P: AsRef<Path>>(set: &mut FileDataSet, paths: &[P], config: &Config) -> Result<usize> {
    let mut count = 0;
    for path in paths {
        count += load_path(set, path.as_ref(), config)?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "a.info", "SF:a.c\nDA:1,1\nDA:2,0\nend_of_record\n");

        let mut set = FileDataSet::new();
        assert_eq!(load_path(&mut set, &path, &Config::default()).unwrap(), 1);
        assert_eq!(set.get("a.c").unwrap().line_data.len(), 2);
    }

    #[test]
    fn test_format_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "coverage.txt", "mode: set\na.go:1.1,2.1 1 1\n");

        let mut set = FileDataSet::new();
        let err = load_path(&mut set, &path, &Config::default()).unwrap_err();
        match err {
            CovError::Input { source, .. } => {
                assert!(matches!(*source, CovError::UnknownExtension(ref e) if e == "txt"))
            }
            other => panic!("unexpected error: {other}"),
        }

        let config = Config::new().with_format(Format::GoProfile);
        assert_eq!(load_path(&mut set, &path, &config).unwrap(), 1);
        assert!(set.contains("a.go"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let mut set = FileDataSet::new();
        let err = load_path(&mut set, Path::new("does/not/exist.gcov"), &Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("does/not/exist.gcov"));
        match err {
            CovError::Input { source, .. } => assert!(matches!(*source, CovError::Io(_))),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dir_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.gcov", "file:b.c\nlcount:1,1\n");
        write(dir.path(), "README.md", "not coverage\n");
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).unwrap();
        write(&sub, "c.gcov", "file:c.c\nlcount:1,1\n");

        let mut set = FileDataSet::new();
        assert_eq!(load_path(&mut set, dir.path(), &Config::default()).unwrap(), 1);
        assert_eq!(set.filenames().collect::<Vec<_>>(), vec!["b.c"]);
    }
}
