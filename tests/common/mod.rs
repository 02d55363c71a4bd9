#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use covnorm::config::Config;
use covnorm::model::FileDataSet;

/// Path to a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load one fixture and run post-processing with `config`.
pub fn load(name: &str, config: &Config) -> FileDataSet {
    let mut set = FileDataSet::new();
    covnorm::ingest::load_path(&mut set, &fixture(name), config).unwrap();
    covnorm::postprocess::process(&mut set, config).unwrap();
    set
}

/// Config rooted at the `/example` prefix the fixtures were generated under.
pub fn example_config() -> Config {
    Config::new().with_source_root("/example").unwrap()
}

/// Gzip `bytes` into a new file under `dir`.
pub fn write_gz(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut enc = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    enc.write_all(bytes).unwrap();
    enc.finish().unwrap();
    path
}

/// The gcov JSON equivalent of `example.c.gcov`.
pub const EXAMPLE_GCOV_JSON: &str = r#"{
  "gcc_version": "9.1.0",
  "current_working_directory": "/example",
  "files": [
    {
      "file": "/example/example.c",
      "functions": [
        { "name": "main", "demangled_name": "main", "start_line": 3, "end_line": 12,
          "execution_count": 1, "blocks": 6, "blocks_executed": 5 }
      ],
      "lines": [
        { "line_number": 3, "count": 1, "unexecuted_block": false, "branches": [] },
        { "line_number": 4, "count": 1, "branches": [] },
        { "line_number": 5, "count": 10,
          "branches": [ { "count": 1, "fallthrough": true }, { "count": 9, "fallthrough": false } ] },
        { "line_number": 6, "count": 10 },
        { "line_number": 7, "count": 0,
          "branches": [ { "count": 0 }, { "count": 0 } ] },
        { "line_number": 8, "count": 1 },
        { "line_number": 9, "count": 1 },
        { "line_number": 10, "count": 1 },
        { "line_number": 11, "count": 1 },
        { "line_number": 12, "count": 1 }
      ]
    },
    {
      "file": "/usr/include/stdio.h",
      "lines": [ { "line_number": 20, "count": 2 } ]
    }
  ]
}"#;
