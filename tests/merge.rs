mod common;

use covnorm::config::Config;
use covnorm::ingest;
use covnorm::model::{Coverage, FileDataSet};
use covnorm::report::Report;

#[test]
fn runs_sum_hit_counts() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("run-a.info");
    let b = dir.path().join("run-b.info");
    std::fs::write(&a, "SF:/src/lib.rs\nFN:1,process\nFNDA:0,process\nDA:1,3\nDA:2,0\nDA:3,1\nend_of_record\n").unwrap();
    std::fs::write(&b, "SF:/src/lib.rs\nFN:1,process\nFNDA:2,process\nDA:1,2\nDA:2,1\nDA:3,0\nend_of_record\n").unwrap();

    let mut set = FileDataSet::new();
    ingest::load_paths(&mut set, &[&a, &b], &Config::default()).unwrap();

    let file = set.get("/src/lib.rs").unwrap();
    assert_eq!(file.line_data[&1], 5);
    assert_eq!(file.line_data[&2], 1);
    assert_eq!(file.line_data[&3], 1);
    assert_eq!(file.line_coverage(), Coverage::new(3, 3));
    assert_eq!(file.func_data["process"].hit_count, 2);
    assert_eq!(file.func_data["process"].start_line, 1);
}

#[test]
fn load_order_does_not_matter() {
    let forward = [common::fixture("example.info"), common::fixture("example.c.gcov")];
    let reverse = [common::fixture("example.c.gcov"), common::fixture("example.info")];

    let mut a = FileDataSet::new();
    ingest::load_paths(&mut a, &forward, &Config::default()).unwrap();
    let mut b = FileDataSet::new();
    ingest::load_paths(&mut b, &reverse, &Config::default()).unwrap();

    // Branch outcomes are kept in load order, so compare the roll-up.
    assert_eq!(Report::collect(&a), Report::collect(&b));
    assert_eq!(a.get("/example/example.c").unwrap().line_data[&5], 20);
}
