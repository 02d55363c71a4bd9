mod common;

use covnorm::config::Config;
use covnorm::model::Coverage;
use covnorm::parsers::lcov::LcovDecoder;
use covnorm::parsers::Decoder;
use covnorm::model::FileDataSet;

#[test]
fn load_fixture() {
    let set = common::load("example.info", &Config::default().with_include_external(true));

    assert_eq!(set.len(), 2);
    let file = set.get("/example/example.c").unwrap();
    assert_eq!(file.line_coverage(), Coverage::new(9, 10));
    assert_eq!(file.func_coverage(), Coverage::new(1, 1));
    assert_eq!(file.branch_coverage(), Coverage::new(2, 4));
    assert_eq!(set.line_coverage(), Coverage::new(10, 11));
}

#[test]
fn source_root_applied_while_decoding() {
    let input = b"TN:test\nSF:/src/main.rs\nDA:1,5\nDA:2,5\nDA:3,0\nLF:3\nLH:2\nend_of_record\n";
    let mut set = FileDataSet::new();
    LcovDecoder::new(Some("/src".into()))
        .decode(&mut set, &mut &input[..])
        .unwrap();

    let file = set.get("main.rs").unwrap();
    assert_eq!(file.line_data[&1], 5);
    assert_eq!(file.line_coverage(), Coverage::new(2, 3));
}

#[test]
fn external_files_dropped_by_default() {
    let set = common::load("example.info", &common::example_config());
    assert_eq!(set.filenames().collect::<Vec<_>>(), vec!["example.c"]);
}
