#![no_main]
use libfuzzer_sys::fuzz_target;

use covnorm::model::FileDataSet;

fuzz_target!(|data: &[u8]| {
    // Decoding and region conversion must not panic on any input.
    let mut set = FileDataSet::new();
    if covnorm::parsers::llvm::decode(&mut set, &mut &data[..]).is_ok() {
        let _ = set.convert_region_to_line_data();
    }
});
