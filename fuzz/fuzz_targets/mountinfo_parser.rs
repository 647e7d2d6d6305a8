#![no_main]

use bindscan::mountinfo::MountTable;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text must parse without panicking; bad lines are skipped
    if let Ok(input) = std::str::from_utf8(data) {
        let table = MountTable::parse(input);
        assert!(table.len() <= input.lines().count());
    }
});
