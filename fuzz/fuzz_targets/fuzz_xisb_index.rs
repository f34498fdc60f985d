#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Fuzz the .xisb index-node linked-list parser with arbitrary data
    let mut cursor = Cursor::new(data);
    let _ = xisf_io::distributed::read_index(&mut cursor);
});
