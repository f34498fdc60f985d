#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Fuzz the monolithic file-header + XML header parse path with arbitrary data
    let mut cursor = Cursor::new(data);
    let _ = xisf_io::monolithic::read_header(&mut cursor);
});
