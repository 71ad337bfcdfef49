#![no_main]

use libfuzzer_sys::fuzz_target;
use plyload::{geometry::Mesh, Reader};

fuzz_target!(|data: &[u8]| {
    // We are only interested in panics or worse crashes, so all errors are
    // ignored. The header is displayed to exercise that code path, too.
    let reader = Reader::new(data);
    let _ = reader.header().to_string();
    if let Ok(ply) = reader.read_body() {
        let _ = Mesh::from_ply(&ply);
    }
});
