#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(model) = petrel_dsl::parse(s, "fuzz.prism") {
            let _ = petrel_ir::lowering::lower(&model);
        }
    }
});
