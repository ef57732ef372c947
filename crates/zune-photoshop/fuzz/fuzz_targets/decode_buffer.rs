#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(document) = zune_photoshop::PsdDocument::read(data) {
        let _ = document.layer_tree();
        let _ = document.merged_image();
    }
});
