#![no_main]

use libfuzzer_sys::fuzz_target;
use zune_photoshop::compression::{compress, decompress};
use zune_photoshop::{Compression, PsdVersion};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let width = usize::from(data[0]).max(1);
    let height = data.len() / width;
    let plane = &data[..width * height];

    for method in [Compression::Raw, Compression::Rle, Compression::Zip, Compression::ZipPrediction] {
        let encoded = compress(plane, method, width, height, 8, PsdVersion::Psd).unwrap();
        let decoded = decompress(&encoded, method, width, height, 8, PsdVersion::Psd).unwrap();
        assert_eq!(decoded, plane);
    }
});
