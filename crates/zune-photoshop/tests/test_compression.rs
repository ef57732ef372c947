/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use nanorand::{Rng, WyRand};
use zune_photoshop::compression::{
    compress, decompress, packbits, plane_size, restore_byte_order, shuffle_byte_order
};
use zune_photoshop::{Compression, CompressionError, PsdVersion};

const METHODS: [Compression; 4] = [
    Compression::Raw,
    Compression::Rle,
    Compression::Zip,
    Compression::ZipPrediction
];

/// Random plane with some runs so RLE has something to do
fn plane(rand: &mut WyRand, size: usize) -> Vec<u8> {
    let mut data = vec![0_u8; size];
    rand.fill(&mut data);
    for chunk in data.chunks_mut(37).step_by(2) {
        let value = chunk[0];
        chunk.fill(value);
    }
    data
}

#[test]
fn test_compression_idempotence() {
    let mut rand = WyRand::new_seed(0x5053_4421);

    for version in [PsdVersion::Psd, PsdVersion::Psb] {
        for depth in [8_u16, 16, 32] {
            for (width, height) in [(1, 1), (7, 3), (64, 5), (300, 2)] {
                let data = plane(&mut rand, plane_size(width, height, depth));

                for method in METHODS {
                    let encoded = compress(&data, method, width, height, depth, version).unwrap();
                    let decoded =
                        decompress(&encoded, method, width, height, depth, version).unwrap();
                    assert_eq!(
                        decoded, data,
                        "{method:?} depth {depth} {width}x{height} {version:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_one_bit_planes() {
    let mut rand = WyRand::new_seed(1);
    let (width, height) = (13, 4);
    let data = plane(&mut rand, plane_size(width, height, 1));
    assert_eq!(data.len(), 8);

    for method in [Compression::Raw, Compression::Rle, Compression::Zip] {
        let encoded = compress(&data, method, width, height, 1, PsdVersion::Psd).unwrap();
        let decoded = decompress(&encoded, method, width, height, 1, PsdVersion::Psd).unwrap();
        assert_eq!(decoded, data);
    }
}

#[test]
fn test_packbits_lengths() {
    let mut rand = WyRand::new_seed(7);

    for length in 0..300 {
        let mut random = vec![0_u8; length];
        rand.fill(&mut random);
        let same = vec![0xAB_u8; length];
        let alternating: Vec<u8> = (0..length).map(|x| (x % 2) as u8).collect();
        let pairs: Vec<u8> = (0..length).map(|x| (x / 2) as u8).collect();

        for input in [random, same, alternating, pairs] {
            let encoded = packbits::encode(&input);
            assert_eq!(packbits::decode(&encoded, input.len()).unwrap(), input);
        }
    }
}

#[test]
fn test_packbits_never_encodes_pairs() {
    let input: Vec<u8> = (0..200).map(|x| (x / 2) as u8).collect();
    let encoded = packbits::encode(&input);
    // pairs are only ever literals
    assert!(encoded
        .iter()
        .step_by(128)
        .all(|control| *control < 128));
    assert!(encoded.len() > input.len());
}

#[test]
fn test_packbits_long_runs_are_split() {
    let encoded = packbits::encode(&[9; 300]);
    // 127 + 127 + 46
    assert_eq!(encoded, [130, 9, 130, 9, 211, 9]);
}

#[test]
fn test_packbits_overflow_is_an_error() {
    // a run of 5 into a row of 4
    let err = packbits::decode(&[252, 1], 4).unwrap_err();
    assert!(matches!(err, CompressionError::RleOverflow(0, 1)));

    // literal of 3 with only 2 source bytes
    let err = packbits::decode(&[2, 1, 2], 3).unwrap_err();
    assert!(matches!(err, CompressionError::RleExhausted(..)));
}

#[test]
fn test_byte_order_shuffle() {
    let mut rand = WyRand::new_seed(42);
    for (width, height) in [(1, 1), (3, 2), (50, 7)] {
        let mut data = vec![0_u8; 4 * width * height];
        rand.fill(&mut data);
        let shuffled = shuffle_byte_order(&data, width, height);
        assert_eq!(restore_byte_order(&shuffled, width, height), data);
    }
    // planes of the first row
    let shuffled = shuffle_byte_order(&[1, 2, 3, 4, 5, 6, 7, 8], 2, 1);
    assert_eq!(shuffled, [1, 5, 2, 6, 3, 7, 4, 8]);
}

#[test]
fn test_zip_size_is_checked() {
    let data = vec![1_u8; 16];
    let encoded = compress(&data, Compression::Zip, 4, 4, 8, PsdVersion::Psd).unwrap();
    let err = decompress(&encoded, Compression::Zip, 4, 5, 8, PsdVersion::Psd).unwrap_err();
    assert!(matches!(err, CompressionError::SizeMismatch(20, 16)));
}
