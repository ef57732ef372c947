/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Hand assembled documents that must be written back byte for byte

use zune_photoshop::tagged_blocks::keys;
use zune_photoshop::{PsdDocument, PsdVersion, TaggedBlockData, TextEncoding};

/// A 1x1 8 bit grayscale document around the given sections,
/// each section slice starts with its own length
fn document(version: u8, resources: &[u8], layer_and_mask: &[u8]) -> Vec<u8> {
    let mut bytes = vec![];
    bytes.extend_from_slice(b"8BPS");
    bytes.extend_from_slice(&[0, version, 0, 0, 0, 0, 0, 0]);
    // channels, height, width, depth, color mode
    bytes.extend_from_slice(&[0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 8, 0, 1]);
    // color mode data
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(resources);
    bytes.extend_from_slice(layer_and_mask);
    // raw merged image
    bytes.extend_from_slice(&[0, 0, 0x80]);
    bytes
}

fn assert_round_trip(bytes: &[u8]) -> PsdDocument {
    let document = PsdDocument::read(bytes).unwrap();
    assert_eq!(document.write().unwrap(), bytes);
    assert_eq!(document.merged_image().unwrap(), [vec![0x80]]);
    document
}

#[test]
fn test_odd_length_image_resource() {
    #[rustfmt::skip]
    let resources = [
        0, 0, 0, 16,
        b'8', b'B', b'I', b'M', 0x03, 0xED,
        // empty name, padded to two bytes
        0, 0,
        // three bytes of data and a pad byte outside the length
        0, 0, 0, 3, 1, 2, 3, 0
    ];
    let bytes = document(1, &resources, &[0, 0, 0, 0]);
    let document = assert_round_trip(&bytes);

    let resources = &document.image_resources.resources;
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].data, [1, 2, 3]);
}

#[test]
fn test_two_empty_layer_and_mask_blocks() {
    // layer info and global layer mask, both zero length
    let section = [0, 0, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0];
    let bytes = document(1, &[0, 0, 0, 0], &section);
    let document = assert_round_trip(&bytes);

    let info = &document.layer_and_mask_information;
    assert!(info.layer_info.is_none());
    assert!(info.global_layer_mask_info.is_none());
    assert!(info.has_layer_info_block);
    assert!(info.has_global_mask_block);
    assert!(document.layer_records().is_empty());
}

#[test]
fn test_unaligned_document_tagged_blocks() {
    #[rustfmt::skip]
    let section = [
        0, 0, 0, 44,
        0, 0, 0, 0,
        0, 0, 0, 0,
        // five bytes, padded to four outside the length
        b'8', b'B', b'I', b'M', b'z', b'z', b'z', b'z', 0, 0, 0, 5,
        1, 2, 3, 4, 5, 0, 0, 0,
        b'8', b'B', b'I', b'M', b'y', b'y', b'y', b'y', 0, 0, 0, 2,
        6, 7, 0, 0
    ];
    let bytes = document(1, &[0, 0, 0, 0], &section);
    let document = assert_round_trip(&bytes);

    let blocks = &document.layer_and_mask_information.tagged_blocks;
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks.get(*b"zzzz").unwrap().data, [1, 2, 3, 4, 5]);
    assert_eq!(blocks.get(*b"yyyy").unwrap().data, [6, 7]);
    assert!(blocks.trailing.is_empty());
}

#[test]
fn test_psb_layer_with_wide_lr16_block() {
    #[rustfmt::skip]
    let section = [
        0, 0, 0, 0, 0, 0, 0, 90,
        // layer info
        0, 0, 0, 0, 0, 0, 0, 78,
        0, 1,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 1,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 2,
        b'8', b'B', b'I', b'M', b'n', b'o', b'r', b'm',
        255, 0, 0, 0,
        // extra data
        0, 0, 0, 30,
        0, 0, 0, 0,
        0, 0, 0, 0,
        3, b'a', b'b', b'c',
        b'8', b'B', b'I', b'M', b'L', b'r', b'1', b'6',
        0, 0, 0, 0, 0, 0, 0, 2,
        0, 0,
        // channel image data, raw and empty
        0, 0,
        // global layer mask
        0, 0, 0, 0
    ];
    let bytes = document(2, &[0, 0, 0, 0], &section);
    let document = assert_round_trip(&bytes);
    assert_eq!(document.version(), PsdVersion::Psb);

    let records = document.layer_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name(TextEncoding::MacRoman), "abc");
    assert_eq!(records[0].channel_info[0].length, 2);

    let nested = records[0].tagged_blocks.decode(keys::LAYER_16, PsdVersion::Psb);
    match nested {
        Some(TaggedBlockData::LayerInfo(info)) => assert!(info.is_empty()),
        other => panic!("unexpected {other:?}")
    }
}
