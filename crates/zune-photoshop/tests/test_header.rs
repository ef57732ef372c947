/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_photoshop::bytestream::{PsdReader, PsdWriter};
use zune_photoshop::errors::{ErrorKind, PsdError};
use zune_photoshop::{ColorMode, FileHeader, PsdDocument, PsdOptions, PsdVersion};

fn header_bytes(signature: &[u8; 4], version: u16, width: u32, height: u32) -> Vec<u8> {
    let mut writer = PsdWriter::new();
    writer.write_all(signature);
    writer.write_u16_be(version);
    writer.write_zeros(6);
    writer.write_u16_be(3);
    writer.write_u32_be(height);
    writer.write_u32_be(width);
    writer.write_u16_be(8);
    writer.write_u16_be(3);
    writer.into_inner()
}

fn read_header(bytes: &[u8]) -> Result<FileHeader, PsdError> {
    FileHeader::read(&mut PsdReader::new(bytes), &PsdOptions::default())
}

#[test]
fn test_bad_signature() {
    let err = read_header(&header_bytes(b"8BPX", 1, 10, 10)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(err, PsdError::WrongMagicBytes(_)));
}

#[test]
fn test_unknown_version() {
    let err = read_header(&header_bytes(b"8BPS", 3, 10, 10)).unwrap_err();
    assert!(matches!(err, PsdError::UnknownVersion(3)));
}

#[test]
fn test_width_out_of_range() {
    let err = read_header(&header_bytes(b"8BPS", 2, 300_001, 10)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(err, PsdError::OutOfRange(..)));

    // the largest PSB width is fine
    let header = read_header(&header_bytes(b"8BPS", 2, 300_000, 10)).unwrap();
    assert_eq!(header.width(), 300_000);
}

#[test]
fn test_options_limit_dimensions() {
    let options = PsdOptions::default().set_max_height(5);
    let bytes = header_bytes(b"8BPS", 1, 10, 10);
    let err = FileHeader::read(&mut PsdReader::new(&bytes), &options).unwrap_err();
    assert!(matches!(err, PsdError::OutOfRange(..)));
}

#[test]
fn test_header_round_trip() {
    let bytes = header_bytes(b"8BPS", 2, 640, 480);
    let header = read_header(&bytes).unwrap();
    assert_eq!(header.version(), PsdVersion::Psb);
    assert_eq!(header.dimensions(), (640, 480));
    assert_eq!(header.color_mode(), ColorMode::RGB);

    let mut writer = PsdWriter::new();
    header.write(&mut writer);
    assert_eq!(writer.into_inner(), bytes);
}

#[test]
fn test_invalid_header_fields() {
    assert!(FileHeader::new(PsdVersion::Psd, 0, 1, 1, 8, ColorMode::RGB).is_err());
    assert!(FileHeader::new(PsdVersion::Psd, 57, 1, 1, 8, ColorMode::RGB).is_err());
    assert!(FileHeader::new(PsdVersion::Psd, 3, 1, 1, 12, ColorMode::RGB).is_err());
    assert!(FileHeader::new(PsdVersion::Psd, 3, 0, 1, 8, ColorMode::RGB).is_err());
}

#[test]
fn test_document_errors_point_at_the_header() {
    let err = PsdDocument::read(&header_bytes(b"GIF8", 1, 1, 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(err.location(), Some(("file header", 0)));
    assert!(matches!(err.root_cause(), PsdError::WrongMagicBytes(_)));
}

#[test]
fn test_truncated_document() {
    let bytes = header_bytes(b"8BPS", 1, 1, 1);
    let err = PsdDocument::read(&bytes[..20]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncation);
}
