/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Channel pixel compression
//!
//! Every channel plane in a document is stored with one of four methods,
//! see [`Compression`]. The functions here are pure, they only need the plane
//! dimensions, bit depth and file version to turn stored bytes into a
//! plane and back.
//!
//! Planes are handed out exactly as the raw method would store them,
//! rows of `ceil(width * depth / 8)` bytes with multi byte samples in
//! big endian order.
use std::io::Write;

use flate2::write::ZlibEncoder;
use log::trace;
use zune_inflate::{DeflateDecoder, DeflateOptions};

use crate::constants::{Compression, PsdVersion};
use crate::errors::CompressionError;

pub mod packbits;
pub mod prediction;

pub use prediction::{restore_byte_order, shuffle_byte_order};

/// Number of bytes in one row of a plane
#[inline]
pub const fn row_size(width: usize, depth: u16) -> usize {
    (width * depth as usize + 7) / 8
}

/// Number of bytes in a whole plane
#[inline]
pub const fn plane_size(width: usize, height: usize, depth: u16) -> usize {
    row_size(width, depth) * height
}

/// Decompress a stored channel into a plane of exactly
/// `plane_size(width, height, depth)` bytes
pub fn decompress(
    data: &[u8], compression: Compression, width: usize, height: usize, depth: u16,
    version: PsdVersion
) -> Result<Vec<u8>, CompressionError> {
    let expected = plane_size(width, height, depth);

    let result = match compression {
        Compression::Raw => {
            if data.len() != expected {
                return Err(CompressionError::SizeMismatch(expected, data.len()));
            }
            data.to_vec()
        }
        Compression::Rle => decode_rle(data, width, height, depth, version)?,
        Compression::Zip => inflate(data, expected)?,
        Compression::ZipPrediction => {
            let mut decompressed = inflate(data, expected)?;
            if decompressed.len() == expected {
                prediction::decode_prediction(&mut decompressed, width, height, depth)?;
            }
            decompressed
        }
        Compression::Unknown(method) => return Err(CompressionError::UnknownMethod(method))
    };

    if result.len() != expected {
        return Err(CompressionError::SizeMismatch(expected, result.len()));
    }
    Ok(result)
}

/// Compress a plane of `plane_size(width, height, depth)` bytes
pub fn compress(
    data: &[u8], compression: Compression, width: usize, height: usize, depth: u16,
    version: PsdVersion
) -> Result<Vec<u8>, CompressionError> {
    let expected = plane_size(width, height, depth);

    if data.len() != expected {
        return Err(CompressionError::SizeMismatch(expected, data.len()));
    }

    match compression {
        Compression::Raw => Ok(data.to_vec()),
        Compression::Rle => encode_rle(data, width, height, depth, version),
        Compression::Zip => deflate(data),
        Compression::ZipPrediction => {
            let mut predicted = data.to_vec();
            prediction::encode_prediction(&mut predicted, width, height, depth)?;
            deflate(&predicted)
        }
        Compression::Unknown(method) => Err(CompressionError::UnknownMethod(method))
    }
}

/// Decode PackBits rows preceded by a table of row byte counts
fn decode_rle(
    data: &[u8], width: usize, height: usize, depth: u16, version: PsdVersion
) -> Result<Vec<u8>, CompressionError> {
    let count_width = version.rle_count_width();
    let table_size = count_width * height;

    if data.len() < table_size {
        return Err(CompressionError::RleCounts(table_size, data.len()));
    }
    let (table, mut rows) = data.split_at(table_size);

    let row_bytes = row_size(width, depth);
    let mut out = vec![0; row_bytes * height];

    if row_bytes == 0 {
        return Ok(out);
    }

    for (row, (count, out_row)) in table
        .chunks_exact(count_width)
        .zip(out.chunks_exact_mut(row_bytes))
        .enumerate()
    {
        let count = match count_width {
            2 => usize::from(u16::from_be_bytes([count[0], count[1]])),
            _ => u32::from_be_bytes([count[0], count[1], count[2], count[3]]) as usize
        };
        // a short final row is reported by the row decoder
        let (src, rest) = rows.split_at(count.min(rows.len()));
        packbits::decode_row(src, out_row, row)?;
        rows = rest;
    }

    Ok(out)
}

fn encode_rle(
    data: &[u8], width: usize, height: usize, depth: u16, version: PsdVersion
) -> Result<Vec<u8>, CompressionError> {
    let row_bytes = row_size(width, depth);
    let count_width = version.rle_count_width();

    let mut counts = Vec::with_capacity(count_width * height);
    let mut rows = Vec::with_capacity(data.len() / 2);

    for row in 0..height {
        let start = rows.len();
        packbits::encode_row(&data[row * row_bytes..(row + 1) * row_bytes], &mut rows);
        let count = rows.len() - start;

        // PSD row counts are 16 bit, wide rows only fit in PSB
        let too_long = CompressionError::RleRowTooLong(row, count);
        match count_width {
            2 => {
                let count = u16::try_from(count).map_err(|_| too_long)?;
                counts.extend_from_slice(&count.to_be_bytes());
            }
            _ => {
                let count = u32::try_from(count).map_err(|_| too_long)?;
                counts.extend_from_slice(&count.to_be_bytes());
            }
        }
    }
    counts.extend_from_slice(&rows);
    Ok(counts)
}

/// Inflate a zlib stream, falling back to a bare deflate stream
/// which some third party writers produce
fn inflate(data: &[u8], expected: usize) -> Result<Vec<u8>, CompressionError> {
    let options = DeflateOptions::default()
        .set_size_hint(expected)
        .set_limit(expected.saturating_add(1).max(1024));

    let mut decoder = DeflateDecoder::new_with_options(data, options);

    match decoder.decode_zlib() {
        Ok(bytes) => Ok(bytes),
        Err(zlib_error) => {
            trace!("zlib stream rejected ({zlib_error:?}), retrying as raw deflate");
            let mut decoder = DeflateDecoder::new_with_options(data, options);
            decoder
                .decode_deflate()
                .map_err(|e| CompressionError::Inflate(format!("{e:?}")))
        }
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2),
        flate2::Compression::default()
    );
    encoder
        .write_all(data)
        .map_err(|e| CompressionError::Deflate(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CompressionError::Deflate(e.to_string()))
}
