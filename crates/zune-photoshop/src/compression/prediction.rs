/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Horizontal delta prediction used by the `ZipPrediction` compression
//!
//! 8 and 16 bit scanlines are delta coded sample by sample, with 16 bit
//! samples kept big endian on both sides.
//!
//! 32 bit scanlines are first split into four byte planes, all the first
//! bytes of every pixel in a row, then all second bytes and so on. The
//! resulting `4 * width` byte row is then delta coded as 8 bit samples.

use crate::errors::CompressionError;

/// Undo the delta coding in place. `data` must be `row_bytes * height` long
pub fn decode_prediction(
    data: &mut [u8], width: usize, height: usize, depth: u16
) -> Result<(), CompressionError> {
    if !matches!(depth, 8 | 16 | 32) {
        return Err(CompressionError::UnsupportedDepth(depth));
    }
    if width == 0 || height == 0 {
        return Ok(());
    }
    match depth {
        8 => {
            for row in data.chunks_exact_mut(width).take(height) {
                undo_delta_u8(row);
            }
        }
        16 => {
            for row in data.chunks_exact_mut(width * 2).take(height) {
                let mut previous = 0_u16;
                for sample in row.chunks_exact_mut(2) {
                    let value = u16::from_be_bytes([sample[0], sample[1]]).wrapping_add(previous);
                    sample.copy_from_slice(&value.to_be_bytes());
                    previous = value;
                }
            }
        }
        32 => {
            for row in data.chunks_exact_mut(width * 4).take(height) {
                undo_delta_u8(row);
            }
            let restored = restore_byte_order(data, width, height);
            data.copy_from_slice(&restored);
        }
        _ => return Err(CompressionError::UnsupportedDepth(depth))
    }
    Ok(())
}

/// Apply delta coding in place, the inverse of [`decode_prediction`]
pub fn encode_prediction(
    data: &mut [u8], width: usize, height: usize, depth: u16
) -> Result<(), CompressionError> {
    if !matches!(depth, 8 | 16 | 32) {
        return Err(CompressionError::UnsupportedDepth(depth));
    }
    if width == 0 || height == 0 {
        return Ok(());
    }
    match depth {
        8 => {
            for row in data.chunks_exact_mut(width).take(height) {
                apply_delta_u8(row);
            }
        }
        16 => {
            for row in data.chunks_exact_mut(width * 2).take(height) {
                // right to left so every sample still sees its original neighbour
                for x in (1..width).rev() {
                    let current = u16::from_be_bytes([row[2 * x], row[2 * x + 1]]);
                    let left = u16::from_be_bytes([row[2 * x - 2], row[2 * x - 1]]);
                    row[2 * x..2 * x + 2].copy_from_slice(&current.wrapping_sub(left).to_be_bytes());
                }
            }
        }
        32 => {
            let shuffled = shuffle_byte_order(data, width, height);
            data.copy_from_slice(&shuffled);
            for row in data.chunks_exact_mut(width * 4).take(height) {
                apply_delta_u8(row);
            }
        }
        _ => return Err(CompressionError::UnsupportedDepth(depth))
    }
    Ok(())
}

fn undo_delta_u8(row: &mut [u8]) {
    for x in 1..row.len() {
        row[x] = row[x].wrapping_add(row[x - 1]);
    }
}

fn apply_delta_u8(row: &mut [u8]) {
    for x in (1..row.len()).rev() {
        row[x] = row[x].wrapping_sub(row[x - 1]);
    }
}

/// Gather byte planes back into pixels.
///
/// Byte `b` of pixel `x` in a row comes from position `b * width + x`
pub fn restore_byte_order(data: &[u8], width: usize, height: usize) -> Vec<u8> {
    let row_size = width * 4;
    let mut out = vec![0; data.len()];
    if row_size == 0 {
        return out;
    }

    for (src, dst) in data
        .chunks_exact(row_size)
        .zip(out.chunks_exact_mut(row_size))
        .take(height)
    {
        for (x, pixel) in dst.chunks_exact_mut(4).enumerate() {
            for (b, byte) in pixel.iter_mut().enumerate() {
                *byte = src[b * width + x];
            }
        }
    }
    out
}

/// Scatter pixels into byte planes, the inverse of [`restore_byte_order`]
pub fn shuffle_byte_order(data: &[u8], width: usize, height: usize) -> Vec<u8> {
    let row_size = width * 4;
    let mut out = vec![0; data.len()];
    if row_size == 0 {
        return out;
    }

    for (src, dst) in data
        .chunks_exact(row_size)
        .zip(out.chunks_exact_mut(row_size))
        .take(height)
    {
        for (x, pixel) in src.chunks_exact(4).enumerate() {
            for (b, byte) in pixel.iter().enumerate() {
                dst[b * width + x] = *byte;
            }
        }
    }
    out
}
