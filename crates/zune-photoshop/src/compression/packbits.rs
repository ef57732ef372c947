/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Apple PackBits run length coding
//!
//! Loop until you get the number of unpacked bytes you are expecting:
//!     Read the next source byte into n.
//!     If n is between 0 and 127 inclusive, copy the next n+1 bytes
//!     literally. Else if n is between -127 and -1 inclusive, copy the next
//!     byte -n+1 times. Else if n is 128, noop.
//! Endloop
use std::cmp::Ordering;

use crate::errors::CompressionError;

/// Longest literal or run the encoder emits
const MAX_PACKET: usize = 127;

/// Decode one PackBits row into `out`, which must be exactly the row size.
///
/// `row` is only used for error reporting
pub fn decode_row(src: &[u8], out: &mut [u8], row: usize) -> Result<(), CompressionError> {
    let mut position = 0;
    let mut src_position = 0;

    while position < out.len() {
        let Some(&control) = src.get(src_position) else {
            return Err(CompressionError::RleExhausted(row, out.len() - position));
        };
        src_position += 1;

        let nleft = out.len() - position;

        match control.cmp(&128) {
            Ordering::Less => {
                // copy next len+1 bytes literally
                let len = usize::from(control) + 1;
                if len > nleft {
                    return Err(CompressionError::RleOverflow(row, len - nleft));
                }
                let Some(literal) = src.get(src_position..src_position + len) else {
                    return Err(CompressionError::RleExhausted(row, nleft));
                };
                out[position..position + len].copy_from_slice(literal);
                src_position += len;
                position += len;
            }
            Ordering::Equal => (),
            Ordering::Greater => {
                // Next -len+1 bytes in the dest are replicated from next source byte.
                // (Interpret len as a negative 8-bit int.)
                let len = 257 - usize::from(control);
                if len > nleft {
                    return Err(CompressionError::RleOverflow(row, len - nleft));
                }
                let Some(&value) = src.get(src_position) else {
                    return Err(CompressionError::RleExhausted(row, nleft));
                };
                src_position += 1;
                out[position..position + len].fill(value);
                position += len;
            }
        }
    }
    Ok(())
}

/// Encode one row, appending to `out`.
///
/// Runs shorter than three bytes are folded into literals since a two
/// byte run costs as much as the literal, and no packet exceeds 127 bytes.
pub fn encode_row(src: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;

    while i < src.len() {
        let mut run = 1;
        while i + run < src.len() && src[i + run] == src[i] && run < MAX_PACKET {
            run += 1;
        }

        if run >= 3 {
            out.push((257 - run) as u8);
            out.push(src[i]);
            i += run;
            continue;
        }

        let start = i;
        while i < src.len() && i - start < MAX_PACKET {
            // stop the literal where a worthwhile run begins
            if i + 2 < src.len() && src[i] == src[i + 1] && src[i] == src[i + 2] {
                break;
            }
            i += 1;
        }
        out.push((i - start - 1) as u8);
        out.extend_from_slice(&src[start..i]);
    }
}

/// Encode a whole buffer as a single row
pub fn encode(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() + src.len() / MAX_PACKET + 1);
    encode_row(src, &mut out);
    out
}

/// Decode a buffer that is known to expand to `size` bytes
pub fn decode(src: &[u8], size: usize) -> Result<Vec<u8>, CompressionError> {
    let mut out = vec![0; size];
    decode_row(src, &mut out, 0)?;
    Ok(out)
}
