/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use crate::bytestream::{padding_for, LengthWidth};
use crate::errors::PsdError;

/// Encapsulates a growable byte sink with
/// support for big endian writes and length backfilling
#[derive(Default)]
pub struct PsdWriter {
    buffer: Vec<u8>
}

impl PsdWriter {
    pub fn new() -> PsdWriter {
        PsdWriter { buffer: Vec::new() }
    }

    pub fn with_capacity(size: usize) -> PsdWriter {
        PsdWriter {
            buffer: Vec::with_capacity(size)
        }
    }

    /// Return the number of bytes the writer has written
    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_all(&mut self, buf: &[u8]) {
        self.buffer.extend_from_slice(buf);
    }

    pub fn write_u8(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    /// Write `count` zero bytes
    pub fn write_zeros(&mut self, count: usize) {
        self.buffer.resize(self.buffer.len() + count, 0);
    }

    /// Zero fill until `written` is a multiple of `padding`,
    /// returning the number of bytes added
    pub fn write_padding(&mut self, written: usize, padding: usize) -> usize {
        let pad = padding_for(written, padding);
        self.write_zeros(pad);
        pad
    }

    /// Write a length field of the given width
    pub fn write_length(&mut self, width: LengthWidth, length: u64) -> Result<(), PsdError> {
        if length > width.max_value() {
            return Err(PsdError::OutOfRange(
                "block length",
                length,
                0,
                width.max_value()
            ));
        }
        match width {
            LengthWidth::U16 => self.write_u16_be(length as u16),
            LengthWidth::U32 => self.write_u32_be(length as u32),
            LengthWidth::U64 => self.write_u64_be(length)
        }
        Ok(())
    }

    /// Reserve a length field, run `func`, fill in the measured length and
    /// then zero pad the produced bytes to `padding`.
    ///
    /// The padding follows the block and is not counted in its length, the
    /// mirror of [`PsdReader::read_length_prefixed`](crate::bytestream::PsdReader::read_length_prefixed).
    /// Returns the total number of bytes written including the length field
    /// and the padding.
    pub fn write_length_prefixed<F>(
        &mut self, width: LengthWidth, padding: usize, func: F
    ) -> Result<usize, PsdError>
    where
        F: FnOnce(&mut PsdWriter) -> Result<(), PsdError>
    {
        let length_position = self.buffer.len();
        self.write_zeros(width.size());

        let body_start = self.buffer.len();
        if let Err(e) = func(self) {
            // never leave a half written block behind
            self.buffer.truncate(length_position);
            return Err(e);
        }
        let body_length = self.buffer.len() - body_start;

        let length = body_length as u64;
        if length > width.max_value() {
            self.buffer.truncate(length_position);
            return Err(PsdError::OutOfRange(
                "block length",
                length,
                0,
                width.max_value()
            ));
        }
        let field = &mut self.buffer[length_position..body_start];
        match width {
            LengthWidth::U16 => field.copy_from_slice(&(length as u16).to_be_bytes()),
            LengthWidth::U32 => field.copy_from_slice(&(length as u32).to_be_bytes()),
            LengthWidth::U64 => field.copy_from_slice(&length.to_be_bytes())
        }
        let pad = self.write_padding(body_length, padding);
        Ok(width.size() + body_length + pad)
    }

    /// Write a Pascal string padded so that the length byte plus the
    /// string is a multiple of `padding`
    pub fn write_pascal_string(&mut self, bytes: &[u8], padding: usize) -> Result<usize, PsdError> {
        let length = u8::try_from(bytes.len()).map_err(|_| {
            PsdError::OutOfRange("pascal string length", bytes.len() as u64, 0, 255)
        })?;
        self.write_u8(length);
        self.write_all(bytes);
        let pad = self.write_padding(bytes.len() + 1, padding);
        Ok(bytes.len() + 1 + pad)
    }

    /// Write a string as a UTF-16 code unit count followed by the
    /// big endian code units
    pub fn write_unicode_string(&mut self, string: &str) -> usize {
        let units: Vec<u16> = string.encode_utf16().collect();
        self.write_u32_be(units.len() as u32);
        for unit in &units {
            self.write_u16_be(*unit);
        }
        4 + units.len() * 2
    }
}

macro_rules! write_single_type {
    ($name:tt,$int_type:tt) => {
        impl PsdWriter {
            #[doc=concat!("Write ",stringify!($int_type)," as a big endian integer")]
            #[inline]
            pub fn $name(&mut self, value: $int_type) {
                self.buffer.extend_from_slice(&value.to_be_bytes());
            }
        }
    };
}

write_single_type!(write_u16_be, u16);
write_single_type!(write_i16_be, i16);
write_single_type!(write_u32_be, u32);
write_single_type!(write_i32_be, i32);
write_single_type!(write_u64_be, u64);
write_single_type!(write_f64_be, f64);
