/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_core::bytestream::{ZCursor, ZReader};

use crate::bytestream::{padding_for, LengthWidth};
use crate::errors::PsdError;

/// A big endian reader over an in-memory document.
///
/// Integer reads and seeking go through [`ZReader`], the slice is kept
/// next to it so blocks can be borrowed without copying.
///
/// Sub-readers created by [`read_length_prefixed`](Self::read_length_prefixed)
/// remember where they started in the file so [`position`](Self::position)
/// always reports absolute offsets, which is what ends up in error messages.
pub struct PsdReader<'a> {
    stream: ZReader<ZCursor<&'a [u8]>>,
    data:   &'a [u8],
    base:   usize
}

impl<'a> PsdReader<'a> {
    pub fn new(data: &'a [u8]) -> PsdReader<'a> {
        PsdReader::new_at(data, 0)
    }

    /// Create a reader for a slice that starts at `base` in the file
    pub fn new_at(data: &'a [u8], base: usize) -> PsdReader<'a> {
        PsdReader {
            stream: ZReader::new(ZCursor::new(data)),
            data,
            base
        }
    }

    /// Offset of the next byte inside this reader's slice
    #[inline(always)]
    fn cursor(&mut self) -> usize {
        // in memory cursors cannot fail to report a position
        self.stream
            .position()
            .map_or(self.data.len(), |p| (p as usize).min(self.data.len()))
    }

    /// Absolute offset of the next byte to be read
    #[inline(always)]
    pub fn position(&mut self) -> usize {
        self.base + self.cursor()
    }

    #[inline(always)]
    pub fn remaining(&mut self) -> usize {
        self.data.len() - self.cursor()
    }

    #[inline(always)]
    pub fn is_eof(&mut self) -> bool {
        self.remaining() == 0
    }

    #[inline(always)]
    pub fn has(&mut self, bytes: usize) -> bool {
        self.remaining() >= bytes
    }

    fn ensure(&mut self, num: usize) -> Result<(), PsdError> {
        let remaining = self.remaining();
        if remaining < num {
            return Err(PsdError::Truncated(num, remaining));
        }
        Ok(())
    }

    pub fn skip(&mut self, num: usize) -> Result<(), PsdError> {
        self.ensure(num)?;
        self.stream.skip(num)?;
        Ok(())
    }

    /// Borrow the next `num` bytes, advancing the reader
    pub fn get_bytes(&mut self, num: usize) -> Result<&'a [u8], PsdError> {
        self.ensure(num)?;
        let data = self.data;
        let start = self.cursor();
        self.stream.skip(num)?;
        Ok(&data[start..start + num])
    }

    /// Borrow everything that is left
    pub fn get_remaining(&mut self) -> &'a [u8] {
        let data = self.data;
        let start = self.cursor();
        // skipping what is left of a slice cannot run past its end
        let _ = self.stream.skip(data.len() - start);
        &data[start..]
    }

    /// Look at the next `N` bytes without consuming them
    pub fn peek_fixed_bytes<const N: usize>(&mut self) -> Option<[u8; N]> {
        let start = self.cursor();
        let bytes = self.data.get(start..start + N)?;

        let mut byte_store: [u8; N] = [0; N];
        byte_store.copy_from_slice(bytes);
        Some(byte_store)
    }

    #[inline]
    pub fn get_fixed_bytes_or_err<const N: usize>(&mut self) -> Result<[u8; N], PsdError> {
        self.ensure(N)?;
        Ok(self.stream.read_fixed_bytes_or_error::<N>()?)
    }

    #[inline(always)]
    pub fn get_u8_err(&mut self) -> Result<u8, PsdError> {
        self.ensure(1)?;
        Ok(self.stream.read_u8_err()?)
    }

    #[inline]
    pub fn get_i16_be_err(&mut self) -> Result<i16, PsdError> {
        Ok(i16::from_be_bytes(self.get_fixed_bytes_or_err::<2>()?))
    }

    #[inline]
    pub fn get_i32_be_err(&mut self) -> Result<i32, PsdError> {
        Ok(i32::from_be_bytes(self.get_fixed_bytes_or_err::<4>()?))
    }

    #[inline]
    pub fn get_f64_be_err(&mut self) -> Result<f64, PsdError> {
        Ok(f64::from_bits(self.get_u64_be_err()?))
    }

    /// Read a length field of the given width
    pub fn get_length(&mut self, width: LengthWidth) -> Result<u64, PsdError> {
        match width {
            LengthWidth::U16 => self.get_u16_be_err().map(u64::from),
            LengthWidth::U32 => self.get_u32_be_err().map(u64::from),
            LengthWidth::U64 => self.get_u64_be_err()
        }
    }

    /// Read a length field, then exactly that many bytes, then skip to
    /// the next `padding` boundary measured from the block length.
    ///
    /// Returns a reader over the block contents
    pub fn read_length_prefixed(
        &mut self, width: LengthWidth, padding: usize
    ) -> Result<PsdReader<'a>, PsdError> {
        let length = self.get_length(width)?;
        let length = usize::try_from(length)
            .map_err(|_| PsdError::OutOfRange("block length", length, 0, usize::MAX as u64))?;

        let start = self.position();
        let block = self.get_bytes(length)?;
        // padding may be absent at the very end of a file
        let pad = padding_for(length, padding).min(self.remaining());
        self.skip(pad)?;

        Ok(PsdReader::new_at(block, start))
    }

    /// Read a Pascal string, a one byte length followed by that many bytes,
    /// padded so that the whole string including the length byte is a
    /// multiple of `padding`.
    pub fn get_pascal_string(&mut self, padding: usize) -> Result<&'a [u8], PsdError> {
        let length = usize::from(self.get_u8_err()?);
        let bytes = self.get_bytes(length)?;
        self.skip(padding_for(length + 1, padding))?;
        Ok(bytes)
    }

    /// Read a UTF-16 string prefixed by its code unit count
    pub fn get_unicode_string(&mut self) -> Result<String, PsdError> {
        let count = self.get_u32_be_err()? as usize;
        let count_bytes = count
            .checked_mul(2)
            .ok_or(PsdError::Generic("Unicode string length overflows"))?;
        let units: Vec<u16> = self
            .get_bytes(count_bytes)?
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();

        Ok(String::from_utf16_lossy(&units))
    }
}

macro_rules! get_single_type {
    ($name:tt,$int_type:tt) => {
        impl<'a> PsdReader<'a> {
            #[doc=concat!("Read ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            #[inline]
            pub fn $name(&mut self) -> Result<$int_type, PsdError> {
                self.ensure(core::mem::size_of::<$int_type>())?;
                Ok(self.stream.$name()?)
            }
        }
    };
}

get_single_type!(get_u16_be_err, u16);
get_single_type!(get_u32_be_err, u32);
get_single_type!(get_u64_be_err, u64);
