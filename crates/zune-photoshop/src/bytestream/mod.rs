/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Big endian byte readers and writers used by every structure
//! in the document.
//!
//! Photoshop nests most of its sections inside length prefixed blocks,
//! the reader exposes [`PsdReader::read_length_prefixed`] to pull such a block
//! out as a sub-reader, and the writer exposes [`PsdWriter::write_length_prefixed`]
//! which reserves the length field, runs a closure and then fills in the
//! number of bytes the closure produced.
pub use reader::PsdReader;
pub use writer::PsdWriter;

mod reader;
mod writer;

/// Size of a length field in front of a block
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LengthWidth {
    U16,
    U32,
    U64
}

impl LengthWidth {
    pub const fn size(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8
        }
    }

    pub const fn max_value(self) -> u64 {
        match self {
            Self::U16 => u16::MAX as u64,
            Self::U32 => u32::MAX as u64,
            Self::U64 => u64::MAX
        }
    }
}

/// Number of bytes needed to round `length` up to a multiple of `padding`
#[inline]
pub const fn padding_for(length: usize, padding: usize) -> usize {
    if padding <= 1 {
        return 0;
    }
    (padding - length % padding) % padding
}
