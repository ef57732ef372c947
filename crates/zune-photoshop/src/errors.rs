/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors that can occur when reading or writing photoshop documents
use std::fmt::{Debug, Display, Formatter};

use zune_core::bytestream::ZByteIoError;

use crate::constants::PSD_SIGNATURE;

/// Broad classification of a [`PsdError`]
///
/// Useful for callers that only care whether an error
/// is fatal for the whole file or can be recovered from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Bad signature, unknown enumerated value or a value outside
    /// its declared range. Fatal.
    Format,
    /// The stream ended before a declared length was satisfied
    Truncation,
    /// A channel failed to compress or decompress
    Compression,
    /// Records that do not agree with each other, e.g. channel counts
    Structural,
    /// Underlying reader or writer failed
    Io
}

/// Errors raised by the pixel compression codecs
#[derive(Clone)]
pub enum CompressionError {
    /// Unknown compression method found in a channel
    UnknownMethod(u16),
    /// A PackBits control byte asked for more bytes than the row holds.
    ///
    /// Contains the row and the number of bytes requested past its end
    RleOverflow(usize, usize),
    /// PackBits source ran out before the row was filled
    ///
    /// Contains the row and the number of bytes still missing
    RleExhausted(usize, usize),
    /// Not enough bytes for the per-row byte count table
    RleCounts(usize, usize),
    /// A packed row does not fit the row count field of the version.
    ///
    /// Contains the row and its packed length
    RleRowTooLong(usize, usize),
    /// Inflate rejected the stream
    Inflate(String),
    /// Deflate encoder failed
    Deflate(String),
    /// Decompressed size does not match the plane size.
    ///
    /// Expected, found
    SizeMismatch(usize, usize),
    /// Prediction is only defined for 8, 16 and 32 bit depths
    UnsupportedDepth(u16)
}

impl Debug for CompressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMethod(method) => {
                writeln!(f, "Unknown compression method {method}")
            }
            Self::RleOverflow(row, extra) => {
                writeln!(
                    f,
                    "Bad RLE, row {row} overflows its declared size by {extra} bytes"
                )
            }
            Self::RleExhausted(row, missing) => {
                writeln!(
                    f,
                    "Bad RLE, source exhausted in row {row} with {missing} bytes missing"
                )
            }
            Self::RleCounts(expected, found) => {
                writeln!(
                    f,
                    "Bad RLE, expected {expected} bytes of row counts but found {found}"
                )
            }
            Self::RleRowTooLong(row, length) => {
                writeln!(
                    f,
                    "Packed row {row} is {length} bytes, too long for a PSD row count"
                )
            }
            Self::Inflate(reason) => {
                writeln!(f, "Inflate error: {reason}")
            }
            Self::Deflate(reason) => {
                writeln!(f, "Deflate error: {reason}")
            }
            Self::SizeMismatch(expected, found) => {
                writeln!(
                    f,
                    "Decompressed size mismatch, expected {expected} bytes but found {found}"
                )
            }
            Self::UnsupportedDepth(depth) => {
                writeln!(f, "Prediction is not supported for bit depth {depth}")
            }
        }
    }
}

impl Display for CompressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for CompressionError {}

/// Errors that can occur while reading or writing a document
pub enum PsdError {
    /// The file did not start with `8BPS`
    WrongMagicBytes([u8; 4]),
    /// Version was neither 1 (PSD) nor 2 (PSB)
    UnknownVersion(u16),
    /// An enumerated field held a value we do not know.
    ///
    /// Field name, value
    InvalidValue(&'static str, u32),
    /// A numeric field is outside its declared range.
    ///
    /// Field name, value, minimum, maximum
    OutOfRange(&'static str, u64, u64, u64),
    /// The stream ended early.
    ///
    /// Expected bytes, bytes available
    Truncated(usize, usize),
    /// A channel failed to compress or decompress
    Compression(CompressionError),
    /// Records that disagree with each other
    Structural(&'static str),
    /// An error raised while reading a named structure at an offset
    Context {
        structure: &'static str,
        offset:    usize,
        error:     Box<PsdError>
    },
    IoErrors(std::io::Error),
    /// The byte reader failed for a reason other than running out of bytes
    ByteIoErrors(ZByteIoError),
    Generic(&'static str),
    GenericOwned(String)
}

impl PsdError {
    /// Return the broad class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WrongMagicBytes(_)
            | Self::UnknownVersion(_)
            | Self::InvalidValue(..)
            | Self::OutOfRange(..)
            | Self::Generic(_)
            | Self::GenericOwned(_) => ErrorKind::Format,
            Self::Truncated(..) => ErrorKind::Truncation,
            Self::Compression(_) => ErrorKind::Compression,
            Self::Structural(_) => ErrorKind::Structural,
            Self::IoErrors(_) | Self::ByteIoErrors(_) => ErrorKind::Io,
            Self::Context { error, .. } => error.kind()
        }
    }

    /// Return the innermost error, skipping structure context
    pub fn root_cause(&self) -> &PsdError {
        match self {
            Self::Context { error, .. } => error.root_cause(),
            _ => self
        }
    }

    /// Name and offset of the structure that was being read when
    /// the error occurred, innermost first.
    pub fn location(&self) -> Option<(&'static str, usize)> {
        match self {
            Self::Context {
                structure,
                offset,
                error
            } => error.location().or(Some((*structure, *offset))),
            _ => None
        }
    }
}

impl Debug for PsdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongMagicBytes(bytes) => {
                writeln!(
                    f,
                    "Expected {:?} but found {:?}, not a PSD image",
                    PSD_SIGNATURE, bytes
                )
            }
            Self::UnknownVersion(version) => {
                writeln!(
                    f,
                    "Unknown file version {version}, known versions are 1 (PSD) and 2 (PSB)"
                )
            }
            Self::InvalidValue(field, value) => {
                writeln!(f, "Invalid value {value} for {field}")
            }
            Self::OutOfRange(field, value, min, max) => {
                writeln!(
                    f,
                    "Value {value} for {field} is outside the allowed range {min}..={max}"
                )
            }
            Self::Truncated(expected, found) => {
                writeln!(
                    f,
                    "Not enough bytes, expected {expected} but found {found}"
                )
            }
            Self::Compression(err) => {
                writeln!(f, "Compression error: {err:?}")
            }
            Self::Structural(reason) => {
                writeln!(f, "Structural inconsistency: {reason}")
            }
            Self::Context {
                structure,
                offset,
                error
            } => {
                write!(f, "While reading {structure} at offset {offset}: {error:?}")
            }
            Self::IoErrors(err) => {
                writeln!(f, "I/O error: {err}")
            }
            Self::ByteIoErrors(err) => {
                writeln!(f, "Byte reader error: {err:?}")
            }
            Self::Generic(reason) => {
                writeln!(f, "{reason}")
            }
            Self::GenericOwned(reason) => {
                writeln!(f, "{reason}")
            }
        }
    }
}

impl Display for PsdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for PsdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoErrors(err) => Some(err),
            Self::Compression(err) => Some(err),
            Self::Context { error, .. } => Some(error.as_ref()),
            _ => None
        }
    }
}

impl From<&'static str> for PsdError {
    fn from(r: &'static str) -> Self {
        Self::Generic(r)
    }
}

impl From<String> for PsdError {
    fn from(r: String) -> Self {
        Self::GenericOwned(r)
    }
}

impl From<std::io::Error> for PsdError {
    fn from(r: std::io::Error) -> Self {
        Self::IoErrors(r)
    }
}

impl From<ZByteIoError> for PsdError {
    fn from(r: ZByteIoError) -> Self {
        match r {
            // requested, read
            ZByteIoError::NotEnoughBytes(expected, found) => Self::Truncated(expected, found),
            r => Self::ByteIoErrors(r)
        }
    }
}

impl From<CompressionError> for PsdError {
    fn from(r: CompressionError) -> Self {
        Self::Compression(r)
    }
}

/// Attach the structure being read to an error
pub(crate) trait WithContext<T> {
    fn within(self, structure: &'static str, offset: usize) -> Result<T, PsdError>;
}

impl<T> WithContext<T> for Result<T, PsdError> {
    fn within(self, structure: &'static str, offset: usize) -> Result<T, PsdError> {
        self.map_err(|error| PsdError::Context {
            structure,
            offset,
            error: Box::new(error)
        })
    }
}
