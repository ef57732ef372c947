/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The fixed 26 byte file header
use log::trace;

use crate::bytestream::{PsdReader, PsdWriter};
use crate::constants::{ColorMode, PsdVersion, MAX_CHANNELS, MAX_DIMENSIONS, PSD_SIGNATURE};
use crate::errors::PsdError;
use crate::options::PsdOptions;

/// Size of the header on disk
pub const HEADER_SIZE: usize = 26;

/// File header
///
/// All fields are validated when the header is constructed or read,
/// so a `FileHeader` in hand always describes a representable document.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileHeader {
    version:    PsdVersion,
    channels:   u16,
    height:     u32,
    width:      u32,
    depth:      u16,
    color_mode: ColorMode
}

impl FileHeader {
    /// Create a header, validating every field
    pub fn new(
        version: PsdVersion, channels: u16, width: u32, height: u32, depth: u16,
        color_mode: ColorMode
    ) -> Result<FileHeader, PsdError> {
        let header = FileHeader {
            version,
            channels,
            height,
            width,
            depth,
            color_mode
        };
        header.validate(MAX_DIMENSIONS as usize, MAX_DIMENSIONS as usize)?;
        Ok(header)
    }

    fn validate(&self, max_width: usize, max_height: usize) -> Result<(), PsdError> {
        if !(1..=MAX_CHANNELS).contains(&self.channels) {
            return Err(PsdError::OutOfRange(
                "channel count",
                u64::from(self.channels),
                1,
                u64::from(MAX_CHANNELS)
            ));
        }
        let max_width = max_width.min(MAX_DIMENSIONS as usize) as u64;
        let max_height = max_height.min(MAX_DIMENSIONS as usize) as u64;

        if self.width == 0 || u64::from(self.width) > max_width {
            return Err(PsdError::OutOfRange(
                "width",
                u64::from(self.width),
                1,
                max_width
            ));
        }
        if self.height == 0 || u64::from(self.height) > max_height {
            return Err(PsdError::OutOfRange(
                "height",
                u64::from(self.height),
                1,
                max_height
            ));
        }
        if !matches!(self.depth, 1 | 8 | 16 | 32) {
            return Err(PsdError::InvalidValue("bit depth", u32::from(self.depth)));
        }
        Ok(())
    }

    /// Read and validate the header
    pub fn read(stream: &mut PsdReader, options: &PsdOptions) -> Result<FileHeader, PsdError> {
        let magic = stream.get_fixed_bytes_or_err::<4>()?;

        if magic != PSD_SIGNATURE {
            return Err(PsdError::WrongMagicBytes(magic));
        }

        let version = stream.get_u16_be_err()?;
        let version = PsdVersion::from_int(version).ok_or(PsdError::UnknownVersion(version))?;

        // reserved, must be zero but nobody checks
        stream.skip(6)?;

        let channels = stream.get_u16_be_err()?;
        let height = stream.get_u32_be_err()?;
        let width = stream.get_u32_be_err()?;
        let depth = stream.get_u16_be_err()?;

        let color_mode = stream.get_u16_be_err()?;
        let color_mode = ColorMode::from_int(color_mode)
            .ok_or(PsdError::InvalidValue("color mode", u32::from(color_mode)))?;

        let header = FileHeader {
            version,
            channels,
            height,
            width,
            depth,
            color_mode
        };
        header.validate(options.get_max_width(), options.get_max_height())?;

        trace!("Version: {:?}", version);
        trace!("Image width: {}", width);
        trace!("Image height: {}", height);
        trace!("Channels: {}", channels);
        trace!("Bit depth: {}", depth);
        trace!("Color mode: {:?}", color_mode);

        Ok(header)
    }

    pub fn write(&self, stream: &mut PsdWriter) -> usize {
        stream.write_all(&PSD_SIGNATURE);
        stream.write_u16_be(self.version.to_int());
        stream.write_zeros(6);
        stream.write_u16_be(self.channels);
        stream.write_u32_be(self.height);
        stream.write_u32_be(self.width);
        stream.write_u16_be(self.depth);
        stream.write_u16_be(self.color_mode.to_int());
        HEADER_SIZE
    }

    pub const fn version(&self) -> PsdVersion {
        self.version
    }

    pub const fn channels(&self) -> u16 {
        self.channels
    }

    pub const fn width(&self) -> usize {
        self.width as usize
    }

    pub const fn height(&self) -> usize {
        self.height as usize
    }

    pub const fn depth(&self) -> u16 {
        self.depth
    }

    pub const fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Return the dimensions as `(width, height)`
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize)
    }
}
