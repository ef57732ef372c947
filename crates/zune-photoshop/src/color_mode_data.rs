/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use log::trace;

use crate::bytestream::{LengthWidth, PsdReader, PsdWriter};
use crate::errors::PsdError;

/// Color mode data section
///
/// Only indexed and duotone documents fill this. For indexed images it
/// is a 768 byte planar palette, all reds, then all greens, then all blues.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ColorModeData {
    pub data: Vec<u8>
}

impl ColorModeData {
    pub fn read(stream: &mut PsdReader) -> Result<ColorModeData, PsdError> {
        let mut block = stream.read_length_prefixed(LengthWidth::U32, 1)?;
        trace!("Color mode data length: {}", block.remaining());
        Ok(ColorModeData {
            data: block.get_remaining().to_vec()
        })
    }

    pub fn write(&self, stream: &mut PsdWriter) -> Result<usize, PsdError> {
        stream.write_length_prefixed(LengthWidth::U32, 1, |w| {
            w.write_all(&self.data);
            Ok(())
        })
    }

    /// Turn a planar palette into RGB triplets.
    ///
    /// Returns `None` if the data does not hold a 256 entry palette
    pub fn interleave_color_table(&self) -> Option<Vec<[u8; 3]>> {
        if self.data.len() < 768 {
            return None;
        }
        let (red, rest) = self.data.split_at(256);
        let (green, blue) = rest.split_at(256);

        Some(
            red.iter()
                .zip(green)
                .zip(blue)
                .map(|((r, g), b)| [*r, *g, *b])
                .collect()
        )
    }
}
