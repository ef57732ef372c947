/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Layer mask data

use bitflags::bitflags;

use crate::bytestream::{LengthWidth, PsdReader, PsdWriter};
use crate::errors::PsdError;
use crate::layer_record::Rect;

bitflags! {
    /// Flags of a user or real mask
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct MaskFlags: u8 {
        /// Position is relative to the layer
        const POS_RELATIVE_TO_LAYER = 0b0000_0001;
        const DISABLED = 0b0000_0010;
        /// Obsolete, invert the mask when blending
        const INVERT = 0b0000_0100;
        /// The user mask came from rendering other data
        const USER_MASK_FROM_RENDER = 0b0000_1000;
        /// Density and feather parameters follow the flags
        const PARAMETERS_APPLIED = 0b0001_0000;
    }
}

bitflags! {
    /// Which of the mask parameters are present
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct MaskParameterFlags: u8 {
        const USER_MASK_DENSITY = 0b0000_0001;
        const USER_MASK_FEATHER = 0b0000_0010;
        const VECTOR_MASK_DENSITY = 0b0000_0100;
        const VECTOR_MASK_FEATHER = 0b0000_1000;
    }
}

/// Density and feather of the user and vector masks, each optional
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct MaskParameters {
    pub user_mask_density:   Option<u8>,
    pub user_mask_feather:   Option<f64>,
    pub vector_mask_density: Option<u8>,
    pub vector_mask_feather: Option<f64>
}

impl MaskParameters {
    pub fn flags(&self) -> MaskParameterFlags {
        let mut flags = MaskParameterFlags::empty();
        flags.set(
            MaskParameterFlags::USER_MASK_DENSITY,
            self.user_mask_density.is_some()
        );
        flags.set(
            MaskParameterFlags::USER_MASK_FEATHER,
            self.user_mask_feather.is_some()
        );
        flags.set(
            MaskParameterFlags::VECTOR_MASK_DENSITY,
            self.vector_mask_density.is_some()
        );
        flags.set(
            MaskParameterFlags::VECTOR_MASK_FEATHER,
            self.vector_mask_feather.is_some()
        );
        flags
    }

    fn read(stream: &mut PsdReader) -> Result<MaskParameters, PsdError> {
        let flags = MaskParameterFlags::from_bits_retain(stream.get_u8_err()?);
        let mut parameters = MaskParameters::default();

        if flags.contains(MaskParameterFlags::USER_MASK_DENSITY) {
            parameters.user_mask_density = Some(stream.get_u8_err()?);
        }
        if flags.contains(MaskParameterFlags::USER_MASK_FEATHER) {
            parameters.user_mask_feather = Some(stream.get_f64_be_err()?);
        }
        if flags.contains(MaskParameterFlags::VECTOR_MASK_DENSITY) {
            parameters.vector_mask_density = Some(stream.get_u8_err()?);
        }
        if flags.contains(MaskParameterFlags::VECTOR_MASK_FEATHER) {
            parameters.vector_mask_feather = Some(stream.get_f64_be_err()?);
        }
        Ok(parameters)
    }

    fn write(&self, stream: &mut PsdWriter) {
        stream.write_u8(self.flags().bits());

        if let Some(density) = self.user_mask_density {
            stream.write_u8(density);
        }
        if let Some(feather) = self.user_mask_feather {
            stream.write_f64_be(feather);
        }
        if let Some(density) = self.vector_mask_density {
            stream.write_u8(density);
        }
        if let Some(feather) = self.vector_mask_feather {
            stream.write_f64_be(feather);
        }
    }
}

/// The real (composite of user and vector) mask, present when
/// a layer has both
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RealMask {
    pub flags:            MaskFlags,
    pub background_color: u8,
    pub rect:             Rect
}

/// Layer mask and adjustment layer data
#[derive(Debug, Clone, PartialEq)]
pub struct MaskData {
    pub rect:             Rect,
    /// 0 or 255
    pub background_color: u8,
    pub flags:            MaskFlags,
    pub parameters:       Option<MaskParameters>,
    pub real:             Option<RealMask>,
    /// Bytes after the known fields, usually alignment padding
    pub trailing:         Vec<u8>
}

impl MaskData {
    pub fn new(rect: Rect, background_color: u8) -> MaskData {
        MaskData {
            rect,
            background_color,
            flags: MaskFlags::empty(),
            parameters: None,
            real: None,
            trailing: vec![]
        }
    }

    /// Read the length prefixed mask block, an empty block yields `None`
    pub fn read(stream: &mut PsdReader) -> Result<Option<MaskData>, PsdError> {
        let mut block = stream.read_length_prefixed(LengthWidth::U32, 1)?;

        if block.is_eof() {
            return Ok(None);
        }
        let rect = Rect::read(&mut block)?;
        let background_color = block.get_u8_err()?;
        let flags = MaskFlags::from_bits_retain(block.get_u8_err()?);

        // the real mask is only there when the block is at least 36 bytes
        let real = if block.has(18) {
            let flags = MaskFlags::from_bits_retain(block.get_u8_err()?);
            let background_color = block.get_u8_err()?;
            let rect = Rect::read(&mut block)?;
            Some(RealMask {
                flags,
                background_color,
                rect
            })
        } else {
            None
        };

        let parameters = if flags.contains(MaskFlags::PARAMETERS_APPLIED) && !block.is_eof() {
            Some(MaskParameters::read(&mut block)?)
        } else {
            None
        };

        Ok(Some(MaskData {
            rect,
            background_color,
            flags,
            parameters,
            real,
            trailing: block.get_remaining().to_vec()
        }))
    }

    /// Write a mask block, `None` is written as an empty block
    pub fn write(mask: Option<&MaskData>, stream: &mut PsdWriter) -> Result<usize, PsdError> {
        stream.write_length_prefixed(LengthWidth::U32, 1, |w| {
            let Some(mask) = mask else {
                return Ok(());
            };
            let start = w.bytes_written();

            mask.rect.write(w);
            w.write_u8(mask.background_color);
            w.write_u8(mask.flags.bits());

            if let Some(real) = &mask.real {
                w.write_u8(real.flags.bits());
                w.write_u8(real.background_color);
                real.rect.write(w);
            }
            if let Some(parameters) = &mask.parameters {
                parameters.write(w);
            }
            if mask.trailing.is_empty() {
                w.write_padding(w.bytes_written() - start, 4);
            } else {
                w.write_all(&mask.trailing);
            }
            Ok(())
        })
    }

    pub fn width(&self) -> usize {
        self.rect.width()
    }

    pub fn height(&self) -> usize {
        self.rect.height()
    }

    pub fn is_disabled(&self) -> bool {
        self.flags.contains(MaskFlags::DISABLED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(bytes: &[u8]) -> Option<MaskData> {
        let mask = MaskData::read(&mut PsdReader::new(bytes)).unwrap();
        let mut writer = PsdWriter::new();
        MaskData::write(mask.as_ref(), &mut writer).unwrap();
        assert_eq!(writer.into_inner(), bytes);
        mask
    }

    #[test]
    fn empty_mask() {
        assert!(round_trip(&[0, 0, 0, 0]).is_none());
    }

    #[test]
    fn user_mask_with_padding() {
        let mut bytes = vec![0, 0, 0, 20];
        for v in [1_i32, 2, 11, 22] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        bytes.extend_from_slice(&[255, 0b10, 0, 0]);

        let mask = round_trip(&bytes).unwrap();
        assert_eq!(mask.width(), 20);
        assert_eq!(mask.height(), 10);
        assert_eq!(mask.background_color, 255);
        assert!(mask.is_disabled());
        assert!(mask.real.is_none());
        assert_eq!(mask.trailing, [0, 0]);
    }

    #[test]
    fn real_mask_and_parameters() {
        let mut body = vec![];
        for v in [0_i32, 0, 4, 4] {
            body.extend_from_slice(&v.to_be_bytes());
        }
        body.extend_from_slice(&[0, MaskFlags::PARAMETERS_APPLIED.bits()]);
        body.extend_from_slice(&[1, 255]);
        for v in [0_i32, 0, 8, 8] {
            body.extend_from_slice(&v.to_be_bytes());
        }
        body.push(0b0101);
        body.push(200);
        body.push(100);
        // padded to 40
        body.push(0);

        let mut writer = PsdWriter::new();
        writer
            .write_length_prefixed(LengthWidth::U32, 1, |w| {
                w.write_all(&body);
                Ok(())
            })
            .unwrap();
        let bytes = writer.into_inner();

        let mask = round_trip(&bytes).unwrap();
        let real = mask.real.unwrap();
        assert_eq!(real.rect.width(), 8);
        assert_eq!(real.background_color, 255);
        assert!(real.flags.contains(MaskFlags::POS_RELATIVE_TO_LAYER));

        let parameters = mask.parameters.unwrap();
        assert_eq!(parameters.user_mask_density, Some(200));
        assert_eq!(parameters.vector_mask_density, Some(100));
        assert_eq!(parameters.user_mask_feather, None);
        assert_eq!(mask.trailing, [0]);
    }

    #[test]
    fn new_mask_is_padded_to_four() {
        let mask = MaskData::new(Rect::new(0, 0, 2, 2), 0);
        let mut writer = PsdWriter::new();
        MaskData::write(Some(&mask), &mut writer).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(&bytes[..4], &[0, 0, 0, 20]);
        assert_eq!(bytes.len(), 24);
    }
}
