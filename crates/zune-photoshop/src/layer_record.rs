/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Layer records
//!
//! A layer record describes one entry of the flat layer list, its bounds,
//! which channels it stores and how long each one is, blending options,
//! an optional mask and a set of tagged blocks holding everything Photoshop
//! added after version 4.
use bitflags::bitflags;
use log::trace;

use crate::bytestream::{LengthWidth, PsdReader, PsdWriter};
use crate::constants::{channel_id, blend_mode, Clipping, PsdVersion, SIGNATURE_8BIM};
use crate::encoding::TextEncoding;
use crate::errors::{PsdError, WithContext};
use crate::mask::MaskData;
use crate::tagged_blocks::{keys, SectionDividerSetting, TaggedBlock, TaggedBlocks};

/// Padding of tagged blocks inside a layer record
const LAYER_TAGGED_BLOCK_PADDING: usize = 1;

/// A rectangle stored as top, left, bottom, right
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub top:    i32,
    pub left:   i32,
    pub bottom: i32,
    pub right:  i32
}

impl Rect {
    pub const fn new(top: i32, left: i32, bottom: i32, right: i32) -> Rect {
        Rect {
            top,
            left,
            bottom,
            right
        }
    }

    /// Width, zero for inverted rectangles
    pub fn width(&self) -> usize {
        (i64::from(self.right) - i64::from(self.left)).max(0) as usize
    }

    /// Height, zero for inverted rectangles
    pub fn height(&self) -> usize {
        (i64::from(self.bottom) - i64::from(self.top)).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub(crate) fn read(stream: &mut PsdReader) -> Result<Rect, PsdError> {
        Ok(Rect {
            top:    stream.get_i32_be_err()?,
            left:   stream.get_i32_be_err()?,
            bottom: stream.get_i32_be_err()?,
            right:  stream.get_i32_be_err()?
        })
    }

    pub(crate) fn write(&self, stream: &mut PsdWriter) {
        stream.write_i32_be(self.top);
        stream.write_i32_be(self.left);
        stream.write_i32_be(self.bottom);
        stream.write_i32_be(self.right);
    }
}

/// Id and stored length of one channel of a layer
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelInfo {
    /// Non negative ids are color planes, see [`channel_id`] for the rest
    pub id:     i16,
    /// Bytes of channel image data including the compression field
    pub length: u64
}

bitflags! {
    /// Layer record flags
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct LayerFlags: u8 {
        const TRANSPARENCY_PROTECTED = 0b0000_0001;
        /// Set when the layer is hidden
        const HIDDEN = 0b0000_0010;
        const OBSOLETE = 0b0000_0100;
        /// Tells whether bit 4 carries information
        const PHOTOSHOP_5_LATER = 0b0000_1000;
        /// Pixel data does not contribute to the appearance, e.g. shape layers
        const PIXEL_DATA_IRRELEVANT = 0b0001_0000;
    }
}

/// One blending range, `[black, white]` for the source then the destination
pub type BlendingRange = ([u16; 2], [u16; 2]);

/// Blend-if sliders of a layer
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct LayerBlendingRanges {
    pub composite: Option<BlendingRange>,
    pub channels:  Vec<BlendingRange>,
    /// Bytes that do not form a whole range
    pub trailing:  Vec<u8>
}

impl LayerBlendingRanges {
    fn read_range(stream: &mut PsdReader) -> Result<BlendingRange, PsdError> {
        Ok((
            [stream.get_u16_be_err()?, stream.get_u16_be_err()?],
            [stream.get_u16_be_err()?, stream.get_u16_be_err()?]
        ))
    }

    fn write_range(range: &BlendingRange, stream: &mut PsdWriter) {
        for value in range.0.iter().chain(range.1.iter()) {
            stream.write_u16_be(*value);
        }
    }

    pub fn read(stream: &mut PsdReader) -> Result<LayerBlendingRanges, PsdError> {
        let mut block = stream.read_length_prefixed(LengthWidth::U32, 1)?;
        let mut ranges = LayerBlendingRanges::default();

        if block.has(8) {
            ranges.composite = Some(Self::read_range(&mut block)?);
        }
        while block.has(8) {
            ranges.channels.push(Self::read_range(&mut block)?);
        }
        ranges.trailing = block.get_remaining().to_vec();
        Ok(ranges)
    }

    pub fn write(&self, stream: &mut PsdWriter) -> Result<usize, PsdError> {
        stream.write_length_prefixed(LengthWidth::U32, 1, |w| {
            if let Some(composite) = &self.composite {
                Self::write_range(composite, w);
            }
            for range in &self.channels {
                Self::write_range(range, w);
            }
            w.write_all(&self.trailing);
            Ok(())
        })
    }
}

/// One entry of the layer list
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRecord {
    pub rect:            Rect,
    pub channel_info:    Vec<ChannelInfo>,
    /// Blend mode signature, always `8BIM`
    pub signature:       [u8; 4],
    pub blend_mode:      [u8; 4],
    pub opacity:         u8,
    pub clipping:        Clipping,
    pub flags:           LayerFlags,
    /// Unused byte after the flags
    pub filler:          u8,
    pub mask:            Option<MaskData>,
    pub blending_ranges: LayerBlendingRanges,
    /// Legacy Pascal name, see [`LayerRecord::name`]
    pub name:            Vec<u8>,
    pub tagged_blocks:   TaggedBlocks
}

impl Default for LayerRecord {
    fn default() -> Self {
        LayerRecord {
            rect:            Rect::default(),
            channel_info:    vec![],
            signature:       SIGNATURE_8BIM,
            blend_mode:      blend_mode::NORMAL,
            opacity:         255,
            clipping:        Clipping::Base,
            flags:           LayerFlags::empty(),
            filler:          0,
            mask:            None,
            blending_ranges: LayerBlendingRanges::default(),
            name:            vec![],
            tagged_blocks:   TaggedBlocks::default()
        }
    }
}

impl LayerRecord {
    pub fn read(stream: &mut PsdReader, version: PsdVersion) -> Result<LayerRecord, PsdError> {
        let rect = Rect::read(stream)?;

        let channel_count = stream.get_u16_be_err()?;
        let mut channel_info = Vec::with_capacity(usize::from(channel_count));

        for _ in 0..channel_count {
            let id = stream.get_i16_be_err()?;
            let length = stream.get_length(version.length_width())?;
            channel_info.push(ChannelInfo { id, length });
        }

        let signature = stream.get_fixed_bytes_or_err::<4>()?;
        if signature != SIGNATURE_8BIM {
            return Err(PsdError::InvalidValue(
                "blend mode signature",
                u32::from_be_bytes(signature)
            ));
        }
        let blend_mode = stream.get_fixed_bytes_or_err::<4>()?;
        let opacity = stream.get_u8_err()?;

        let clipping = stream.get_u8_err()?;
        let clipping = Clipping::from_int(clipping)
            .ok_or(PsdError::InvalidValue("clipping", u32::from(clipping)))?;

        let flags = LayerFlags::from_bits_retain(stream.get_u8_err()?);
        let filler = stream.get_u8_err()?;

        let mut extra = stream.read_length_prefixed(LengthWidth::U32, 1)?;

        let offset = extra.position();
        let mask = MaskData::read(&mut extra).within("layer mask data", offset)?;
        let offset = extra.position();
        let blending_ranges =
            LayerBlendingRanges::read(&mut extra).within("layer blending ranges", offset)?;
        let name = extra.get_pascal_string(4)?.to_vec();

        let offset = extra.position();
        let tagged_blocks = TaggedBlocks::read(&mut extra, version, LAYER_TAGGED_BLOCK_PADDING)
            .within("layer tagged blocks", offset)?;

        trace!(
            "Layer record {:?}, {} channels, {} tagged blocks",
            String::from_utf8_lossy(&name),
            channel_count,
            tagged_blocks.len()
        );

        Ok(LayerRecord {
            rect,
            channel_info,
            signature,
            blend_mode,
            opacity,
            clipping,
            flags,
            filler,
            mask,
            blending_ranges,
            name,
            tagged_blocks
        })
    }

    /// Write the record using the stored channel lengths
    pub fn write(&self, stream: &mut PsdWriter, version: PsdVersion) -> Result<usize, PsdError> {
        let lengths: Vec<u64> = self.channel_info.iter().map(|c| c.length).collect();
        self.write_with_lengths(stream, version, &lengths)
    }

    /// Write the record with channel lengths measured from freshly
    /// serialized channel data
    pub fn write_with_lengths(
        &self, stream: &mut PsdWriter, version: PsdVersion, channel_lengths: &[u64]
    ) -> Result<usize, PsdError> {
        if channel_lengths.len() != self.channel_info.len() {
            return Err(PsdError::Structural(
                "channel data count does not match the channel info of its layer"
            ));
        }
        let channel_count = u16::try_from(self.channel_info.len()).map_err(|_| {
            PsdError::OutOfRange(
                "layer channel count",
                self.channel_info.len() as u64,
                0,
                u64::from(u16::MAX)
            )
        })?;
        let start = stream.bytes_written();

        self.rect.write(stream);
        stream.write_u16_be(channel_count);

        for (info, length) in self.channel_info.iter().zip(channel_lengths) {
            stream.write_i16_be(info.id);
            stream.write_length(version.length_width(), *length)?;
        }
        stream.write_all(&self.signature);
        stream.write_all(&self.blend_mode);
        stream.write_u8(self.opacity);
        stream.write_u8(self.clipping.to_int());
        stream.write_u8(self.flags.bits());
        stream.write_u8(self.filler);

        stream.write_length_prefixed(LengthWidth::U32, 1, |w| {
            MaskData::write(self.mask.as_ref(), w)?;
            self.blending_ranges.write(w)?;
            w.write_pascal_string(&self.name, 4)?;
            self.tagged_blocks
                .write(w, version, LAYER_TAGGED_BLOCK_PADDING)?;
            Ok(())
        })?;

        Ok(stream.bytes_written() - start)
    }

    pub fn width(&self) -> usize {
        self.rect.width()
    }

    pub fn height(&self) -> usize {
        self.rect.height()
    }

    /// Layer name, the Unicode name when present, else the Pascal name
    pub fn name(&self, encoding: TextEncoding) -> String {
        self.tagged_blocks
            .unicode_name()
            .unwrap_or_else(|| encoding.decode(&self.name))
    }

    /// Set both the Pascal name and the Unicode name block
    pub fn set_name(&mut self, name: &str, encoding: TextEncoding) {
        let mut pascal = encoding.encode(name);
        pascal.truncate(255);
        self.name = pascal;

        let mut writer = PsdWriter::new();
        writer.write_unicode_string(name);
        self.tagged_blocks
            .insert(TaggedBlock::new(keys::UNICODE_NAME, writer.into_inner()));
    }

    pub fn is_visible(&self) -> bool {
        !self.flags.contains(LayerFlags::HIDDEN)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(LayerFlags::HIDDEN, !visible);
    }

    /// Section divider setting, from `lsct` or the older `lsdk`
    pub fn divider(&self) -> Option<SectionDividerSetting> {
        self.tagged_blocks.section_divider()
    }

    /// Dimensions of the plane stored for channel `id`.
    ///
    /// Color and transparency channels cover the layer bounds, mask
    /// channels cover the mask rectangles.
    pub fn channel_size(&self, id: i16) -> (usize, usize) {
        match (id, &self.mask) {
            (channel_id::USER_MASK, Some(mask)) => (mask.width(), mask.height()),
            (channel_id::REAL_USER_MASK, Some(mask)) => match &mask.real {
                Some(real) => (real.rect.width(), real.rect.height()),
                None => (mask.width(), mask.height())
            },
            _ => (self.width(), self.height())
        }
    }

    /// Return true if the record stores a channel with this id
    pub fn has_channel(&self, id: i16) -> bool {
        self.channel_info.iter().any(|c| c.id == id)
    }
}
