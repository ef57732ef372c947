/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Layer and mask information section
//!
//! ```text
//! length (u32, u64 for PSB)
//!   layer info         length (u32, u64 for PSB), count, records, channel data
//!   global layer mask  length (u32), overlay color, opacity, kind, filler
//!   tagged blocks      until the end of the section, padded to 4
//! ```
use log::{trace, warn};

use crate::bytestream::{LengthWidth, PsdReader, PsdWriter};
use crate::channel::ChannelImageData;
use crate::constants::PsdVersion;
use crate::errors::{PsdError, WithContext};
use crate::layer_record::LayerRecord;
use crate::tagged_blocks::TaggedBlocks;

/// Padding of document level tagged blocks
const DOCUMENT_TAGGED_BLOCK_PADDING: usize = 4;

/// Layer records and their channel data
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    /// The layer count was stored negated, the first alpha channel of
    /// the merged image is the transparency of the flattened result
    pub merged_alpha:       bool,
    /// Records in file order, bottom most layer first
    pub records:            Vec<LayerRecord>,
    pub channel_image_data: ChannelImageData,
    /// Alignment of the section found when reading, reused when writing
    pub padding:            usize,
    /// Bytes after the channel data that are not alignment padding
    pub trailing:           Vec<u8>
}

impl Default for LayerInfo {
    fn default() -> Self {
        LayerInfo {
            merged_alpha:       false,
            records:            vec![],
            channel_image_data: ChannelImageData::default(),
            padding:            4,
            trailing:           vec![]
        }
    }
}

impl LayerInfo {
    /// Signed layer count as stored on disk
    pub fn layer_count(&self) -> i16 {
        let count = self.records.len().min(i16::MAX as usize) as i16;
        if self.merged_alpha {
            -count
        } else {
            count
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read the length prefixed section, an empty section yields `None`
    pub fn read(stream: &mut PsdReader, version: PsdVersion) -> Result<Option<LayerInfo>, PsdError> {
        let mut block = stream.read_length_prefixed(version.length_width(), 1)?;
        let total = block.remaining();

        if total == 0 {
            return Ok(None);
        }
        let mut info = LayerInfo::read_body(&mut block, version)?;

        // work out the alignment the writer used so we can reproduce it
        if info.trailing.iter().all(|b| *b == 0) {
            if let Some(padding) = [4, 2]
                .into_iter()
                .find(|p| total % p == 0 && info.trailing.len() < *p)
            {
                info.padding = padding;
                info.trailing.clear();
            }
        }
        trace!(
            "Layer info: {} layers, padding {}, {} trailing bytes",
            info.len(),
            info.padding,
            info.trailing.len()
        );
        Ok(Some(info))
    }

    /// Read the section contents without the length field, this is
    /// also the layout of the `Lr16`, `Lr32` and `Layr` tagged blocks
    pub fn read_body(stream: &mut PsdReader, version: PsdVersion) -> Result<LayerInfo, PsdError> {
        let count = stream.get_i16_be_err()?;
        let merged_alpha = count < 0;
        let count = usize::from(count.unsigned_abs());

        let mut records = Vec::with_capacity(count);

        for _ in 0..count {
            let offset = stream.position();
            records.push(LayerRecord::read(stream, version).within("layer record", offset)?);
        }

        let offset = stream.position();
        let channel_image_data =
            ChannelImageData::read(stream, &records).within("channel image data", offset)?;

        Ok(LayerInfo {
            merged_alpha,
            records,
            channel_image_data,
            padding: 1,
            trailing: stream.get_remaining().to_vec()
        })
    }

    /// Write the length prefixed section.
    ///
    /// `padding` overrides the alignment found when reading
    pub fn write(
        &self, stream: &mut PsdWriter, version: PsdVersion, padding: Option<usize>
    ) -> Result<usize, PsdError> {
        let padding = padding.unwrap_or(self.padding);
        // photoshop counts the alignment of this section in its length
        stream.write_length_prefixed(version.length_width(), 1, |w| {
            let written = self.write_body(w, version)?;
            w.write_padding(written, padding);
            Ok(())
        })
    }

    /// Write the section contents, channel lengths in the records are
    /// taken from the channel data that follows them
    pub fn write_body(&self, stream: &mut PsdWriter, version: PsdVersion) -> Result<usize, PsdError> {
        if self.records.len() != self.channel_image_data.len() {
            return Err(PsdError::Structural(
                "layer record count does not match channel image data"
            ));
        }
        if self.records.len() > i16::MAX as usize {
            return Err(PsdError::OutOfRange(
                "layer count",
                self.records.len() as u64,
                0,
                i16::MAX as u64
            ));
        }
        let start = stream.bytes_written();

        // channel data is serialized first, the records need its lengths
        let mut channels = PsdWriter::new();
        let lengths = self.channel_image_data.write(&mut channels);

        stream.write_i16_be(self.layer_count());

        for (record, lengths) in self.records.iter().zip(&lengths) {
            record.write_with_lengths(stream, version, lengths)?;
        }
        stream.write_all(&channels.into_inner());
        stream.write_all(&self.trailing);

        Ok(stream.bytes_written() - start)
    }
}

/// Global layer mask info
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct GlobalLayerMaskInfo {
    pub overlay_color_space: u16,
    pub color_components:    [u16; 4],
    /// 0 transparent, 100 opaque
    pub opacity:             u16,
    /// 0 color selected, 1 color protected, 128 use per layer value
    pub kind:                u8,
    pub filler:              Vec<u8>
}

impl GlobalLayerMaskInfo {
    pub fn read(stream: &mut PsdReader) -> Result<Option<GlobalLayerMaskInfo>, PsdError> {
        let mut block = stream.read_length_prefixed(LengthWidth::U32, 1)?;

        if block.is_eof() {
            return Ok(None);
        }
        let overlay_color_space = block.get_u16_be_err()?;
        let mut color_components = [0; 4];
        for component in &mut color_components {
            *component = block.get_u16_be_err()?;
        }
        let opacity = block.get_u16_be_err()?;
        let kind = block.get_u8_err()?;

        Ok(Some(GlobalLayerMaskInfo {
            overlay_color_space,
            color_components,
            opacity,
            kind,
            filler: block.get_remaining().to_vec()
        }))
    }

    pub fn write(info: Option<&GlobalLayerMaskInfo>, stream: &mut PsdWriter) -> Result<usize, PsdError> {
        stream.write_length_prefixed(LengthWidth::U32, 1, |w| {
            if let Some(info) = info {
                w.write_u16_be(info.overlay_color_space);
                for component in info.color_components {
                    w.write_u16_be(component);
                }
                w.write_u16_be(info.opacity);
                w.write_u8(info.kind);
                w.write_all(&info.filler);
            }
            Ok(())
        })
    }
}

/// The whole layer and mask information section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerAndMaskInformation {
    pub layer_info:             Option<LayerInfo>,
    pub global_layer_mask_info: Option<GlobalLayerMaskInfo>,
    pub tagged_blocks:          TaggedBlocks,
    /// The layer info length field was present when reading.
    ///
    /// A present block is written back even when it is empty.
    pub has_layer_info_block:   bool,
    /// The global layer mask length field was present when reading
    pub has_global_mask_block:  bool
}

impl LayerAndMaskInformation {
    pub fn read(
        stream: &mut PsdReader, version: PsdVersion
    ) -> Result<LayerAndMaskInformation, PsdError> {
        let mut block = stream.read_length_prefixed(version.length_width(), 1)?;
        trace!("Layer and mask information length: {}", block.remaining());

        let mut info = LayerAndMaskInformation::default();

        if block.is_eof() {
            return Ok(info);
        }
        let offset = block.position();
        info.layer_info = LayerInfo::read(&mut block, version).within("layer info", offset)?;
        info.has_layer_info_block = true;

        if block.has(4) {
            let offset = block.position();
            info.global_layer_mask_info =
                GlobalLayerMaskInfo::read(&mut block).within("global layer mask info", offset)?;
            info.has_global_mask_block = true;
        }
        let offset = block.position();
        info.tagged_blocks = TaggedBlocks::read(&mut block, version, DOCUMENT_TAGGED_BLOCK_PADDING)
            .within("document tagged blocks", offset)?;

        if !info.tagged_blocks.trailing.is_empty() {
            warn!(
                "{} unrecognised bytes at the end of the layer and mask section",
                info.tagged_blocks.trailing.len()
            );
        }
        Ok(info)
    }

    pub fn write(
        &self, stream: &mut PsdWriter, version: PsdVersion, layer_info_padding: Option<usize>
    ) -> Result<usize, PsdError> {
        // sections built in memory always get a global mask block
        let write_global = self.has_global_mask_block
            || self.global_layer_mask_info.is_some()
            || !self.tagged_blocks.is_empty()
            || (self.layer_info.is_some() && !self.has_layer_info_block);
        let write_layer_info =
            write_global || self.has_layer_info_block || self.layer_info.is_some();

        stream.write_length_prefixed(version.length_width(), 1, |w| {
            if !write_layer_info {
                return Ok(());
            }
            match &self.layer_info {
                Some(layer_info) => {
                    layer_info.write(w, version, layer_info_padding)?;
                }
                None => w.write_length(version.length_width(), 0)?
            }
            if !write_global {
                return Ok(());
            }
            GlobalLayerMaskInfo::write(self.global_layer_mask_info.as_ref(), w)?;
            self.tagged_blocks
                .write(w, version, DOCUMENT_TAGGED_BLOCK_PADDING)?;
            Ok(())
        })
    }

    pub fn is_empty(&self) -> bool {
        self.layer_info.is_none()
            && self.global_layer_mask_info.is_none()
            && self.tagged_blocks.is_empty()
            && !self.has_layer_info_block
            && !self.has_global_mask_block
    }
}
