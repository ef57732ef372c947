/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Tagged blocks, the extensible metadata of layers and documents
//!
//! Every block is `{signature, key, length, payload}`. Reading never
//! depends on the key, the payload is kept verbatim so blocks we know
//! nothing about survive a round trip. Typed decoding is a separate step
//! driven by [`DECODERS`], a static table from key to decode function.
//!
//! The length field is 32 bits wide, except for the keys in
//! [`WIDE_LENGTH_KEYS`] in PSB documents where it is 64 bits wide.
use log::debug;

use crate::bytestream::{LengthWidth, PsdReader, PsdWriter};
use crate::constants::{PsdVersion, SIGNATURE_8B64, SIGNATURE_8BIM, WIDE_LENGTH_KEYS};
use crate::errors::PsdError;
use crate::layer_and_mask::LayerInfo;

/// Well known tagged block keys
pub mod keys {
    pub const SECTION_DIVIDER: [u8; 4] = *b"lsct";
    /// Section divider written inside nested groups by some versions
    pub const NESTED_SECTION_DIVIDER: [u8; 4] = *b"lsdk";
    pub const UNICODE_NAME: [u8; 4] = *b"luni";
    pub const LAYER_ID: [u8; 4] = *b"lyid";
    pub const LAYER_NAME_SOURCE: [u8; 4] = *b"lnsr";
    pub const LAYER_VERSION: [u8; 4] = *b"lyvr";
    pub const BLEND_CLIPPING_ELEMENTS: [u8; 4] = *b"clbl";
    pub const BLEND_INTERIOR_ELEMENTS: [u8; 4] = *b"infx";
    pub const KNOCKOUT_SETTING: [u8; 4] = *b"knko";
    pub const TRANSPARENCY_SHAPES_LAYER: [u8; 4] = *b"tsly";
    pub const LAYER_MASK_AS_GLOBAL_MASK: [u8; 4] = *b"lmgm";
    pub const VECTOR_MASK_AS_GLOBAL_MASK: [u8; 4] = *b"vmgm";
    pub const FILL_OPACITY: [u8; 4] = *b"iOpa";
    pub const PROTECTED_SETTING: [u8; 4] = *b"lspf";
    pub const SHEET_COLOR: [u8; 4] = *b"lclr";
    pub const REFERENCE_POINT: [u8; 4] = *b"fxrp";

    pub const LAYER: [u8; 4] = *b"Layr";
    pub const LAYER_16: [u8; 4] = *b"Lr16";
    pub const LAYER_32: [u8; 4] = *b"Lr32";
    pub const SAVING_MERGED_TRANSPARENCY: [u8; 4] = *b"Mtrn";
    pub const SAVING_MERGED_TRANSPARENCY_16: [u8; 4] = *b"Mt16";
    pub const SAVING_MERGED_TRANSPARENCY_32: [u8; 4] = *b"Mt32";

    pub const TYPE_TOOL: [u8; 4] = *b"TySh";
    pub const TYPE_TOOL_LEGACY: [u8; 4] = *b"tySh";

    pub const VECTOR_MASK: [u8; 4] = *b"vmsk";
    pub const VECTOR_MASK_CS6: [u8; 4] = *b"vsms";
    pub const VECTOR_ORIGINATION: [u8; 4] = *b"vogk";
    pub const VECTOR_STROKE_CONTENT: [u8; 4] = *b"vscg";
    pub const VECTOR_STROKE: [u8; 4] = *b"vstk";

    pub const PLACED_LAYER: [u8; 4] = *b"PlLd";
    pub const SMART_OBJECT: [u8; 4] = *b"SoLd";
    pub const SMART_OBJECT_EDITED: [u8; 4] = *b"SoLE";

    pub const SOLID_COLOR: [u8; 4] = *b"SoCo";
    pub const GRADIENT_FILL: [u8; 4] = *b"GdFl";
    pub const PATTERN_FILL: [u8; 4] = *b"PtFl";
    pub const BRIGHTNESS_CONTRAST: [u8; 4] = *b"brit";
    pub const LEVELS: [u8; 4] = *b"levl";
    pub const CURVES: [u8; 4] = *b"curv";
    pub const EXPOSURE: [u8; 4] = *b"expA";
    pub const VIBRANCE: [u8; 4] = *b"vibA";
    pub const HUE_SATURATION_LEGACY: [u8; 4] = *b"hue ";
    pub const HUE_SATURATION: [u8; 4] = *b"hue2";
    pub const COLOR_BALANCE: [u8; 4] = *b"blnc";
    pub const BLACK_AND_WHITE: [u8; 4] = *b"blwh";
    pub const PHOTO_FILTER: [u8; 4] = *b"phfl";
    pub const CHANNEL_MIXER: [u8; 4] = *b"mixr";
    pub const COLOR_LOOKUP: [u8; 4] = *b"clrL";
    pub const INVERT: [u8; 4] = *b"nvrt";
    pub const POSTERIZE: [u8; 4] = *b"post";
    pub const THRESHOLD: [u8; 4] = *b"thrs";
    pub const GRADIENT_MAP: [u8; 4] = *b"grdm";
    pub const SELECTIVE_COLOR: [u8; 4] = *b"selc";

    /// Keys of vector shape data
    pub const VECTOR_KEYS: [[u8; 4]; 5] = [
        VECTOR_MASK,
        VECTOR_MASK_CS6,
        VECTOR_ORIGINATION,
        VECTOR_STROKE_CONTENT,
        VECTOR_STROKE
    ];

    /// Keys of placed and embedded smart objects
    pub const SMART_OBJECT_KEYS: [[u8; 4]; 3] = [PLACED_LAYER, SMART_OBJECT, SMART_OBJECT_EDITED];

    /// Keys of adjustment and fill layers
    pub const ADJUSTMENT_KEYS: [[u8; 4]; 20] = [
        SOLID_COLOR,
        GRADIENT_FILL,
        PATTERN_FILL,
        BRIGHTNESS_CONTRAST,
        LEVELS,
        CURVES,
        EXPOSURE,
        VIBRANCE,
        HUE_SATURATION_LEGACY,
        HUE_SATURATION,
        COLOR_BALANCE,
        BLACK_AND_WHITE,
        PHOTO_FILTER,
        CHANNEL_MIXER,
        COLOR_LOOKUP,
        INVERT,
        POSTERIZE,
        THRESHOLD,
        GRADIENT_MAP,
        SELECTIVE_COLOR
    ];
}

/// Kind of a section divider
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SectionDividerKind {
    /// Any other layer
    Other,
    /// Closes an expanded group
    OpenFolder,
    /// Closes a collapsed group
    ClosedFolder,
    /// Hidden marker at the bottom of a group
    BoundingSectionDivider
}

impl SectionDividerKind {
    pub fn from_int(int: u32) -> Option<SectionDividerKind> {
        match int {
            0 => Some(Self::Other),
            1 => Some(Self::OpenFolder),
            2 => Some(Self::ClosedFolder),
            3 => Some(Self::BoundingSectionDivider),
            _ => None
        }
    }

    pub const fn to_int(self) -> u32 {
        match self {
            Self::Other => 0,
            Self::OpenFolder => 1,
            Self::ClosedFolder => 2,
            Self::BoundingSectionDivider => 3
        }
    }

    /// Return true for the record that carries a group's own properties
    pub const fn is_folder(self) -> bool {
        matches!(self, Self::OpenFolder | Self::ClosedFolder)
    }
}

/// Contents of the `lsct` block
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SectionDividerSetting {
    pub kind:       SectionDividerKind,
    /// Blend mode of the group, pass through is common
    pub blend_mode: Option<[u8; 4]>,
    /// 0 normal, 1 scene group
    pub sub_type:   Option<u32>
}

impl SectionDividerSetting {
    pub fn new(kind: SectionDividerKind) -> SectionDividerSetting {
        SectionDividerSetting {
            kind,
            blend_mode: None,
            sub_type: None
        }
    }

    pub fn read(stream: &mut PsdReader) -> Result<SectionDividerSetting, PsdError> {
        let kind = stream.get_u32_be_err()?;
        let kind = SectionDividerKind::from_int(kind)
            .ok_or(PsdError::InvalidValue("section divider kind", kind))?;

        let mut setting = SectionDividerSetting::new(kind);

        if stream.has(8) {
            let signature = stream.get_fixed_bytes_or_err::<4>()?;
            if signature != SIGNATURE_8BIM {
                return Err(PsdError::InvalidValue(
                    "section divider signature",
                    u32::from_be_bytes(signature)
                ));
            }
            setting.blend_mode = Some(stream.get_fixed_bytes_or_err::<4>()?);
        }
        if stream.has(4) {
            setting.sub_type = Some(stream.get_u32_be_err()?);
        }
        Ok(setting)
    }

    pub fn write(&self, stream: &mut PsdWriter) {
        stream.write_u32_be(self.kind.to_int());

        if let Some(blend_mode) = self.blend_mode {
            stream.write_all(&SIGNATURE_8BIM);
            stream.write_all(&blend_mode);

            if let Some(sub_type) = self.sub_type {
                stream.write_u32_be(sub_type);
            }
        }
    }
}

/// Typed payload of a tagged block
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedBlockData {
    SectionDivider(SectionDividerSetting),
    UnicodeName(String),
    LayerId(u32),
    NameSource([u8; 4]),
    LayerVersion(u32),
    /// One of the one byte switches such as `clbl` or `knko`
    Boolean(bool),
    FillOpacity(u8),
    /// `lspf` protection bits
    Protection(u32),
    SheetColor(u16),
    ReferencePoint(f64, f64),
    /// Layers stored inside `Lr16`, `Lr32` or `Layr`
    LayerInfo(Box<LayerInfo>),
    /// Blocks whose presence is the information
    Marker
}

type DecodeFn = fn(&mut PsdReader, PsdVersion) -> Result<TaggedBlockData, PsdError>;

/// Registry entry
pub struct BlockDecoder {
    pub key:    [u8; 4],
    pub decode: DecodeFn
}

fn decode_section_divider(stream: &mut PsdReader, _: PsdVersion) -> Result<TaggedBlockData, PsdError> {
    SectionDividerSetting::read(stream).map(TaggedBlockData::SectionDivider)
}

fn decode_unicode_name(stream: &mut PsdReader, _: PsdVersion) -> Result<TaggedBlockData, PsdError> {
    stream.get_unicode_string().map(TaggedBlockData::UnicodeName)
}

fn decode_layer_id(stream: &mut PsdReader, _: PsdVersion) -> Result<TaggedBlockData, PsdError> {
    stream.get_u32_be_err().map(TaggedBlockData::LayerId)
}

fn decode_name_source(stream: &mut PsdReader, _: PsdVersion) -> Result<TaggedBlockData, PsdError> {
    stream
        .get_fixed_bytes_or_err::<4>()
        .map(TaggedBlockData::NameSource)
}

fn decode_layer_version(stream: &mut PsdReader, _: PsdVersion) -> Result<TaggedBlockData, PsdError> {
    stream.get_u32_be_err().map(TaggedBlockData::LayerVersion)
}

fn decode_boolean(stream: &mut PsdReader, _: PsdVersion) -> Result<TaggedBlockData, PsdError> {
    // one byte followed by three bytes of padding
    Ok(TaggedBlockData::Boolean(stream.get_u8_err()? != 0))
}

fn decode_fill_opacity(stream: &mut PsdReader, _: PsdVersion) -> Result<TaggedBlockData, PsdError> {
    stream.get_u8_err().map(TaggedBlockData::FillOpacity)
}

fn decode_protection(stream: &mut PsdReader, _: PsdVersion) -> Result<TaggedBlockData, PsdError> {
    stream.get_u32_be_err().map(TaggedBlockData::Protection)
}

fn decode_sheet_color(stream: &mut PsdReader, _: PsdVersion) -> Result<TaggedBlockData, PsdError> {
    stream.get_u16_be_err().map(TaggedBlockData::SheetColor)
}

fn decode_reference_point(stream: &mut PsdReader, _: PsdVersion) -> Result<TaggedBlockData, PsdError> {
    let x = stream.get_f64_be_err()?;
    let y = stream.get_f64_be_err()?;
    Ok(TaggedBlockData::ReferencePoint(x, y))
}

fn decode_layer_info(stream: &mut PsdReader, version: PsdVersion) -> Result<TaggedBlockData, PsdError> {
    LayerInfo::read_body(stream, version).map(|info| TaggedBlockData::LayerInfo(Box::new(info)))
}

fn decode_marker(_: &mut PsdReader, _: PsdVersion) -> Result<TaggedBlockData, PsdError> {
    Ok(TaggedBlockData::Marker)
}

macro_rules! decoders {
    ($($key:expr => $func:ident),* $(,)?) => {
        &[$(BlockDecoder { key: $key, decode: $func }),*]
    };
}

/// Keys with a typed decoder, anything else stays opaque
pub static DECODERS: &[BlockDecoder] = decoders![
    keys::SECTION_DIVIDER => decode_section_divider,
    keys::NESTED_SECTION_DIVIDER => decode_section_divider,
    keys::UNICODE_NAME => decode_unicode_name,
    keys::LAYER_ID => decode_layer_id,
    keys::LAYER_NAME_SOURCE => decode_name_source,
    keys::LAYER_VERSION => decode_layer_version,
    keys::BLEND_CLIPPING_ELEMENTS => decode_boolean,
    keys::BLEND_INTERIOR_ELEMENTS => decode_boolean,
    keys::KNOCKOUT_SETTING => decode_boolean,
    keys::TRANSPARENCY_SHAPES_LAYER => decode_boolean,
    keys::LAYER_MASK_AS_GLOBAL_MASK => decode_boolean,
    keys::VECTOR_MASK_AS_GLOBAL_MASK => decode_boolean,
    keys::FILL_OPACITY => decode_fill_opacity,
    keys::PROTECTED_SETTING => decode_protection,
    keys::SHEET_COLOR => decode_sheet_color,
    keys::REFERENCE_POINT => decode_reference_point,
    keys::LAYER => decode_layer_info,
    keys::LAYER_16 => decode_layer_info,
    keys::LAYER_32 => decode_layer_info,
    keys::SAVING_MERGED_TRANSPARENCY => decode_marker,
    keys::SAVING_MERGED_TRANSPARENCY_16 => decode_marker,
    keys::SAVING_MERGED_TRANSPARENCY_32 => decode_marker,
];

/// Find the decoder registered for `key`
pub fn decoder_for(key: [u8; 4]) -> Option<&'static BlockDecoder> {
    DECODERS.iter().find(|d| d.key == key)
}

/// Width of the length field of a block with this key
pub fn length_width(key: [u8; 4], version: PsdVersion) -> LengthWidth {
    if version == PsdVersion::Psb && WIDE_LENGTH_KEYS.contains(&key) {
        LengthWidth::U64
    } else {
        LengthWidth::U32
    }
}

/// A single tagged block
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TaggedBlock {
    /// `8BIM` or `8B64`
    pub signature: [u8; 4],
    pub key:       [u8; 4],
    pub data:      Vec<u8>
}

impl TaggedBlock {
    pub fn new(key: [u8; 4], data: Vec<u8>) -> TaggedBlock {
        TaggedBlock {
            signature: SIGNATURE_8BIM,
            key,
            data
        }
    }

    pub fn read(
        stream: &mut PsdReader, version: PsdVersion, padding: usize
    ) -> Result<TaggedBlock, PsdError> {
        let signature = stream.get_fixed_bytes_or_err::<4>()?;

        if signature != SIGNATURE_8BIM && signature != SIGNATURE_8B64 {
            return Err(PsdError::InvalidValue(
                "tagged block signature",
                u32::from_be_bytes(signature)
            ));
        }
        let key = stream.get_fixed_bytes_or_err::<4>()?;
        let mut block = stream.read_length_prefixed(length_width(key, version), padding)?;

        Ok(TaggedBlock {
            signature,
            key,
            data: block.get_remaining().to_vec()
        })
    }

    pub fn write(
        &self, stream: &mut PsdWriter, version: PsdVersion, padding: usize
    ) -> Result<usize, PsdError> {
        stream.write_all(&self.signature);
        stream.write_all(&self.key);
        let written = stream.write_length_prefixed(length_width(self.key, version), padding, |w| {
            w.write_all(&self.data);
            Ok(())
        })?;
        Ok(8 + written)
    }

    /// Decode the payload with the registered decoder.
    ///
    /// Returns `None` for keys without a decoder
    pub fn decode(&self, version: PsdVersion) -> Option<Result<TaggedBlockData, PsdError>> {
        let decoder = decoder_for(self.key)?;
        Some((decoder.decode)(&mut PsdReader::new(&self.data), version))
    }
}

/// Ordered tagged blocks of a layer record or of the document
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TaggedBlocks {
    pub blocks:   Vec<TaggedBlock>,
    /// Bytes after the last block that do not start a new one
    pub trailing: Vec<u8>
}

impl TaggedBlocks {
    /// Read blocks until the stream ends
    pub fn read(
        stream: &mut PsdReader, version: PsdVersion, padding: usize
    ) -> Result<TaggedBlocks, PsdError> {
        let mut blocks = vec![];

        // a block header is signature, key and at least a 32 bit length
        while stream.has(12) {
            let signature = stream.peek_fixed_bytes::<4>().unwrap_or_default();

            if signature != SIGNATURE_8BIM && signature != SIGNATURE_8B64 {
                debug!(
                    "Stopping tagged blocks at offset {}, found {:?}",
                    stream.position(),
                    signature
                );
                break;
            }
            blocks.push(TaggedBlock::read(stream, version, padding)?);
        }
        Ok(TaggedBlocks {
            blocks,
            trailing: stream.get_remaining().to_vec()
        })
    }

    pub fn write(
        &self, stream: &mut PsdWriter, version: PsdVersion, padding: usize
    ) -> Result<usize, PsdError> {
        let start = stream.bytes_written();
        for block in &self.blocks {
            block.write(stream, version, padding)?;
        }
        stream.write_all(&self.trailing);
        Ok(stream.bytes_written() - start)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.trailing.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaggedBlock> {
        self.blocks.iter()
    }

    pub fn get(&self, key: [u8; 4]) -> Option<&TaggedBlock> {
        self.blocks.iter().find(|b| b.key == key)
    }

    pub fn contains(&self, key: [u8; 4]) -> bool {
        self.get(key).is_some()
    }

    /// Replace the block with the same key, or append it
    pub fn insert(&mut self, block: TaggedBlock) {
        match self.blocks.iter_mut().find(|b| b.key == block.key) {
            Some(existing) => *existing = block,
            None => self.blocks.push(block)
        }
    }

    pub fn remove(&mut self, key: [u8; 4]) -> Option<TaggedBlock> {
        let position = self.blocks.iter().position(|b| b.key == key)?;
        Some(self.blocks.remove(position))
    }

    /// Decode the first block with `key`, `None` when it is absent,
    /// has no decoder or fails to decode
    pub fn decode(&self, key: [u8; 4], version: PsdVersion) -> Option<TaggedBlockData> {
        match self.get(key)?.decode(version)? {
            Ok(data) => Some(data),
            Err(e) => {
                debug!(
                    "Could not decode tagged block {:?}: {:?}",
                    String::from_utf8_lossy(&key),
                    e
                );
                None
            }
        }
    }

    /// The `luni` name if present
    pub fn unicode_name(&self) -> Option<String> {
        let block = self.get(keys::UNICODE_NAME)?;
        PsdReader::new(&block.data).get_unicode_string().ok()
    }

    /// The section divider from `lsct`, falling back to `lsdk`
    pub fn section_divider(&self) -> Option<SectionDividerSetting> {
        [keys::SECTION_DIVIDER, keys::NESTED_SECTION_DIVIDER]
            .iter()
            .filter_map(|key| self.get(*key))
            .find_map(|block| SectionDividerSetting::read(&mut PsdReader::new(&block.data)).ok())
    }

    /// Nested layer info from `Lr16`, `Lr32` or `Layr`
    pub fn nested_layer_info(&self, version: PsdVersion) -> Option<LayerInfo> {
        [keys::LAYER_16, keys::LAYER_32, keys::LAYER]
            .iter()
            .find_map(|key| match self.decode(*key, version) {
                Some(TaggedBlockData::LayerInfo(info)) => Some(*info),
                _ => None
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_key_under_psb() {
        let block = TaggedBlock::new(keys::LAYER_16, vec![0; 4]);

        let mut psd = PsdWriter::new();
        block.write(&mut psd, PsdVersion::Psd, 1).unwrap();
        let psd = psd.into_inner();
        assert_eq!(&psd[8..12], &[0, 0, 0, 4]);
        assert_eq!(psd.len(), 8 + 4 + 4);

        let mut psb = PsdWriter::new();
        block.write(&mut psb, PsdVersion::Psb, 1).unwrap();
        let psb = psb.into_inner();
        assert_eq!(&psb[8..16], &[0, 0, 0, 0, 0, 0, 0, 4]);
        assert_eq!(psb.len(), 8 + 8 + 4);

        let read = TaggedBlock::read(&mut PsdReader::new(&psb), PsdVersion::Psb, 1).unwrap();
        assert_eq!(read, block);
    }

    #[test]
    fn narrow_key_under_psb() {
        assert_eq!(length_width(keys::UNICODE_NAME, PsdVersion::Psb), LengthWidth::U32);
        assert_eq!(length_width(keys::LAYER_32, PsdVersion::Psd), LengthWidth::U32);
        assert_eq!(length_width(*b"FMsk", PsdVersion::Psb), LengthWidth::U64);
    }

    #[test]
    fn unknown_keys_round_trip() {
        let blocks = TaggedBlocks {
            blocks:   vec![
                TaggedBlock::new(*b"zzzz", vec![1, 2, 3, 4, 5]),
                TaggedBlock {
                    signature: SIGNATURE_8B64,
                    key:       *b"yyyy",
                    data:      vec![9; 8]
                },
            ],
            trailing: vec![]
        };
        let mut writer = PsdWriter::new();
        blocks.write(&mut writer, PsdVersion::Psd, 1).unwrap();
        let bytes = writer.into_inner();

        let read = TaggedBlocks::read(&mut PsdReader::new(&bytes), PsdVersion::Psd, 1).unwrap();
        assert_eq!(read, blocks);
        assert!(read.get(*b"zzzz").unwrap().decode(PsdVersion::Psd).is_none());
    }

    #[test]
    fn document_padding_is_four() {
        let blocks = TaggedBlocks {
            blocks:   vec![TaggedBlock::new(*b"zzzz", vec![1, 2, 3, 4, 5])],
            trailing: vec![]
        };
        let mut writer = PsdWriter::new();
        blocks.write(&mut writer, PsdVersion::Psd, 4).unwrap();
        let bytes = writer.into_inner();
        // declared length stays unpadded, three zero bytes follow
        assert_eq!(&bytes[8..12], &[0, 0, 0, 5]);
        assert_eq!(&bytes[17..], &[0, 0, 0]);

        let read = TaggedBlocks::read(&mut PsdReader::new(&bytes), PsdVersion::Psd, 4).unwrap();
        assert_eq!(read, blocks);
    }

    #[test]
    fn garbage_after_blocks_is_kept() {
        let mut writer = PsdWriter::new();
        TaggedBlock::new(keys::LAYER_ID, vec![0, 0, 0, 7])
            .write(&mut writer, PsdVersion::Psd, 1)
            .unwrap();
        writer.write_all(&[0; 3]);
        let bytes = writer.into_inner();

        let read = TaggedBlocks::read(&mut PsdReader::new(&bytes), PsdVersion::Psd, 1).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read.trailing, [0; 3]);
        assert_eq!(
            read.decode(keys::LAYER_ID, PsdVersion::Psd),
            Some(TaggedBlockData::LayerId(7))
        );
    }

    #[test]
    fn section_divider_forms() {
        let mut short = PsdWriter::new();
        SectionDividerSetting::new(SectionDividerKind::BoundingSectionDivider).write(&mut short);
        assert_eq!(short.into_inner(), [0, 0, 0, 3]);

        let setting = SectionDividerSetting {
            kind:       SectionDividerKind::OpenFolder,
            blend_mode: Some(*b"pass"),
            sub_type:   Some(0)
        };
        let mut long = PsdWriter::new();
        setting.write(&mut long);
        let bytes = long.into_inner();
        assert_eq!(bytes.len(), 16);
        assert_eq!(
            SectionDividerSetting::read(&mut PsdReader::new(&bytes)).unwrap(),
            setting
        );

        let err = SectionDividerSetting::read(&mut PsdReader::new(&[0, 0, 0, 9])).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Format);
    }

    #[test]
    fn registry_has_no_duplicates() {
        for (i, a) in DECODERS.iter().enumerate() {
            for b in &DECODERS[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
        assert!(decoder_for(keys::SECTION_DIVIDER).is_some());
        assert!(decoder_for(*b"TySh").is_none());
    }

    #[test]
    fn one_byte_switches() {
        let blocks = TaggedBlocks {
            blocks:   vec![
                TaggedBlock::new(keys::KNOCKOUT_SETTING, vec![1, 0, 0, 0]),
                TaggedBlock::new(keys::FILL_OPACITY, vec![200, 0, 0, 0]),
            ],
            trailing: vec![]
        };
        assert_eq!(
            blocks.decode(keys::KNOCKOUT_SETTING, PsdVersion::Psd),
            Some(TaggedBlockData::Boolean(true))
        );
        assert_eq!(
            blocks.decode(keys::FILL_OPACITY, PsdVersion::Psd),
            Some(TaggedBlockData::FillOpacity(200))
        );
    }
}
