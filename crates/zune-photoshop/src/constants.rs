/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(clippy::upper_case_acronyms)]

use crate::bytestream::LengthWidth;

/// File signature, `8BPS`
pub const PSD_SIGNATURE: [u8; 4] = *b"8BPS";

/// Signature used by image resources, blend modes and tagged blocks
pub const SIGNATURE_8BIM: [u8; 4] = *b"8BIM";
/// Tagged block signature used by some PSB writers
pub const SIGNATURE_8B64: [u8; 4] = *b"8B64";
/// Image resource signature written by ImageReady
pub const SIGNATURE_MESA: [u8; 4] = *b"MeSa";

/// Image resource signatures we tolerate with a warning
pub const EXTRA_RESOURCE_SIGNATURES: [[u8; 4]; 3] = [*b"PHUT", *b"AgHg", *b"DCSR"];

/// Maximum number of channels in a document
pub const MAX_CHANNELS: u16 = 56;
/// Maximum width or height of a document
pub const MAX_DIMENSIONS: u32 = 300_000;

/// Keys whose tagged block length is a 64-bit integer in PSB documents
pub const WIDE_LENGTH_KEYS: [[u8; 4]; 13] = [
    *b"LMsk", *b"Lr16", *b"Lr32", *b"Layr", *b"Mt16", *b"Mt32", *b"Mtrn", *b"Alph", *b"FMsk",
    *b"lnk2", *b"FEid", *b"FXid", *b"PxSD"
];

/// File format version
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PsdVersion {
    /// Photoshop document, 32-bit section lengths
    #[default]
    Psd = 1,
    /// Large document format, 64-bit section lengths
    Psb = 2
}

impl PsdVersion {
    pub fn from_int(int: u16) -> Option<PsdVersion> {
        match int {
            1 => Some(Self::Psd),
            2 => Some(Self::Psb),
            _ => None
        }
    }

    pub const fn to_int(self) -> u16 {
        self as u16
    }

    /// Width of the length fields whose size depends on the version,
    /// e.g. layer and mask information or channel lengths
    pub const fn length_width(self) -> LengthWidth {
        match self {
            Self::Psd => LengthWidth::U32,
            Self::Psb => LengthWidth::U64
        }
    }

    /// Width of a PackBits row byte count
    pub const fn rle_count_width(self) -> usize {
        match self {
            Self::Psd => 2,
            Self::Psb => 4
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorMode {
    Bitmap = 0,
    Grayscale = 1,
    Indexed = 2,
    RGB = 3,
    CMYK = 4,
    Multichannel = 7,
    Duotone = 8,
    Lab = 9
}

impl ColorMode {
    pub fn from_int(int: u16) -> Option<ColorMode> {
        use crate::constants::ColorMode::{
            Bitmap, Duotone, Grayscale, Indexed, Lab, Multichannel, CMYK, RGB
        };

        match int {
            0 => Some(Bitmap),
            1 => Some(Grayscale),
            2 => Some(Indexed),
            3 => Some(RGB),
            4 => Some(CMYK),
            7 => Some(Multichannel),
            8 => Some(Duotone),
            9 => Some(Lab),
            _ => None
        }
    }

    pub const fn to_int(self) -> u16 {
        self as u16
    }

    /// Number of color planes this mode carries before any alpha channels
    pub const fn color_channels(self) -> usize {
        match self {
            Self::Bitmap | Self::Grayscale | Self::Indexed | Self::Duotone => 1,
            Self::RGB | Self::Lab => 3,
            Self::CMYK => 4,
            Self::Multichannel => 0
        }
    }
}

/// Channel compression methods
///
/// Methods this crate cannot decode are kept as [`Unknown`](Self::Unknown)
/// so their channels can be written back byte for byte.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compression {
    /// Uncompressed planes
    #[default]
    Raw,
    /// PackBits with a row byte count table
    Rle,
    /// zlib/deflate
    Zip,
    /// zlib/deflate over horizontally delta encoded scanlines
    ZipPrediction,
    /// Any other method id
    Unknown(u16)
}

impl Compression {
    pub const fn from_int(int: u16) -> Compression {
        match int {
            0 => Self::Raw,
            1 => Self::Rle,
            2 => Self::Zip,
            3 => Self::ZipPrediction,
            _ => Self::Unknown(int)
        }
    }

    pub const fn to_int(self) -> u16 {
        match self {
            Self::Raw => 0,
            Self::Rle => 1,
            Self::Zip => 2,
            Self::ZipPrediction => 3,
            Self::Unknown(int) => int
        }
    }
}

/// Well known channel ids.
///
/// Non-negative ids index color planes in the order of the color mode.
pub mod channel_id {
    /// Transparency mask
    pub const TRANSPARENCY: i16 = -1;
    /// User supplied layer mask
    pub const USER_MASK: i16 = -2;
    /// Real user mask, the union of the user and vector masks
    pub const REAL_USER_MASK: i16 = -3;
}

/// Whether a layer is clipped to the layer below it
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Clipping {
    #[default]
    Base,
    NonBase
}

impl Clipping {
    pub fn from_int(int: u8) -> Option<Clipping> {
        match int {
            0 => Some(Self::Base),
            1 => Some(Self::NonBase),
            _ => None
        }
    }

    pub const fn to_int(self) -> u8 {
        match self {
            Self::Base => 0,
            Self::NonBase => 1
        }
    }
}

/// Blend mode keys as stored in layer records and section dividers
pub mod blend_mode {
    pub const PASS_THROUGH: [u8; 4] = *b"pass";
    pub const NORMAL: [u8; 4] = *b"norm";
    pub const DISSOLVE: [u8; 4] = *b"diss";
    pub const DARKEN: [u8; 4] = *b"dark";
    pub const MULTIPLY: [u8; 4] = *b"mul ";
    pub const COLOR_BURN: [u8; 4] = *b"idiv";
    pub const LINEAR_BURN: [u8; 4] = *b"lbrn";
    pub const DARKER_COLOR: [u8; 4] = *b"dkCl";
    pub const LIGHTEN: [u8; 4] = *b"lite";
    pub const SCREEN: [u8; 4] = *b"scrn";
    pub const COLOR_DODGE: [u8; 4] = *b"div ";
    pub const LINEAR_DODGE: [u8; 4] = *b"lddg";
    pub const LIGHTER_COLOR: [u8; 4] = *b"lgCl";
    pub const OVERLAY: [u8; 4] = *b"over";
    pub const SOFT_LIGHT: [u8; 4] = *b"sLit";
    pub const HARD_LIGHT: [u8; 4] = *b"hLit";
    pub const VIVID_LIGHT: [u8; 4] = *b"vLit";
    pub const LINEAR_LIGHT: [u8; 4] = *b"lLit";
    pub const PIN_LIGHT: [u8; 4] = *b"pLit";
    pub const HARD_MIX: [u8; 4] = *b"hMix";
    pub const DIFFERENCE: [u8; 4] = *b"diff";
    pub const EXCLUSION: [u8; 4] = *b"smud";
    pub const SUBTRACT: [u8; 4] = *b"fsub";
    pub const DIVIDE: [u8; 4] = *b"fdiv";
    pub const HUE: [u8; 4] = *b"hue ";
    pub const SATURATION: [u8; 4] = *b"sat ";
    pub const COLOR: [u8; 4] = *b"colr";
    pub const LUMINOSITY: [u8; 4] = *b"lum ";
}
