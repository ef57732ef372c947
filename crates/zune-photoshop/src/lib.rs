/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A Photoshop PSD and PSB reader and writer
//!
//! This crate reads the whole structure of a photoshop document,
//! header, color mode data, image resources, layer records with their
//! masks, channels and tagged blocks, and the merged image, and writes
//! it back byte for byte.
//!
//! On top of the flat layer records it rebuilds the group hierarchy
//! photoshop shows in its layer panel, see [`LayerTree`].
//!
//! It does not composite layers, nor does it interpret effects, text
//! or smart objects beyond keeping their bytes intact.
//!
//! # Features
//! - `threads`: Decode and encode independent channels with rayon
//! - `serde`: Serialize the plain data types
//!
//! # Example
//! - Reading a document and walking its layers
//! ```no_run
//! use zune_photoshop::errors::PsdError;
//! use zune_photoshop::{PsdDocument, TextEncoding};
//!
//! fn main() -> Result<(), PsdError> {
//!     let data = std::fs::read("image.psd")?;
//!     let document = PsdDocument::read(&data)?;
//!
//!     let records = document.layer_records();
//!     let tree = document.layer_tree();
//!
//!     for id in tree.walk() {
//!         println!("{}", tree.name(id, records, TextEncoding::MacRoman));
//!     }
//!     // one plane per channel
//!     let _planes = document.merged_image()?;
//!     Ok(())
//! }
//! ```
//!
//! - Creating a document
//! ```
//! use zune_photoshop::{ColorMode, FileHeader, PsdDocument, PsdVersion};
//!
//! let header = FileHeader::new(PsdVersion::Psd, 3, 16, 16, 8, ColorMode::RGB).unwrap();
//! let mut document = PsdDocument::new(header);
//! document.set_merged_image(&[vec![255; 256], vec![0; 256], vec![0; 256]]).unwrap();
//!
//! let bytes = document.write().unwrap();
//! assert_eq!(&bytes[..4], b"8BPS");
//! ```
#![forbid(unsafe_code)]

pub use crate::channel::{ChannelData, ChannelImageData, LayerChannel};
pub use crate::color_mode_data::ColorModeData;
pub use crate::constants::{Clipping, ColorMode, Compression, PsdVersion};
pub use crate::document::PsdDocument;
pub use crate::encoding::TextEncoding;
pub use crate::errors::{CompressionError, ErrorKind, PsdError};
pub use crate::header::FileHeader;
pub use crate::image_data::ImageData;
pub use crate::image_resources::{ImageResource, ImageResources};
pub use crate::layer_and_mask::{GlobalLayerMaskInfo, LayerAndMaskInformation, LayerInfo};
pub use crate::layer_record::{
    ChannelInfo, LayerBlendingRanges, LayerFlags, LayerRecord, Rect
};
pub use crate::mask::{MaskData, MaskFlags, MaskParameters};
pub use crate::options::PsdOptions;
pub use crate::tagged_blocks::{TaggedBlock, TaggedBlockData, TaggedBlocks};
pub use crate::tree::{LayerKind, LayerNode, LayerTree, NodeKind};

pub mod bytestream;
pub mod channel;
pub mod color_mode_data;
pub mod compression;
pub mod constants;
mod document;
pub mod encoding;
pub mod errors;
pub mod header;
pub mod image_data;
pub mod image_resources;
pub mod layer_and_mask;
pub mod layer_record;
pub mod mask;
mod options;
pub mod tagged_blocks;
pub mod tree;
