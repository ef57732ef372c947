/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A whole photoshop document
//!
//! A document is five sections in a fixed order
//!
//! ```text
//! file header                  26 bytes
//! color mode data              u32 length
//! image resources              u32 length
//! layer and mask information   u32 length, u64 for PSB
//! image data                   until the end of the file
//! ```
use std::io::{Read, Write};

use log::trace;

use crate::bytestream::{PsdReader, PsdWriter};
use crate::channel::{decode_layer_channels, ChannelData, LayerChannel};
use crate::color_mode_data::ColorModeData;
use crate::constants::PsdVersion;
use crate::errors::{PsdError, WithContext};
use crate::header::FileHeader;
use crate::image_data::ImageData;
use crate::image_resources::ImageResources;
use crate::layer_and_mask::{LayerAndMaskInformation, LayerInfo};
use crate::layer_record::LayerRecord;
use crate::options::PsdOptions;
use crate::tree::LayerTree;

/// A parsed PSD or PSB document
///
/// Every section keeps enough of the original bytes that writing an
/// unmodified document reproduces its input.
#[derive(Debug, Clone)]
pub struct PsdDocument {
    pub header:                     FileHeader,
    pub color_mode_data:            ColorModeData,
    pub image_resources:            ImageResources,
    pub layer_and_mask_information: LayerAndMaskInformation,
    pub image_data:                 ImageData,
    options:                        PsdOptions,
    /// Layers decoded from an `Lr16`/`Lr32` block when the layer info
    /// section is empty
    nested_layers:                  Option<LayerInfo>
}

impl PsdDocument {
    /// Create an empty document, no layers and no merged image
    pub fn new(header: FileHeader) -> PsdDocument {
        PsdDocument {
            header,
            color_mode_data: ColorModeData::default(),
            image_resources: ImageResources::default(),
            layer_and_mask_information: LayerAndMaskInformation::default(),
            image_data: ImageData::default(),
            options: PsdOptions::default(),
            nested_layers: None
        }
    }

    /// Read a document with default options
    pub fn read(data: &[u8]) -> Result<PsdDocument, PsdError> {
        Self::read_with_options(data, PsdOptions::default())
    }

    /// Read a document
    ///
    /// Errors carry the section being read and its offset, see
    /// [`PsdError::location`]
    pub fn read_with_options(data: &[u8], options: PsdOptions) -> Result<PsdDocument, PsdError> {
        let mut stream = PsdReader::new(data);

        let header = FileHeader::read(&mut stream, &options).within("file header", 0)?;
        let version = header.version();

        let offset = stream.position();
        let color_mode_data =
            ColorModeData::read(&mut stream).within("color mode data", offset)?;

        let offset = stream.position();
        let image_resources =
            ImageResources::read(&mut stream).within("image resources", offset)?;
        trace!("Image resources: {}", image_resources.len());

        let offset = stream.position();
        let layer_and_mask_information = LayerAndMaskInformation::read(&mut stream, version)
            .within("layer and mask information", offset)?;

        let offset = stream.position();
        let image_data = ImageData::read(&mut stream).within("image data", offset)?;

        let mut document = PsdDocument {
            header,
            color_mode_data,
            image_resources,
            layer_and_mask_information,
            image_data,
            options,
            nested_layers: None
        };
        document.reload_nested_layers();
        Ok(document)
    }

    /// Read a whole document from `reader`
    pub fn from_reader<R: Read>(mut reader: R, options: PsdOptions) -> Result<PsdDocument, PsdError> {
        let mut data = vec![];
        reader.read_to_end(&mut data)?;
        Self::read_with_options(&data, options)
    }

    /// Serialize the document
    pub fn write(&self) -> Result<Vec<u8>, PsdError> {
        let version = self.version();
        let mut stream = PsdWriter::with_capacity(self.image_data.data.len() + 1024);

        self.header.write(&mut stream);
        self.color_mode_data.write(&mut stream)?;
        self.image_resources.write(&mut stream)?;
        self.layer_and_mask_information.write(
            &mut stream,
            version,
            self.options.get_layer_info_padding()
        )?;
        self.image_data.write(&mut stream);

        trace!("Wrote {} bytes", stream.bytes_written());
        Ok(stream.into_inner())
    }

    /// Serialize the document into `writer`, returning the number of bytes
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize, PsdError> {
        let bytes = self.write()?;
        writer.write_all(&bytes)?;
        Ok(bytes.len())
    }

    pub const fn options(&self) -> &PsdOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: PsdOptions) {
        self.options = options;
    }

    pub const fn version(&self) -> PsdVersion {
        self.header.version()
    }

    /// Layer info of the document, from the `Lr16`/`Lr32` blocks for
    /// documents that keep their layers there
    pub fn layer_info(&self) -> Option<&LayerInfo> {
        match &self.layer_and_mask_information.layer_info {
            Some(info) if !info.is_empty() => Some(info),
            _ => self.nested_layers.as_ref()
        }
    }

    /// Decode the `Lr16`/`Lr32` layers again.
    ///
    /// Reading does this once, call it after editing those tagged blocks
    /// in place.
    pub fn reload_nested_layers(&mut self) {
        let section = &self.layer_and_mask_information;

        self.nested_layers = match &section.layer_info {
            Some(info) if !info.is_empty() => None,
            _ => section.tagged_blocks.nested_layer_info(self.header.version())
        };
        if let Some(nested) = &self.nested_layers {
            trace!("Nested layer info: {} layers", nested.len());
        }
    }

    /// Layer records in file order, bottom most first
    pub fn layer_records(&self) -> &[LayerRecord] {
        match self.layer_info() {
            Some(info) => &info.records,
            None => &[]
        }
    }

    /// Build the group hierarchy of the layers
    pub fn layer_tree(&self) -> LayerTree {
        LayerTree::build(self.layer_records())
    }

    /// True when the first alpha channel of the merged image holds
    /// the transparency of the flattened layers
    pub fn merged_alpha(&self) -> bool {
        self.layer_info().map_or(false, |info| info.merged_alpha)
    }

    /// Decode the merged image, one plane per channel
    pub fn merged_image(&self) -> Result<Vec<Vec<u8>>, PsdError> {
        self.image_data.get_data(&self.header, &self.options)
    }

    /// Replace the merged image with `planes`, compressed with the
    /// method configured in the options
    pub fn set_merged_image(&mut self, planes: &[Vec<u8>]) -> Result<usize, PsdError> {
        self.image_data
            .set_data(planes, &self.header, self.options.get_compression())
    }

    /// Decode the channels of the layer at `index` in file order
    pub fn layer_channels(&self, index: usize) -> Result<Vec<LayerChannel>, PsdError> {
        let info = self
            .layer_info()
            .ok_or(PsdError::Generic("Document has no layers"))?;

        let record = info.records.get(index).ok_or(PsdError::OutOfRange(
            "layer index",
            index as u64,
            0,
            info.records.len().saturating_sub(1) as u64
        ))?;
        let channels = info
            .channel_image_data
            .layers
            .get(index)
            .ok_or(PsdError::Structural("layer has no channel image data"))?;

        decode_layer_channels(
            record,
            channels,
            self.header.depth(),
            self.version(),
            &self.options
        )
    }

    /// Append a layer on top of the others.
    ///
    /// `planes` hold one plane per entry of the record's channel info,
    /// they are compressed with the method configured in the options and
    /// the channel lengths of the record are filled in.
    pub fn push_layer(&mut self, mut record: LayerRecord, planes: &[Vec<u8>]) -> Result<(), PsdError> {
        if record.channel_info.len() != planes.len() {
            return Err(PsdError::Structural(
                "plane count does not match the channel info of the layer"
            ));
        }
        let depth = self.header.depth();
        let version = self.version();
        let compression = self.options.get_compression();

        let sizes: Vec<(usize, usize)> = record
            .channel_info
            .iter()
            .map(|info| record.channel_size(info.id))
            .collect();
        let mut channels = Vec::with_capacity(planes.len());

        for ((info, plane), (width, height)) in record.channel_info.iter_mut().zip(planes).zip(sizes) {
            let mut channel = ChannelData::default();
            channel.set_data(plane, compression, width, height, depth, version)?;
            info.length = channel.stored_length();
            channels.push(channel);
        }

        let layer_info = self
            .layer_and_mask_information
            .layer_info
            .get_or_insert_with(LayerInfo::default);
        layer_info.records.push(record);
        layer_info.channel_image_data.layers.push(channels);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ColorMode, Compression};
    use crate::errors::ErrorKind;
    use crate::layer_record::{ChannelInfo, Rect};

    fn document(version: PsdVersion) -> PsdDocument {
        let header = FileHeader::new(version, 3, 4, 2, 8, ColorMode::RGB).unwrap();
        let mut document = PsdDocument::new(header);
        document
            .set_merged_image(&[vec![1; 8], vec![2; 8], vec![3; 8]])
            .unwrap();
        document
    }

    fn layer(name: &str) -> LayerRecord {
        LayerRecord {
            rect: Rect::new(0, 0, 2, 2),
            channel_info: vec![
                ChannelInfo { id: -1, length: 0 },
                ChannelInfo { id: 0, length: 0 },
            ],
            name: name.as_bytes().to_vec(),
            ..LayerRecord::default()
        }
    }

    #[test]
    fn empty_document_round_trip() {
        for version in [PsdVersion::Psd, PsdVersion::Psb] {
            let document = document(version);
            let bytes = document.write().unwrap();

            let read = PsdDocument::read(&bytes).unwrap();
            assert_eq!(read.header, document.header);
            assert!(read.layer_records().is_empty());
            assert_eq!(read.merged_image().unwrap()[2], vec![3; 8]);
            assert_eq!(read.write().unwrap(), bytes);
        }
    }

    #[test]
    fn layers_round_trip() {
        let mut document = document(PsdVersion::Psd);
        document
            .push_layer(layer("Bottom"), &[vec![255; 4], vec![7, 8, 9, 10]])
            .unwrap();
        document
            .push_layer(layer("Top"), &[vec![0; 4], vec![1; 4]])
            .unwrap();

        let bytes = document.write().unwrap();
        let read = PsdDocument::read(&bytes).unwrap();

        let records = read.layer_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, b"Top");
        // RLE is the default compression for new pixel data
        assert!(records[0].channel_info.iter().all(|c| c.length > 2));

        let channels = read.layer_channels(0).unwrap();
        assert_eq!(channels[1].data, [7, 8, 9, 10]);
        assert_eq!((channels[1].width, channels[1].height), (2, 2));
        assert_eq!(read.layer_tree().root().children.len(), 2);
        assert_eq!(read.write().unwrap(), bytes);
    }

    #[test]
    fn nested_layers_are_decoded_once() {
        let mut nested = LayerInfo::default();
        nested.records.push(layer("Deep"));
        nested.channel_image_data.layers.push(vec![
            ChannelData {
                compression: Compression::Raw,
                data:        vec![0; 4]
            };
            2
        ]);
        let mut body = PsdWriter::new();
        nested.write_body(&mut body, PsdVersion::Psd).unwrap();

        let mut document = document(PsdVersion::Psd);
        document
            .layer_and_mask_information
            .tagged_blocks
            .insert(crate::tagged_blocks::TaggedBlock::new(
                crate::tagged_blocks::keys::LAYER_16,
                body.into_inner()
            ));
        assert!(document.layer_info().is_none());
        document.reload_nested_layers();
        assert_eq!(document.layer_records()[0].name, b"Deep");

        let read = PsdDocument::read(&document.write().unwrap()).unwrap();
        let first = read.layer_info().unwrap();
        assert!(std::ptr::eq(first, read.layer_info().unwrap()));
        assert_eq!(read.layer_records().len(), 1);
        assert_eq!(read.layer_tree().root().children.len(), 1);
    }

    #[test]
    fn layer_index_out_of_range() {
        let mut document = document(PsdVersion::Psd);
        document
            .push_layer(layer("Only"), &[vec![0; 4], vec![0; 4]])
            .unwrap();
        let err = document.layer_channels(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn raw_layer_channels() {
        let mut document = document(PsdVersion::Psb);
        let options = PsdOptions::default().set_compression(Compression::Raw);
        document.set_options(options);
        document
            .push_layer(layer("Raw"), &[vec![0; 4], vec![1; 4]])
            .unwrap();

        let records = document.layer_records();
        assert!(records[0].channel_info.iter().all(|c| c.length == 6));
    }

    #[test]
    fn errors_name_the_section() {
        let mut bytes = document(PsdVersion::Psd).write().unwrap();
        // color mode data claims more bytes than the file has
        bytes[26..30].copy_from_slice(&[0, 0, 0xFF, 0xFF]);

        let err = PsdDocument::read(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncation);
        assert_eq!(err.location().map(|(name, _)| name), Some("color mode data"));
    }

    #[test]
    fn read_and_write_through_io() {
        let document = document(PsdVersion::Psd);
        let mut sink = vec![];
        let written = document.write_to(&mut sink).unwrap();
        assert_eq!(written, sink.len());

        let read = PsdDocument::from_reader(sink.as_slice(), PsdOptions::default()).unwrap();
        assert_eq!(read.header, document.header);
    }
}
