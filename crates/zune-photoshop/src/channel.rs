/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Per layer channel image data
//!
//! This is the only place where layer pixels cross between their stored
//! form and plain planes. Planes use the raw layout described in
//! [`compression`](crate::compression).
use log::warn;

use crate::bytestream::{PsdReader, PsdWriter};
use crate::compression::{compress, decompress, plane_size};
use crate::constants::{Compression, PsdVersion};
use crate::errors::{CompressionError, PsdError};
use crate::layer_record::{ChannelInfo, LayerRecord};
use crate::options::PsdOptions;

/// One stored channel, a compression method and the compressed bytes
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ChannelData {
    pub compression: Compression,
    pub data:        Vec<u8>
}

impl ChannelData {
    /// Read a channel whose [`ChannelInfo`](crate::ChannelInfo) declares
    /// `length` bytes, compression field included
    pub fn read(stream: &mut PsdReader, length: u64) -> Result<ChannelData, PsdError> {
        if length < 2 {
            return Err(PsdError::OutOfRange("channel length", length, 2, u64::MAX));
        }
        let compression = Compression::from_int(stream.get_u16_be_err()?);

        let size = usize::try_from(length - 2)
            .map_err(|_| PsdError::OutOfRange("channel length", length, 2, usize::MAX as u64))?;

        Ok(ChannelData {
            compression,
            data: stream.get_bytes(size)?.to_vec()
        })
    }

    /// Write the channel, returning the number of bytes which is
    /// what the matching channel info must declare
    pub fn write(&self, stream: &mut PsdWriter) -> usize {
        stream.write_u16_be(self.compression.to_int());
        stream.write_all(&self.data);
        2 + self.data.len()
    }

    /// Length this channel occupies on disk
    pub fn stored_length(&self) -> u64 {
        2 + self.data.len() as u64
    }

    /// Decompress into a plane of `width * height` samples of `depth` bits
    pub fn get_data(
        &self, width: usize, height: usize, depth: u16, version: PsdVersion
    ) -> Result<Vec<u8>, CompressionError> {
        decompress(&self.data, self.compression, width, height, depth, version)
    }

    /// Like [`get_data`](Self::get_data) but a channel that fails to
    /// decompress yields a zero plane unless `options` asks for strictness
    pub fn get_data_lossy(
        &self, width: usize, height: usize, depth: u16, version: PsdVersion,
        options: &PsdOptions
    ) -> Result<Vec<u8>, PsdError> {
        match self.get_data(width, height, depth, version) {
            Ok(data) => Ok(data),
            Err(e) if options.get_strict_mode() => Err(e.into()),
            Err(e) => {
                warn!("Replacing damaged channel with an empty plane: {:?}", e);
                Ok(vec![0; plane_size(width, height, depth)])
            }
        }
    }

    /// Compress `data` and store it, returning the compressed length
    pub fn set_data(
        &mut self, data: &[u8], compression: Compression, width: usize, height: usize,
        depth: u16, version: PsdVersion
    ) -> Result<usize, CompressionError> {
        self.data = compress(data, compression, width, height, depth, version)?;
        self.compression = compression;
        Ok(self.data.len())
    }
}

/// Channel data of every layer, index aligned with the layer records
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ChannelImageData {
    pub layers: Vec<Vec<ChannelData>>
}

impl ChannelImageData {
    /// Read the channels of every record in order
    pub fn read(
        stream: &mut PsdReader, records: &[LayerRecord]
    ) -> Result<ChannelImageData, PsdError> {
        let mut layers = Vec::with_capacity(records.len());

        for record in records {
            let mut channels = Vec::with_capacity(record.channel_info.len());

            for info in &record.channel_info {
                channels.push(ChannelData::read(stream, info.length)?);
            }
            layers.push(channels);
        }
        Ok(ChannelImageData { layers })
    }

    /// Write all channels, returning the stored length of every channel
    /// grouped per layer
    pub fn write(&self, stream: &mut PsdWriter) -> Vec<Vec<u64>> {
        self.layers
            .iter()
            .map(|channels| {
                channels
                    .iter()
                    .map(|channel| channel.write(stream) as u64)
                    .collect()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// A decoded channel of a layer
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LayerChannel {
    pub id:     i16,
    pub width:  usize,
    pub height: usize,
    pub data:   Vec<u8>
}

/// Decode every channel of one layer.
///
/// Channels are independent, with the `threads` feature they are
/// decompressed in parallel.
pub fn decode_layer_channels(
    record: &LayerRecord, channels: &[ChannelData], depth: u16, version: PsdVersion,
    options: &PsdOptions
) -> Result<Vec<LayerChannel>, PsdError> {
    if record.channel_info.len() != channels.len() {
        return Err(PsdError::Structural(
            "channel data count does not match the channel info of its layer"
        ));
    }
    let decode = |(info, channel): (&ChannelInfo, &ChannelData)| -> Result<LayerChannel, PsdError> {
        let (width, height) = record.channel_size(info.id);
        let data = channel.get_data_lossy(width, height, depth, version, options)?;
        Ok(LayerChannel {
            id: info.id,
            width,
            height,
            data
        })
    };

    #[cfg(feature = "threads")]
    {
        use rayon::prelude::*;

        record
            .channel_info
            .par_iter()
            .zip(channels.par_iter())
            .map(decode)
            .collect()
    }
    #[cfg(not(feature = "threads"))]
    {
        record
            .channel_info
            .iter()
            .zip(channels.iter())
            .map(decode)
            .collect()
    }
}
