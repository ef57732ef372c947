/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Merged image data, the last section of the file
//!
//! One compression method covers every channel. Channels are stored one
//! after the other, for RLE the row counts of all channels come first
//! followed by the rows of all channels.
use log::{trace, warn};

use crate::bytestream::{PsdReader, PsdWriter};
use crate::compression::{compress, decompress, plane_size};
use crate::constants::Compression;
use crate::errors::{CompressionError, PsdError};
use crate::header::FileHeader;
use crate::options::PsdOptions;

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ImageData {
    pub compression: Compression,
    /// Compressed channels, everything up to the end of the file
    pub data:        Vec<u8>
}

impl ImageData {
    pub fn read(stream: &mut PsdReader) -> Result<ImageData, PsdError> {
        let compression = Compression::from_int(stream.get_u16_be_err()?);

        let data = stream.get_remaining().to_vec();
        trace!("Image data: {:?}, {} bytes", compression, data.len());

        Ok(ImageData { compression, data })
    }

    pub fn write(&self, stream: &mut PsdWriter) -> usize {
        stream.write_u16_be(self.compression.to_int());
        stream.write_all(&self.data);
        2 + self.data.len()
    }

    /// Decode one plane per channel of the document.
    ///
    /// A channel that fails to decode becomes a zero plane and a warning,
    /// unless strict mode is on.
    pub fn get_data(&self, header: &FileHeader, options: &PsdOptions) -> Result<Vec<Vec<u8>>, PsdError> {
        let (width, height) = header.dimensions();
        let depth = header.depth();
        let version = header.version();
        let channels = usize::from(header.channels());
        let size = plane_size(width, height, depth);

        let results: Vec<Result<Vec<u8>, CompressionError>> = match self.compression {
            Compression::Raw => (0..channels)
                .map(|c| {
                    self.data
                        .get(c * size..(c + 1) * size)
                        .map(<[u8]>::to_vec)
                        .ok_or(CompressionError::SizeMismatch(
                            (c + 1) * size,
                            self.data.len()
                        ))
                })
                .collect(),
            Compression::Rle => {
                let payloads = self.split_rle(channels, height, version.rle_count_width());
                decode_all(&payloads, |payload| {
                    let payload = payload.as_ref().map_err(|e| e.clone())?;
                    decompress(payload, Compression::Rle, width, height, depth, version)
                })
            }
            Compression::Zip | Compression::ZipPrediction => {
                // rows never span channels, the whole image is one tall plane
                match decompress(
                    &self.data,
                    self.compression,
                    width,
                    height * channels,
                    depth,
                    version
                ) {
                    Ok(planes) => planes
                        .chunks_exact(size.max(1))
                        .map(|p| Ok(p.to_vec()))
                        .collect(),
                    Err(e) => (0..channels).map(|_| Err(e.clone())).collect()
                }
            }
            Compression::Unknown(method) => (0..channels)
                .map(|_| Err(CompressionError::UnknownMethod(method)))
                .collect()
        };

        results
            .into_iter()
            .enumerate()
            .map(|(channel, result)| match result {
                Ok(plane) => Ok(plane),
                Err(e) if options.get_strict_mode() => Err(e.into()),
                Err(e) => {
                    warn!(
                        "Merged image channel {} could not be decoded, using an empty plane: {:?}",
                        channel, e
                    );
                    Ok(vec![0; size])
                }
            })
            .collect()
    }

    /// Split RLE data into a standalone payload per channel
    fn split_rle(
        &self, channels: usize, height: usize, count_width: usize
    ) -> Vec<Result<Vec<u8>, CompressionError>> {
        let table_size = channels * height * count_width;

        if self.data.len() < table_size {
            let error = CompressionError::RleCounts(table_size, self.data.len());
            return (0..channels).map(|_| Err(error.clone())).collect();
        }
        let (table, mut rows) = self.data.split_at(table_size);

        table
            .chunks_exact((height * count_width).max(1))
            .take(channels)
            .map(|counts| {
                let length: usize = counts
                    .chunks_exact(count_width)
                    .map(|c| match count_width {
                        2 => usize::from(u16::from_be_bytes([c[0], c[1]])),
                        _ => u32::from_be_bytes([c[0], c[1], c[2], c[3]]) as usize
                    })
                    .sum();
                let (channel_rows, rest) = rows.split_at(length.min(rows.len()));
                rows = rest;

                let mut payload = Vec::with_capacity(counts.len() + channel_rows.len());
                payload.extend_from_slice(counts);
                payload.extend_from_slice(channel_rows);
                Ok(payload)
            })
            .collect()
    }

    /// Compress `planes`, one per channel, replacing the stored data.
    ///
    /// Returns the compressed length
    pub fn set_data(
        &mut self, planes: &[Vec<u8>], header: &FileHeader, compression: Compression
    ) -> Result<usize, PsdError> {
        let (width, height) = header.dimensions();
        let depth = header.depth();
        let version = header.version();

        if planes.len() != usize::from(header.channels()) {
            return Err(PsdError::Structural(
                "plane count does not match the channel count of the header"
            ));
        }
        let size = plane_size(width, height, depth);
        let mut joined = Vec::with_capacity(size * planes.len());

        for plane in planes {
            if plane.len() != size {
                return Err(CompressionError::SizeMismatch(size, plane.len()).into());
            }
            joined.extend_from_slice(plane);
        }
        // one tall plane gives the same layout as per channel coding
        self.data = compress(
            &joined,
            compression,
            width,
            height * planes.len(),
            depth,
            version
        )?;
        self.compression = compression;
        Ok(self.data.len())
    }
}

fn decode_all<F>(
    payloads: &[Result<Vec<u8>, CompressionError>], func: F
) -> Vec<Result<Vec<u8>, CompressionError>>
where
    F: Fn(&Result<Vec<u8>, CompressionError>) -> Result<Vec<u8>, CompressionError> + Sync + Send
{
    #[cfg(feature = "threads")]
    {
        use rayon::prelude::*;
        payloads.par_iter().map(func).collect()
    }
    #[cfg(not(feature = "threads"))]
    {
        payloads.iter().map(func).collect()
    }
}
