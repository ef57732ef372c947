/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image resources
//!
//! A flat list of `{signature, id, name, payload}` records. Photoshop
//! stores everything from resolution info to thumbnails here, we keep
//! the payload untouched.
use log::{trace, warn};

use crate::bytestream::{LengthWidth, PsdReader, PsdWriter};
use crate::constants::{EXTRA_RESOURCE_SIGNATURES, SIGNATURE_8BIM, SIGNATURE_MESA};
use crate::errors::{PsdError, WithContext};

/// Well known resource ids
pub mod resource_id {
    pub const RESOLUTION_INFO: u16 = 1005;
    pub const ALPHA_NAMES_PASCAL: u16 = 1006;
    pub const LAYER_STATE: u16 = 1024;
    pub const LAYER_GROUP_INFO: u16 = 1026;
    pub const THUMBNAIL_RESOURCE: u16 = 1036;
    pub const GLOBAL_ANGLE: u16 = 1037;
    pub const ICC_PROFILE: u16 = 1039;
    pub const VERSION_INFO: u16 = 1057;
    pub const EXIF_DATA_1: u16 = 1058;
    pub const XMP_METADATA: u16 = 1060;
    pub const ALPHA_NAMES_UNICODE: u16 = 1045;
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ImageResource {
    pub signature: [u8; 4],
    pub id:        u16,
    /// Raw Pascal name, almost always empty
    pub name:      Vec<u8>,
    pub data:      Vec<u8>
}

impl ImageResource {
    pub fn new(id: u16, data: Vec<u8>) -> ImageResource {
        ImageResource {
            signature: SIGNATURE_8BIM,
            id,
            name: vec![],
            data
        }
    }

    fn read(stream: &mut PsdReader) -> Result<ImageResource, PsdError> {
        let signature = stream.get_fixed_bytes_or_err::<4>()?;

        if signature != SIGNATURE_8BIM && signature != SIGNATURE_MESA {
            if EXTRA_RESOURCE_SIGNATURES.contains(&signature) {
                warn!(
                    "Image resource with uncommon signature {:?}",
                    String::from_utf8_lossy(&signature)
                );
            } else {
                return Err(PsdError::InvalidValue(
                    "image resource signature",
                    u32::from_be_bytes(signature)
                ));
            }
        }
        let id = stream.get_u16_be_err()?;
        let name = stream.get_pascal_string(2)?.to_vec();
        let mut data = stream.read_length_prefixed(LengthWidth::U32, 2)?;

        Ok(ImageResource {
            signature,
            id,
            name,
            data: data.get_remaining().to_vec()
        })
    }

    fn write(&self, stream: &mut PsdWriter) -> Result<usize, PsdError> {
        let start = stream.bytes_written();
        stream.write_all(&self.signature);
        stream.write_u16_be(self.id);
        stream.write_pascal_string(&self.name, 2)?;
        stream.write_length_prefixed(LengthWidth::U32, 2, |w| {
            w.write_all(&self.data);
            Ok(())
        })?;
        Ok(stream.bytes_written() - start)
    }
}

/// All image resources in file order
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ImageResources {
    pub resources: Vec<ImageResource>
}

impl ImageResources {
    pub fn read(stream: &mut PsdReader) -> Result<ImageResources, PsdError> {
        let mut block = stream.read_length_prefixed(LengthWidth::U32, 1)?;
        trace!("Image resources length: {}", block.remaining());

        let mut resources = vec![];

        while !block.is_eof() {
            let offset = block.position();
            resources.push(ImageResource::read(&mut block).within("image resource", offset)?);
        }
        Ok(ImageResources { resources })
    }

    pub fn write(&self, stream: &mut PsdWriter) -> Result<usize, PsdError> {
        stream.write_length_prefixed(LengthWidth::U32, 1, |w| {
            for resource in &self.resources {
                resource.write(w)?;
            }
            Ok(())
        })
    }

    /// Return the first resource with the given id
    pub fn get(&self, id: u16) -> Option<&ImageResource> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ImageResources {
        ImageResources {
            resources: vec![
                ImageResource::new(resource_id::GLOBAL_ANGLE, vec![0, 0, 0, 30]),
                ImageResource {
                    signature: SIGNATURE_8BIM,
                    id:        resource_id::VERSION_INFO,
                    name:      b"v".to_vec(),
                    data:      vec![1, 2, 3]
                },
                ImageResource::new(resource_id::GLOBAL_ANGLE, vec![0, 0, 0, 90]),
            ]
        }
    }

    #[test]
    fn resources_keep_order_and_duplicates() {
        let mut writer = PsdWriter::new();
        let written = sample().write(&mut writer).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(written, bytes.len());

        let read = ImageResources::read(&mut PsdReader::new(&bytes)).unwrap();
        assert_eq!(read, sample());
        assert_eq!(read.get(resource_id::GLOBAL_ANGLE).unwrap().data, [0, 0, 0, 30]);

        let mut again = PsdWriter::new();
        read.write(&mut again).unwrap();
        assert_eq!(again.into_inner(), bytes);
    }

    #[test]
    fn odd_payload_is_padded_outside_its_length() {
        let resources = ImageResources {
            resources: vec![ImageResource::new(7, vec![1, 2, 3])]
        };
        let mut writer = PsdWriter::new();
        resources.write(&mut writer).unwrap();
        let bytes = writer.into_inner();
        // outer length, 8BIM, id, empty name + pad, length, payload + pad
        assert_eq!(bytes.len(), 4 + 4 + 2 + 2 + 4 + 4);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 3]);

        let read = ImageResources::read(&mut PsdReader::new(&bytes)).unwrap();
        assert_eq!(read, resources);
    }

    #[test]
    fn odd_payload_round_trip() {
        #[rustfmt::skip]
        let bytes = [
            0, 0, 0, 28,
            b'8', b'B', b'I', b'M', 0x03, 0xED, 0, 0, 0, 0, 0, 3, 1, 2, 3, 0,
            b'8', b'B', b'I', b'M', 0x04, 0x21, 1, b'v', 0, 0, 0, 0
        ];
        let read = ImageResources::read(&mut PsdReader::new(&bytes)).unwrap();
        assert_eq!(read.resources[0].id, resource_id::RESOLUTION_INFO);
        assert_eq!(read.resources[0].data, [1, 2, 3]);
        assert_eq!(read.resources[1].name, b"v");
        assert!(read.resources[1].data.is_empty());

        let mut writer = PsdWriter::new();
        read.write(&mut writer).unwrap();
        assert_eq!(writer.into_inner(), bytes);
    }

    #[test]
    fn unknown_signature_is_rejected() {
        let bytes = [0, 0, 0, 12, b'X', b'X', b'X', b'X', 0, 1, 0, 0, 0, 0, 0, 0];
        let err = ImageResources::read(&mut PsdReader::new(&bytes)).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Format);
        assert_eq!(err.location(), Some(("image resource", 4)));
    }
}
