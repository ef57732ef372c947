/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Text encodings for legacy Pascal strings
//!
//! Layer names written before Photoshop 5 and image resource names are stored
//! as Pascal strings with no declared encoding; Photoshop itself writes them
//! in the platform encoding, which is Mac Roman for most files.
use encoding_rs::{MACINTOSH, WINDOWS_1252};

/// Encoding used to interpret Pascal strings
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextEncoding {
    #[default]
    MacRoman,
    Latin1,
    Utf8
}

impl TextEncoding {
    /// Decode bytes to a string, replacing what cannot be represented
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::MacRoman => MACINTOSH.decode_without_bom_handling(bytes).0.into_owned(),
            // windows-1252 is a superset of latin-1 for printable characters
            Self::Latin1 => WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned(),
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned()
        }
    }

    /// Encode a string, characters without a mapping are written as
    /// HTML numeric character references
    pub fn encode(self, string: &str) -> Vec<u8> {
        match self {
            Self::MacRoman => MACINTOSH.encode(string).0.into_owned(),
            Self::Latin1 => WINDOWS_1252.encode(string).0.into_owned(),
            Self::Utf8 => string.as_bytes().to_vec()
        }
    }
}
