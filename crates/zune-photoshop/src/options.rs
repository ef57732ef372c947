/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Reader and writer options
//!
//! All options are put into one `PsdOptions` so the same value
//! can be used to read a document and write it back out.
//!
//! The limits and strictness shared with the other zune decoders live in
//! [`DecoderOptions`], the photoshop specific ones sit next to it.

use zune_core::options::DecoderOptions;

use crate::constants::{Compression, MAX_DIMENSIONS};
use crate::encoding::TextEncoding;

/// Options that influence reading and writing
///
/// Each option specifies whether it is respected by the
/// reader, the writer or both.
#[derive(Debug, Copy, Clone)]
pub struct PsdOptions {
    /// Dimension limits and strict mode
    ///
    /// - Default value: `max_width` and `max_height` of 300 000,
    ///   strict mode off
    /// - Respected by: `reader` for the limits, `channel decoding` for
    ///   strict mode, where a channel that fails to decompress is replaced
    ///   by an all zero plane and the failure is logged unless strict mode
    ///   is on
    decoder:            DecoderOptions,
    /// Encoding of legacy Pascal strings
    ///
    /// - Default value: `TextEncoding::MacRoman`
    /// - Respected by: `reader` and `writer` name helpers
    encoding:           TextEncoding,
    /// Alignment of the layer info trailer.
    ///
    /// Photoshop and other tools disagree on this, `None` keeps
    /// whatever alignment the source document used.
    ///
    /// - Default value: None
    /// - Respected by: `writer`
    layer_info_padding: Option<usize>,
    /// Compression used when encoding new pixel data
    ///
    /// - Default value: `Compression::Rle`
    /// - Respected by: `set_data` helpers
    compression:        Compression
}

impl Default for PsdOptions {
    fn default() -> Self {
        PsdOptions {
            decoder:            DecoderOptions::default()
                .set_max_width(MAX_DIMENSIONS as usize)
                .set_max_height(MAX_DIMENSIONS as usize)
                .set_strict_mode(false),
            encoding:           TextEncoding::MacRoman,
            layer_info_padding: None,
            compression:        Compression::Rle
        }
    }
}

impl PsdOptions {
    /// Get maximum width configured for which the reader
    /// should not accept documents greater than this width
    pub const fn get_max_width(&self) -> usize {
        self.decoder.max_width()
    }

    /// Get maximum height configured for which the reader
    /// should not accept documents greater than this height
    pub const fn get_max_height(&self) -> usize {
        self.decoder.max_height()
    }

    /// Return true if damaged channels should be reported as errors
    pub fn get_strict_mode(&self) -> bool {
        self.decoder.strict_mode()
    }

    /// The shared decoder options
    pub const fn get_decoder_options(&self) -> &DecoderOptions {
        &self.decoder
    }

    pub const fn get_encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub const fn get_layer_info_padding(&self) -> Option<usize> {
        self.layer_info_padding
    }

    pub const fn get_compression(&self) -> Compression {
        self.compression
    }

    /// Set maximum width for which the reader should not try
    /// reading documents greater than that width
    ///
    /// # Arguments
    /// - width: The maximum width allowed
    ///
    /// # Returns
    /// -  meself
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.decoder = self.decoder.set_max_width(width);
        self
    }

    /// Set maximum height for which the reader should not try
    /// reading documents greater than that height
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.decoder = self.decoder.set_max_height(height);
        self
    }

    /// Set whether damaged channels are errors instead of zero planes
    pub fn set_strict_mode(mut self, yes: bool) -> Self {
        self.decoder = self.decoder.set_strict_mode(yes);
        self
    }

    /// Replace the shared decoder options, e.g. ones already configured
    /// for the other zune decoders
    pub fn set_decoder_options(mut self, options: DecoderOptions) -> Self {
        self.decoder = options;
        self
    }

    /// Set the encoding used for Pascal strings
    pub fn set_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Force the layer info trailer to a given alignment,
    /// `None` reuses the alignment found when reading
    pub fn set_layer_info_padding(mut self, padding: Option<usize>) -> Self {
        self.layer_info_padding = padding;
        self
    }

    /// Set the compression used when encoding new pixel data
    pub fn set_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}

#[cfg(test)]
mod tests {
    use zune_core::options::DecoderOptions;

    use crate::constants::MAX_DIMENSIONS;
    use crate::options::PsdOptions;

    #[test]
    fn defaults_allow_psb_dimensions() {
        let options = PsdOptions::default();
        assert_eq!(options.get_max_width(), MAX_DIMENSIONS as usize);
        assert_eq!(options.get_max_height(), MAX_DIMENSIONS as usize);
        assert!(!options.get_strict_mode());
    }

    #[test]
    fn decoder_options_carry_over() {
        let decoder = DecoderOptions::default()
            .set_max_width(10)
            .set_strict_mode(true);
        let options = PsdOptions::default().set_decoder_options(decoder);

        assert_eq!(options.get_max_width(), 10);
        assert!(options.get_strict_mode());
        assert_eq!(options.get_decoder_options().max_width(), 10);
    }
}
