//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Knobs for the decoder

use crate::error::DecodeError;

/// Limits and checks applied while decoding
///
/// The defaults accept anything the wire format can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Largest accepted packet, counting the fixed header
    pub maximum_packet_size: u32,
    /// Reject property lists repeating an identifier that may only appear once
    pub strict_properties: bool,
}

impl Default for DecodeOptions {
    fn default() -> DecodeOptions {
        DecodeOptions {
            maximum_packet_size: u32::MAX,
            strict_properties: false,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> DecodeOptions {
        DecodeOptions::default()
    }

    pub fn with_maximum_packet_size(mut self, maximum_packet_size: u32) -> DecodeOptions {
        self.maximum_packet_size = maximum_packet_size;
        self
    }

    pub fn with_strict_properties(mut self, strict_properties: bool) -> DecodeOptions {
        self.strict_properties = strict_properties;
        self
    }

    pub(crate) fn check_packet_size(
        &self,
        header_size: usize,
        remaining_length: u32,
    ) -> Result<(), DecodeError> {
        let size = header_size as u64 + u64::from(remaining_length);

        if size > u64::from(self.maximum_packet_size) {
            return Err(DecodeError::PacketTooLarge {
                size,
                maximum: self.maximum_packet_size,
            });
        }

        Ok(())
    }
}
