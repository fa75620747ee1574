//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! MQTT integers
//!
//! Fixed size integers are big-endian, lengths use the variable byte encoding of 7 bits per byte
//! with the high bit marking continuation.

use winnow::Bytes;
use winnow::Parser;
use winnow::combinator::trace;

use crate::MResult;
use crate::error::DecodeError;
use crate::error::MqttWriteError;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

/// Largest value a variable byte integer can hold
pub const VARIABLE_INTEGER_MAX: u32 = 268_435_455;

/// A variable byte integer never spans more than this many bytes
pub const VARIABLE_INTEGER_MAX_BYTES: usize = 4;

pub fn parse_u8(input: &mut &Bytes) -> MResult<u8> {
    trace("mqtt_u8", winnow::binary::u8).parse_next(input)
}

#[doc = crate::util::md_speclink!("_Toc3901008")]
pub fn parse_u16(input: &mut &Bytes) -> MResult<u16> {
    trace(
        "mqtt_u16",
        winnow::binary::u16(winnow::binary::Endianness::Big),
    )
    .parse_next(input)
}

pub fn write_u16<W: WriteMqttPacket>(buffer: &mut W, u: u16) -> WResult<W> {
    buffer.write_u16(u)
}

#[doc = crate::util::md_speclink!("_Toc3901009")]
pub fn parse_u32(input: &mut &Bytes) -> MResult<u32> {
    trace(
        "mqtt_u32",
        winnow::binary::u32(winnow::binary::Endianness::Big),
    )
    .parse_next(input)
}

pub fn write_u32<W: WriteMqttPacket>(buffer: &mut W, u: u32) -> WResult<W> {
    buffer.write_u32(u)
}

/// Parse a variable byte integer
///
/// Running out of input before the terminating byte, or a continuation bit on the fourth byte,
/// fails with [`DecodeError::VarInt`].
#[doc = crate::util::md_speclink!("_Toc3901011")]
pub fn parse_variable_u32(input: &mut &Bytes) -> MResult<u32> {
    trace("mqtt_variable_u32", |input: &mut &Bytes| {
        let mut value: u32 = 0;

        for index in 0..VARIABLE_INTEGER_MAX_BYTES {
            let byte = winnow::binary::u8
                .parse_next(input)
                .map_err(|_: winnow::error::ErrMode<winnow::error::ContextError>| {
                    DecodeError::VarInt.into_parse_error(input)
                })?;

            value |= u32::from(byte & 0b0111_1111) << (7 * index);

            if byte & 0b1000_0000 == 0 {
                return Ok(value);
            }
        }

        Err(DecodeError::VarInt.into_parse_error(input))
    })
    .parse_next(input)
}

/// Number of bytes `u` occupies as a variable byte integer
///
/// Values above [`VARIABLE_INTEGER_MAX`] report the four byte maximum, [`write_variable_u32`]
/// refuses them.
#[inline]
pub const fn variable_u32_binary_size(u: u32) -> u32 {
    match u {
        0..=127 => 1,
        128..=16_383 => 2,
        16_384..=2_097_151 => 3,
        _ => 4,
    }
}

pub fn write_variable_u32<W: WriteMqttPacket>(buffer: &mut W, u: u32) -> WResult<W> {
    if u > VARIABLE_INTEGER_MAX {
        return Err(MqttWriteError::VarIntOutOfRange(u64::from(u)).into());
    }

    let mut remaining = u;
    loop {
        let mut byte = (remaining % 128) as u8;
        remaining /= 128;
        if remaining > 0 {
            byte |= 0b1000_0000;
        }
        buffer.write_byte(byte)?;

        if remaining == 0 {
            return Ok(());
        }
    }
}
