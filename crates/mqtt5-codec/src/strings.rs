//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! UTF-8 strings and string pairs, each prefixed by a two byte length

use winnow::Bytes;
use winnow::Parser;
use winnow::binary::length_take;
use winnow::error::ErrMode;
use winnow::error::FromExternalError;

use crate::MResult;
use crate::error::MqttWriteError;
use crate::integers::parse_u16;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

#[doc = crate::util::md_speclink!("_Toc3901010")]
pub fn parse_string<'i>(input: &mut &'i Bytes) -> MResult<&'i str> {
    winnow::combinator::trace("mqtt_string", |input: &mut &'i Bytes| {
        let maybe_str = length_take(parse_u16).parse_next(input)?;

        core::str::from_utf8(maybe_str).map_err(|e| ErrMode::from_external_error(input, e))
    })
    .parse_next(input)
}

#[inline]
pub fn string_binary_size(s: &str) -> u32 {
    (2 + s.len()) as u32
}

pub fn write_string<W: WriteMqttPacket>(buffer: &mut W, s: &str) -> WResult<W> {
    let len = u16::try_from(s.len()).map_err(|_| MqttWriteError::FieldTooLong(s.len()))?;

    buffer.write_u16(len)?;
    buffer.write_slice(s.as_bytes())
}

#[doc = crate::util::md_speclink!("_Toc3901013")]
pub fn parse_string_pair<'i>(input: &mut &'i Bytes) -> MResult<(&'i str, &'i str)> {
    winnow::combinator::trace("mqtt_string_pair", (parse_string, parse_string)).parse_next(input)
}

#[inline]
pub fn string_pair_binary_size(key: &str, value: &str) -> u32 {
    string_binary_size(key) + string_binary_size(value)
}

pub fn write_string_pair<W: WriteMqttPacket>(buffer: &mut W, key: &str, value: &str) -> WResult<W> {
    write_string(buffer, key)?;
    write_string(buffer, value)
}
