//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Binary data, prefixed by a two byte length

use winnow::Bytes;
use winnow::Parser;
use winnow::binary::length_take;

use crate::MResult;
use crate::error::MqttWriteError;
use crate::integers::parse_u16;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

#[doc = crate::util::md_speclink!("_Toc3901012")]
pub fn parse_binary_data<'i>(input: &mut &'i Bytes) -> MResult<&'i [u8]> {
    winnow::combinator::trace("mqtt_binary_data", length_take(parse_u16)).parse_next(input)
}

#[inline]
pub fn binary_data_binary_size(data: &[u8]) -> u32 {
    (2 + data.len()) as u32
}

pub fn write_binary_data<W: WriteMqttPacket>(buffer: &mut W, data: &[u8]) -> WResult<W> {
    let len = u16::try_from(data.len()).map_err(|_| MqttWriteError::FieldTooLong(data.len()))?;

    buffer.write_u16(len)?;
    buffer.write_slice(data)
}
