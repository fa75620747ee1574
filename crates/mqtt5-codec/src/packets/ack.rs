//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! The layout PUBACK, PUBREC, PUBREL and PUBCOMP share
//!
//! A packet identifier, optionally followed by a reason code, optionally followed by properties.
//! When the reason code is [`ReasonCode::Success`] and there are no properties, only the packet
//! identifier is written.

use core::marker::PhantomData;

use winnow::Bytes;
use winnow::Parser;

use crate::MResult;
use crate::fixed_header::FixedHeader;
use crate::fixed_header::PacketType;
use crate::packets::ControlPacket;
use crate::properties::Properties;
use crate::reason_code::ReasonCode;
use crate::variable_header::PacketIdentifier;
use crate::variable_header::parse_optional_reason;
use crate::variable_header::write_optional_reason;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

/// Names which of the four acknowledgement packets an [`MAck`] is
pub trait AckKind: Clone + Copy + core::fmt::Debug + Default + PartialEq + Eq {
    const PACKET_TYPE: PacketType;
}

#[derive(Clone, Debug, PartialEq)]
pub struct MAck<K> {
    header: FixedHeader,
    pub packet_identifier: PacketIdentifier,
    pub reason_code: ReasonCode,
    pub properties: Properties,
    kind: PhantomData<K>,
}

impl<K: AckKind> Default for MAck<K> {
    fn default() -> MAck<K> {
        MAck {
            header: FixedHeader::new(K::PACKET_TYPE, 0),
            packet_identifier: PacketIdentifier::default(),
            reason_code: ReasonCode::Success,
            properties: Properties::new(),
            kind: PhantomData,
        }
    }
}

impl<K: AckKind> MAck<K> {
    pub fn new(packet_identifier: impl Into<PacketIdentifier>) -> MAck<K> {
        MAck {
            packet_identifier: packet_identifier.into(),
            ..MAck::default()
        }
    }

    pub fn with_reason_code(mut self, reason_code: ReasonCode) -> MAck<K> {
        self.reason_code = reason_code;
        self
    }
}

impl<K: AckKind> ControlPacket for MAck<K> {
    const PACKET_TYPE: PacketType = K::PACKET_TYPE;

    fn header(&self) -> &FixedHeader {
        &self.header
    }

    fn set_fixed_header(&mut self, header: FixedHeader) {
        self.header = header.with_remaining_length(0);
    }

    fn parse_variable_header(&mut self, input: &mut &Bytes) -> MResult<()> {
        winnow::combinator::trace("MAck::variable_header", |input: &mut &Bytes| {
            self.packet_identifier = PacketIdentifier::parse(input)?;
            (self.reason_code, self.properties) = parse_optional_reason(input)?;
            Ok(())
        })
        .parse_next(input)
    }

    fn parse_payload(&mut self, _input: &mut &Bytes) -> MResult<()> {
        Ok(())
    }

    fn write_variable_header<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;
        write_optional_reason(buffer, self.reason_code, &self.properties)
    }

    fn write_payload<W: WriteMqttPacket>(&self, _buffer: &mut W) -> WResult<W> {
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.has_valid_header()
            && self.packet_identifier.is_valid()
            && self.reason_code.allowed_in(Self::PACKET_TYPE)
            && self.properties.allowed_in(Self::PACKET_TYPE)
    }

    fn property_lists(&self) -> Vec<&Properties> {
        vec![&self.properties]
    }
}
