//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! The fixed header every MQTT control packet starts with
//!
//! One byte carrying the packet type in its upper and the flags in its lower nibble, followed by
//! the Remaining Length as a variable byte integer.

use winnow::Bytes;
use winnow::Parser;

use crate::MResult;
use crate::error::DecodeError;
use crate::integers::parse_u8;
use crate::integers::parse_variable_u32;
use crate::integers::variable_u32_binary_size;
use crate::integers::write_variable_u32;
use crate::qos::QualityOfService;
use crate::write::WriteMqttPacket;

#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[doc = crate::util::md_speclink!("_Toc3901022")]
pub enum PacketType {
    Connect = 1,
    Connack = 2,
    Publish = 3,
    Puback = 4,
    Pubrec = 5,
    Pubrel = 6,
    Pubcomp = 7,
    Subscribe = 8,
    Suback = 9,
    Unsubscribe = 10,
    Unsuback = 11,
    Pingreq = 12,
    Pingresp = 13,
    Disconnect = 14,
    Auth = 15,
}

impl PacketType {
    /// The flags every packet of this type must carry, PUBLISH flags are free-form instead
    pub const fn required_flags(self) -> u8 {
        match self {
            PacketType::Pubrel | PacketType::Subscribe | PacketType::Unsubscribe => 0b0010,
            _ => 0b0000,
        }
    }
}

impl core::fmt::Display for PacketType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            PacketType::Connect => "CONNECT",
            PacketType::Connack => "CONNACK",
            PacketType::Publish => "PUBLISH",
            PacketType::Puback => "PUBACK",
            PacketType::Pubrec => "PUBREC",
            PacketType::Pubrel => "PUBREL",
            PacketType::Pubcomp => "PUBCOMP",
            PacketType::Subscribe => "SUBSCRIBE",
            PacketType::Suback => "SUBACK",
            PacketType::Unsubscribe => "UNSUBSCRIBE",
            PacketType::Unsuback => "UNSUBACK",
            PacketType::Pingreq => "PINGREQ",
            PacketType::Pingresp => "PINGRESP",
            PacketType::Disconnect => "DISCONNECT",
            PacketType::Auth => "AUTH",
        };
        f.write_str(name)
    }
}

const DUP: u8 = 0b0000_1000;
const QOS: u8 = 0b0000_0110;
const RETAIN: u8 = 0b0000_0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[doc = crate::util::md_speclink!("_Toc3901021")]
pub struct FixedHeader {
    type_and_flags: u8,
    remaining_length: u32,
}

impl FixedHeader {
    /// A header for `packet_type` carrying the flags that type requires
    pub fn new(packet_type: PacketType, remaining_length: u32) -> FixedHeader {
        FixedHeader {
            type_and_flags: (u8::from(packet_type) << 4) | packet_type.required_flags(),
            remaining_length,
        }
    }

    /// A header from its raw first byte, nothing is validated
    pub const fn from_byte(type_and_flags: u8, remaining_length: u32) -> FixedHeader {
        FixedHeader {
            type_and_flags,
            remaining_length,
        }
    }

    pub const fn first_byte(&self) -> u8 {
        self.type_and_flags
    }

    /// The raw type nibble
    pub const fn type_bits(&self) -> u8 {
        self.type_and_flags >> 4
    }

    pub fn packet_type(&self) -> Option<PacketType> {
        PacketType::try_from(self.type_bits()).ok()
    }

    /// The raw flag nibble
    pub const fn flags(&self) -> u8 {
        self.type_and_flags & 0b0000_1111
    }

    pub const fn remaining_length(&self) -> u32 {
        self.remaining_length
    }

    pub fn set_remaining_length(&mut self, remaining_length: u32) {
        self.remaining_length = remaining_length;
    }

    pub const fn with_remaining_length(mut self, remaining_length: u32) -> FixedHeader {
        self.remaining_length = remaining_length;
        self
    }

    pub const fn dup(&self) -> bool {
        self.type_and_flags & DUP != 0
    }

    pub fn set_dup(&mut self, dup: bool) {
        self.type_and_flags = (self.type_and_flags & !DUP) | if dup { DUP } else { 0 };
    }

    /// The QoS bits, `None` if both are set
    pub fn qos(&self) -> Option<QualityOfService> {
        QualityOfService::try_from((self.type_and_flags & QOS) >> 1).ok()
    }

    pub fn set_qos(&mut self, qos: QualityOfService) {
        self.type_and_flags = (self.type_and_flags & !QOS) | (u8::from(qos) << 1);
    }

    pub const fn retain(&self) -> bool {
        self.type_and_flags & RETAIN != 0
    }

    pub fn set_retain(&mut self, retain: bool) {
        self.type_and_flags = (self.type_and_flags & !RETAIN) | if retain { RETAIN } else { 0 };
    }

    /// Check the type nibble names a known packet and the flags are legal for it
    pub fn validate(&self) -> Result<PacketType, DecodeError> {
        let packet_type = self
            .packet_type()
            .ok_or(DecodeError::UnsupportedPacketType(self.type_bits()))?;

        let flags_valid = match packet_type {
            PacketType::Publish => self.qos().is_some(),
            other => self.flags() == other.required_flags(),
        };

        if !flags_valid {
            return Err(DecodeError::InvalidFlags {
                packet_type: self.type_bits(),
                flags: self.flags(),
            });
        }

        Ok(packet_type)
    }

    /// Parse the first byte and the Remaining Length, the header is not validated
    pub fn parse(input: &mut &Bytes) -> MResult<FixedHeader> {
        winnow::combinator::trace(
            "FixedHeader",
            (parse_u8, parse_variable_u32).map(|(type_and_flags, remaining_length)| {
                FixedHeader::from_byte(type_and_flags, remaining_length)
            }),
        )
        .parse_next(input)
    }

    /// Size of the encoded header, one byte plus the Remaining Length
    pub const fn binary_size(&self) -> u32 {
        1 + variable_u32_binary_size(self.remaining_length)
    }

    /// Write the header, returning the number of bytes written
    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> Result<usize, W::Error> {
        buffer.write_byte(self.type_and_flags)?;
        write_variable_u32(buffer, self.remaining_length)?;
        Ok(self.binary_size() as usize)
    }
}
