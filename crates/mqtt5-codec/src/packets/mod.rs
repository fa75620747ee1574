//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! MQTT control packets
//!
//! Every packet implements [`ControlPacket`], splitting its body into a variable header and a
//! payload. [`MqttPacket`] wraps all fifteen kinds and drives framing: the fixed header is parsed
//! first, then the packet it names consumes exactly the bytes the Remaining Length announced.

use winnow::Bytes;
use winnow::Parser;

use self::auth::MAuth;
use self::connack::MConnack;
use self::connect::MConnect;
use self::disconnect::MDisconnect;
use self::pingreq::MPingreq;
use self::pingresp::MPingresp;
use self::puback::MPuback;
use self::pubcomp::MPubcomp;
use self::publish::MPublish;
use self::pubrec::MPubrec;
use self::pubrel::MPubrel;
use self::suback::MSuback;
use self::subscribe::MSubscribe;
use self::unsuback::MUnsuback;
use self::unsubscribe::MUnsubscribe;
use crate::MResult;
use crate::error::DecodeError;
use crate::error::MqttError;
use crate::error::MqttWriteError;
use crate::fixed_header::FixedHeader;
use crate::fixed_header::PacketType;
use crate::integers::VARIABLE_INTEGER_MAX;
use crate::options::DecodeOptions;
use crate::properties::Properties;
use crate::write::CountingWriter;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

pub mod ack;
pub mod auth;
pub mod connack;
pub mod connect;
pub mod disconnect;
pub mod ping;
pub mod pingreq;
pub mod pingresp;
pub mod puback;
pub mod pubcomp;
pub mod publish;
pub mod pubrec;
pub mod pubrel;
pub mod suback;
pub mod subscribe;
pub mod unsuback;
pub mod unsubscribe;

/// The operations every MQTT control packet supports
///
/// Decoding calls [`ControlPacket::set_fixed_header`] on an empty packet, then
/// [`ControlPacket::parse_variable_header`] and [`ControlPacket::parse_payload`] on the bytes the
/// Remaining Length covers. Encoding writes the variable header and payload twice, once to learn
/// their size and once into the destination.
pub trait ControlPacket: Default {
    const PACKET_TYPE: PacketType;

    /// The header as last set, its Remaining Length is not kept
    fn header(&self) -> &FixedHeader;

    fn set_fixed_header(&mut self, header: FixedHeader);

    fn parse_variable_header(&mut self, input: &mut &Bytes) -> MResult<()>;

    fn parse_payload(&mut self, input: &mut &Bytes) -> MResult<()>;

    fn write_variable_header<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W>;

    fn write_payload<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W>;

    /// Whether the packet respects the constraints of the MQTT standard beyond its wire shape
    fn is_valid(&self) -> bool;

    /// The property lists of this packet, checked for duplicates by strict decoding
    fn property_lists(&self) -> Vec<&Properties> {
        Vec::new()
    }

    /// The header to put on the wire, with the Remaining Length computed from the current fields
    fn fixed_header(&self) -> Result<FixedHeader, MqttWriteError> {
        let mut counter = CountingWriter::new();
        self.write_variable_header(&mut counter)?;
        self.write_payload(&mut counter)?;

        let remaining_length = u32::try_from(counter.count())
            .ok()
            .filter(|length| *length <= VARIABLE_INTEGER_MAX)
            .ok_or(MqttWriteError::VarIntOutOfRange(counter.count() as u64))?;

        Ok(self.header().with_remaining_length(remaining_length))
    }

    /// Whether the stored header names this packet type with legal flags
    fn has_valid_header(&self) -> bool {
        self.header().validate() == Ok(Self::PACKET_TYPE)
    }
}

/// Run both parsing stages of `packet` over `body`, returning how many bytes they consumed
fn decode_into<P: ControlPacket>(packet: &mut P, body: &[u8]) -> Result<usize, DecodeError> {
    let mut input = Bytes::new(body);

    packet
        .parse_variable_header(&mut input)
        .map_err(DecodeError::from_parse_error)?;
    let variable_header_size = body.len() - input.len();

    packet
        .parse_payload(&mut input)
        .map_err(DecodeError::from_parse_error)?;
    let payload_size = body.len() - variable_header_size - input.len();

    tracing::trace!(
        packet_type = %P::PACKET_TYPE,
        variable_header_size,
        payload_size,
        "Decoded packet body"
    );

    Ok(variable_header_size + payload_size)
}

/// Write the fixed header, variable header and payload of `packet`, returning the bytes written
pub fn write_control_packet<P: ControlPacket, W: WriteMqttPacket>(
    packet: &P,
    buffer: &mut W,
) -> Result<usize, W::Error> {
    let header = packet.fixed_header()?;
    let header_size = header.write(buffer)?;
    packet.write_variable_header(buffer)?;
    packet.write_payload(buffer)?;

    let written = header_size + header.remaining_length() as usize;
    tracing::trace!(packet_type = %P::PACKET_TYPE, written, "Encoded packet");

    Ok(written)
}

macro_rules! define_packets {
    ($($name:ident($kind:ty)),* $(,)?) => {
        #[derive(Clone, Debug, PartialEq)]
        pub enum MqttPacket {
            $( $name($kind), )*
        }

        impl MqttPacket {
            /// An empty packet of the given type, ready to be filled by the parsers
            pub fn empty(packet_type: PacketType) -> MqttPacket {
                match packet_type {
                    $( PacketType::$name => MqttPacket::$name(<$kind>::default()), )*
                }
            }

            pub fn packet_type(&self) -> PacketType {
                match self {
                    $( MqttPacket::$name(_) => PacketType::$name, )*
                }
            }

            pub fn fixed_header(&self) -> Result<FixedHeader, MqttWriteError> {
                match self {
                    $( MqttPacket::$name(p) => p.fixed_header(), )*
                }
            }

            pub fn set_fixed_header(&mut self, header: FixedHeader) {
                match self {
                    $( MqttPacket::$name(p) => p.set_fixed_header(header), )*
                }
            }

            pub fn is_valid(&self) -> bool {
                match self {
                    $( MqttPacket::$name(p) => p.is_valid(), )*
                }
            }

            pub fn property_lists(&self) -> Vec<&Properties> {
                match self {
                    $( MqttPacket::$name(p) => p.property_lists(), )*
                }
            }

            /// Serialize into `buffer`, returning the number of bytes written
            pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> Result<usize, W::Error> {
                match self {
                    $( MqttPacket::$name(p) => write_control_packet(p, buffer), )*
                }
            }

            fn decode_body(&mut self, body: &[u8]) -> Result<usize, DecodeError> {
                match self {
                    $( MqttPacket::$name(p) => decode_into(p, body), )*
                }
            }
        }

        $(
            impl From<$kind> for MqttPacket {
                fn from(from: $kind) -> MqttPacket {
                    MqttPacket::$name(from)
                }
            }
        )*
    };
}

define_packets! {
    Connect(MConnect),
    Connack(MConnack),
    Publish(MPublish),
    Puback(MPuback),
    Pubrec(MPubrec),
    Pubrel(MPubrel),
    Pubcomp(MPubcomp),
    Subscribe(MSubscribe),
    Suback(MSuback),
    Unsubscribe(MUnsubscribe),
    Unsuback(MUnsuback),
    Pingreq(MPingreq),
    Pingresp(MPingresp),
    Disconnect(MDisconnect),
    Auth(MAuth),
}

impl MqttPacket {
    /// Decode the body of a packet whose fixed header has already been read
    ///
    /// `body` must hold exactly the bytes the Remaining Length of `header` announced.
    pub fn decode(
        header: FixedHeader,
        body: &[u8],
        options: &DecodeOptions,
    ) -> Result<MqttPacket, DecodeError> {
        let mut packet = MqttPacket::with_header(header)?;
        let consumed = packet.decode_body(body)?;
        packet.finish_decode(header, consumed, options)
    }

    /// Decode a body the packet may keep
    ///
    /// A PUBLISH payload takes over the allocation of `body` instead of being copied out of it.
    pub fn decode_owned(
        header: FixedHeader,
        body: Vec<u8>,
        options: &DecodeOptions,
    ) -> Result<MqttPacket, DecodeError> {
        let mut packet = MqttPacket::with_header(header)?;
        let consumed = match &mut packet {
            MqttPacket::Publish(publish) => publish.decode_owned(body)?,
            other => other.decode_body(&body)?,
        };
        packet.finish_decode(header, consumed, options)
    }

    fn with_header(header: FixedHeader) -> Result<MqttPacket, DecodeError> {
        let mut packet = MqttPacket::empty(header.validate()?);
        packet.set_fixed_header(header);
        Ok(packet)
    }

    fn finish_decode(
        self,
        header: FixedHeader,
        consumed: usize,
        options: &DecodeOptions,
    ) -> Result<MqttPacket, DecodeError> {
        let packet_type = self.packet_type();
        if consumed != header.remaining_length() as usize {
            return Err(DecodeError::SizeMismatch {
                declared: header.remaining_length(),
                actual: consumed as u32,
            });
        }

        if options.strict_properties {
            for properties in self.property_lists() {
                properties.check_duplicates(packet_type)?;
            }
        }

        Ok(self)
    }

    /// Decode a buffer holding exactly one packet
    pub fn parse_complete(input: &[u8]) -> Result<MqttPacket, MqttError> {
        MqttPacket::parse_complete_with(input, &DecodeOptions::default())
    }

    pub fn parse_complete_with(
        input: &[u8],
        options: &DecodeOptions,
    ) -> Result<MqttPacket, MqttError> {
        let mut bytes = Bytes::new(input);
        let header = FixedHeader::parse
            .parse_next(&mut bytes)
            .map_err(DecodeError::from_parse_error)?;
        let header_size = input.len() - bytes.len();

        header.validate()?;
        options.check_packet_size(header_size, header.remaining_length())?;

        if bytes.len() != header.remaining_length() as usize {
            return Err(DecodeError::SizeMismatch {
                declared: header.remaining_length(),
                actual: bytes.len() as u32,
            }
            .into());
        }

        Ok(MqttPacket::decode(header, &bytes[..], options)?)
    }

    /// Serialize into a fresh buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>, MqttWriteError> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }
}
