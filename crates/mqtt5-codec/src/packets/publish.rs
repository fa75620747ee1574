//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;
use winnow::Parser;

use crate::MResult;
use crate::error::DecodeError;
use crate::fixed_header::FixedHeader;
use crate::fixed_header::PacketType;
use crate::packets::ControlPacket;
use crate::properties::Properties;
use crate::qos::QualityOfService;
use crate::strings::parse_string;
use crate::strings::write_string;
use crate::variable_header::PacketIdentifier;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

/// An application message
///
/// DUP, QoS and RETAIN live in the fixed header flags. The packet identifier is only present on
/// the wire for QoS 1 and 2, for QoS 0 it is neither written nor read.
#[derive(Clone, Debug, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901100")]
pub struct MPublish {
    header: FixedHeader,
    pub topic_name: String,
    pub packet_identifier: PacketIdentifier,
    pub properties: Properties,
    pub payload: Vec<u8>,
}

impl Default for MPublish {
    fn default() -> MPublish {
        MPublish {
            header: FixedHeader::new(PacketType::Publish, 0),
            topic_name: String::new(),
            packet_identifier: PacketIdentifier::default(),
            properties: Properties::new(),
            payload: Vec::new(),
        }
    }
}

impl MPublish {
    pub fn new(topic_name: impl Into<String>, payload: impl Into<Vec<u8>>) -> MPublish {
        MPublish {
            topic_name: topic_name.into(),
            payload: payload.into(),
            ..MPublish::default()
        }
    }

    pub fn dup(&self) -> bool {
        self.header.dup()
    }

    pub fn set_dup(&mut self, dup: bool) {
        self.header.set_dup(dup);
    }

    pub fn qos(&self) -> QualityOfService {
        self.header.qos().unwrap_or_default()
    }

    pub fn set_qos(&mut self, qos: QualityOfService) {
        self.header.set_qos(qos);
    }

    pub fn retain(&self) -> bool {
        self.header.retain()
    }

    pub fn set_retain(&mut self, retain: bool) {
        self.header.set_retain(retain);
    }

    pub fn has_packet_identifier(&self) -> bool {
        self.qos() > QualityOfService::AtMostOnce
    }

    /// Decode an owned body, keeping its allocation as the payload
    pub(crate) fn decode_owned(&mut self, mut body: Vec<u8>) -> Result<usize, DecodeError> {
        let mut input = Bytes::new(&body);
        self.parse_variable_header(&mut input).map_err(DecodeError::from_parse_error)?;
        let variable_header_size = body.len() - input.len();

        body.drain(..variable_header_size);
        self.payload = body;

        tracing::trace!(
            packet_type = %PacketType::Publish,
            variable_header_size,
            payload_size = self.payload.len(),
            "Decoded packet body"
        );

        Ok(variable_header_size + self.payload.len())
    }
}

impl ControlPacket for MPublish {
    const PACKET_TYPE: PacketType = PacketType::Publish;

    fn header(&self) -> &FixedHeader {
        &self.header
    }

    fn set_fixed_header(&mut self, header: FixedHeader) {
        self.header = header.with_remaining_length(0);
    }

    fn parse_variable_header(&mut self, input: &mut &Bytes) -> MResult<()> {
        winnow::combinator::trace("MPublish::variable_header", |input: &mut &Bytes| {
            self.topic_name = parse_string(input)?.to_owned();

            if self.has_packet_identifier() {
                self.packet_identifier = PacketIdentifier::parse(input)?;
            }

            self.properties = Properties::parse(input)?;

            Ok(())
        })
        .parse_next(input)
    }

    /// The payload is whatever the Remaining Length leaves after the variable header
    fn parse_payload(&mut self, input: &mut &Bytes) -> MResult<()> {
        let payload: MResult<&[u8]> =
            winnow::combinator::trace("MPublish::payload", winnow::token::rest).parse_next(input);
        self.payload = payload?.to_vec();
        Ok(())
    }

    fn write_variable_header<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_string(buffer, &self.topic_name)?;

        if self.has_packet_identifier() {
            self.packet_identifier.write(buffer)?;
        }

        self.properties.write(buffer)
    }

    fn write_payload<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_slice(&self.payload)
    }

    fn is_valid(&self) -> bool {
        let topic_valid = !self.topic_name.contains(&['#', '+'][..])
            && (!self.topic_name.is_empty() || self.properties.topic_alias().is_some());
        let identifier_valid = if self.has_packet_identifier() {
            self.packet_identifier.is_valid()
        } else {
            !self.dup()
        };

        self.has_valid_header()
            && topic_valid
            && identifier_valid
            && self.properties.allowed_in(Self::PACKET_TYPE)
    }

    fn property_lists(&self) -> Vec<&Properties> {
        vec![&self.properties]
    }
}
