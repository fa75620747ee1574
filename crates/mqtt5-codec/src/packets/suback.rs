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
use crate::reason_code::ReasonCode;
use crate::variable_header::PacketIdentifier;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

/// Parse the rest of the input as one reason code per byte
pub(crate) fn parse_reason_codes(input: &mut &Bytes) -> MResult<Vec<ReasonCode>> {
    winnow::combinator::trace("ReasonCodes", |input: &mut &Bytes| {
        let payload: MResult<&[u8]> = winnow::token::rest.parse_next(input);
        let payload = payload?;

        bytemuck::checked::try_cast_slice::<u8, ReasonCode>(payload)
            .map(<[ReasonCode]>::to_vec)
            .map_err(|_| DecodeError::Malformed.into_parse_error(input))
    })
    .parse_next(input)
}

pub(crate) fn write_reason_codes<W: WriteMqttPacket>(
    buffer: &mut W,
    reason_codes: &[ReasonCode],
) -> WResult<W> {
    buffer.write_slice(bytemuck::cast_slice(reason_codes))
}

/// Answers a SUBSCRIBE with one reason code per requested subscription, in order
#[derive(Clone, Debug, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901171")]
pub struct MSuback {
    header: FixedHeader,
    pub packet_identifier: PacketIdentifier,
    pub properties: Properties,
    pub reason_codes: Vec<ReasonCode>,
}

impl Default for MSuback {
    fn default() -> MSuback {
        MSuback {
            header: FixedHeader::new(PacketType::Suback, 0),
            packet_identifier: PacketIdentifier::default(),
            properties: Properties::new(),
            reason_codes: Vec::new(),
        }
    }
}

impl MSuback {
    pub fn new(
        packet_identifier: impl Into<PacketIdentifier>,
        reason_codes: Vec<ReasonCode>,
    ) -> MSuback {
        MSuback {
            packet_identifier: packet_identifier.into(),
            reason_codes,
            ..MSuback::default()
        }
    }
}

impl ControlPacket for MSuback {
    const PACKET_TYPE: PacketType = PacketType::Suback;

    fn header(&self) -> &FixedHeader {
        &self.header
    }

    fn set_fixed_header(&mut self, header: FixedHeader) {
        self.header = header.with_remaining_length(0);
    }

    fn parse_variable_header(&mut self, input: &mut &Bytes) -> MResult<()> {
        winnow::combinator::trace("MSuback::variable_header", |input: &mut &Bytes| {
            self.packet_identifier = PacketIdentifier::parse(input)?;
            self.properties = Properties::parse(input)?;
            Ok(())
        })
        .parse_next(input)
    }

    fn parse_payload(&mut self, input: &mut &Bytes) -> MResult<()> {
        self.reason_codes = parse_reason_codes(input)?;
        Ok(())
    }

    fn write_variable_header<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;
        self.properties.write(buffer)
    }

    fn write_payload<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_reason_codes(buffer, &self.reason_codes)
    }

    fn is_valid(&self) -> bool {
        self.has_valid_header()
            && self.packet_identifier.is_valid()
            && !self.reason_codes.is_empty()
            && self
                .reason_codes
                .iter()
                .all(|code| code.allowed_in(Self::PACKET_TYPE))
            && self.properties.allowed_in(Self::PACKET_TYPE)
    }

    fn property_lists(&self) -> Vec<&Properties> {
        vec![&self.properties]
    }
}
