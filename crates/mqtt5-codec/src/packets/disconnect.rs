//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;
use winnow::Parser;

use crate::MResult;
use crate::fixed_header::FixedHeader;
use crate::fixed_header::PacketType;
use crate::packets::ControlPacket;
use crate::properties::Properties;
use crate::reason_code::ReasonCode;
use crate::variable_header::parse_optional_reason;
use crate::variable_header::write_optional_reason;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

/// Final packet of a connection, sent by either side
///
/// Both the reason code and the properties may be omitted, `[0xE0, 0x00]` is a normal disconnection.
#[derive(Clone, Debug, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901205")]
pub struct MDisconnect {
    header: FixedHeader,
    pub reason_code: ReasonCode,
    pub properties: Properties,
}

impl Default for MDisconnect {
    fn default() -> MDisconnect {
        MDisconnect {
            header: FixedHeader::new(PacketType::Disconnect, 0),
            reason_code: ReasonCode::Success,
            properties: Properties::new(),
        }
    }
}

impl MDisconnect {
    pub fn new(reason_code: ReasonCode) -> MDisconnect {
        MDisconnect {
            reason_code,
            ..MDisconnect::default()
        }
    }
}

impl ControlPacket for MDisconnect {
    const PACKET_TYPE: PacketType = PacketType::Disconnect;

    fn header(&self) -> &FixedHeader {
        &self.header
    }

    fn set_fixed_header(&mut self, header: FixedHeader) {
        self.header = header.with_remaining_length(0);
    }

    fn parse_variable_header(&mut self, input: &mut &Bytes) -> MResult<()> {
        (self.reason_code, self.properties) =
            winnow::combinator::trace("MDisconnect::variable_header", parse_optional_reason)
                .parse_next(input)?;
        Ok(())
    }

    fn parse_payload(&mut self, _input: &mut &Bytes) -> MResult<()> {
        Ok(())
    }

    fn write_variable_header<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_optional_reason(buffer, self.reason_code, &self.properties)
    }

    fn write_payload<W: WriteMqttPacket>(&self, _buffer: &mut W) -> WResult<W> {
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.has_valid_header()
            && self.reason_code.allowed_in(Self::PACKET_TYPE)
            && self.properties.allowed_in(Self::PACKET_TYPE)
    }

    fn property_lists(&self) -> Vec<&Properties> {
        vec![&self.properties]
    }
}
