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

/// Step of an extended authentication exchange
///
/// Like DISCONNECT, a bare `[0xF0, 0x00]` stands for success without properties.
#[derive(Clone, Debug, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901217")]
pub struct MAuth {
    header: FixedHeader,
    pub reason_code: ReasonCode,
    pub properties: Properties,
}

impl Default for MAuth {
    fn default() -> MAuth {
        MAuth {
            header: FixedHeader::new(PacketType::Auth, 0),
            reason_code: ReasonCode::Success,
            properties: Properties::new(),
        }
    }
}

impl MAuth {
    pub fn new(reason_code: ReasonCode) -> MAuth {
        MAuth {
            reason_code,
            ..MAuth::default()
        }
    }
}

impl ControlPacket for MAuth {
    const PACKET_TYPE: PacketType = PacketType::Auth;

    fn header(&self) -> &FixedHeader {
        &self.header
    }

    fn set_fixed_header(&mut self, header: FixedHeader) {
        self.header = header.with_remaining_length(0);
    }

    fn parse_variable_header(&mut self, input: &mut &Bytes) -> MResult<()> {
        (self.reason_code, self.properties) =
            winnow::combinator::trace("MAuth::variable_header", parse_optional_reason)
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
