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
use crate::integers::parse_u8;
use crate::packets::ControlPacket;
use crate::properties::Properties;
use crate::reason_code::ReasonCode;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

const SESSION_PRESENT: u8 = 0b0000_0001;

#[derive(Clone, Debug, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901074")]
pub struct MConnack {
    header: FixedHeader,
    pub session_present: bool,
    pub reason_code: ReasonCode,
    pub properties: Properties,
}

impl Default for MConnack {
    fn default() -> MConnack {
        MConnack {
            header: FixedHeader::new(PacketType::Connack, 0),
            session_present: false,
            reason_code: ReasonCode::Success,
            properties: Properties::new(),
        }
    }
}

impl MConnack {
    pub fn new(reason_code: ReasonCode) -> MConnack {
        MConnack {
            reason_code,
            ..MConnack::default()
        }
    }
}

impl ControlPacket for MConnack {
    const PACKET_TYPE: PacketType = PacketType::Connack;

    fn header(&self) -> &FixedHeader {
        &self.header
    }

    fn set_fixed_header(&mut self, header: FixedHeader) {
        self.header = header.with_remaining_length(0);
    }

    fn parse_variable_header(&mut self, input: &mut &Bytes) -> MResult<()> {
        winnow::combinator::trace("MConnack::variable_header", |input: &mut &Bytes| {
            let acknowledge_flags = parse_u8(input)?;
            if acknowledge_flags & !SESSION_PRESENT != 0 {
                return Err(DecodeError::Malformed.into_parse_error(input));
            }

            self.session_present = acknowledge_flags & SESSION_PRESENT != 0;
            self.reason_code = ReasonCode::parse(input)?;
            self.properties = Properties::parse(input)?;

            Ok(())
        })
        .parse_next(input)
    }

    fn parse_payload(&mut self, _input: &mut &Bytes) -> MResult<()> {
        Ok(())
    }

    fn write_variable_header<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_byte(if self.session_present { SESSION_PRESENT } else { 0 })?;
        self.reason_code.write(buffer)?;
        self.properties.write(buffer)
    }

    fn write_payload<W: WriteMqttPacket>(&self, _buffer: &mut W) -> WResult<W> {
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.has_valid_header()
            && self.reason_code.allowed_in(Self::PACKET_TYPE)
            && self.properties.allowed_in(Self::PACKET_TYPE)
            && !(self.session_present && !self.reason_code.is_success())
    }

    fn property_lists(&self) -> Vec<&Properties> {
        vec![&self.properties]
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::MConnack;
    use crate::error::DecodeError;
    use crate::error::MqttError;
    use crate::packets::ControlPacket;
    use crate::packets::MqttPacket;
    use crate::reason_code::ReasonCode;
    use crate::test::make_roundtrip_test;

    #[test]
    fn roundtrip_connack() {
        let mut connack = MConnack::new(ReasonCode::Success);
        connack.session_present = true;
        connack.properties.set_assigned_client_identifier("auto-1234");
        connack.properties.set_server_keep_alive(45u16);

        make_roundtrip_test!(connack);
    }

    #[test]
    fn refused_connack_bytes() {
        let connack = MConnack::new(ReasonCode::NotAuthorized);
        assert!(connack.is_valid());

        assert_eq!(
            MqttPacket::from(connack).to_bytes().unwrap(),
            [0x20, 0x03, 0x00, 0x87, 0x00]
        );
    }

    #[test]
    fn session_present_with_failure_is_invalid() {
        let mut connack = MConnack::new(ReasonCode::ServerBusy);
        connack.session_present = true;
        assert!(!connack.is_valid());
    }

    #[test]
    fn reserved_acknowledge_flags_are_malformed() {
        let error = MqttPacket::parse_complete(&[0x20, 0x03, 0x02, 0x00, 0x00]).unwrap_err();
        assert!(matches!(error, MqttError::Decode(DecodeError::Malformed)));
    }

    #[test]
    fn unknown_reason_code_is_malformed() {
        let error = MqttPacket::parse_complete(&[0x20, 0x03, 0x00, 0x03, 0x00]).unwrap_err();
        assert!(matches!(error, MqttError::Decode(DecodeError::Malformed)));
    }
}
