//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;
use winnow::Parser;

use crate::MResult;
use crate::bytes::parse_binary_data;
use crate::bytes::write_binary_data;
use crate::error::DecodeError;
use crate::fixed_header::FixedHeader;
use crate::fixed_header::PacketType;
use crate::integers::parse_u16;
use crate::integers::parse_u8;
use crate::packets::ControlPacket;
use crate::properties::Properties;
use crate::qos::QualityOfService;
use crate::strings::parse_string;
use crate::strings::write_string;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

pub const PROTOCOL_NAME: &str = "MQTT";
pub const PROTOCOL_VERSION: u8 = 5;

const RESERVED: u8 = 0b0000_0001;
const CLEAN_START: u8 = 0b0000_0010;
const WILL_FLAG: u8 = 0b0000_0100;
const WILL_QOS: u8 = 0b0001_1000;
const WILL_RETAIN: u8 = 0b0010_0000;
const PASSWORD: u8 = 0b0100_0000;
const USERNAME: u8 = 0b1000_0000;

/// Message the server publishes on behalf of a client that disconnects ungracefully
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Will {
    pub properties: Properties,
    pub topic: String,
    pub payload: Vec<u8>,
    pub quality_of_service: QualityOfService,
    pub retain: bool,
}

impl Will {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Will {
        Will {
            topic: topic.into(),
            payload: payload.into(),
            ..Will::default()
        }
    }
}

/// Presence of the optional payload fields is signalled by the connect flags, so those fields are
/// modelled as `Option`s and the flags derived from them when writing.
#[derive(Clone, Debug, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901033")]
pub struct MConnect {
    header: FixedHeader,
    pub protocol_version: u8,
    pub clean_start: bool,
    pub keep_alive: u16,
    pub properties: Properties,
    pub client_identifier: String,
    pub will: Option<Will>,
    pub username: Option<String>,
    pub password: Option<Vec<u8>>,
}

impl Default for MConnect {
    fn default() -> MConnect {
        MConnect {
            header: FixedHeader::new(PacketType::Connect, 0),
            protocol_version: PROTOCOL_VERSION,
            clean_start: false,
            keep_alive: 0,
            properties: Properties::new(),
            client_identifier: String::new(),
            will: None,
            username: None,
            password: None,
        }
    }
}

impl MConnect {
    pub fn new(client_identifier: impl Into<String>) -> MConnect {
        MConnect {
            client_identifier: client_identifier.into(),
            ..MConnect::default()
        }
    }

    /// The connect flags byte matching the current fields
    pub fn connect_flags(&self) -> u8 {
        let mut flags = 0;

        if self.clean_start {
            flags |= CLEAN_START;
        }

        if let Some(will) = &self.will {
            flags |= WILL_FLAG;
            flags |= u8::from(will.quality_of_service) << 3;
            if will.retain {
                flags |= WILL_RETAIN;
            }
        }

        if self.password.is_some() {
            flags |= PASSWORD;
        }

        if self.username.is_some() {
            flags |= USERNAME;
        }

        flags
    }
}

impl ControlPacket for MConnect {
    const PACKET_TYPE: PacketType = PacketType::Connect;

    fn header(&self) -> &FixedHeader {
        &self.header
    }

    fn set_fixed_header(&mut self, header: FixedHeader) {
        self.header = header.with_remaining_length(0);
    }

    fn parse_variable_header(&mut self, input: &mut &Bytes) -> MResult<()> {
        winnow::combinator::trace("MConnect::variable_header", |input: &mut &Bytes| {
            let protocol_name = parse_string(input)?;
            if protocol_name != PROTOCOL_NAME {
                return Err(DecodeError::ProtocolName.into_parse_error(input));
            }

            self.protocol_version = parse_u8(input)?;

            let flags = parse_u8(input)?;
            if flags & RESERVED != 0 {
                return Err(DecodeError::Malformed.into_parse_error(input));
            }

            self.clean_start = flags & CLEAN_START != 0;

            // Placeholders mark which payload fields follow, parse_payload fills them in
            self.will = if flags & WILL_FLAG != 0 {
                let quality_of_service = QualityOfService::try_from((flags & WILL_QOS) >> 3)
                    .map_err(|_| DecodeError::Malformed.into_parse_error(input))?;

                Some(Will {
                    quality_of_service,
                    retain: flags & WILL_RETAIN != 0,
                    ..Will::default()
                })
            } else if flags & (WILL_QOS | WILL_RETAIN) != 0 {
                return Err(DecodeError::Malformed.into_parse_error(input));
            } else {
                None
            };
            self.password = (flags & PASSWORD != 0).then(Vec::new);
            self.username = (flags & USERNAME != 0).then(String::new);

            self.keep_alive = parse_u16(input)?;
            self.properties = Properties::parse(input)?;

            Ok(())
        })
        .parse_next(input)
    }

    fn parse_payload(&mut self, input: &mut &Bytes) -> MResult<()> {
        winnow::combinator::trace("MConnect::payload", |input: &mut &Bytes| {
            self.client_identifier = parse_string(input)?.to_owned();

            if let Some(will) = &mut self.will {
                will.properties = Properties::parse(input)?;
                will.topic = parse_string(input)?.to_owned();
                will.payload = parse_binary_data(input)?.to_vec();
            }

            if let Some(username) = &mut self.username {
                *username = parse_string(input)?.to_owned();
            }

            if let Some(password) = &mut self.password {
                *password = parse_binary_data(input)?.to_vec();
            }

            Ok(())
        })
        .parse_next(input)
    }

    fn write_variable_header<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_string(buffer, PROTOCOL_NAME)?;
        buffer.write_byte(self.protocol_version)?;
        buffer.write_byte(self.connect_flags())?;
        buffer.write_u16(self.keep_alive)?;
        self.properties.write(buffer)
    }

    fn write_payload<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_string(buffer, &self.client_identifier)?;

        if let Some(will) = &self.will {
            will.properties.write(buffer)?;
            write_string(buffer, &will.topic)?;
            write_binary_data(buffer, &will.payload)?;
        }

        if let Some(username) = &self.username {
            write_string(buffer, username)?;
        }

        if let Some(password) = &self.password {
            write_binary_data(buffer, password)?;
        }

        Ok(())
    }

    fn is_valid(&self) -> bool {
        let will_valid = self.will.as_ref().map_or(true, |will| {
            !will.topic.is_empty() && will.properties.allowed_in_will()
        });

        self.has_valid_header()
            && self.protocol_version == PROTOCOL_VERSION
            && self.properties.allowed_in(Self::PACKET_TYPE)
            && will_valid
    }

    fn property_lists(&self) -> Vec<&Properties> {
        let mut lists = vec![&self.properties];
        if let Some(will) = &self.will {
            lists.push(&will.properties);
        }
        lists
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::MConnect;
    use super::Will;
    use crate::error::DecodeError;
    use crate::error::MqttError;
    use crate::packets::ControlPacket;
    use crate::packets::MqttPacket;
    use crate::qos::QualityOfService;
    use crate::test::make_roundtrip_test;

    #[test]
    fn minimal_connect_bytes() {
        let mut connect = MConnect::new("c");
        connect.clean_start = true;
        connect.keep_alive = 60;

        let bytes = MqttPacket::from(connect).to_bytes().unwrap();
        assert_eq!(
            bytes,
            [
                0x10, 0x0E, // fixed header
                0x00, 0x04, b'M', b'Q', b'T', b'T', // protocol name
                0x05, // version
                0x02, // flags
                0x00, 0x3C, // keep alive
                0x00, // properties
                0x00, 0x01, b'c', // client identifier
            ]
        );
    }

    #[test]
    fn roundtrip_connect() {
        let mut connect = MConnect::new("client-1");
        connect.keep_alive = 30;
        connect.properties.set_session_expiry_interval(120u32);
        connect.properties.set_receive_maximum(10u16);
        connect.properties.add_user_property("region", "eu");

        make_roundtrip_test!(connect);
    }

    #[test]
    fn roundtrip_connect_with_everything() {
        let mut will = Will::new("last/words", &b"gone"[..]);
        will.quality_of_service = QualityOfService::ExactlyOnce;
        will.retain = true;
        will.properties.set_will_delay_interval(5u32);
        will.properties.set_content_type("text/plain");

        let mut connect = MConnect::new("client-2");
        connect.clean_start = true;
        connect.will = Some(will);
        connect.username = Some(String::from("user"));
        connect.password = Some(b"secret".to_vec());

        assert_eq!(connect.connect_flags(), 0b1111_0110);
        assert!(connect.is_valid());

        make_roundtrip_test!(connect);
    }

    #[test]
    fn will_fields_follow_flags() {
        let mut connect = MConnect::new("id");
        connect.password = Some(Vec::new());

        let decoded = make_roundtrip_test!(connect);
        let MqttPacket::Connect(decoded) = decoded else {
            panic!("Expected CONNECT");
        };
        assert_eq!(decoded.will, None);
        assert_eq!(decoded.username, None);
        assert_eq!(decoded.password, Some(Vec::new()));
    }

    #[test]
    fn wrong_protocol_name() {
        let input = [
            0x10, 0x0D, 0x00, 0x04, b'M', b'Q', b'T', b'X', 0x05, 0x02, 0x00, 0x3C, 0x00, 0x00,
            0x00,
        ];

        let error = MqttPacket::parse_complete(&input).unwrap_err();
        assert!(matches!(error, MqttError::Decode(DecodeError::ProtocolName)));
        assert_eq!(error.reason_code(), Some(crate::reason_code::ReasonCode::ProtocolError));
    }

    #[test]
    fn reserved_flag_is_malformed() {
        let input = [
            0x10, 0x0D, 0x00, 0x04, b'M', b'Q', b'T', b'T', 0x05, 0x03, 0x00, 0x3C, 0x00, 0x00,
            0x00,
        ];

        let error = MqttPacket::parse_complete(&input).unwrap_err();
        assert!(matches!(error, MqttError::Decode(DecodeError::Malformed)));
    }

    #[test]
    fn will_bits_without_will_flag_are_malformed() {
        for flags in [0x08, 0x18, 0x20, 0x38] {
            let input = [
                0x10, 0x0D, 0x00, 0x04, b'M', b'Q', b'T', b'T', 0x05, flags, 0x00, 0x3C, 0x00,
                0x00, 0x00,
            ];

            let error = MqttPacket::parse_complete(&input).unwrap_err();
            assert!(
                matches!(error, MqttError::Decode(DecodeError::Malformed)),
                "flags {flags:#04x} gave {error:?}"
            );
        }
    }

    #[test]
    fn other_versions_decode_but_are_invalid() {
        let mut connect = MConnect::new("old");
        connect.protocol_version = 4;

        let decoded = make_roundtrip_test!(connect);
        assert!(!decoded.is_valid());
    }
}
