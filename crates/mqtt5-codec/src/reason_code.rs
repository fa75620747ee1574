//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Reason codes shared by the acknowledgement, DISCONNECT and AUTH packets

use winnow::Bytes;
use winnow::Parser;

use crate::MResult;
use crate::fixed_header::PacketType;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

macro_rules! define_reason_codes {
    ($(
        $name:ident = $code:tt => $description:literal in [$($packet:ident),+]
    ),* $(,)?) => {
        /// One byte outcome of an operation
        ///
        /// Codes below `0x80` indicate success, the others failure.
        #[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
        #[derive(bytemuck::NoUninit, bytemuck::CheckedBitPattern)]
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[doc = crate::util::md_speclink!("_Toc3901031")]
        pub enum ReasonCode {
            $( $name = $code, )*
        }

        impl ReasonCode {
            /// Human readable name of the code as used by the MQTT standard
            pub fn description(&self) -> &'static str {
                match self {
                    $( ReasonCode::$name => $description, )*
                }
            }

            /// Whether a packet of type `packet_type` may carry this code
            pub fn allowed_in(&self, packet_type: PacketType) -> bool {
                match self {
                    $( ReasonCode::$name => matches!(packet_type, $(PacketType::$packet)|+), )*
                }
            }
        }
    };
}

define_reason_codes! {
    Success = 0x00 => "Success" in [Connack, Puback, Pubrec, Pubrel, Pubcomp, Suback, Unsuback, Disconnect, Auth],
    GrantedQoS1 = 0x01 => "Granted QoS 1" in [Suback],
    GrantedQoS2 = 0x02 => "Granted QoS 2" in [Suback],
    DisconnectWithWillMessage = 0x04 => "Disconnect with Will Message" in [Disconnect],
    NoMatchingSubscribers = 0x10 => "No matching subscribers" in [Puback, Pubrec],
    NoSubscriptionExisted = 0x11 => "No subscription existed" in [Unsuback],
    ContinueAuthentication = 0x18 => "Continue authentication" in [Auth],
    ReAuthenticate = 0x19 => "Re-authenticate" in [Auth],
    UnspecifiedError = 0x80 => "Unspecified error" in [Connack, Puback, Pubrec, Suback, Unsuback, Disconnect],
    MalformedPacket = 0x81 => "Malformed Packet" in [Connack, Disconnect],
    ProtocolError = 0x82 => "Protocol Error" in [Connack, Disconnect],
    ImplementationSpecificError = 0x83 => "Implementation specific error" in [Connack, Puback, Pubrec, Suback, Unsuback, Disconnect],
    UnsupportedProtocolVersion = 0x84 => "Unsupported Protocol Version" in [Connack],
    ClientIdentifierNotValid = 0x85 => "Client Identifier not valid" in [Connack],
    BadUsernameOrPassword = 0x86 => "Bad User Name or Password" in [Connack],
    NotAuthorized = 0x87 => "Not authorized" in [Connack, Puback, Pubrec, Suback, Unsuback, Disconnect],
    ServerUnavailable = 0x88 => "Server unavailable" in [Connack],
    ServerBusy = 0x89 => "Server busy" in [Connack, Disconnect],
    Banned = 0x8A => "Banned" in [Connack],
    ServerShuttingDown = 0x8B => "Server shutting down" in [Disconnect],
    BadAuthenticationMethod = 0x8C => "Bad authentication method" in [Connack, Disconnect],
    KeepAliveTimeout = 0x8D => "Keep Alive timeout" in [Disconnect],
    SessionTakenOver = 0x8E => "Session taken over" in [Disconnect],
    TopicFilterInvalid = 0x8F => "Topic Filter invalid" in [Suback, Unsuback, Disconnect],
    TopicNameInvalid = 0x90 => "Topic Name invalid" in [Connack, Puback, Pubrec, Disconnect],
    PacketIdentifierInUse = 0x91 => "Packet Identifier in use" in [Puback, Pubrec, Suback, Unsuback],
    PacketIdentifierNotFound = 0x92 => "Packet Identifier not found" in [Pubrel, Pubcomp],
    ReceiveMaximumExceeded = 0x93 => "Receive Maximum exceeded" in [Disconnect],
    TopicAliasInvalid = 0x94 => "Topic Alias invalid" in [Disconnect],
    PacketTooLarge = 0x95 => "Packet too large" in [Connack, Disconnect],
    MessageRateTooHigh = 0x96 => "Message rate too high" in [Disconnect],
    QuotaExceeded = 0x97 => "Quota exceeded" in [Connack, Puback, Pubrec, Suback, Disconnect],
    AdministrativeAction = 0x98 => "Administrative action" in [Disconnect],
    PayloadFormatInvalid = 0x99 => "Payload format invalid" in [Connack, Puback, Pubrec, Disconnect],
    RetainNotSupported = 0x9A => "Retain not supported" in [Connack, Disconnect],
    QoSNotSupported = 0x9B => "QoS not supported" in [Connack, Disconnect],
    UseAnotherServer = 0x9C => "Use another server" in [Connack, Disconnect],
    ServerMoved = 0x9D => "Server moved" in [Connack, Disconnect],
    SharedSubscriptionsNotSupported = 0x9E => "Shared Subscriptions not supported" in [Suback, Disconnect],
    ConnectionRateExceeded = 0x9F => "Connection rate exceeded" in [Connack, Disconnect],
    MaximumConnectTime = 0xA0 => "Maximum connect time" in [Disconnect],
    SubscriptionIdentifiersNotSupported = 0xA1 => "Subscription Identifiers not supported" in [Suback, Disconnect],
    WildcardSubscriptionsNotSupported = 0xA2 => "Wildcard Subscriptions not supported" in [Suback, Disconnect],
}

impl ReasonCode {
    /// `0x00` as carried by a DISCONNECT
    pub const NORMAL_DISCONNECTION: ReasonCode = ReasonCode::Success;
    /// `0x00` as carried by a SUBACK
    pub const GRANTED_QOS_0: ReasonCode = ReasonCode::Success;

    pub fn is_success(&self) -> bool {
        u8::from(*self) < 0x80
    }

    pub fn parse(input: &mut &Bytes) -> MResult<ReasonCode> {
        winnow::combinator::trace(
            "mqtt_reason_code",
            winnow::binary::u8.try_map(ReasonCode::try_from),
        )
        .parse_next(input)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_byte((*self).into())
    }
}

impl core::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({:#04x})", self.description(), u8::from(*self))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use super::ReasonCode;
    use crate::fixed_header::PacketType;

    #[test]
    fn lookup_by_byte() {
        assert_eq!(
            ReasonCode::try_from(0x87u8).ok(),
            Some(ReasonCode::NotAuthorized)
        );
        assert_eq!(ReasonCode::NotAuthorized.description(), "Not authorized");
        assert!(ReasonCode::try_from(0x03u8).is_err());
        assert!(ReasonCode::try_from(0xA3u8).is_err());
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert_eq!(
            ReasonCode::parse(&mut Bytes::new(&[0x9B])).unwrap(),
            ReasonCode::QoSNotSupported
        );
        assert!(ReasonCode::parse(&mut Bytes::new(&[0x05])).is_err());
    }

    #[test]
    fn success_and_failure() {
        assert!(ReasonCode::NORMAL_DISCONNECTION.is_success());
        assert!(ReasonCode::ReAuthenticate.is_success());
        assert!(!ReasonCode::UnspecifiedError.is_success());
    }

    #[test]
    fn codes_are_scoped_to_packets() {
        assert!(ReasonCode::GRANTED_QOS_0.allowed_in(PacketType::Suback));
        assert!(ReasonCode::GrantedQoS2.allowed_in(PacketType::Suback));
        assert!(!ReasonCode::GrantedQoS2.allowed_in(PacketType::Puback));
        assert!(ReasonCode::PacketIdentifierNotFound.allowed_in(PacketType::Pubrel));
        assert!(!ReasonCode::PacketIdentifierNotFound.allowed_in(PacketType::Puback));
        assert!(!ReasonCode::Success.allowed_in(PacketType::Connect));
    }

    #[test]
    fn display_names_the_code() {
        assert_eq!(
            ReasonCode::ServerMoved.to_string(),
            "Server moved (0x9d)"
        );
    }
}
