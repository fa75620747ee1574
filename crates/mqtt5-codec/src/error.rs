//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::error::ContextError;
use winnow::error::ErrMode;
use winnow::error::FromExternalError;
use winnow::Bytes;

use crate::reason_code::ReasonCode;

/// Everything that can go wrong while turning bytes into a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Remaining Length declares {declared} bytes but {actual} were decoded")]
    SizeMismatch { declared: u32, actual: u32 },

    #[error("Packet type {0} is not supported")]
    UnsupportedPacketType(u8),

    #[error("Flags {flags:#06b} are not valid for packet type {packet_type}")]
    InvalidFlags { packet_type: u8, flags: u8 },

    #[error("Unknown property identifier {0:#04x}")]
    UnknownProperty(u8),

    #[error("Property {0:#04x} may only appear once")]
    DuplicateProperty(u8),

    #[error("Property length declares {declared} bytes but the entries span {actual}")]
    PropertyLength { declared: u32, actual: u32 },

    #[error("Protocol name must be \"MQTT\"")]
    ProtocolName,

    #[error("Malformed variable byte integer")]
    VarInt,

    #[error("SUBSCRIBE and UNSUBSCRIBE must carry at least one topic filter")]
    EmptyTopicFilters,

    #[error("Packet of {size} bytes exceeds the maximum packet size of {maximum}")]
    PacketTooLarge { size: u64, maximum: u32 },

    #[error("Malformed packet")]
    Malformed,
}

impl DecodeError {
    /// The reason code a server would send back when disconnecting a peer for this error
    pub fn reason_code(&self) -> ReasonCode {
        match self {
            DecodeError::UnsupportedPacketType(_)
            | DecodeError::ProtocolName
            | DecodeError::DuplicateProperty(_)
            | DecodeError::EmptyTopicFilters => ReasonCode::ProtocolError,
            DecodeError::PacketTooLarge { .. } => ReasonCode::PacketTooLarge,
            DecodeError::SizeMismatch { .. }
            | DecodeError::InvalidFlags { .. }
            | DecodeError::UnknownProperty(_)
            | DecodeError::PropertyLength { .. }
            | DecodeError::VarInt
            | DecodeError::Malformed => ReasonCode::MalformedPacket,
        }
    }

    /// Recover the typed error carried by a failed parser, falling back to [`DecodeError::Malformed`]
    pub(crate) fn from_parse_error(error: ErrMode<ContextError>) -> DecodeError {
        match error {
            ErrMode::Backtrack(error) | ErrMode::Cut(error) => error
                .cause()
                .and_then(|cause| cause.downcast_ref::<DecodeError>())
                .copied()
                .unwrap_or(DecodeError::Malformed),
            ErrMode::Incomplete(_) => DecodeError::Malformed,
        }
    }

    /// Wrap this error so that it can be returned from a parser
    pub(crate) fn into_parse_error(self, input: &&Bytes) -> ErrMode<ContextError> {
        ErrMode::Cut(ContextError::from_external_error(input, self))
    }
}

/// Everything that can go wrong while turning a packet into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MqttWriteError {
    #[error("A field of {0} bytes does not fit into a two byte length prefix")]
    FieldTooLong(usize),

    #[error("{0} does not fit into a variable byte integer")]
    VarIntOutOfRange(u64),

    #[error("SUBSCRIBE and UNSUBSCRIBE must carry at least one topic filter")]
    EmptyTopicFilters,
}

impl MqttWriteError {
    pub fn reason_code(&self) -> ReasonCode {
        match self {
            MqttWriteError::FieldTooLong(_) => ReasonCode::MalformedPacket,
            MqttWriteError::VarIntOutOfRange(_) => ReasonCode::PacketTooLarge,
            MqttWriteError::EmptyTopicFilters => ReasonCode::ProtocolError,
        }
    }
}

/// Errors surfaced by the `std::io` entry points
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    #[error("Reading from or writing to the underlying stream failed")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Write(#[from] MqttWriteError),
}

impl MqttError {
    /// The reason code matching this error, transport failures have none
    pub fn reason_code(&self) -> Option<ReasonCode> {
        match self {
            MqttError::Io(_) => None,
            MqttError::Decode(error) => Some(error.reason_code()),
            MqttError::Write(error) => Some(error.reason_code()),
        }
    }
}

#[cfg(test)]
mod test {
    use winnow::Bytes;
    use winnow::Parser;

    use super::DecodeError;
    use super::MqttError;
    use crate::reason_code::ReasonCode;

    #[test]
    fn typed_error_survives_parser() {
        let input = &[0x00][..];
        let result = (|input: &mut &Bytes| -> crate::MResult<()> {
            Err(DecodeError::ProtocolName.into_parse_error(input))
        })
        .parse_peek(Bytes::new(input));

        let error = DecodeError::from_parse_error(result.unwrap_err());
        assert_eq!(error, DecodeError::ProtocolName);
    }

    #[test]
    fn plain_parser_failure_is_malformed() {
        let input = &[0x00][..];
        let result = winnow::binary::be_u16::<_, winnow::error::ErrMode<winnow::error::ContextError>>
            .parse_peek(Bytes::new(input));

        let error = DecodeError::from_parse_error(result.unwrap_err());
        assert_eq!(error, DecodeError::Malformed);
    }

    #[test]
    fn reason_codes() {
        assert_eq!(
            DecodeError::ProtocolName.reason_code(),
            ReasonCode::ProtocolError
        );
        assert_eq!(
            DecodeError::PacketTooLarge {
                size: 10,
                maximum: 5
            }
            .reason_code(),
            ReasonCode::PacketTooLarge
        );
        assert_eq!(
            MqttError::from(DecodeError::VarInt).reason_code(),
            Some(ReasonCode::MalformedPacket)
        );
        let io = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert_eq!(MqttError::from(io).reason_code(), None);
    }
}
