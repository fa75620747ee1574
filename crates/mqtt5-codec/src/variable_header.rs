//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Components shared by the variable headers of several packets

use winnow::Bytes;
use winnow::Parser;

use crate::MResult;
use crate::integers::parse_u16;
use crate::properties::Properties;
use crate::reason_code::ReasonCode;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[doc = crate::util::md_speclink!("_Toc3901026")]
pub struct PacketIdentifier(pub u16);

impl PacketIdentifier {
    pub fn parse(input: &mut &Bytes) -> MResult<PacketIdentifier> {
        winnow::combinator::trace("PacketIdentifier", parse_u16.map(PacketIdentifier))
            .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        2
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_u16(self.0)
    }

    /// Packets that carry an identifier must not use zero
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl From<u16> for PacketIdentifier {
    fn from(value: u16) -> PacketIdentifier {
        PacketIdentifier(value)
    }
}

/// Parse the optional reason code and property list ending a variable header
///
/// An exhausted input means [`ReasonCode::Success`] without properties, a lone reason code means
/// no properties.
pub fn parse_optional_reason(input: &mut &Bytes) -> MResult<(ReasonCode, Properties)> {
    winnow::combinator::trace("OptionalReason", |input: &mut &Bytes| {
        if input.is_empty() {
            return Ok((ReasonCode::Success, Properties::new()));
        }

        let reason_code = ReasonCode::parse(input)?;

        if input.is_empty() {
            return Ok((reason_code, Properties::new()));
        }

        let properties = Properties::parse(input)?;
        Ok((reason_code, properties))
    })
    .parse_next(input)
}

/// Counterpart of [`parse_optional_reason`], omitting both parts for a bare success
pub fn write_optional_reason<W: WriteMqttPacket>(
    buffer: &mut W,
    reason_code: ReasonCode,
    properties: &Properties,
) -> WResult<W> {
    if reason_code == ReasonCode::Success && properties.is_empty() {
        return Ok(());
    }

    reason_code.write(buffer)?;
    properties.write(buffer)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use super::parse_optional_reason;
    use super::write_optional_reason;
    use crate::properties::Properties;
    use crate::reason_code::ReasonCode;

    #[test]
    fn omitted_reason_is_success() {
        let (reason, properties) = parse_optional_reason(&mut Bytes::new(&[0u8; 0])).unwrap();
        assert_eq!(reason, ReasonCode::Success);
        assert!(properties.is_empty());
    }

    #[test]
    fn reason_without_properties() {
        let (reason, properties) = parse_optional_reason(&mut Bytes::new(&[0x8E])).unwrap();
        assert_eq!(reason, ReasonCode::SessionTakenOver);
        assert!(properties.is_empty());
    }

    #[test]
    fn written_forms() {
        let mut buffer = Vec::new();
        write_optional_reason(&mut buffer, ReasonCode::Success, &Properties::new()).unwrap();
        assert!(buffer.is_empty());

        write_optional_reason(&mut buffer, ReasonCode::ServerBusy, &Properties::new()).unwrap();
        assert_eq!(buffer, [0x89, 0x00]);
    }
}
