//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::fixed_header::PacketType;
use crate::packets::ack::AckKind;
use crate::packets::ack::MAck;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PubrecKind;

impl AckKind for PubrecKind {
    const PACKET_TYPE: PacketType = PacketType::Pubrec;
}

/// Response to a QoS 2 PUBLISH, the first step of the QoS 2 handshake
#[doc = crate::util::md_speclink!("_Toc3901131")]
pub type MPubrec = MAck<PubrecKind>;

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::MPubrec;
    use crate::packets::MqttPacket;
    use crate::reason_code::ReasonCode;
    use crate::test::make_roundtrip_test;

    #[test]
    fn roundtrip_pubrec() {
        let mut pubrec = MPubrec::new(9u16).with_reason_code(ReasonCode::NotAuthorized);
        pubrec.properties.add_user_property("why", "acl");

        make_roundtrip_test!(pubrec);
    }

    #[test]
    fn pubrec_reason_only() {
        let pubrec = MPubrec::new(9u16).with_reason_code(ReasonCode::NoMatchingSubscribers);

        assert_eq!(
            MqttPacket::from(pubrec).to_bytes().unwrap(),
            [0x50, 0x04, 0x00, 0x09, 0x10, 0x00]
        );
    }
}
