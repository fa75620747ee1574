//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::fixed_header::PacketType;
use crate::packets::ping::MPing;
use crate::packets::ping::PingKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PingrespKind;

impl PingKind for PingrespKind {
    const PACKET_TYPE: PacketType = PacketType::Pingresp;
}

#[doc = crate::util::md_speclink!("_Toc3901200")]
pub type MPingresp = MPing<PingrespKind>;

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::MPingresp;
    use crate::packets::MqttPacket;
    use crate::test::make_roundtrip_test;

    #[test]
    fn roundtrip_pingresp() {
        assert_eq!(
            MqttPacket::from(MPingresp::new()).to_bytes().unwrap(),
            [0xD0, 0x00]
        );
        make_roundtrip_test!(MPingresp::new());
    }

    #[test]
    fn pingresp_with_body_is_rejected() {
        assert!(MqttPacket::parse_complete(&[0xD0, 0x01, 0x00]).is_err());
    }
}
