//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::fixed_header::PacketType;
use crate::packets::ack::AckKind;
use crate::packets::ack::MAck;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PubrelKind;

impl AckKind for PubrelKind {
    const PACKET_TYPE: PacketType = PacketType::Pubrel;
}

/// Response to a PUBREC, the second step of the QoS 2 handshake
#[doc = crate::util::md_speclink!("_Toc3901141")]
pub type MPubrel = MAck<PubrelKind>;
