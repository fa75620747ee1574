//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::fixed_header::PacketType;
use crate::packets::ping::MPing;
use crate::packets::ping::PingKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PingreqKind;

impl PingKind for PingreqKind {
    const PACKET_TYPE: PacketType = PacketType::Pingreq;
}

#[doc = crate::util::md_speclink!("_Toc3901195")]
pub type MPingreq = MPing<PingreqKind>;
