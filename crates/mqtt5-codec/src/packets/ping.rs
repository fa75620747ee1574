//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! PINGREQ and PINGRESP, packets without a body

use core::marker::PhantomData;

use winnow::Bytes;

use crate::MResult;
use crate::fixed_header::FixedHeader;
use crate::fixed_header::PacketType;
use crate::packets::ControlPacket;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

pub trait PingKind: Clone + Copy + core::fmt::Debug + Default + PartialEq + Eq {
    const PACKET_TYPE: PacketType;
}

/// A packet consisting of nothing but its fixed header
#[derive(Clone, Debug, PartialEq)]
pub struct MPing<K> {
    header: FixedHeader,
    kind: PhantomData<K>,
}

impl<K: PingKind> Default for MPing<K> {
    fn default() -> MPing<K> {
        MPing {
            header: FixedHeader::new(K::PACKET_TYPE, 0),
            kind: PhantomData,
        }
    }
}

impl<K: PingKind> MPing<K> {
    pub fn new() -> MPing<K> {
        MPing::default()
    }
}

impl<K: PingKind> ControlPacket for MPing<K> {
    const PACKET_TYPE: PacketType = K::PACKET_TYPE;

    fn header(&self) -> &FixedHeader {
        &self.header
    }

    fn set_fixed_header(&mut self, header: FixedHeader) {
        self.header = header.with_remaining_length(0);
    }

    fn parse_variable_header(&mut self, _input: &mut &Bytes) -> MResult<()> {
        Ok(())
    }

    fn parse_payload(&mut self, _input: &mut &Bytes) -> MResult<()> {
        Ok(())
    }

    fn write_variable_header<W: WriteMqttPacket>(&self, _buffer: &mut W) -> WResult<W> {
        Ok(())
    }

    fn write_payload<W: WriteMqttPacket>(&self, _buffer: &mut W) -> WResult<W> {
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.has_valid_header()
    }
}
