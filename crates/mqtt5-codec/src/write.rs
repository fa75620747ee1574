//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Byte sinks that packets serialize into

use crate::error::MqttError;
use crate::error::MqttWriteError;
use crate::packets::MqttPacket;

pub type WResult<W> = core::result::Result<(), <W as WriteMqttPacket>::Error>;

/// A destination for serialized packet bytes
///
/// Every encoder in this crate writes through this trait, so the same code path produces bytes
/// for a socket, for an in-memory buffer and for the size computation of the fixed header.
pub trait WriteMqttPacket {
    type Error: From<MqttWriteError>;

    fn write_byte(&mut self, u: u8) -> WResult<Self>;
    fn write_slice(&mut self, u: &[u8]) -> WResult<Self>;

    #[inline]
    fn write_u16(&mut self, u: u16) -> WResult<Self> {
        self.write_slice(&u.to_be_bytes())
    }

    #[inline]
    fn write_u32(&mut self, u: u32) -> WResult<Self> {
        self.write_slice(&u.to_be_bytes())
    }
}

impl WriteMqttPacket for Vec<u8> {
    type Error = MqttWriteError;

    fn write_byte(&mut self, u: u8) -> WResult<Self> {
        self.push(u);
        Ok(())
    }

    fn write_slice(&mut self, u: &[u8]) -> WResult<Self> {
        self.extend_from_slice(u);
        Ok(())
    }
}

/// A sink that discards its input and only counts it
///
/// Used to learn the Remaining Length of a packet before its fixed header is written.
#[derive(Debug, Default)]
pub struct CountingWriter {
    count: usize,
}

impl CountingWriter {
    pub fn new() -> CountingWriter {
        CountingWriter::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl WriteMqttPacket for CountingWriter {
    type Error = MqttWriteError;

    fn write_byte(&mut self, _u: u8) -> WResult<Self> {
        self.count += 1;
        Ok(())
    }

    fn write_slice(&mut self, u: &[u8]) -> WResult<Self> {
        self.count += u.len();
        Ok(())
    }
}

/// Adapts any [`std::io::Write`] into a packet sink
#[derive(Debug)]
pub struct IoWriter<W> {
    inner: W,
}

impl<W: std::io::Write> IoWriter<W> {
    pub fn new(inner: W) -> IoWriter<W> {
        IoWriter { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: std::io::Write> WriteMqttPacket for IoWriter<W> {
    type Error = MqttError;

    fn write_byte(&mut self, u: u8) -> WResult<Self> {
        self.inner.write_all(&[u])?;
        Ok(())
    }

    fn write_slice(&mut self, u: &[u8]) -> WResult<Self> {
        self.inner.write_all(u)?;
        Ok(())
    }
}

/// Serialize `packet` into `writer`, returning the number of bytes written
///
/// Bytes are handed to the writer as they are produced, wrap it in a [`std::io::BufWriter`] when
/// it is unbuffered.
pub fn write_packet<W: std::io::Write>(
    writer: &mut W,
    packet: &MqttPacket,
) -> Result<usize, MqttError> {
    packet.write(&mut IoWriter::new(writer))
}
