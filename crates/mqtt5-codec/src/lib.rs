//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! A byte-exact encoder and decoder for MQTT v5.0 control packets
//!
//! Decoding reads a fixed header from a byte source, dispatches on the packet type and runs the
//! variable header and payload parsers of that packet, checking that exactly the declared
//! Remaining Length was consumed. Encoding first serializes the body into a counting sink to learn
//! the Remaining Length, then emits the fixed header followed by the body.
//!
//! The codec performs no network I/O of its own, see [`read_packet`] and [`write_packet`] for the
//! `std::io` entry points and [`write::WriteMqttPacket`] for custom sinks.

#![deny(missing_debug_implementations)]
#![deny(clippy::disallowed_methods)]
#![deny(clippy::disallowed_types)]

pub mod bytes;
pub mod error;
pub mod fixed_header;
pub mod integers;
pub mod options;
pub mod packets;
pub mod properties;
pub mod qos;
pub mod read;
pub mod reason_code;
pub mod strings;
pub mod variable_header;
pub mod write;

#[cfg(test)]
mod test;
mod util;

pub use error::DecodeError;
pub use error::MqttError;
pub use error::MqttWriteError;
pub use options::DecodeOptions;
pub use packets::MqttPacket;
pub use read::read_packet;
pub use read::read_packet_with;
pub use write::write_packet;

pub type MResult<O> = winnow::ModalResult<O>;
