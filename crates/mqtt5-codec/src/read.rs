//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Pulling packets out of a `std::io::Read`

use std::io::Read;

use crate::error::DecodeError;
use crate::error::MqttError;
use crate::fixed_header::FixedHeader;
use crate::integers::VARIABLE_INTEGER_MAX_BYTES;
use crate::options::DecodeOptions;
use crate::packets::MqttPacket;

/// Bodies up to this size are read with a single call, larger ones grow the buffer in steps
pub const PAYLOAD_BUFFER_SIZE: usize = 32 * 1024;

fn read_byte<R: Read>(reader: &mut R) -> Result<u8, std::io::Error> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0])
}

/// Read a variable byte integer, returning its value and encoded length
pub fn read_variable_u32<R: Read>(reader: &mut R) -> Result<(u32, usize), MqttError> {
    let mut value: u32 = 0;

    for index in 0..VARIABLE_INTEGER_MAX_BYTES {
        let byte = match read_byte(reader) {
            Ok(byte) => byte,
            Err(error) if error.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(DecodeError::VarInt.into());
            }
            Err(error) => return Err(error.into()),
        };

        value |= u32::from(byte & 0x7F) << (7 * index);

        if byte & 0x80 == 0 {
            return Ok((value, index + 1));
        }
    }

    Err(DecodeError::VarInt.into())
}

/// Read the fixed header, returning it together with its size on the wire
///
/// End of input before the first byte surfaces as an [`std::io::ErrorKind::UnexpectedEof`]
/// I/O error, so that callers can tell a closed stream from a truncated packet.
pub fn read_fixed_header<R: Read>(reader: &mut R) -> Result<(FixedHeader, usize), MqttError> {
    let first = read_byte(reader)?;
    let (remaining_length, length_size) = read_variable_u32(reader)?;

    Ok((FixedHeader::from_byte(first, remaining_length), 1 + length_size))
}

fn read_body<R: Read>(reader: &mut R, length: usize) -> Result<Vec<u8>, MqttError> {
    if length <= PAYLOAD_BUFFER_SIZE {
        let mut body = vec![0u8; length];
        reader.read_exact(&mut body)?;
        return Ok(body);
    }

    // Only trust the announced length as far as the bytes actually arrive
    let mut body = Vec::with_capacity(PAYLOAD_BUFFER_SIZE);
    while body.len() < length {
        let start = body.len();
        let chunk = usize::min(PAYLOAD_BUFFER_SIZE, length - start);
        body.resize(start + chunk, 0);
        reader.read_exact(&mut body[start..])?;
    }

    Ok(body)
}

/// Read exactly one packet from `reader`
pub fn read_packet<R: Read>(reader: &mut R) -> Result<MqttPacket, MqttError> {
    read_packet_with(reader, &DecodeOptions::default())
}

/// Read exactly one packet from `reader`, applying `options`
///
/// The size limit is checked against the fixed header before any of the body is read.
pub fn read_packet_with<R: Read>(
    reader: &mut R,
    options: &DecodeOptions,
) -> Result<MqttPacket, MqttError> {
    let (header, header_size) = read_fixed_header(reader)?;
    let packet_type = header.validate()?;
    options.check_packet_size(header_size, header.remaining_length())?;

    tracing::trace!(
        %packet_type,
        remaining_length = header.remaining_length(),
        "Read fixed header"
    );

    let body = read_body(reader, header.remaining_length() as usize)?;

    match MqttPacket::decode_owned(header, body, options) {
        Ok(packet) => Ok(packet),
        Err(error) => {
            tracing::debug!(%packet_type, %error, "Could not decode packet");
            Err(error.into())
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::read_fixed_header;
    use super::read_packet;
    use super::read_packet_with;
    use super::read_variable_u32;
    use crate::error::DecodeError;
    use crate::error::MqttError;
    use crate::fixed_header::PacketType;
    use crate::options::DecodeOptions;
    use crate::packets::MqttPacket;
    use crate::packets::pingreq::MPingreq;

    #[test]
    fn variable_integers() {
        let cases: &[(&[u8], u32)] = &[
            (&[0x00], 0),
            (&[0x7F], 127),
            (&[0x80, 0x01], 128),
            (&[0xFF, 0x7F], 16_383),
            (&[0xFF, 0xFF, 0xFF, 0x7F], 268_435_455),
        ];

        for (bytes, value) in cases {
            let (decoded, size) = read_variable_u32(&mut Cursor::new(*bytes)).unwrap();
            assert_eq!(decoded, *value);
            assert_eq!(size, bytes.len());
        }
    }

    #[test]
    fn overlong_variable_integer() {
        let error =
            read_variable_u32(&mut Cursor::new(&[0xFFu8, 0xFF, 0xFF, 0xFF, 0x01])).unwrap_err();
        assert!(matches!(error, MqttError::Decode(DecodeError::VarInt)));
    }

    #[test]
    fn truncated_variable_integer() {
        let error = read_variable_u32(&mut Cursor::new(&[0x80u8])).unwrap_err();
        assert!(matches!(error, MqttError::Decode(DecodeError::VarInt)));
    }

    #[test]
    fn empty_stream_is_io() {
        let error = read_packet(&mut Cursor::new(&[0u8; 0])).unwrap_err();
        let MqttError::Io(error) = error else {
            panic!("Expected an I/O error");
        };
        assert_eq!(error.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn fixed_header_size() {
        let (header, size) = read_fixed_header(&mut Cursor::new(&[0x30u8, 0x80, 0x01])).unwrap();
        assert_eq!(header.packet_type(), Some(PacketType::Publish));
        assert_eq!(header.remaining_length(), 128);
        assert_eq!(size, 3);
    }

    #[test]
    fn reads_consecutive_packets() {
        let mut cursor = Cursor::new(vec![0xC0u8, 0x00, 0xC0, 0x00]);
        let expected = MqttPacket::from(MPingreq::default());

        assert_eq!(read_packet(&mut cursor).unwrap(), expected);
        assert_eq!(read_packet(&mut cursor).unwrap(), expected);
        assert!(matches!(read_packet(&mut cursor), Err(MqttError::Io(_))));
    }

    #[test]
    fn truncated_body_is_io() {
        let error = read_packet(&mut Cursor::new(&[0x40u8, 0x02, 0x00])).unwrap_err();
        assert!(matches!(error, MqttError::Io(_)));
    }

    #[test]
    fn too_large_is_rejected_before_the_body() {
        let options = DecodeOptions::new().with_maximum_packet_size(4);
        let mut cursor = Cursor::new(&[0x30u8, 0x10]);

        let error = read_packet_with(&mut cursor, &options).unwrap_err();
        assert!(matches!(
            error,
            MqttError::Decode(DecodeError::PacketTooLarge {
                size: 18,
                maximum: 4
            })
        ));
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn invalid_flags_are_rejected() {
        let packet = read_packet(&mut Cursor::new(&[0x62u8, 0x02, 0x00, 0x01])).unwrap();
        assert_eq!(packet.packet_type(), PacketType::Pubrel);

        let error = read_packet(&mut Cursor::new(&[0x60u8, 0x02, 0x00, 0x01])).unwrap_err();
        assert!(matches!(
            error,
            MqttError::Decode(DecodeError::InvalidFlags {
                packet_type: 6,
                flags: 0
            })
        ));
    }
}
