//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

/// Encode a packet, decode the bytes again and check both agree
///
/// Evaluates to the decoded [`MqttPacket`](crate::packets::MqttPacket).
macro_rules! make_roundtrip_test {
    ($packet:expr) => {{
        let instance = $crate::packets::MqttPacket::from($packet);
        let bytes = instance.to_bytes().unwrap();
        let header = instance.fixed_header().unwrap();
        assert_eq!(
            bytes.len(),
            header.binary_size() as usize + header.remaining_length() as usize
        );

        let output = $crate::packets::MqttPacket::parse_complete(&bytes).unwrap();
        pretty_assertions::assert_eq!(instance, output);
        output
    }};
}
pub(crate) use make_roundtrip_test;
