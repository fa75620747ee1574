//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::io::Cursor;

use mqtt5_codec::MqttPacket;
use mqtt5_codec::packets::ControlPacket;
use mqtt5_codec::packets::auth::MAuth;
use mqtt5_codec::packets::connack::MConnack;
use mqtt5_codec::packets::connect::MConnect;
use mqtt5_codec::packets::connect::Will;
use mqtt5_codec::packets::disconnect::MDisconnect;
use mqtt5_codec::packets::pingreq::MPingreq;
use mqtt5_codec::packets::pingresp::MPingresp;
use mqtt5_codec::packets::puback::MPuback;
use mqtt5_codec::packets::pubcomp::MPubcomp;
use mqtt5_codec::packets::publish::MPublish;
use mqtt5_codec::packets::pubrec::MPubrec;
use mqtt5_codec::packets::pubrel::MPubrel;
use mqtt5_codec::packets::suback::MSuback;
use mqtt5_codec::packets::subscribe::MSubscribe;
use mqtt5_codec::packets::subscribe::RetainHandling;
use mqtt5_codec::packets::subscribe::Subscription;
use mqtt5_codec::packets::unsuback::MUnsuback;
use mqtt5_codec::packets::unsubscribe::MUnsubscribe;
use mqtt5_codec::qos::QualityOfService;
use mqtt5_codec::read_packet;
use mqtt5_codec::reason_code::ReasonCode;
use mqtt5_codec::write_packet;
use pretty_assertions::assert_eq;

fn populated_packets() -> Vec<MqttPacket> {
    let mut connect = MConnect::new("roundtrip-client");
    connect.clean_start = true;
    connect.keep_alive = 30;
    connect.properties.set_receive_maximum(20u16);
    connect.properties.set_request_problem_information(1u8);
    let mut will = Will::new("clients/roundtrip/status", &b"offline"[..]);
    will.quality_of_service = QualityOfService::AtLeastOnce;
    will.retain = true;
    will.properties.set_will_delay_interval(5u32);
    will.properties.set_content_type("text/plain");
    connect.will = Some(will);
    connect.username = Some(String::from("user"));
    connect.password = Some(b"secret".to_vec());

    let mut connack = MConnack::new(ReasonCode::Success);
    connack.properties.set_assigned_client_identifier("assigned");
    connack.properties.set_maximum_qos(1u8);
    connack.properties.set_topic_alias_maximum(10u16);

    let mut publish = MPublish::new("sensors/1/temperature", &b"21.5"[..]);
    publish.set_qos(QualityOfService::ExactlyOnce);
    publish.set_retain(true);
    publish.packet_identifier = 7.into();
    publish.properties.set_message_expiry_interval(60u32);
    publish.properties.set_response_topic("sensors/1/reply");
    publish.properties.set_correlation_data(&b"corr"[..]);
    publish.properties.set_subscription_identifier(268_435_455u32);

    let mut puback = MPuback::new(7u16).with_reason_code(ReasonCode::NoMatchingSubscribers);
    puback.properties.set_reason_string("nobody listens");

    let mut subscription = Subscription::new("sensors/+/temperature", QualityOfService::AtLeastOnce);
    subscription.options.no_local = true;
    subscription.options.retain_as_published = true;
    subscription.options.retain_handling = RetainHandling::DoNotSendRetainedMessages;
    let mut subscribe = MSubscribe::new(
        9u16,
        vec![subscription, Subscription::new("alerts/#", QualityOfService::AtMostOnce)],
    );
    subscribe.properties.set_subscription_identifier(42u32);

    let suback = MSuback::new(
        9u16,
        vec![ReasonCode::GrantedQoS1, ReasonCode::NotAuthorized],
    );

    let unsubscribe = MUnsubscribe::new(10u16, ["sensors/+/temperature", "alerts/#"]);
    let unsuback = MUnsuback::new(
        10u16,
        vec![ReasonCode::Success, ReasonCode::NoSubscriptionExisted],
    );

    let mut disconnect = MDisconnect::new(ReasonCode::DisconnectWithWillMessage);
    disconnect.properties.add_user_property("why", "maintenance");

    let mut auth = MAuth::new(ReasonCode::ReAuthenticate);
    auth.properties.set_authentication_method("SCRAM-SHA-1");

    vec![
        connect.into(),
        connack.into(),
        publish.into(),
        puback.into(),
        MPubrec::new(7u16).into(),
        MPubrel::new(7u16)
            .with_reason_code(ReasonCode::PacketIdentifierNotFound)
            .into(),
        MPubcomp::new(7u16).into(),
        subscribe.into(),
        suback.into(),
        unsubscribe.into(),
        unsuback.into(),
        MPingreq::default().into(),
        MPingresp::default().into(),
        disconnect.into(),
        auth.into(),
    ]
}

#[test]
fn every_packet_type_roundtrips_through_a_stream() {
    let packets = populated_packets();
    assert_eq!(packets.len(), 15);

    let mut stream = Cursor::new(Vec::new());
    for packet in &packets {
        assert!(packet.is_valid(), "{packet:?} is not valid");
        write_packet(&mut stream, packet).unwrap();
    }

    stream.set_position(0);
    for packet in &packets {
        let decoded = read_packet(&mut stream).unwrap();
        assert_eq!(&decoded, packet);
    }
    assert_eq!(stream.position() as usize, stream.get_ref().len());
}

#[test]
fn written_length_matches_header() {
    for packet in populated_packets() {
        let header = packet.fixed_header().unwrap();
        let bytes = packet.to_bytes().unwrap();

        assert_eq!(bytes[0], header.first_byte());
        assert_eq!(
            bytes.len(),
            header.binary_size() as usize + header.remaining_length() as usize
        );
    }
}

#[test]
fn connect_without_will_omits_will_fields() {
    let mut connect = MConnect::new("c");
    connect.keep_alive = 10;
    assert!(connect.is_valid());

    let bytes = MqttPacket::from(connect.clone()).to_bytes().unwrap();

    #[rustfmt::skip]
    assert_eq!(
        bytes,
        [
            0x10, 0x0E,
            0x00, 0x04, b'M', b'Q', b'T', b'T',
            0x05,
            // no flags
            0x00,
            0x00, 0x0A,
            // no properties
            0x00,
            // client identifier, nothing follows
            0x00, 0x01, b'c',
        ]
    );

    let MqttPacket::Connect(decoded) = MqttPacket::parse_complete(&bytes).unwrap() else {
        panic!("Expected CONNECT");
    };
    assert_eq!(decoded, connect);
    assert!(decoded.will.is_none());
    assert!(decoded.username.is_none());
    assert!(decoded.password.is_none());
}

#[test]
fn large_publish_payload() {
    let payload = (0..200_000u32).map(|i| i as u8).collect::<Vec<_>>();
    let mut publish = MPublish::new("bulk", payload.clone());
    publish.set_qos(QualityOfService::AtLeastOnce);
    publish.packet_identifier = 1.into();

    let mut stream = Cursor::new(Vec::new());
    write_packet(&mut stream, &MqttPacket::from(publish)).unwrap();

    stream.set_position(0);
    let MqttPacket::Publish(decoded) = read_packet(&mut stream).unwrap() else {
        panic!("Expected PUBLISH");
    };
    assert_eq!(decoded.payload.len(), payload.len());
    assert!(decoded.payload == payload);
}
