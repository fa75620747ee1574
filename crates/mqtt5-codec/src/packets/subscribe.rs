//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;
use winnow::Parser;

use crate::MResult;
use crate::error::DecodeError;
use crate::error::MqttWriteError;
use crate::fixed_header::FixedHeader;
use crate::fixed_header::PacketType;
use crate::integers::parse_u8;
use crate::packets::ControlPacket;
use crate::properties::Properties;
use crate::qos::QualityOfService;
use crate::strings::parse_string;
use crate::strings::write_string;
use crate::variable_header::PacketIdentifier;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

const QOS: u8 = 0b0000_0011;
const NO_LOCAL: u8 = 0b0000_0100;
const RETAIN_AS_PUBLISHED: u8 = 0b0000_1000;
const RETAIN_HANDLING: u8 = 0b0011_0000;
const RESERVED: u8 = 0b1100_0000;

#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetainHandling {
    #[default]
    SendRetainedMessagesAlways = 0,
    SendRetainedMessagesOnNewSubscribe = 1,
    DoNotSendRetainedMessages = 2,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionOptions {
    pub quality_of_service: QualityOfService,
    pub no_local: bool,
    pub retain_as_published: bool,
    pub retain_handling: RetainHandling,
}

impl SubscriptionOptions {
    /// Decode the options byte, `None` if a reserved bit or an undefined value is set
    pub fn from_byte(byte: u8) -> Option<SubscriptionOptions> {
        if byte & RESERVED != 0 {
            return None;
        }

        Some(SubscriptionOptions {
            quality_of_service: QualityOfService::try_from(byte & QOS).ok()?,
            no_local: byte & NO_LOCAL != 0,
            retain_as_published: byte & RETAIN_AS_PUBLISHED != 0,
            retain_handling: RetainHandling::try_from((byte & RETAIN_HANDLING) >> 4).ok()?,
        })
    }

    pub fn to_byte(&self) -> u8 {
        let mut byte = u8::from(self.quality_of_service);
        if self.no_local {
            byte |= NO_LOCAL;
        }
        if self.retain_as_published {
            byte |= RETAIN_AS_PUBLISHED;
        }
        byte | (u8::from(self.retain_handling) << 4)
    }

    pub fn parse(input: &mut &Bytes) -> MResult<SubscriptionOptions> {
        winnow::combinator::trace("SubscriptionOptions", |input: &mut &Bytes| {
            let byte = parse_u8(input)?;
            SubscriptionOptions::from_byte(byte)
                .ok_or_else(|| DecodeError::Malformed.into_parse_error(input))
        })
        .parse_next(input)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[doc = crate::util::md_speclink!("_Toc3901161")]
pub struct Subscription {
    pub topic_filter: String,
    pub options: SubscriptionOptions,
}

impl Subscription {
    pub fn new(topic_filter: impl Into<String>, quality_of_service: QualityOfService) -> Subscription {
        Subscription {
            topic_filter: topic_filter.into(),
            options: SubscriptionOptions {
                quality_of_service,
                ..SubscriptionOptions::default()
            },
        }
    }

    pub fn parse(input: &mut &Bytes) -> MResult<Subscription> {
        winnow::combinator::trace("Subscription", |input: &mut &Bytes| {
            let topic_filter = parse_string(input)?.to_owned();
            let options = SubscriptionOptions::parse(input)?;

            Ok(Subscription {
                topic_filter,
                options,
            })
        })
        .parse_next(input)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_string(buffer, &self.topic_filter)?;
        buffer.write_byte(self.options.to_byte())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901161")]
pub struct MSubscribe {
    header: FixedHeader,
    pub packet_identifier: PacketIdentifier,
    pub properties: Properties,
    pub subscriptions: Vec<Subscription>,
}

impl Default for MSubscribe {
    fn default() -> MSubscribe {
        MSubscribe {
            header: FixedHeader::new(PacketType::Subscribe, 0),
            packet_identifier: PacketIdentifier::default(),
            properties: Properties::new(),
            subscriptions: Vec::new(),
        }
    }
}

impl MSubscribe {
    pub fn new(
        packet_identifier: impl Into<PacketIdentifier>,
        subscriptions: Vec<Subscription>,
    ) -> MSubscribe {
        MSubscribe {
            packet_identifier: packet_identifier.into(),
            subscriptions,
            ..MSubscribe::default()
        }
    }
}

impl ControlPacket for MSubscribe {
    const PACKET_TYPE: PacketType = PacketType::Subscribe;

    fn header(&self) -> &FixedHeader {
        &self.header
    }

    fn set_fixed_header(&mut self, header: FixedHeader) {
        self.header = header.with_remaining_length(0);
    }

    fn parse_variable_header(&mut self, input: &mut &Bytes) -> MResult<()> {
        winnow::combinator::trace("MSubscribe::variable_header", |input: &mut &Bytes| {
            self.packet_identifier = PacketIdentifier::parse(input)?;
            self.properties = Properties::parse(input)?;
            Ok(())
        })
        .parse_next(input)
    }

    fn parse_payload(&mut self, input: &mut &Bytes) -> MResult<()> {
        winnow::combinator::trace("MSubscribe::payload", |input: &mut &Bytes| {
            self.subscriptions.clear();
            while !input.is_empty() {
                self.subscriptions.push(Subscription::parse(input)?);
            }

            if self.subscriptions.is_empty() {
                return Err(DecodeError::EmptyTopicFilters.into_parse_error(input));
            }

            Ok(())
        })
        .parse_next(input)
    }

    fn write_variable_header<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;
        self.properties.write(buffer)
    }

    fn write_payload<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        if self.subscriptions.is_empty() {
            return Err(MqttWriteError::EmptyTopicFilters.into());
        }

        for subscription in &self.subscriptions {
            subscription.write(buffer)?;
        }

        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.has_valid_header()
            && self.packet_identifier.is_valid()
            && !self.subscriptions.is_empty()
            && self
                .subscriptions
                .iter()
                .all(|subscription| !subscription.topic_filter.is_empty())
            && self.properties.allowed_in(Self::PACKET_TYPE)
            && self.properties.check_duplicates(Self::PACKET_TYPE).is_ok()
    }

    fn property_lists(&self) -> Vec<&Properties> {
        vec![&self.properties]
    }
}
