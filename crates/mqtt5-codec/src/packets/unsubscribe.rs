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
use crate::packets::ControlPacket;
use crate::properties::Properties;
use crate::strings::parse_string;
use crate::strings::write_string;
use crate::variable_header::PacketIdentifier;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

#[derive(Clone, Debug, PartialEq)]
#[doc = crate::util::md_speclink!("_Toc3901179")]
pub struct MUnsubscribe {
    header: FixedHeader,
    pub packet_identifier: PacketIdentifier,
    pub properties: Properties,
    pub topic_filters: Vec<String>,
}

impl Default for MUnsubscribe {
    fn default() -> MUnsubscribe {
        MUnsubscribe {
            header: FixedHeader::new(PacketType::Unsubscribe, 0),
            packet_identifier: PacketIdentifier::default(),
            properties: Properties::new(),
            topic_filters: Vec::new(),
        }
    }
}

impl MUnsubscribe {
    pub fn new<T: Into<String>>(
        packet_identifier: impl Into<PacketIdentifier>,
        topic_filters: impl IntoIterator<Item = T>,
    ) -> MUnsubscribe {
        MUnsubscribe {
            packet_identifier: packet_identifier.into(),
            topic_filters: topic_filters.into_iter().map(Into::into).collect(),
            ..MUnsubscribe::default()
        }
    }
}

impl ControlPacket for MUnsubscribe {
    const PACKET_TYPE: PacketType = PacketType::Unsubscribe;

    fn header(&self) -> &FixedHeader {
        &self.header
    }

    fn set_fixed_header(&mut self, header: FixedHeader) {
        self.header = header.with_remaining_length(0);
    }

    fn parse_variable_header(&mut self, input: &mut &Bytes) -> MResult<()> {
        winnow::combinator::trace("MUnsubscribe::variable_header", |input: &mut &Bytes| {
            self.packet_identifier = PacketIdentifier::parse(input)?;
            self.properties = Properties::parse(input)?;
            Ok(())
        })
        .parse_next(input)
    }

    fn parse_payload(&mut self, input: &mut &Bytes) -> MResult<()> {
        winnow::combinator::trace("MUnsubscribe::payload", |input: &mut &Bytes| {
            self.topic_filters.clear();
            while !input.is_empty() {
                self.topic_filters.push(parse_string(input)?.to_owned());
            }

            if self.topic_filters.is_empty() {
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
        if self.topic_filters.is_empty() {
            return Err(MqttWriteError::EmptyTopicFilters.into());
        }

        for topic_filter in &self.topic_filters {
            write_string(buffer, topic_filter)?;
        }

        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.has_valid_header()
            && self.packet_identifier.is_valid()
            && !self.topic_filters.is_empty()
            && self.topic_filters.iter().all(|filter| !filter.is_empty())
            && self.properties.allowed_in(Self::PACKET_TYPE)
    }

    fn property_lists(&self) -> Vec<&Properties> {
        vec![&self.properties]
    }
}
