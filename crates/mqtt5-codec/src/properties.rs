//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Property lists carried in variable headers and wills
//!
//! A list is a variable byte integer holding its length in bytes, followed by properties, each of
//! them a one byte identifier and a value whose shape the identifier determines.

use winnow::Bytes;
use winnow::Parser;

use crate::MResult;
use crate::bytes::binary_data_binary_size;
use crate::bytes::parse_binary_data;
use crate::bytes::write_binary_data;
use crate::error::DecodeError;
use crate::fixed_header::PacketType;
use crate::integers::parse_u16;
use crate::integers::parse_u32;
use crate::integers::parse_u8;
use crate::integers::parse_variable_u32;
use crate::integers::variable_u32_binary_size;
use crate::integers::write_variable_u32;
use crate::strings::parse_string;
use crate::strings::parse_string_pair;
use crate::strings::string_binary_size;
use crate::strings::string_pair_binary_size;
use crate::strings::write_string;
use crate::strings::write_string_pair;
use crate::write::WResult;
use crate::write::WriteMqttPacket;

/// Types a property can hold, with the borrowed form handed out by the getters of [`Properties`]
pub trait PropertyValue {
    type Borrowed<'a>
    where
        Self: 'a;

    fn borrowed(&self) -> Self::Borrowed<'_>;
}

macro_rules! copy_property_value {
    ($($ty:ty),*) => {
        $(
            impl PropertyValue for $ty {
                type Borrowed<'a> = $ty;

                fn borrowed(&self) -> $ty {
                    *self
                }
            }
        )*
    };
}

copy_property_value!(u8, u16, u32);

impl PropertyValue for String {
    type Borrowed<'a> = &'a str;

    fn borrowed(&self) -> &str {
        self
    }
}

impl PropertyValue for Vec<u8> {
    type Borrowed<'a> = &'a [u8];

    fn borrowed(&self) -> &[u8] {
        self
    }
}

fn parse_owned_string(input: &mut &Bytes) -> MResult<String> {
    parse_string.map(str::to_owned).parse_next(input)
}

fn parse_owned_binary_data(input: &mut &Bytes) -> MResult<Vec<u8>> {
    parse_binary_data.map(<[u8]>::to_vec).parse_next(input)
}

fn write_byte<W: WriteMqttPacket>(buffer: &mut W, value: &u8) -> WResult<W> {
    buffer.write_byte(*value)
}

fn write_two_byte_integer<W: WriteMqttPacket>(buffer: &mut W, value: &u16) -> WResult<W> {
    buffer.write_u16(*value)
}

fn write_four_byte_integer<W: WriteMqttPacket>(buffer: &mut W, value: &u32) -> WResult<W> {
    buffer.write_u32(*value)
}

fn write_variable_byte_integer<W: WriteMqttPacket>(buffer: &mut W, value: &u32) -> WResult<W> {
    write_variable_u32(buffer, *value)
}

macro_rules! define_properties {
    ([
        $(
            $name:ident as $id:literal =>
                parse with $parser:path as $kind:ty;
                write with $writer:path;
                with size $size_closure:expr
        ),*
        $(,)?
    ]) => {
        /// Identifier byte of a property
        #[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum PropertyId {
            $( $name = $id, )*
            UserProperty = 0x26,
        }

        #[derive(Debug, Clone, PartialEq, Eq)]
        #[doc = crate::util::md_speclink!("_Toc3901027")]
        pub enum Property {
            $( $name($kind), )*
            UserProperty(UserProperty),
        }

        impl Property {
            pub fn id(&self) -> PropertyId {
                match self {
                    $( Property::$name(_) => PropertyId::$name, )*
                    Property::UserProperty(_) => PropertyId::UserProperty,
                }
            }

            /// Size of the value, not counting the identifier byte
            pub fn data_len(&self) -> u32 {
                match self {
                    $(
                        Property::$name(value) => {
                            let fun = $size_closure;
                            fun(value)
                        }
                    )*
                    Property::UserProperty(up) => up.binary_size(),
                }
            }

            pub fn parse(input: &mut &Bytes) -> MResult<Property> {
                winnow::combinator::trace("Property", |input: &mut &Bytes| {
                    let id = parse_u8(input)?;

                    match id {
                        $(
                            $id => winnow::combinator::trace(stringify!($name), $parser)
                                .parse_next(input)
                                .map(Property::$name),
                        )*
                        0x26 => UserProperty::parse(input).map(Property::UserProperty),
                        unknown => Err(DecodeError::UnknownProperty(unknown).into_parse_error(input)),
                    }
                })
                .parse_next(input)
            }

            pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
                buffer.write_byte(self.id().into())?;

                match self {
                    $( Property::$name(value) => $writer(buffer, value), )*
                    Property::UserProperty(up) => up.write(buffer),
                }
            }
        }

        impl Properties {
            $(
                paste::paste! {
                    pub fn [< $name:snake >](&self) -> Option<<$kind as PropertyValue>::Borrowed<'_>> {
                        self.0.iter().find_map(|property| match property {
                            Property::$name(value) => Some(value.borrowed()),
                            _ => None,
                        })
                    }

                    pub fn [< set_ $name:snake >](&mut self, value: impl Into<$kind>) {
                        self.replace(Property::$name(value.into()));
                    }
                }
            )*
        }
    };
}

define_properties! {[
    PayloadFormatIndicator as 0x01 =>
        parse with parse_u8 as u8;
        write with write_byte;
        with size |_| 1,

    MessageExpiryInterval as 0x02 =>
        parse with parse_u32 as u32;
        write with write_four_byte_integer;
        with size |_| 4,

    ContentType as 0x03 =>
        parse with parse_owned_string as String;
        write with write_string;
        with size string_binary_size,

    ResponseTopic as 0x08 =>
        parse with parse_owned_string as String;
        write with write_string;
        with size string_binary_size,

    CorrelationData as 0x09 =>
        parse with parse_owned_binary_data as Vec<u8>;
        write with write_binary_data;
        with size binary_data_binary_size,

    SubscriptionIdentifier as 0x0B =>
        parse with parse_variable_u32 as u32;
        write with write_variable_byte_integer;
        with size |value: &u32| variable_u32_binary_size(*value),

    SessionExpiryInterval as 0x11 =>
        parse with parse_u32 as u32;
        write with write_four_byte_integer;
        with size |_| 4,

    AssignedClientIdentifier as 0x12 =>
        parse with parse_owned_string as String;
        write with write_string;
        with size string_binary_size,

    ServerKeepAlive as 0x13 =>
        parse with parse_u16 as u16;
        write with write_two_byte_integer;
        with size |_| 2,

    AuthenticationMethod as 0x15 =>
        parse with parse_owned_string as String;
        write with write_string;
        with size string_binary_size,

    AuthenticationData as 0x16 =>
        parse with parse_owned_binary_data as Vec<u8>;
        write with write_binary_data;
        with size binary_data_binary_size,

    RequestProblemInformation as 0x17 =>
        parse with parse_u8 as u8;
        write with write_byte;
        with size |_| 1,

    WillDelayInterval as 0x18 =>
        parse with parse_u32 as u32;
        write with write_four_byte_integer;
        with size |_| 4,

    RequestResponseInformation as 0x19 =>
        parse with parse_u8 as u8;
        write with write_byte;
        with size |_| 1,

    ResponseInformation as 0x1A =>
        parse with parse_owned_string as String;
        write with write_string;
        with size string_binary_size,

    ServerReference as 0x1C =>
        parse with parse_owned_string as String;
        write with write_string;
        with size string_binary_size,

    ReasonString as 0x1F =>
        parse with parse_owned_string as String;
        write with write_string;
        with size string_binary_size,

    ReceiveMaximum as 0x21 =>
        parse with parse_u16 as u16;
        write with write_two_byte_integer;
        with size |_| 2,

    TopicAliasMaximum as 0x22 =>
        parse with parse_u16 as u16;
        write with write_two_byte_integer;
        with size |_| 2,

    TopicAlias as 0x23 =>
        parse with parse_u16 as u16;
        write with write_two_byte_integer;
        with size |_| 2,

    MaximumQos as 0x24 =>
        parse with parse_u8 as u8;
        write with write_byte;
        with size |_| 1,

    RetainAvailable as 0x25 =>
        parse with parse_u8 as u8;
        write with write_byte;
        with size |_| 1,

    MaximumPacketSize as 0x27 =>
        parse with parse_u32 as u32;
        write with write_four_byte_integer;
        with size |_| 4,

    WildcardSubscriptionAvailable as 0x28 =>
        parse with parse_u8 as u8;
        write with write_byte;
        with size |_| 1,

    SubscriptionIdentifiersAvailable as 0x29 =>
        parse with parse_u8 as u8;
        write with write_byte;
        with size |_| 1,

    SharedSubscriptionAvailable as 0x2A =>
        parse with parse_u8 as u8;
        write with write_byte;
        with size |_| 1,
]}

impl PropertyId {
    /// Whether this property may appear several times in the list of a `packet_type` packet
    ///
    /// User properties repeat anywhere, subscription identifiers only in PUBLISH.
    pub fn allows_repeat(&self, packet_type: PacketType) -> bool {
        match self {
            PropertyId::UserProperty => true,
            PropertyId::SubscriptionIdentifier => packet_type == PacketType::Publish,
            _ => false,
        }
    }

    /// Whether the property list of a packet of type `packet_type` may contain this property
    pub fn allowed_in(&self, packet_type: PacketType) -> bool {
        use PacketType::*;

        match self {
            PropertyId::PayloadFormatIndicator
            | PropertyId::MessageExpiryInterval
            | PropertyId::ContentType
            | PropertyId::ResponseTopic
            | PropertyId::CorrelationData
            | PropertyId::TopicAlias => packet_type == Publish,
            PropertyId::SubscriptionIdentifier => matches!(packet_type, Publish | Subscribe),
            PropertyId::SessionExpiryInterval => {
                matches!(packet_type, Connect | Connack | Disconnect)
            }
            PropertyId::AuthenticationMethod | PropertyId::AuthenticationData => {
                matches!(packet_type, Connect | Connack | Auth)
            }
            PropertyId::RequestProblemInformation | PropertyId::RequestResponseInformation => {
                packet_type == Connect
            }
            PropertyId::WillDelayInterval => false,
            PropertyId::ServerReference => matches!(packet_type, Connack | Disconnect),
            PropertyId::ReasonString => matches!(
                packet_type,
                Connack | Puback | Pubrec | Pubrel | Pubcomp | Suback | Unsuback | Disconnect | Auth
            ),
            PropertyId::ReceiveMaximum
            | PropertyId::TopicAliasMaximum
            | PropertyId::MaximumPacketSize => matches!(packet_type, Connect | Connack),
            PropertyId::AssignedClientIdentifier
            | PropertyId::ServerKeepAlive
            | PropertyId::ResponseInformation
            | PropertyId::MaximumQos
            | PropertyId::RetainAvailable
            | PropertyId::WildcardSubscriptionAvailable
            | PropertyId::SubscriptionIdentifiersAvailable
            | PropertyId::SharedSubscriptionAvailable => packet_type == Connack,
            PropertyId::UserProperty => !matches!(packet_type, Pingreq | Pingresp),
        }
    }

    /// Whether the will properties of a CONNECT may contain this property
    pub fn allowed_in_will(&self) -> bool {
        matches!(
            self,
            PropertyId::PayloadFormatIndicator
                | PropertyId::MessageExpiryInterval
                | PropertyId::ContentType
                | PropertyId::ResponseTopic
                | PropertyId::CorrelationData
                | PropertyId::WillDelayInterval
                | PropertyId::UserProperty
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[doc = crate::util::md_speclink!("_Toc3901068")]
pub struct UserProperty {
    pub key: String,
    pub value: String,
}

impl UserProperty {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> UserProperty {
        UserProperty {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn parse(input: &mut &Bytes) -> MResult<UserProperty> {
        winnow::combinator::trace(
            "UserProperty",
            parse_string_pair.map(|(key, value)| UserProperty::new(key, value)),
        )
        .parse_next(input)
    }

    pub fn binary_size(&self) -> u32 {
        string_pair_binary_size(&self.key, &self.value)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_string_pair(buffer, &self.key, &self.value)
    }
}

/// An ordered property list
///
/// Lookups return the first matching entry. Identifiers that may not repeat are still kept when
/// they do, unless the list was decoded with strict property checking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(Vec<Property>);

impl Properties {
    pub fn new() -> Properties {
        Properties::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Property> {
        self.0.iter()
    }

    pub fn push(&mut self, property: Property) {
        self.0.push(property);
    }

    pub fn get(&self, id: PropertyId) -> Option<&Property> {
        self.0.iter().find(|property| property.id() == id)
    }

    pub fn get_all(&self, id: PropertyId) -> impl Iterator<Item = &Property> {
        self.0.iter().filter(move |property| property.id() == id)
    }

    /// Replace the first property with the same identifier, or append it
    pub fn replace(&mut self, property: Property) {
        match self.0.iter_mut().find(|existing| existing.id() == property.id()) {
            Some(existing) => *existing = property,
            None => self.0.push(property),
        }
    }

    /// Remove every property with this identifier
    pub fn remove(&mut self, id: PropertyId) {
        self.0.retain(|property| property.id() != id);
    }

    pub fn user_properties(&self) -> impl Iterator<Item = &UserProperty> {
        self.0.iter().filter_map(|property| match property {
            Property::UserProperty(up) => Some(up),
            _ => None,
        })
    }

    pub fn add_user_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0
            .push(Property::UserProperty(UserProperty::new(key, value)));
    }

    pub fn subscription_identifiers(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().filter_map(|property| match property {
            Property::SubscriptionIdentifier(id) => Some(*id),
            _ => None,
        })
    }

    /// Length of the list contents, the value of its length prefix
    pub fn content_len(&self) -> u32 {
        self.0.iter().map(|property| 1 + property.data_len()).sum()
    }

    /// Size of the list including its length prefix
    pub fn binary_size(&self) -> u32 {
        let content_len = self.content_len();
        variable_u32_binary_size(content_len) + content_len
    }

    /// Every entry may appear in a packet of type `packet_type`
    pub fn allowed_in(&self, packet_type: PacketType) -> bool {
        self.0
            .iter()
            .all(|property| property.id().allowed_in(packet_type))
    }

    /// Every entry may appear in will properties
    pub fn allowed_in_will(&self) -> bool {
        self.0.iter().all(|property| property.id().allowed_in_will())
    }

    /// Fail on the first identifier that appears twice without being allowed to repeat in a
    /// packet of type `packet_type`
    pub fn check_duplicates(&self, packet_type: PacketType) -> Result<(), DecodeError> {
        let mut seen: u64 = 0;

        for property in &self.0 {
            let id = property.id();
            if id.allows_repeat(packet_type) {
                continue;
            }

            let bit = 1u64 << u8::from(id);
            if seen & bit != 0 {
                return Err(DecodeError::DuplicateProperty(id.into()));
            }
            seen |= bit;
        }

        Ok(())
    }

    #[doc = crate::util::md_speclink!("_Toc3901027")]
    pub fn parse(input: &mut &Bytes) -> MResult<Properties> {
        winnow::combinator::trace("Properties", |input: &mut &Bytes| {
            let declared = parse_variable_u32(input)?;
            let start = input.len();
            let consumed = |input: &&Bytes| (start - input.len()) as u32;

            let mut properties = Vec::new();
            while consumed(&*input) < declared {
                properties.push(Property::parse(input)?);
            }

            let actual = consumed(&*input);
            if actual != declared {
                return Err(DecodeError::PropertyLength { declared, actual }.into_parse_error(input));
            }

            tracing::trace!(count = properties.len(), length = declared, "Parsed properties");

            Ok(Properties(properties))
        })
        .parse_next(input)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_variable_u32(buffer, self.content_len())?;

        for property in &self.0 {
            property.write(buffer)?;
        }

        Ok(())
    }
}

impl From<Vec<Property>> for Properties {
    fn from(properties: Vec<Property>) -> Properties {
        Properties(properties)
    }
}

impl FromIterator<Property> for Properties {
    fn from_iter<T: IntoIterator<Item = Property>>(iter: T) -> Properties {
        Properties(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = &'a Property;
    type IntoIter = core::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use super::Properties;
    use super::Property;
    use super::PropertyId;
    use super::UserProperty;
    use crate::error::DecodeError;
    use crate::fixed_header::PacketType;

    fn parse(input: &[u8]) -> Result<Properties, DecodeError> {
        Properties::parse(&mut Bytes::new(input)).map_err(DecodeError::from_parse_error)
    }

    #[test]
    fn empty_list() {
        assert_eq!(parse(&[0x00]).unwrap(), Properties::new());

        let mut buffer = Vec::new();
        Properties::new().write(&mut buffer).unwrap();
        assert_eq!(buffer, [0x00]);
    }

    #[test]
    fn mixed_list() {
        let input = [
            0x0E, // length
            0x11, 0x00, 0x00, 0x00, 0x64, // session expiry interval
            0x26, 0x00, 0x01, b'k', 0x00, 0x01, b'v', // user property
            0x24, 0x01, // maximum qos
        ];
        let input = &input[..];

        let properties = parse(input).unwrap();
        assert_eq!(properties.len(), 3);
        assert_eq!(properties.session_expiry_interval(), Some(100));
        assert_eq!(properties.maximum_qos(), Some(1));
        assert_eq!(
            properties.user_properties().collect::<Vec<_>>(),
            vec![&UserProperty::new("k", "v")]
        );

        let mut buffer = Vec::new();
        properties.write(&mut buffer).unwrap();
        assert_eq!(buffer, input);
        assert_eq!(properties.binary_size() as usize, input.len());
    }

    #[test]
    fn subscription_identifier_is_a_variable_integer() {
        let input = [0x03, 0x0B, 0x80, 0x01];

        let properties = parse(&input).unwrap();
        assert_eq!(properties.subscription_identifier(), Some(128));
        assert_eq!(properties.content_len(), 3);
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        assert_eq!(
            parse(&[0x02, 0x05, 0x00]),
            Err(DecodeError::UnknownProperty(0x05))
        );
    }

    #[test]
    fn overrunning_entry_is_rejected() {
        // declared two bytes, the entry spans five
        assert_eq!(
            parse(&[0x02, 0x02, 0x00, 0x00, 0x00, 0x01]),
            Err(DecodeError::PropertyLength {
                declared: 2,
                actual: 5
            })
        );
    }

    #[test]
    fn truncated_list_is_malformed() {
        assert_eq!(parse(&[0x05, 0x01]), Err(DecodeError::Malformed));
    }

    #[test]
    fn duplicates_are_kept_and_lookup_returns_first() {
        let input = [0x04, 0x01, 0x00, 0x01, 0x01];

        let properties = parse(&input).unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties.payload_format_indicator(), Some(0));
        assert_eq!(properties.get_all(PropertyId::PayloadFormatIndicator).count(), 2);
        assert_eq!(
            properties.check_duplicates(PacketType::Publish),
            Err(DecodeError::DuplicateProperty(0x01))
        );
    }

    #[test]
    fn repeatable_properties_pass_duplicate_check() {
        let mut properties = Properties::new();
        properties.add_user_property("a", "1");
        properties.add_user_property("a", "2");
        properties.push(Property::SubscriptionIdentifier(1));
        properties.push(Property::SubscriptionIdentifier(2));

        assert_eq!(properties.check_duplicates(PacketType::Publish), Ok(()));
        assert_eq!(
            properties.subscription_identifiers().collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn subscription_identifier_repeats_only_in_publish() {
        let properties: Properties = vec![
            Property::SubscriptionIdentifier(1),
            Property::SubscriptionIdentifier(2),
        ]
        .into();

        assert!(PropertyId::SubscriptionIdentifier.allows_repeat(PacketType::Publish));
        assert!(!PropertyId::SubscriptionIdentifier.allows_repeat(PacketType::Subscribe));
        assert!(PropertyId::UserProperty.allows_repeat(PacketType::Subscribe));
        assert_eq!(
            properties.check_duplicates(PacketType::Subscribe),
            Err(DecodeError::DuplicateProperty(0x0B))
        );
    }

    #[test]
    fn setters_replace() {
        let mut properties = Properties::new();
        properties.set_content_type("text/plain");
        properties.set_content_type("application/json");
        properties.set_correlation_data(&b"abc"[..]);

        assert_eq!(properties.len(), 2);
        assert_eq!(properties.content_type(), Some("application/json"));
        assert_eq!(properties.correlation_data(), Some(&b"abc"[..]));

        properties.remove(PropertyId::ContentType);
        assert_eq!(properties.content_type(), None);
    }

    #[test]
    fn scoping() {
        assert!(PropertyId::TopicAlias.allowed_in(PacketType::Publish));
        assert!(!PropertyId::TopicAlias.allowed_in(PacketType::Connect));
        assert!(PropertyId::ReasonString.allowed_in(PacketType::Pubrel));
        assert!(!PropertyId::UserProperty.allowed_in(PacketType::Pingreq));
        assert!(PropertyId::WillDelayInterval.allowed_in_will());
        assert!(!PropertyId::WillDelayInterval.allowed_in(PacketType::Connect));
        assert!(!PropertyId::SessionExpiryInterval.allowed_in_will());

        let properties: Properties = vec![Property::ServerKeepAlive(30)].into();
        assert!(properties.allowed_in(PacketType::Connack));
        assert!(!properties.allowed_in(PacketType::Connect));
    }
}
