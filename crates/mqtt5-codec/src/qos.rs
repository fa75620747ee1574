//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

/// Delivery guarantee of a PUBLISH, a will or a subscription
#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
#[doc = crate::util::md_speclink!("_Toc3901103")]
pub enum QualityOfService {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

#[cfg(test)]
mod test {
    use super::QualityOfService;

    #[test]
    fn levels_from_bits() {
        assert_eq!(
            QualityOfService::try_from(2u8).ok(),
            Some(QualityOfService::ExactlyOnce)
        );
        assert!(QualityOfService::try_from(3u8).is_err());
        assert_eq!(u8::from(QualityOfService::AtLeastOnce), 1);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(QualityOfService::AtMostOnce < QualityOfService::ExactlyOnce);
    }
}
