//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

/// Markdown link to an anchor in the MQTT v5.0 standard, for use in `#[doc = ...]`
macro_rules! md_speclink {
    ($anchor:literal) => {
        core::concat!(
            "[MQTT v5.0](https://docs.oasis-open.org/mqtt/mqtt/v5.0/os/mqtt-v5.0-os.html#",
            $anchor,
            ")"
        )
    };
}
pub(crate) use md_speclink;
