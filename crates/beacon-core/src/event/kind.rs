// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The closed set of event categories carried by the bus.

use crate::error::BusError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A category of event a publisher can notify and a subscriber can wait on.
///
/// The set is fixed at compile time. Adding a kind means adding a variant
/// here and to [`EventKind::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    /// The first event category.
    Event0,
    /// The second event category.
    Event1,
    /// The third event category.
    Event2,
}

impl EventKind {
    /// Every kind, in index order.
    pub const ALL: [EventKind; 3] = [EventKind::Event0, EventKind::Event1, EventKind::Event2];

    /// The number of kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the dense index of this kind, in `0..EventKind::COUNT`.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl TryFrom<u8> for EventKind {
    type Error = BusError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        EventKind::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| BusError::UnknownKind(value.to_string()))
    }
}

impl FromStr for EventKind {
    type Err = BusError;

    /// Accepts `Event1`, `event1` or the bare index `1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = match trimmed.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("event") => &trimmed[5..],
            _ => trimmed,
        };

        let index = match digits.as_bytes() {
            [digit @ b'0'..=b'9'] => digit - b'0',
            _ => return Err(BusError::UnknownKind(s.to_string())),
        };
        EventKind::try_from(index).map_err(|_| BusError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(EventKind::COUNT, 3);
    }

    #[test]
    fn test_try_from_rejects_out_of_range() {
        assert_eq!(EventKind::try_from(2).unwrap(), EventKind::Event2);
        assert_eq!(
            EventKind::try_from(3),
            Err(BusError::UnknownKind("3".to_string()))
        );
    }

    #[test]
    fn test_parse_names_and_indices() {
        assert_eq!("Event0".parse::<EventKind>().unwrap(), EventKind::Event0);
        assert_eq!("event1".parse::<EventKind>().unwrap(), EventKind::Event1);
        assert_eq!(" 2 ".parse::<EventKind>().unwrap(), EventKind::Event2);
        assert!("Event3".parse::<EventKind>().is_err());
        assert!("event".parse::<EventKind>().is_err());
        assert!("banana".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_parse_rejects_signed_and_padded_indices() {
        for input in ["+1", "event+1", "event001", "01", "event 1", "Event10"] {
            assert_eq!(
                input.parse::<EventKind>(),
                Err(BusError::UnknownKind(input.to_string())),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn test_display_matches_variant_name() {
        assert_eq!(EventKind::Event1.to_string(), "Event1");
    }
}
