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

//! Identities handed out to publisher and subscriber handles.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a [`Subscriber`](crate::handle::Subscriber) within one bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// Identity of a [`Publisher`](crate::handle::Publisher) within one bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublisherId(u64);

impl SubscriberId {
    /// Wraps a raw id. Handles obtain theirs from the bus's [`IdGenerator`].
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl PublisherId {
    /// Wraps a raw id.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for PublisherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A monotonically increasing id source scoped to one bus.
///
/// Publishers and subscribers draw from the same counter, so two handles of
/// the same bus never share a raw value. Values are never reused.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator whose first id is `0`.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    fn next_raw(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Allocates a fresh subscriber id.
    pub fn next_subscriber(&self) -> SubscriberId {
        SubscriberId(self.next_raw())
    }

    /// Allocates a fresh publisher id.
    pub fn next_publisher(&self) -> PublisherId {
        PublisherId(self.next_raw())
    }

    /// Returns how many ids have been handed out so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_ids_are_monotonic_and_shared() {
        let ids = IdGenerator::new();
        let s0 = ids.next_subscriber();
        let p1 = ids.next_publisher();
        let s2 = ids.next_subscriber();

        assert_eq!(s0.raw(), 0);
        assert_eq!(p1.raw(), 1);
        assert_eq!(s2.raw(), 2);
        assert_eq!(ids.issued(), 3);
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let ids = Arc::new(IdGenerator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || (0..100).map(|_| ids.next_subscriber()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().expect("id thread panicked") {
                assert!(seen.insert(id), "id {id} was handed out twice");
            }
        }
        assert_eq!(seen.len(), 800);
    }

    #[test]
    fn test_generators_are_independent() {
        let a = IdGenerator::new();
        let b = IdGenerator::new();
        a.next_subscriber();
        a.next_subscriber();
        assert_eq!(b.next_subscriber().raw(), 0);
    }
}
