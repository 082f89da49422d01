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

//! Registry mapping each event kind to the subscribers interested in it.

use crate::error::{BusError, BusResult};
use crate::event::EventKind;
use crate::subscription::SubscriberId;
use std::collections::HashMap;
use std::sync::RwLock;

/// Thread-safe map from [`EventKind`] to an insertion-ordered set of ids.
///
/// A single `RwLock` guards the whole map: membership checks run
/// concurrently, while subscribe and unsubscribe exclude every other access.
/// An id appears at most once per kind.
#[derive(Debug)]
pub struct SubscriptionRegistry {
    subscribers: RwLock<HashMap<EventKind, Vec<SubscriberId>>>,
}

impl SubscriptionRegistry {
    /// Creates a registry with an empty set for every kind.
    pub fn new() -> Self {
        let subscribers = EventKind::ALL
            .iter()
            .map(|&kind| (kind, Vec::new()))
            .collect();
        Self {
            subscribers: RwLock::new(subscribers),
        }
    }

    /// Adds `id` to `kind`'s set if it is not already there.
    ///
    /// Returns `true` if the id was inserted, `false` if it was present.
    pub fn subscribe(&self, kind: EventKind, id: SubscriberId) -> BusResult<bool> {
        let mut subscribers = self
            .subscribers
            .write()
            .map_err(|_| BusError::LockPoisoned("subscription registry"))?;

        let set = subscribers.entry(kind).or_default();
        if set.contains(&id) {
            return Ok(false);
        }
        set.push(id);
        Ok(true)
    }

    /// Removes `id` from `kind`'s set. Absent ids are ignored.
    ///
    /// Returns `true` if the id was removed.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriberId) -> BusResult<bool> {
        let mut subscribers = self
            .subscribers
            .write()
            .map_err(|_| BusError::LockPoisoned("subscription registry"))?;

        let Some(set) = subscribers.get_mut(&kind) else {
            return Ok(false);
        };
        match set.iter().position(|&existing| existing == id) {
            Some(pos) => {
                set.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes `id` from every kind under a single write lock.
    ///
    /// Returns the number of kinds it was removed from.
    pub fn unsubscribe_all(&self, id: SubscriberId) -> BusResult<usize> {
        let mut subscribers = self
            .subscribers
            .write()
            .map_err(|_| BusError::LockPoisoned("subscription registry"))?;

        let mut removed = 0;
        for set in subscribers.values_mut() {
            let before = set.len();
            set.retain(|&existing| existing != id);
            removed += before - set.len();
        }
        Ok(removed)
    }

    /// Checks whether `id` is registered for `kind`. Takes the shared lock.
    pub fn contains(&self, kind: EventKind, id: SubscriberId) -> BusResult<bool> {
        let subscribers = self
            .subscribers
            .read()
            .map_err(|_| BusError::LockPoisoned("subscription registry"))?;
        Ok(subscribers.get(&kind).is_some_and(|set| set.contains(&id)))
    }

    /// Returns the ids registered for `kind`, in subscription order.
    pub fn subscribers(&self, kind: EventKind) -> BusResult<Vec<SubscriberId>> {
        let subscribers = self
            .subscribers
            .read()
            .map_err(|_| BusError::LockPoisoned("subscription registry"))?;
        Ok(subscribers.get(&kind).cloned().unwrap_or_default())
    }

    /// Returns the number of ids registered for `kind`.
    pub fn len(&self, kind: EventKind) -> BusResult<usize> {
        let subscribers = self
            .subscribers
            .read()
            .map_err(|_| BusError::LockPoisoned("subscription registry"))?;
        Ok(subscribers.get(&kind).map_or(0, Vec::len))
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
