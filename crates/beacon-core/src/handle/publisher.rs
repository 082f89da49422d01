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

use crate::error::BusResult;
use crate::event::{EventBus, EventKind};
use crate::subscription::PublisherId;
use std::sync::Arc;

/// A handle that announces data for an event kind.
///
/// Carries no queue: a notification wakes the subscribers currently blocked
/// on that kind, and later subscribers see it only through the sticky ready
/// flag.
#[derive(Debug)]
pub struct Publisher {
    bus: Arc<EventBus>,
    id: PublisherId,
}

impl Publisher {
    /// Creates a publisher on `bus` with a fresh id.
    pub fn new(bus: Arc<EventBus>) -> Self {
        let id = bus.ids().next_publisher();
        log::debug!("Publisher {id} created.");
        Self { bus, id }
    }

    /// This publisher's id.
    pub fn id(&self) -> PublisherId {
        self.id
    }

    /// The bus this publisher notifies.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Publishes the "data ready" pattern on `kind`.
    pub fn notify_on_event(&self, kind: EventKind) -> BusResult<()> {
        log::debug!("Publisher {} notifying {kind}.", self.id);
        self.bus.notify(kind)
    }

    /// Publishes `data` on `kind`.
    ///
    /// ## Arguments
    /// * `kind` - The event kind to wake.
    /// * `data` - The payload; anything past the snapshot window is dropped.
    ///
    /// ## Returns
    /// How many bytes of `data` were kept.
    pub fn publish(&self, kind: EventKind, data: &[u8]) -> BusResult<usize> {
        log::debug!(
            "Publisher {} publishing {} bytes on {kind}.",
            self.id,
            data.len()
        );
        self.bus.notify_with(kind, data)
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        log::debug!("Publisher {} dropped.", self.id);
    }
}
