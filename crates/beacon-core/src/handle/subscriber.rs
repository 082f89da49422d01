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
use crate::payload::Delivery;
use crate::subscription::SubscriberId;
use std::sync::Arc;

/// A handle that registers interest in event kinds and blocks on them.
///
/// Dropping a subscriber removes its id from every kind it subscribed to.
#[derive(Debug)]
pub struct Subscriber {
    bus: Arc<EventBus>,
    id: SubscriberId,
}

impl Subscriber {
    /// Creates a subscriber on `bus` with a fresh id.
    pub fn new(bus: Arc<EventBus>) -> Self {
        let id = bus.ids().next_subscriber();
        log::debug!("Subscriber {id} created.");
        Self { bus, id }
    }

    /// This subscriber's id.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// The bus this subscriber listens on.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Registers for `kind`. Returns `true` if this was a new subscription.
    pub fn subscribe(&self, kind: EventKind) -> BusResult<bool> {
        self.bus.subscribe(kind, self.id)
    }

    /// Unregisters from `kind`. Returns `true` if a subscription was removed.
    pub fn unsubscribe(&self, kind: EventKind) -> BusResult<bool> {
        self.bus.unsubscribe(kind, self.id)
    }

    /// Registers for `kind` until the returned guard is dropped.
    ///
    /// The guard unsubscribes on drop even if the kind had been subscribed
    /// before this call.
    pub fn subscribe_scoped(&self, kind: EventKind) -> BusResult<Subscription<'_>> {
        self.subscribe(kind)?;
        Ok(Subscription {
            subscriber: self,
            kind,
        })
    }

    /// Blocks until `kind` is notified and returns the payload snapshot.
    ///
    /// Fails with [`NotSubscribed`](crate::BusError::NotSubscribed) without
    /// blocking if this subscriber is not registered for `kind`.
    pub fn listen_on_event(&self, kind: EventKind) -> BusResult<Delivery> {
        self.bus.wait(kind, self.id)
    }

    /// Runs the handler registered for `kind` with `delivery`'s payload.
    ///
    /// ## Arguments
    /// * `kind` - Chosen by the caller; may differ from the kind that
    ///   produced the delivery.
    /// * `delivery` - The snapshot returned by a previous wait.
    pub fn dispatch(&self, kind: EventKind, delivery: &Delivery) -> BusResult<()> {
        log::trace!(
            "Subscriber {} dispatching {} delivery to {kind} handler.",
            self.id,
            delivery.kind()
        );
        self.bus.invoke_callback(kind, delivery.payload())
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        match self.bus.unsubscribe_all(self.id) {
            Ok(released) => log::debug!(
                "Subscriber {} dropped, released {released} subscription(s).",
                self.id
            ),
            Err(err) => log::warn!("Subscriber {} dropped without cleanup: {err}", self.id),
        }
    }
}

/// A subscription that lasts until the guard is dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription<'a> {
    subscriber: &'a Subscriber,
    kind: EventKind,
}

impl Subscription<'_> {
    /// The subscribed kind.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Waits on the subscribed kind. See [`Subscriber::listen_on_event`].
    pub fn listen(&self) -> BusResult<Delivery> {
        self.subscriber.listen_on_event(self.kind)
    }
}

impl Drop for Subscription<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.subscriber.unsubscribe(self.kind) {
            log::warn!(
                "Subscriber {} could not leave {}: {err}",
                self.subscriber.id(),
                self.kind
            );
        }
    }
}
