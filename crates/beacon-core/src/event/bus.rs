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

use crate::callback::{CallbackRegistry, EventHandler};
use crate::config::BusConfig;
use crate::error::{BusError, BusResult};
use crate::event::{Channel, EventKind};
use crate::payload::{Delivery, PayloadIsolation, PayloadPool};
use crate::subscription::{IdGenerator, SubscriberId, SubscriptionRegistry};
use crate::telemetry::{BusMetrics, BusStats};

/// The in-process notification bus.
///
/// Composes the subscription registry, one [`Channel`] per kind, the payload
/// pool and the callback table. Handles share it through an `Arc`; see
/// [`Publisher`](crate::Publisher) and [`Subscriber`](crate::Subscriber).
///
/// # Example
///
/// ```rust
/// use beacon_core::{EventBus, EventKind, SubscriberId};
///
/// let bus = EventBus::new();
/// let id = SubscriberId::from_raw(1);
///
/// bus.subscribe(EventKind::Event1, id).unwrap();
/// bus.notify(EventKind::Event1).unwrap();
///
/// // The ready flag is sticky, so this returns without blocking.
/// let delivery = bus.wait(EventKind::Event1, id).unwrap();
/// assert_eq!(delivery.kind(), EventKind::Event1);
/// assert_eq!(delivery.len(), 513);
/// ```
#[derive(Debug)]
pub struct EventBus {
    config: BusConfig,
    ids: IdGenerator,
    registry: SubscriptionRegistry,
    channels: [Channel; EventKind::COUNT],
    payload: PayloadPool,
    callbacks: CallbackRegistry,
    metrics: BusMetrics,
}

impl EventBus {
    /// Creates a bus with the default configuration.
    pub fn new() -> Self {
        Self::build(BusConfig::default())
    }

    /// Creates a bus from `config`, rejecting invalid sizes.
    ///
    /// ## Arguments
    /// * `config` - Payload sizes and isolation mode for the new bus.
    ///
    /// ## Returns
    /// The bus, or [`BusError::InvalidConfig`] if `config` fails validation.
    pub fn with_config(config: BusConfig) -> BusResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: BusConfig) -> Self {
        let payload = PayloadPool::allocate(&config);
        log::info!(
            "EventBus initialized ({} payload, {}-byte snapshots from a {}-byte pool).",
            config.isolation,
            config.delivered_len,
            config.pool_capacity
        );
        Self {
            config,
            ids: IdGenerator::new(),
            registry: SubscriptionRegistry::new(),
            channels: EventKind::ALL.map(Channel::new),
            payload,
            callbacks: CallbackRegistry::new(),
            metrics: BusMetrics::new(),
        }
    }

    /// The configuration this bus was built with.
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// The isolation mode of the payload pool.
    pub fn payload_isolation(&self) -> PayloadIsolation {
        self.payload.isolation()
    }

    /// The id source shared by every handle of this bus.
    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    fn channel(&self, kind: EventKind) -> &Channel {
        &self.channels[kind.index()]
    }

    // --- Subscriptions ---

    /// Registers `id` for `kind`. Subscribing twice is a no-op.
    ///
    /// ## Arguments
    /// * `kind` - The event kind to register for.
    /// * `id` - The subscriber being registered.
    ///
    /// ## Returns
    /// `true` if the id was newly inserted.
    pub fn subscribe(&self, kind: EventKind, id: SubscriberId) -> BusResult<bool> {
        let inserted = self.registry.subscribe(kind, id)?;
        if inserted {
            log::debug!("Subscriber {id} subscribed to {kind}.");
        }
        Ok(inserted)
    }

    /// Removes `id` from `kind`. Unknown ids are ignored.
    ///
    /// ## Returns
    /// `true` if the id was removed.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriberId) -> BusResult<bool> {
        let removed = self.registry.unsubscribe(kind, id)?;
        if removed {
            log::debug!("Subscriber {id} unsubscribed from {kind}.");
        }
        Ok(removed)
    }

    /// Removes `id` from every kind, returning how many it was removed from.
    pub fn unsubscribe_all(&self, id: SubscriberId) -> BusResult<usize> {
        self.registry.unsubscribe_all(id)
    }

    /// Returns `true` if `id` is registered for `kind`.
    pub fn is_subscribed(&self, kind: EventKind, id: SubscriberId) -> BusResult<bool> {
        self.registry.contains(kind, id)
    }

    /// The ids registered for `kind`, in subscription order.
    pub fn subscribers(&self, kind: EventKind) -> BusResult<Vec<SubscriberId>> {
        self.registry.subscribers(kind)
    }

    /// The number of ids registered for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> BusResult<usize> {
        self.registry.len(kind)
    }

    // --- Wait / notify ---

    /// Blocks until `kind` has been notified, then returns a payload snapshot.
    ///
    /// There is no timeout: a waiter stays blocked until the kind is notified.
    ///
    /// ## Arguments
    /// * `kind` - The event kind to wait on.
    /// * `id` - The waiting subscriber; it must be registered for `kind`.
    ///
    /// ## Returns
    /// A [`Delivery`] carrying `kind` and a `delivered_len`-byte snapshot, or
    /// [`BusError::NotSubscribed`] at once, without touching the channel, if
    /// `id` is not registered for `kind`.
    pub fn wait(&self, kind: EventKind, id: SubscriberId) -> BusResult<Delivery> {
        if !self.registry.contains(kind, id)? {
            self.metrics.record_rejected_wait();
            log::debug!("Subscriber {id} is not subscribed to {kind}; not waiting.");
            return Err(BusError::NotSubscribed { kind, id });
        }

        log::trace!("Subscriber {id} waiting on {kind}.");
        let payload = self
            .channel(kind)
            .wait_ready(|| self.payload.snapshot(kind))?;
        self.metrics.record_delivery();
        log::trace!("Subscriber {id} woke on {kind}.");

        Ok(Delivery::new(kind, payload))
    }

    /// Publishes the "data ready" pattern for `kind` and wakes its waiters.
    ///
    /// Waiters on other kinds are neither woken nor affected, except that in
    /// [`PayloadIsolation::Shared`] mode they share the payload bytes.
    ///
    /// ## Arguments
    /// * `kind` - The event kind to mark ready.
    pub fn notify(&self, kind: EventKind) -> BusResult<()> {
        self.channel(kind)
            .signal(|| self.payload.write_ready(kind))?;
        self.metrics.record_notification();
        log::trace!("Notified {kind}.");
        Ok(())
    }

    /// Like [`notify`](Self::notify) but publishes `data`, truncated to fit
    /// the snapshot window.
    ///
    /// ## Arguments
    /// * `kind` - The event kind to mark ready.
    /// * `data` - The bytes to publish, without terminator.
    ///
    /// ## Returns
    /// The number of bytes of `data` written.
    pub fn notify_with(&self, kind: EventKind, data: &[u8]) -> BusResult<usize> {
        let written = self
            .channel(kind)
            .signal(|| self.payload.write(kind, data))?;
        self.metrics.record_notification();
        log::trace!("Notified {kind} with {written} payload bytes.");
        Ok(written)
    }

    /// Returns the sticky ready flag of `kind`.
    pub fn is_ready(&self, kind: EventKind) -> BusResult<bool> {
        self.channel(kind).is_ready()
    }

    /// Clears the ready flag of `kind`, so later waits block again.
    ///
    /// ## Returns
    /// The previous value of the flag.
    pub fn reset(&self, kind: EventKind) -> BusResult<bool> {
        let was_ready = self.channel(kind).reset()?;
        log::debug!("Reset {kind} (was ready: {was_ready}).");
        Ok(was_ready)
    }

    /// Number of notifications completed on `kind`.
    pub fn notifications(&self, kind: EventKind) -> BusResult<u64> {
        self.channel(kind).notifications()
    }

    // --- Callbacks ---

    /// Registers the handler for `kind`, replacing any previous one.
    ///
    /// ## Arguments
    /// * `kind` - The event kind the handler answers for.
    /// * `handler` - Any [`EventHandler`], including a `Fn(&[u8])` closure.
    ///
    /// ## Returns
    /// `true` if a handler was replaced.
    pub fn register_callback<H>(&self, kind: EventKind, handler: H) -> BusResult<bool>
    where
        H: EventHandler + 'static,
    {
        let replaced = self.callbacks.register(kind, handler)?;
        log::debug!(
            "Registered handler for {kind}{}.",
            if replaced { " (replaced previous)" } else { "" }
        );
        Ok(replaced)
    }

    /// Removes the handler for `kind`, returning whether one was present.
    pub fn unregister_callback(&self, kind: EventKind) -> BusResult<bool> {
        self.callbacks.unregister(kind)
    }

    /// Returns `true` if a handler is registered for `kind`.
    pub fn has_callback(&self, kind: EventKind) -> BusResult<bool> {
        self.callbacks.contains(kind)
    }

    /// Runs the handler for `kind` with `payload` on the calling thread.
    ///
    /// ## Arguments
    /// * `kind` - Selects the handler; it need not be the kind the payload
    ///   was delivered for.
    /// * `payload` - The bytes handed to the handler.
    ///
    /// ## Returns
    /// [`BusError::MissingHandler`] if no handler is registered for `kind`.
    pub fn invoke_callback(&self, kind: EventKind, payload: &[u8]) -> BusResult<()> {
        match self.callbacks.invoke(kind, payload) {
            Ok(()) => {
                self.metrics.record_callback();
                Ok(())
            }
            Err(err @ BusError::MissingHandler(_)) => {
                self.metrics.record_missing_handler();
                log::error!("Failed to invoke callback: {err}.");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Reads the activity counters.
    pub fn stats(&self) -> BusStats {
        self.metrics.snapshot()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TERMINATOR;
    use crate::payload::READY_BYTE;
    use std::sync::{Arc, Mutex};

    fn id(raw: u64) -> SubscriberId {
        SubscriberId::from_raw(raw)
    }

    #[test]
    fn test_wait_without_subscription_does_not_block() {
        let bus = EventBus::new();
        let result = bus.wait(EventKind::Event0, id(1));

        assert_eq!(
            result,
            Err(BusError::NotSubscribed {
                kind: EventKind::Event0,
                id: id(1)
            })
        );
        assert_eq!(bus.stats().rejected_waits, 1);
    }

    #[test]
    fn test_wait_after_unsubscribe_is_rejected() {
        let bus = EventBus::new();
        bus.subscribe(EventKind::Event2, id(3)).unwrap();
        bus.notify(EventKind::Event2).unwrap();
        bus.unsubscribe(EventKind::Event2, id(3)).unwrap();

        assert!(bus
            .wait(EventKind::Event2, id(3))
            .unwrap_err()
            .is_not_subscribed());
    }

    #[test]
    fn test_sticky_flag_serves_late_subscriber() {
        let bus = EventBus::new();
        bus.notify(EventKind::Event1).unwrap();

        bus.subscribe(EventKind::Event1, id(8)).unwrap();
        let delivery = bus.wait(EventKind::Event1, id(8)).unwrap();

        assert_eq!(delivery.kind(), EventKind::Event1);
        assert_eq!(delivery.len(), bus.config().delivered_len);
        assert!(delivery.payload()[..512].iter().all(|&b| b == READY_BYTE));
        assert_eq!(delivery.payload()[512], TERMINATOR);
    }

    #[test]
    fn test_observed_kind_is_the_notified_kind() {
        let bus = EventBus::new();
        for kind in EventKind::ALL {
            bus.subscribe(kind, id(1)).unwrap();
            bus.notify(kind).unwrap();
            assert_eq!(bus.wait(kind, id(1)).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_notify_leaves_other_kinds_alone() {
        let bus = EventBus::new();
        bus.notify(EventKind::Event0).unwrap();

        assert!(bus.is_ready(EventKind::Event0).unwrap());
        assert!(!bus.is_ready(EventKind::Event1).unwrap());
        assert!(!bus.is_ready(EventKind::Event2).unwrap());
        assert_eq!(bus.notifications(EventKind::Event0).unwrap(), 1);
        assert_eq!(bus.notifications(EventKind::Event1).unwrap(), 0);
    }

    #[test]
    fn test_reset_rearms_channel() {
        let bus = EventBus::new();
        bus.notify(EventKind::Event0).unwrap();
        assert!(bus.reset(EventKind::Event0).unwrap());
        assert!(!bus.is_ready(EventKind::Event0).unwrap());
    }

    #[test]
    fn test_notify_with_custom_payload() {
        let bus = EventBus::new();
        bus.subscribe(EventKind::Event0, id(2)).unwrap();

        assert_eq!(bus.notify_with(EventKind::Event0, b"hello").unwrap(), 5);
        let delivery = bus.wait(EventKind::Event0, id(2)).unwrap();
        assert_eq!(delivery.data(), b"hello");
        assert_eq!(delivery.to_string(), "[hello]");
    }

    #[test]
    fn test_invoke_callback_counts_and_errors() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        bus.register_callback(EventKind::Event1, move |payload: &[u8]| {
            *sink.lock().unwrap() = Some(payload.len());
        })
        .unwrap();

        bus.invoke_callback(EventKind::Event1, b"1234").unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(4));

        assert_eq!(
            bus.invoke_callback(EventKind::Event0, b""),
            Err(BusError::MissingHandler(EventKind::Event0))
        );

        let stats = bus.stats();
        assert_eq!(stats.callbacks_invoked, 1);
        assert_eq!(stats.missing_handlers, 1);
    }

    #[test]
    fn test_unregister_callback_makes_invoke_fail() {
        let bus = EventBus::new();
        bus.register_callback(EventKind::Event2, |_: &[u8]| {})
            .unwrap();

        assert!(bus.unregister_callback(EventKind::Event2).unwrap());
        assert!(!bus.unregister_callback(EventKind::Event2).unwrap());
        assert!(!bus.has_callback(EventKind::Event2).unwrap());
        assert_eq!(
            bus.invoke_callback(EventKind::Event2, b"x"),
            Err(BusError::MissingHandler(EventKind::Event2))
        );
    }

    #[test]
    fn test_payload_isolation_follows_config() {
        let bus = EventBus::new();
        assert_eq!(bus.payload_isolation(), PayloadIsolation::PerKind);

        let config = BusConfig::default().with_isolation(PayloadIsolation::Shared);
        let bus = EventBus::with_config(config).unwrap();
        assert_eq!(bus.payload_isolation(), PayloadIsolation::Shared);
    }

    #[test]
    fn test_with_config_validates() {
        let config = BusConfig {
            pool_capacity: 4,
            delivered_len: 8,
            ..BusConfig::default()
        };
        assert!(matches!(
            EventBus::with_config(config),
            Err(BusError::InvalidConfig(_))
        ));
    }
}
