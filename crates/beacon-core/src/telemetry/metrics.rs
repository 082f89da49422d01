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

//! Lock-free counters describing bus activity.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the bus as it runs.
///
/// Every counter is an independent `AtomicU64`; a [`BusStats`] snapshot is
/// therefore not a consistent cut across counters.
#[derive(Debug, Default)]
pub struct BusMetrics {
    notifications: AtomicU64,
    deliveries: AtomicU64,
    rejected_waits: AtomicU64,
    callbacks_invoked: AtomicU64,
    missing_handlers: AtomicU64,
}

impl BusMetrics {
    /// Creates a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery(&self) {
        self.deliveries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected_wait(&self) {
        self.rejected_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_callback(&self) {
        self.callbacks_invoked.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_missing_handler(&self) {
        self.missing_handlers.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads every counter.
    pub fn snapshot(&self) -> BusStats {
        BusStats {
            notifications: self.notifications.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            rejected_waits: self.rejected_waits.load(Ordering::Relaxed),
            callbacks_invoked: self.callbacks_invoked.load(Ordering::Relaxed),
            missing_handlers: self.missing_handlers.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`BusMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusStats {
    /// Completed `notify` calls, all kinds.
    pub notifications: u64,
    /// Waits that returned a payload.
    pub deliveries: u64,
    /// Waits refused because the caller was not subscribed.
    pub rejected_waits: u64,
    /// Handlers that ran to completion.
    pub callbacks_invoked: u64,
    /// Invocations that found no handler.
    pub missing_handlers: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = BusMetrics::new();
        metrics.record_notification();
        metrics.record_delivery();
        metrics.record_delivery();
        metrics.record_rejected_wait();
        metrics.record_missing_handler();

        let stats = metrics.snapshot();
        assert_eq!(stats.notifications, 1);
        assert_eq!(stats.deliveries, 2);
        assert_eq!(stats.rejected_waits, 1);
        assert_eq!(stats.callbacks_invoked, 0);
        assert_eq!(stats.missing_handlers, 1);
    }
}
