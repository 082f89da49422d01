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

//! Identity-bearing handles over a shared [`EventBus`](crate::EventBus).

mod publisher;
mod subscriber;

pub use self::publisher::Publisher;
pub use self::subscriber::{Subscriber, Subscription};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BusError, EventBus, EventKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_handles_draw_distinct_ids() {
        let bus = Arc::new(EventBus::new());
        let publisher = Publisher::new(Arc::clone(&bus));
        let a = Subscriber::new(Arc::clone(&bus));
        let b = Subscriber::new(Arc::clone(&bus));

        assert_ne!(a.id(), b.id());
        assert_ne!(a.id().raw(), publisher.id().raw());
        assert_ne!(b.id().raw(), publisher.id().raw());
    }

    #[test]
    fn test_drop_unsubscribes_everything() {
        let bus = Arc::new(EventBus::new());
        let subscriber = Subscriber::new(Arc::clone(&bus));
        let id = subscriber.id();
        subscriber.subscribe(EventKind::Event0).unwrap();
        subscriber.subscribe(EventKind::Event2).unwrap();

        drop(subscriber);

        assert!(!bus.is_subscribed(EventKind::Event0, id).unwrap());
        assert!(!bus.is_subscribed(EventKind::Event2, id).unwrap());
        assert!(bus
            .wait(EventKind::Event0, id)
            .unwrap_err()
            .is_not_subscribed());
    }

    #[test]
    fn test_scoped_subscription_ends_on_drop() {
        let bus = Arc::new(EventBus::new());
        let subscriber = Subscriber::new(Arc::clone(&bus));
        bus.notify(EventKind::Event1).unwrap();

        {
            let subscription = subscriber.subscribe_scoped(EventKind::Event1).unwrap();
            assert_eq!(subscription.kind(), EventKind::Event1);
            assert_eq!(subscription.listen().unwrap().kind(), EventKind::Event1);
        }

        assert!(matches!(
            subscriber.listen_on_event(EventKind::Event1),
            Err(BusError::NotSubscribed { .. })
        ));
    }

    #[test]
    fn test_dispatch_may_target_another_kind() {
        let bus = Arc::new(EventBus::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        bus.register_callback(EventKind::Event2, move |payload: &[u8]| {
            counter.fetch_add(payload.len(), Ordering::SeqCst);
        })
        .unwrap();

        let publisher = Publisher::new(Arc::clone(&bus));
        let subscriber = Subscriber::new(Arc::clone(&bus));
        subscriber.subscribe(EventKind::Event0).unwrap();
        publisher.notify_on_event(EventKind::Event0).unwrap();

        let delivery = subscriber.listen_on_event(EventKind::Event0).unwrap();
        subscriber.dispatch(EventKind::Event2, &delivery).unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), delivery.len());
        assert_eq!(
            subscriber.dispatch(EventKind::Event1, &delivery),
            Err(BusError::MissingHandler(EventKind::Event1))
        );
    }

    #[test]
    fn test_bus_outlives_handles_through_arc() {
        let bus = Arc::new(EventBus::new());
        let publisher = Publisher::new(Arc::clone(&bus));
        drop(bus);

        publisher.notify_on_event(EventKind::Event0).unwrap();
        assert!(publisher.bus().is_ready(EventKind::Event0).unwrap());
        assert_eq!(Arc::strong_count(publisher.bus()), 1);
    }
}
