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

//! # Beacon Core
//!
//! An in-process event notification bus. Publishers announce that data for an
//! [`EventKind`] is ready; subscribers register interest, block until
//! notified, receive a [`Delivery`] snapshot of the payload and may dispatch
//! it to a handler registered in the bus's callback table.
//!
//! ```rust
//! use beacon_core::{EventBus, EventKind, Publisher, Subscriber};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let bus = Arc::new(EventBus::new());
//! bus.register_callback(EventKind::Event0, |payload: &[u8]| {
//!     assert_eq!(payload.len(), 513);
//! })
//! .unwrap();
//!
//! let subscriber = Subscriber::new(Arc::clone(&bus));
//! subscriber.subscribe(EventKind::Event0).unwrap();
//!
//! let waiter = thread::spawn(move || {
//!     let delivery = subscriber.listen_on_event(EventKind::Event0).unwrap();
//!     subscriber.dispatch(EventKind::Event0, &delivery).unwrap();
//! });
//!
//! Publisher::new(bus).notify_on_event(EventKind::Event0).unwrap();
//! waiter.join().unwrap();
//! ```

#![warn(missing_docs)]

pub mod callback;
pub mod config;
pub mod error;
pub mod event;
pub mod handle;
pub mod payload;
pub mod subscription;
pub mod telemetry;

pub use callback::{CallbackRegistry, EventHandler};
pub use config::{BusConfig, DEFAULT_DELIVERED_LEN, DEFAULT_POOL_CAPACITY, TERMINATOR};
pub use error::{BusError, BusResult};
pub use event::{Channel, EventBus, EventKind};
pub use handle::{Publisher, Subscriber, Subscription};
pub use payload::{Delivery, PayloadIsolation, PayloadPool, READY_BYTE};
pub use subscription::{IdGenerator, PublisherId, SubscriberId, SubscriptionRegistry};
pub use telemetry::{BusMetrics, BusStats};
