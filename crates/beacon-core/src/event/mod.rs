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

//! Event kinds, the per-kind channels, and the bus that ties them together.
//!
//! The [`EventBus`] is the object every [`Publisher`](crate::Publisher) and
//! [`Subscriber`](crate::Subscriber) shares. A subscriber registers for a
//! kind and blocks on that kind's [`Channel`]; a publisher's notify writes the
//! payload and wakes every waiter of that kind and no other.

mod bus;
mod channel;
mod kind;

pub use self::bus::EventBus;
pub use self::channel::Channel;
pub use self::kind::EventKind;
