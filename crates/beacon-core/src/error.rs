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

//! Error types reported by the bus.
//!
//! Every failure is detected and returned at the call site that discovers it.
//! There is no retry and no central error channel.

use crate::event::EventKind;
use crate::subscription::SubscriberId;
use thiserror::Error;

/// A specialized `Result` type for bus operations.
pub type BusResult<T> = Result<T, BusError>;

/// An error that can occur while using the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// `wait` was called by an id that is not registered for the kind.
    ///
    /// This is returned immediately; the caller never blocks.
    #[error("subscriber {id} is not subscribed to {kind}")]
    NotSubscribed {
        /// The kind that was waited on.
        kind: EventKind,
        /// The id that attempted to wait.
        id: SubscriberId,
    },
    /// A raw value or name does not denote any member of [`EventKind`].
    #[error("unknown event kind: {0}")]
    UnknownKind(String),
    /// A callback was invoked for a kind with no registered handler.
    #[error("no handler registered for {0}")]
    MissingHandler(EventKind),
    /// The payload snapshot could not be allocated.
    #[error("failed to allocate a {requested}-byte payload snapshot")]
    ResourceExhaustion {
        /// The number of bytes requested.
        requested: usize,
    },
    /// The bus configuration was rejected at construction.
    #[error("invalid bus configuration: {0}")]
    InvalidConfig(String),
    /// A thread panicked while holding one of the bus locks.
    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

impl BusError {
    /// Returns `true` if this is a [`BusError::NotSubscribed`] result.
    pub fn is_not_subscribed(&self) -> bool {
        matches!(self, BusError::NotSubscribed { .. })
    }
}
