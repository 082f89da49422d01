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

//! The snapshot handed to a subscriber after a successful wait.

use crate::config::TERMINATOR;
use crate::event::EventKind;
use std::fmt;
use std::sync::Arc;

/// Payload snapshot returned by [`EventBus::wait`](crate::EventBus::wait).
///
/// Cloning is cheap: the bytes are reference-counted and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    kind: EventKind,
    payload: Arc<[u8]>,
}

impl Delivery {
    /// Wraps a snapshot observed for `kind`.
    pub fn new(kind: EventKind, payload: Arc<[u8]>) -> Self {
        Self { kind, payload }
    }

    /// The kind whose channel woke the waiter.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The full snapshot, terminator included.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Length of the snapshot in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns `true` if the snapshot holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// The bytes preceding the first terminator.
    pub fn data(&self) -> &[u8] {
        let end = self
            .payload
            .iter()
            .position(|&b| b == TERMINATOR)
            .unwrap_or(self.payload.len());
        &self.payload[..end]
    }

    /// Splits the delivery into `(kind, payload, length)`.
    pub fn into_parts(self) -> (EventKind, Arc<[u8]>, usize) {
        let len = self.payload.len();
        (self.kind, self.payload, len)
    }
}

/// Renders the payload as `[...]`, stopping at the first terminator.
impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", String::from_utf8_lossy(self.data()))
    }
}
