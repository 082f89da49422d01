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

//! Dispatch table mapping each event kind to one handler.

use crate::error::{BusError, BusResult};
use crate::event::EventKind;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A handler invoked with a delivered payload.
///
/// Any `Fn(&[u8]) + Send + Sync` closure is a handler.
pub trait EventHandler: Send + Sync {
    /// Handles one payload. Runs on the thread that invoked the callback.
    fn handle(&self, payload: &[u8]);
}

impl<F> EventHandler for F
where
    F: Fn(&[u8]) + Send + Sync,
{
    fn handle(&self, payload: &[u8]) {
        self(payload)
    }
}

/// At most one handler per [`EventKind`]; registering again replaces it.
#[derive(Default)]
pub struct CallbackRegistry {
    handlers: RwLock<HashMap<EventKind, Arc<dyn EventHandler>>>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`.
    ///
    /// Returns `true` if a previous handler was replaced.
    pub fn register<H>(&self, kind: EventKind, handler: H) -> BusResult<bool>
    where
        H: EventHandler + 'static,
    {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|_| BusError::LockPoisoned("callback registry"))?;
        Ok(handlers.insert(kind, Arc::new(handler)).is_some())
    }

    /// Removes the handler for `kind`, returning whether one was present.
    pub fn unregister(&self, kind: EventKind) -> BusResult<bool> {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|_| BusError::LockPoisoned("callback registry"))?;
        Ok(handlers.remove(&kind).is_some())
    }

    /// Returns `true` if a handler is registered for `kind`.
    pub fn contains(&self, kind: EventKind) -> BusResult<bool> {
        let handlers = self
            .handlers
            .read()
            .map_err(|_| BusError::LockPoisoned("callback registry"))?;
        Ok(handlers.contains_key(&kind))
    }

    /// Runs the handler registered for `kind` on the calling thread.
    ///
    /// The registry lock is released before the handler runs, so a handler
    /// may itself register or invoke callbacks.
    pub fn invoke(&self, kind: EventKind, payload: &[u8]) -> BusResult<()> {
        let handler = {
            let handlers = self
                .handlers
                .read()
                .map_err(|_| BusError::LockPoisoned("callback registry"))?;
            handlers.get(&kind).cloned()
        };

        match handler {
            Some(handler) => {
                handler.handle(payload);
                Ok(())
            }
            None => Err(BusError::MissingHandler(kind)),
        }
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<EventKind> = self
            .handlers
            .read()
            .map(|handlers| handlers.keys().copied().collect())
            .unwrap_or_default();
        kinds.sort();
        f.debug_struct("CallbackRegistry")
            .field("registered", &kinds)
            .finish()
    }
}
