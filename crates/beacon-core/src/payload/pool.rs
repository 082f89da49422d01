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

//! Fixed-capacity payload regions written by `notify` and copied by `wait`.

use crate::config::{BusConfig, TERMINATOR};
use crate::error::{BusError, BusResult};
use crate::event::EventKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Byte pattern written by a plain `notify` to mean "data ready".
pub const READY_BYTE: u8 = b'1';

/// How payload regions are shared between event kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadIsolation {
    /// One region for every kind. A notify on one kind overwrites the bytes
    /// another kind's waiters are about to copy: the last writer wins.
    Shared,
    /// One region per kind. Notifies on different kinds never touch each
    /// other's bytes.
    #[default]
    PerKind,
}

impl fmt::Display for PayloadIsolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadIsolation::Shared => write!(f, "shared"),
            PayloadIsolation::PerKind => write!(f, "per-kind"),
        }
    }
}

impl FromStr for PayloadIsolation {
    type Err = BusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(PayloadIsolation::Shared),
            "per-kind" | "per_kind" | "perkind" => Ok(PayloadIsolation::PerKind),
            other => Err(BusError::InvalidConfig(format!(
                "unknown payload isolation '{other}', expected 'shared' or 'per-kind'"
            ))),
        }
    }
}

/// The payload area of a bus.
///
/// In [`PayloadIsolation::Shared`] mode there is a single region and writes
/// for different kinds race on it; each region only carries a short lock so
/// that a byte copy is never torn.
#[derive(Debug)]
pub struct PayloadPool {
    isolation: PayloadIsolation,
    capacity: usize,
    delivered_len: usize,
    regions: Vec<Mutex<Box<[u8]>>>,
}

impl PayloadPool {
    /// Allocates the zero-filled regions described by `config`.
    ///
    /// Fails with [`BusError::InvalidConfig`] if a snapshot would not fit in a
    /// region or could not hold its terminator.
    pub fn new(config: &BusConfig) -> BusResult<Self> {
        config.validate()?;
        Ok(Self::allocate(config))
    }

    /// Allocates without validating. Callers must have validated `config`.
    pub(crate) fn allocate(config: &BusConfig) -> Self {
        let region_count = match config.isolation {
            PayloadIsolation::Shared => 1,
            PayloadIsolation::PerKind => EventKind::COUNT,
        };
        let regions = (0..region_count)
            .map(|_| Mutex::new(vec![TERMINATOR; config.pool_capacity].into_boxed_slice()))
            .collect();

        Self {
            isolation: config.isolation,
            capacity: config.pool_capacity,
            delivered_len: config.delivered_len,
            regions,
        }
    }

    /// Returns the isolation mode of this pool.
    pub fn isolation(&self) -> PayloadIsolation {
        self.isolation
    }

    /// Returns the capacity of each region in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the length of every snapshot produced by [`snapshot`](Self::snapshot).
    pub fn delivered_len(&self) -> usize {
        self.delivered_len
    }

    /// Returns the number of distinct regions backing the pool.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    fn region(&self, kind: EventKind) -> &Mutex<Box<[u8]>> {
        match self.isolation {
            PayloadIsolation::Shared => &self.regions[0],
            PayloadIsolation::PerKind => &self.regions[kind.index()],
        }
    }

    /// Fills the snapshot window of `kind`'s region with [`READY_BYTE`]
    /// followed by the terminator.
    pub fn write_ready(&self, kind: EventKind) -> BusResult<()> {
        let body = self.delivered_len - 1;
        let mut region = self
            .region(kind)
            .lock()
            .map_err(|_| BusError::LockPoisoned("payload region"))?;
        region[..body].fill(READY_BYTE);
        region[body] = TERMINATOR;
        Ok(())
    }

    /// Copies `data` into `kind`'s region, truncated to leave room for the
    /// terminator, and clears the rest of the snapshot window.
    ///
    /// Returns the number of bytes of `data` actually written.
    pub fn write(&self, kind: EventKind, data: &[u8]) -> BusResult<usize> {
        let written = data.len().min(self.delivered_len - 1);
        let mut region = self
            .region(kind)
            .lock()
            .map_err(|_| BusError::LockPoisoned("payload region"))?;
        region[..written].copy_from_slice(&data[..written]);
        region[written..self.delivered_len].fill(TERMINATOR);
        Ok(written)
    }

    /// Copies a `delivered_len`-byte snapshot out of `kind`'s region and
    /// forces its final byte to the terminator.
    pub fn snapshot(&self, kind: EventKind) -> BusResult<Arc<[u8]>> {
        let len = self.delivered_len;
        let mut snapshot = Vec::new();
        snapshot
            .try_reserve_exact(len)
            .map_err(|_| BusError::ResourceExhaustion { requested: len })?;

        {
            let region = self
                .region(kind)
                .lock()
                .map_err(|_| BusError::LockPoisoned("payload region"))?;
            snapshot.extend_from_slice(&region[..len]);
        }

        snapshot[len - 1] = TERMINATOR;
        Ok(Arc::from(snapshot))
    }
}
