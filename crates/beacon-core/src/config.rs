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

//! Bus configuration.

use crate::error::{BusError, BusResult};
use crate::payload::PayloadIsolation;
use serde::{Deserialize, Serialize};

/// Default capacity, in bytes, of each payload region.
pub const DEFAULT_POOL_CAPACITY: usize = 1024 + 1;

/// Default length, in bytes, of every delivered snapshot.
pub const DEFAULT_DELIVERED_LEN: usize = 512 + 1;

/// Value forced into the final byte of every delivered snapshot.
pub const TERMINATOR: u8 = 0;

/// Configuration for an [`EventBus`](crate::EventBus).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Capacity of each payload region in bytes.
    pub pool_capacity: usize,
    /// Length of each delivered snapshot, terminator included.
    pub delivered_len: usize,
    /// Whether kinds share a single payload region or get one each.
    pub isolation: PayloadIsolation,
}

impl BusConfig {
    /// Returns a copy of this config with the given isolation mode.
    pub fn with_isolation(mut self, isolation: PayloadIsolation) -> Self {
        self.isolation = isolation;
        self
    }

    /// Checks that snapshots fit inside the pool and can hold a terminator.
    pub fn validate(&self) -> BusResult<()> {
        if self.delivered_len == 0 {
            return Err(BusError::InvalidConfig(
                "delivered_len must leave room for the terminator".to_string(),
            ));
        }
        if self.delivered_len > self.pool_capacity {
            return Err(BusError::InvalidConfig(format!(
                "delivered_len ({}) exceeds pool_capacity ({})",
                self.delivered_len, self.pool_capacity
            )));
        }
        Ok(())
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            delivered_len: DEFAULT_DELIVERED_LEN,
            isolation: PayloadIsolation::PerKind,
        }
    }
}
