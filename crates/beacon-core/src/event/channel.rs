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

//! Per-kind wait/wake coordination.

use crate::error::{BusError, BusResult};
use crate::event::EventKind;
use std::sync::{Condvar, Mutex};

#[derive(Debug, Default)]
struct ChannelState {
    /// Sticky: once set, stays set until [`Channel::reset`].
    ready: bool,
    notifications: u64,
}

/// A mutex, a condition variable and a sticky "ready" flag for one kind.
///
/// Channels of different kinds never share a lock.
#[derive(Debug)]
pub struct Channel {
    kind: EventKind,
    state: Mutex<ChannelState>,
    ready_cv: Condvar,
}

impl Channel {
    /// Creates a channel for `kind` with the ready flag cleared.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            state: Mutex::new(ChannelState::default()),
            ready_cv: Condvar::new(),
        }
    }

    /// The kind this channel belongs to.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Runs `publish` under the channel lock, marks the channel ready, then
    /// wakes every waiter once the lock has been released.
    ///
    /// If `publish` fails the flag is left untouched and nobody is woken.
    pub fn signal<T, F>(&self, publish: F) -> BusResult<T>
    where
        F: FnOnce() -> BusResult<T>,
    {
        let output = {
            let mut state = self
                .state
                .lock()
                .map_err(|_| BusError::LockPoisoned("event channel"))?;
            let output = publish()?;
            state.ready = true;
            state.notifications += 1;
            output
        };
        self.ready_cv.notify_all();
        Ok(output)
    }

    /// Blocks until the channel is ready, then runs `read` with the channel
    /// lock still held.
    ///
    /// Returns immediately if the flag was already set.
    pub fn wait_ready<T, F>(&self, read: F) -> BusResult<T>
    where
        F: FnOnce() -> BusResult<T>,
    {
        let state = self
            .state
            .lock()
            .map_err(|_| BusError::LockPoisoned("event channel"))?;
        let _state = self
            .ready_cv
            .wait_while(state, |state| !state.ready)
            .map_err(|_| BusError::LockPoisoned("event channel"))?;
        read()
    }

    /// Returns the current value of the ready flag.
    pub fn is_ready(&self) -> BusResult<bool> {
        self.state
            .lock()
            .map(|state| state.ready)
            .map_err(|_| BusError::LockPoisoned("event channel"))
    }

    /// Clears the ready flag, returning its previous value.
    pub fn reset(&self) -> BusResult<bool> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| BusError::LockPoisoned("event channel"))?;
        Ok(std::mem::replace(&mut state.ready, false))
    }

    /// Number of completed signals on this channel.
    pub fn notifications(&self) -> BusResult<u64> {
        self.state
            .lock()
            .map(|state| state.notifications)
            .map_err(|_| BusError::LockPoisoned("event channel"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wait_returns_immediately_when_ready() {
        let channel = Channel::new(EventKind::Event0);
        channel.signal(|| Ok(())).unwrap();

        let value = channel.wait_ready(|| Ok(42)).unwrap();
        assert_eq!(value, 42);
        assert!(channel.is_ready().unwrap());
    }

    #[test]
    fn test_signal_wakes_blocked_waiter() {
        let channel = Arc::new(Channel::new(EventKind::Event1));
        let (tx, rx) = flume::unbounded();

        let waiter = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || {
                let kind = channel.wait_ready(|| Ok(channel.kind())).unwrap();
                tx.send(kind).unwrap();
            })
        };

        assert!(
            rx.recv_timeout(Duration::from_millis(50)).is_err(),
            "waiter should still be blocked"
        );
        channel.signal(|| Ok(())).unwrap();

        let kind = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("waiter was never woken");
        assert_eq!(kind, EventKind::Event1);
        waiter.join().expect("waiter panicked");
    }

    #[test]
    fn test_failed_publish_leaves_flag_clear() {
        let channel = Channel::new(EventKind::Event2);
        let result: BusResult<()> = channel.signal(|| Err(BusError::LockPoisoned("test")));

        assert!(result.is_err());
        assert!(!channel.is_ready().unwrap());
        assert_eq!(channel.notifications().unwrap(), 0);
    }

    #[test]
    fn test_reset_clears_sticky_flag() {
        let channel = Channel::new(EventKind::Event0);
        channel.signal(|| Ok(())).unwrap();
        channel.signal(|| Ok(())).unwrap();

        assert!(channel.reset().unwrap());
        assert!(!channel.is_ready().unwrap());
        assert!(!channel.reset().unwrap());
        assert_eq!(channel.notifications().unwrap(), 2);
    }
}
