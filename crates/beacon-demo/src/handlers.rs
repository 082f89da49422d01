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

//! The handlers the demo registers, one per event kind.

use beacon_core::{BusResult, EventBus, EventKind, TERMINATOR};

/// Bytes of payload shown in a handler's log line.
const PREVIEW_LEN: usize = 32;

/// Registers a logging handler for every kind on `bus`.
pub fn register_all(bus: &EventBus) -> BusResult<()> {
    for kind in EventKind::ALL {
        bus.register_callback(kind, move |payload: &[u8]| {
            log::info!("Handler {kind} got {}", preview(payload));
        })?;
    }
    Ok(())
}

/// Renders a payload as `[...]`, up to the terminator, shortened past
/// [`PREVIEW_LEN`] bytes.
fn preview(payload: &[u8]) -> String {
    let end = payload
        .iter()
        .position(|&b| b == TERMINATOR)
        .unwrap_or(payload.len());
    let body = &payload[..end];
    let shown = String::from_utf8_lossy(&body[..body.len().min(PREVIEW_LEN)]);
    if body.len() > PREVIEW_LEN {
        format!("[{shown}...] ({} bytes)", body.len())
    } else {
        format!("[{shown}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_stops_at_terminator() {
        assert_eq!(preview(b"abc\0zzz"), "[abc]");
        assert_eq!(preview(b""), "[]");
    }

    #[test]
    fn test_preview_shortens_long_payloads() {
        let payload = [b'1'; 40];
        let rendered = preview(&payload);
        assert!(rendered.starts_with(&format!("[{}...]", "1".repeat(PREVIEW_LEN))));
        assert!(rendered.ends_with("(40 bytes)"));
    }

    #[test]
    fn test_registers_every_kind() {
        let bus = EventBus::new();
        register_all(&bus).unwrap();
        for kind in EventKind::ALL {
            assert!(bus.has_callback(kind).unwrap());
        }
    }
}
