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

//! Command-line interface of the demo driver.

use beacon_core::{EventKind, PayloadIsolation};
use clap::Parser;
use std::path::PathBuf;

/// Spins subscriber threads against a shared bus and wakes them with one
/// notification.
#[derive(Debug, Parser)]
#[command(name = "beacon-demo", version, about)]
pub struct Cli {
    /// TOML file to load the run configuration from. Missing files fall back
    /// to the defaults.
    #[arg(short, long, default_value = "Beacon.toml")]
    pub config: PathBuf,

    /// Number of subscriber threads.
    #[arg(short = 'n', long)]
    pub subscribers: Option<usize>,

    /// Event every subscriber listens on and the publisher notifies
    /// (`event0`, `Event1`, `2`, ...).
    #[arg(short, long)]
    pub event: Option<EventKind>,

    /// Milliseconds the publisher waits before notifying.
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Upper bound, in milliseconds, of each subscriber's random delay
    /// between subscribing and listening.
    #[arg(long)]
    pub jitter_ms: Option<u64>,

    /// Payload isolation mode: `shared` or `per-kind`.
    #[arg(long)]
    pub isolation: Option<PayloadIsolation>,

    /// Seed for reproducible kind choices.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    pub stats_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_kinds_and_isolation() {
        let cli = Cli::try_parse_from([
            "beacon-demo",
            "-n",
            "4",
            "--event",
            "event2",
            "--isolation",
            "shared",
            "--stats-json",
        ])
        .unwrap();

        assert_eq!(cli.subscribers, Some(4));
        assert_eq!(cli.event, Some(EventKind::Event2));
        assert_eq!(cli.isolation, Some(PayloadIsolation::Shared));
        assert!(cli.stats_json);
        assert_eq!(cli.config, PathBuf::from("Beacon.toml"));
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["beacon-demo", "--event", "event9"]).is_err());
    }
}
