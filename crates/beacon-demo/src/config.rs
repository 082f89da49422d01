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

//! Run configuration, loaded from TOML and overridden from the command line.

use crate::cli::Cli;
use anyhow::{ensure, Context, Result};
use beacon_core::{BusConfig, EventKind};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Represents the structure of the `Beacon.toml` run file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of subscriber threads to spawn.
    pub subscribers: usize,
    /// Event the subscribers listen on and the publisher notifies.
    pub event: EventKind,
    /// Delay before the publisher notifies, in milliseconds.
    pub settle_ms: u64,
    /// Upper bound of each subscriber's random delay, in milliseconds.
    pub jitter_ms: u64,
    /// Seed for the subscribers' random choices; entropy when absent.
    pub seed: Option<u64>,
    /// Configuration of the bus itself.
    pub bus: BusConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            subscribers: 10,
            event: EventKind::Event0,
            settle_ms: 2000,
            jitter_ms: 100,
            seed: None,
            bus: BusConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "No '{}' found. Using default configuration.",
                path.display()
            );
            return Ok(Self::default());
        }

        log::info!("Found '{}'. Loading configuration.", path.display());
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{}'", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))
    }

    /// Applies every option given on the command line.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(subscribers) = cli.subscribers {
            self.subscribers = subscribers;
        }
        if let Some(event) = cli.event {
            self.event = event;
        }
        if let Some(settle_ms) = cli.settle_ms {
            self.settle_ms = settle_ms;
        }
        if let Some(jitter_ms) = cli.jitter_ms {
            self.jitter_ms = jitter_ms;
        }
        if let Some(isolation) = cli.isolation {
            self.bus.isolation = isolation;
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
        self
    }

    /// Rejects runs that cannot do anything useful.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.subscribers > 0, "at least one subscriber is required");
        self.bus.validate().context("Invalid [bus] section")?;
        Ok(())
    }

    /// The publisher's settle delay.
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::PayloadIsolation;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DemoConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, DemoConfig::default());
    }

    #[test]
    fn test_loads_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
subscribers = 3
event = "Event1"

[bus]
isolation = "shared"
delivered_len = 33
"#
        )
        .unwrap();

        let config = DemoConfig::load(file.path()).unwrap();
        assert_eq!(config.subscribers, 3);
        assert_eq!(config.event, EventKind::Event1);
        assert_eq!(config.settle_ms, 2000);
        assert_eq!(config.bus.isolation, PayloadIsolation::Shared);
        assert_eq!(config.bus.delivered_len, 33);
        assert_eq!(config.bus.pool_capacity, 1025);
    }

    #[test]
    fn test_malformed_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "subscribers = \"many\"").unwrap();

        let err = DemoConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let cli = Cli::parse_from([
            "beacon-demo",
            "-n",
            "7",
            "--settle-ms",
            "5",
            "--isolation",
            "per-kind",
            "--seed",
            "42",
        ]);
        let base = DemoConfig {
            subscribers: 2,
            bus: BusConfig::default().with_isolation(PayloadIsolation::Shared),
            ..DemoConfig::default()
        };

        let config = base.with_overrides(&cli);
        assert_eq!(config.subscribers, 7);
        assert_eq!(config.settle(), Duration::from_millis(5));
        assert_eq!(config.bus.isolation, PayloadIsolation::PerKind);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.jitter_ms, 100);
    }

    #[test]
    fn test_validate() {
        assert!(DemoConfig::default().validate().is_ok());

        let empty = DemoConfig {
            subscribers: 0,
            ..DemoConfig::default()
        };
        assert!(empty.validate().is_err());

        let mut oversized = DemoConfig::default();
        oversized.bus.delivered_len = oversized.bus.pool_capacity + 1;
        assert!(oversized.validate().is_err());
    }
}
