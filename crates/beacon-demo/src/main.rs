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

//! Demo driver for the beacon event bus.

mod cli;
mod config;
mod driver;
mod handlers;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::DemoConfig;

fn main() -> Result<()> {
    use env_logger::{Builder, Env};
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = DemoConfig::load(&cli.config)?.with_overrides(&cli);
    config.validate()?;
    log::debug!("Run configuration: {config:?}");

    let summary = driver::run(&config)?;
    if cli.stats_json {
        let json =
            serde_json::to_string_pretty(&summary).context("Failed to serialize run summary")?;
        println!("{json}");
    } else {
        summary.log();
    }
    Ok(())
}
