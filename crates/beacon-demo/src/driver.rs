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

//! Runs one demo scenario: subscriber threads, a settle delay, a single
//! notification and the resulting dispatches.

use crate::config::DemoConfig;
use crate::handlers;
use anyhow::{ensure, Context, Result};
use beacon_core::{
    BusError, BusResult, BusStats, EventBus, EventKind, Publisher, Subscriber, SubscriberId,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// What a single subscriber thread ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Woke with a payload and ran the handler of `handler`.
    Delivered {
        /// Kind reported by the delivery.
        observed: EventKind,
        /// Kind whose handler was invoked.
        handler: EventKind,
        /// Payload length.
        len: usize,
    },
    /// Was not subscribed to the waited kind; nothing dispatched.
    NotSubscribed,
    /// A bus call failed.
    Failed(BusError),
}

/// The report sent back by a subscriber thread.
#[derive(Debug, Clone)]
pub struct Report {
    /// Id of the reporting subscriber.
    pub subscriber: SubscriberId,
    /// Kind it randomly subscribed to.
    pub subscribed: EventKind,
    /// How its wait ended.
    pub outcome: Outcome,
}

/// Totals of a run, printable as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Kind waited on and notified.
    pub event: EventKind,
    /// Subscriber threads spawned.
    pub subscribers: usize,
    /// Threads that woke and dispatched.
    pub delivered: usize,
    /// Threads that skipped because they were not subscribed.
    pub not_subscribed: usize,
    /// Threads that hit a bus error.
    pub failed: usize,
    /// Bus counters at the end of the run.
    pub stats: BusStats,
}

impl RunSummary {
    fn from_reports(config: &DemoConfig, reports: &[Report], stats: BusStats) -> Self {
        let mut summary = Self {
            event: config.event,
            subscribers: config.subscribers,
            delivered: 0,
            not_subscribed: 0,
            failed: 0,
            stats,
        };
        for report in reports {
            match report.outcome {
                Outcome::Delivered { .. } => summary.delivered += 1,
                Outcome::NotSubscribed => summary.not_subscribed += 1,
                Outcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Writes the totals to the log.
    pub fn log(&self) {
        log::info!(
            "Run on {}: {} subscriber(s), {} delivered, {} not subscribed, {} failed.",
            self.event,
            self.subscribers,
            self.delivered,
            self.not_subscribed,
            self.failed
        );
        log::info!(
            "Bus stats: {} notification(s), {} delivery(ies), {} rejected wait(s), {} callback(s).",
            self.stats.notifications,
            self.stats.deliveries,
            self.stats.rejected_waits,
            self.stats.callbacks_invoked
        );
    }
}

fn random_kind(rng: &mut impl Rng) -> EventKind {
    EventKind::ALL[rng.gen_range(0..EventKind::COUNT)]
}

fn rng_for(seed: Option<u64>, index: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index)),
        None => StdRng::from_entropy(),
    }
}

/// Body of one subscriber thread.
fn run_subscriber(
    bus: Arc<EventBus>,
    event: EventKind,
    max_jitter: u64,
    mut rng: StdRng,
) -> Report {
    let subscriber = Subscriber::new(bus);
    let subscribed = random_kind(&mut rng);
    let report = |outcome| Report {
        subscriber: subscriber.id(),
        subscribed,
        outcome,
    };

    if let Err(err) = subscriber.subscribe(subscribed) {
        return report(Outcome::Failed(err));
    }
    log::debug!("Subscriber {} subscribed to {subscribed}.", subscriber.id());

    thread::sleep(Duration::from_millis(rng.gen_range(0..=max_jitter)));

    let outcome = match subscriber.listen_on_event(event) {
        Ok(delivery) => {
            let handler = random_kind(&mut rng);
            log::info!(
                "Subscriber {} woke on {} with {} bytes, dispatching to {handler}.",
                subscriber.id(),
                delivery.kind(),
                delivery.len()
            );
            match subscriber.dispatch(handler, &delivery) {
                Ok(()) => Outcome::Delivered {
                    observed: delivery.kind(),
                    handler,
                    len: delivery.len(),
                },
                Err(err) => Outcome::Failed(err),
            }
        }
        Err(err) if err.is_not_subscribed() => {
            log::info!(
                "Subscriber {} is not subscribed to {event}, skipping.",
                subscriber.id()
            );
            Outcome::NotSubscribed
        }
        Err(err) => Outcome::Failed(err),
    };
    report(outcome)
}

/// Notifies `event`, then joins every worker.
///
/// Waiters on `event` can only be woken by a notify, so when `notify` fails
/// the workers are detached and the error is returned without joining.
fn release_workers<F>(event: EventKind, workers: Vec<JoinHandle<()>>, notify: F) -> Result<()>
where
    F: FnOnce() -> BusResult<()>,
{
    if let Err(err) = notify() {
        log::error!(
            "Failed to notify {event}: {err}. Detaching {} subscriber thread(s).",
            workers.len()
        );
        let context = format!("Failed to notify {event}");
        return Err(anyhow::Error::new(err).context(context));
    }

    let mut panicked = 0;
    for worker in workers {
        if worker.join().is_err() {
            panicked += 1;
        }
    }
    ensure!(panicked == 0, "{panicked} subscriber thread(s) panicked");
    Ok(())
}

/// Runs the scenario described by `config` and returns its totals.
pub fn run(config: &DemoConfig) -> Result<RunSummary> {
    let bus = Arc::new(
        EventBus::with_config(config.bus.clone()).context("Failed to build the event bus")?,
    );
    handlers::register_all(&bus).context("Failed to register handlers")?;

    let (report_tx, report_rx) = flume::unbounded();
    let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(config.subscribers);
    let mut spawn_error = None;
    for index in 0..config.subscribers {
        let bus = Arc::clone(&bus);
        let report_tx = report_tx.clone();
        let rng = rng_for(config.seed, index as u64);
        let (event, jitter_ms) = (config.event, config.jitter_ms);
        let spawned = thread::Builder::new()
            .name(format!("subscriber-{index}"))
            .spawn(move || {
                let report = run_subscriber(bus, event, jitter_ms, rng);
                if report_tx.send(report).is_err() {
                    log::warn!("Report channel closed before subscriber {index} finished.");
                }
            });
        match spawned {
            Ok(worker) => workers.push(worker),
            Err(err) => {
                // The threads already running still need the notify below.
                log::error!("Failed to spawn subscriber thread {index}: {err}");
                spawn_error = Some(err);
                break;
            }
        }
    }
    drop(report_tx);

    log::info!(
        "Spawned {} subscriber(s), notifying {} in {} ms.",
        workers.len(),
        config.event,
        config.settle_ms
    );
    thread::sleep(config.settle());

    let publisher = Publisher::new(Arc::clone(&bus));
    let notify = || publisher.notify_on_event(config.event);
    release_workers(config.event, workers, notify)?;
    if let Some(err) = spawn_error {
        return Err(err).context("Failed to spawn every subscriber thread");
    }

    let reports: Vec<Report> = report_rx.drain().collect();
    for report in &reports {
        match &report.outcome {
            Outcome::Delivered {
                observed,
                handler,
                len,
            } => log::debug!(
                "Subscriber {} (on {}) saw {observed}, handled as {handler}, {len} bytes.",
                report.subscriber,
                report.subscribed
            ),
            Outcome::NotSubscribed => {}
            Outcome::Failed(err) => log::error!(
                "Subscriber {} (on {}) failed: {err}",
                report.subscriber,
                report.subscribed
            ),
        }
    }

    Ok(RunSummary::from_reports(config, &reports, bus.stats()))
}
