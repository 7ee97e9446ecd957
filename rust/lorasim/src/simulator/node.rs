use super::{CycleReport, PublishSettings, RunSummary};
use crate::error::{LoraSimError, Result};
use crate::payload::PayloadAssembler;
use crate::sensor::Tick;
use crate::transport::Transport;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Drives the simulation: one tick per interval, one uplink per device type per tick.
pub struct SimulatorNode {
    id: String,
    assembler: PayloadAssembler,
    transport: Arc<dyn Transport>,
    settings: PublishSettings,
}

impl SimulatorNode {
    pub fn new(
        id: String,
        assembler: PayloadAssembler,
        transport: Arc<dyn Transport>,
        settings: PublishSettings,
    ) -> Result<Self> {
        if settings.interval.is_zero() {
            return Err(LoraSimError::InvalidConfig(
                "publish interval must be positive".into(),
            ));
        }
        if let Some(missing) = settings
            .device_types
            .iter()
            .find(|device_type| !assembler.catalog().contains(**device_type))
        {
            return Err(LoraSimError::InvalidConfig(format!(
                "device type {} is not in the catalog",
                missing
            )));
        }

        Ok(Self {
            id,
            assembler,
            transport,
            settings,
        })
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    /// Assembles and publishes every configured device type for `tick`.
    /// A message that fails to assemble or publish is counted and skipped.
    pub async fn publish_tick(&mut self, tick: Tick) -> CycleReport {
        let mut report = CycleReport::default();

        for device_type in &self.settings.device_types {
            let message = match self.assembler.assemble(*device_type, tick) {
                Ok(message) => message,
                Err(e) => {
                    error!(
                        "Node {} dropping {} uplink for tick {}: {}",
                        self.id, device_type, tick, e
                    );
                    report.dropped += 1;
                    continue;
                }
            };

            debug!(
                "Node {} publishing to {}: {}",
                self.id, message.topic, message.body
            );
            match self
                .transport
                .publish(
                    &message.topic,
                    self.settings.qos,
                    self.settings.retain,
                    message.body.into_bytes(),
                )
                .await
            {
                Ok(()) => report.published += 1,
                Err(e) => {
                    warn!(
                        "Node {} failed to publish to {}: {}",
                        self.id, message.topic, e
                    );
                    report.publish_failures += 1;
                }
            }
        }

        report
    }

    /// Runs until `cancel` fires or the configured run duration elapses, then
    /// disconnects the transport. A tick already being published is finished first.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<RunSummary> {
        let scope = cancel.child_token();
        let _scope_guard = scope.clone().drop_guard();

        if let Some(run_duration) = self.settings.run_duration {
            let shutdown = scope.clone();
            let id = self.id.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(run_duration) => {
                        info!("Node {} reached its run duration of {:?}", id, run_duration);
                        shutdown.cancel();
                    }
                    _ = shutdown.cancelled() => {}
                }
            });
        }

        let period = self.settings.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Node {} starting: {:?} every {:?}",
            self.id, self.settings.device_types, period
        );

        let mut summary = RunSummary::default();
        let mut tick: Tick = 0;
        loop {
            tokio::select! {
                biased;
                _ = scope.cancelled() => {
                    info!("Node {} shutting down after {} ticks", self.id, summary.ticks);
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.publish_tick(tick).await;
                    summary.record(report);
                    info!(
                        "Node {} tick {} at {} ns: {} published, {} dropped, {} failed",
                        self.id,
                        tick,
                        unix_nanos(),
                        report.published,
                        report.dropped,
                        report.publish_failures
                    );
                    tick += 1;
                }
            }
        }

        self.transport.disconnect(self.settings.drain_timeout).await?;
        info!("Node {} finished: {:?}", self.id, summary);
        Ok(summary)
    }
}

fn unix_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default()
}
