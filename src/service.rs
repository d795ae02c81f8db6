/*
 * This file is part of Thermwatch.
 *
 * Copyright (C) 2025 Thermwatch contributors
 *
 * Thermwatch is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Thermwatch is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Thermwatch. If not, see <https://www.gnu.org/licenses/>.
 */

//! The query surface and poll loop tying readers, samplers, the threshold
//! evaluator, and the listener registry together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cpu::{self, CpuUsageSample};
use crate::error::{Result, ThermalError};
use crate::registry::{CallbackRegistry, ThermalListener};
use crate::severity::{ThresholdBand, ThresholdEvaluator};
use crate::sysfs::SysfsRoots;
use crate::temperature::{self, SensorType, TemperatureSample, UNKNOWN_TEMPERATURE};

/// Kind of cooling device. Present for the query signature; this deployment
/// exposes no cooling devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoolingType {
    FanRpm,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoolingDevice {
    pub device_type: CoolingType,
    pub name: String,
    pub current_value: f32,
}

/// One service instance: owns the pseudo-file locations, the listener
/// registry, and the per-sensor severity state.
pub struct ThermalService {
    roots: SysfsRoots,
    registry: Arc<CallbackRegistry>,
    evaluator: Mutex<ThresholdEvaluator>,
}

impl ThermalService {
    pub fn new(roots: SysfsRoots) -> Self {
        Self {
            roots,
            registry: Arc::new(CallbackRegistry::new()),
            evaluator: Mutex::new(ThresholdEvaluator::new(ThresholdBand::cpu_default())),
        }
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    /// Reads every thermal zone and returns one sample per readable entry.
    /// Zero readable entries is a failure with ENOENT semantics, matching
    /// the interface contract.
    pub fn get_temperatures(&self) -> Result<Vec<TemperatureSample>> {
        let samples = temperature::sample_thermal_zones(&self.roots)?;
        if samples.is_empty() {
            return Err(ThermalError::NoThermalZones);
        }
        Ok(samples)
    }

    /// Reads per-core tick counters. Fails only if the counters file cannot
    /// be opened; malformed lines were skipped by the reader.
    pub fn get_cpu_usages(&self) -> Result<Vec<CpuUsageSample>> {
        cpu::sample_cpu_usage(&self.roots)
    }

    /// This deployment exposes no cooling devices; permanently a failure,
    /// not a transient fault.
    pub fn get_cooling_devices(&self) -> Result<Vec<CoolingDevice>> {
        Err(ThermalError::NoCoolingDevices)
    }

    /// Registers a listener under `handle`, optionally filtered by sensor
    /// type. Never fires synchronously.
    pub fn register_listener(
        &self,
        handle: &str,
        filter: Option<SensorType>,
        listener: Arc<dyn ThermalListener>,
    ) -> Result<()> {
        self.registry.register(handle, filter, listener)
    }

    /// Registration entry point of the older interface generation: always
    /// unfiltered, and fires exactly one synchronous "not throttling,
    /// unknown value" notification to the new listener. The newer
    /// `register_listener` never fires on registration; the asymmetry
    /// follows the respective interface contracts.
    pub fn register_thermal_callback(
        &self,
        handle: &str,
        listener: Arc<dyn ThermalListener>,
    ) -> Result<()> {
        self.registry.register(handle, None, listener.clone())?;

        let sample = temperature::cpu_zone_sample("thermal", UNKNOWN_TEMPERATURE);
        if let Err(e) = listener.notify_throttling(&sample) {
            warn!("initial notification to '{}' failed: {}", handle, e);
        }
        Ok(())
    }

    pub fn unregister_listener(&self, handle: &str) -> Result<()> {
        self.registry.unregister(handle)
    }

    /// Runs one poll cycle: read zones, classify each sample, and fan out a
    /// notification for every severity transition. Returns the number of
    /// deliveries made. Zero zones is not an error for a poll cycle.
    pub fn poll_once(&self) -> Result<usize> {
        let samples = temperature::sample_thermal_zones(&self.roots)?;

        // Zones that vanished from the directory lose their retained
        // severity, so a reappearing zone is evaluated from scratch.
        self.evaluator
            .lock()
            .retain_sensors(|name| samples.iter().any(|s| s.name == name));

        let mut delivered = 0;
        for mut sample in samples {
            let (severity, transition) = self
                .evaluator
                .lock()
                .evaluate(&sample.name, sample.current_value);
            sample.throttling_severity = severity;
            if transition {
                debug!(
                    "sensor '{}' transitioned to {:?} at {:.1} C",
                    sample.name, severity, sample.current_value
                );
                delivered += self.registry.notify(&sample);
            }
        }
        Ok(delivered)
    }

    /// Polls at `interval` until `shutdown` is set. A failed cycle (for
    /// example the thermal root vanishing) is logged and skipped; the next
    /// cycle retries naturally.
    pub fn run_poll_loop(&self, interval: Duration, shutdown: &AtomicBool) {
        info!("poll loop started (interval {:?})", interval);
        let tick = Duration::from_millis(50).min(interval);
        let mut last: Option<Instant> = None;

        while !shutdown.load(Ordering::SeqCst) {
            let now = Instant::now();
            if let Some(prev) = last {
                if now.duration_since(prev) < interval {
                    thread::sleep(tick);
                    continue;
                }
            }
            last = Some(now);

            match self.poll_once() {
                Ok(n) if n > 0 => debug!("poll cycle delivered {} notification(s)", n),
                Ok(_) => {}
                Err(e) => warn!("poll cycle skipped: {}", e),
            }
        }
        info!("poll loop stopped");
    }
}
