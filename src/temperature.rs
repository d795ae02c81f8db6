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

//! Typed temperature samples built from raw thermal-zone readings.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::severity::ThrottlingSeverity;
use crate::sysfs::{self, SysfsRoots};

/// Reserved sentinel meaning "reading unavailable" in the raw interface.
/// Normalized to NaN before a sample leaves this module; callers never see
/// the sentinel itself.
pub const UNKNOWN_TEMPERATURE: f32 = f32::MIN;

/// Fixed threshold at which CPU zones begin throttling, degrees Celsius.
pub const CPU_THROTTLING_THRESHOLD_C: f32 = 100.0;

/// Fixed threshold at which CPU zones force shutdown, degrees Celsius.
pub const CPU_SHUTDOWN_THRESHOLD_C: f32 = 120.0;

/// Kind of hardware a temperature sample describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Unknown,
    Cpu,
    Gpu,
    Battery,
    Skin,
    UsbPort,
    PowerAmplifier,
    BclVoltage,
    BclCurrent,
    BclPercentage,
    Npu,
}

/// One temperature reading with its static thresholds. Values are degrees
/// Celsius; an unknown value or threshold is NaN.
#[derive(Debug, Clone, Serialize)]
pub struct TemperatureSample {
    pub sensor_type: SensorType,
    /// Zone type label, e.g. "cpu-thermal" or "thermal_zone0".
    pub name: String,
    pub current_value: f32,
    pub throttling_threshold: f32,
    pub shutdown_threshold: f32,
    pub vr_throttling_threshold: f32,
    /// Filled in by the threshold evaluator during poll cycles; queries
    /// leave it at the default.
    pub throttling_severity: ThrottlingSeverity,
}

/// Replaces the unknown sentinel with NaN, leaving real values untouched.
pub fn finalize_temperature(value: f32) -> f32 {
    if value == UNKNOWN_TEMPERATURE {
        f32::NAN
    } else {
        value
    }
}

/// Builds the sample for a CPU zone. This deployment only instruments CPU
/// zones, so the sensor type is fixed and the VR threshold does not apply.
pub fn cpu_zone_sample(name: &str, value_c: f32) -> TemperatureSample {
    TemperatureSample {
        sensor_type: SensorType::Cpu,
        name: name.to_string(),
        current_value: finalize_temperature(value_c),
        throttling_threshold: finalize_temperature(CPU_THROTTLING_THRESHOLD_C),
        shutdown_threshold: finalize_temperature(CPU_SHUTDOWN_THRESHOLD_C),
        vr_throttling_threshold: finalize_temperature(UNKNOWN_TEMPERATURE),
        throttling_severity: ThrottlingSeverity::None,
    }
}

/// Reads every readable thermal zone and returns one sample per zone, in
/// enumeration order. Zero zones yields an empty Vec; the service layer
/// decides whether that is a failure.
pub fn sample_thermal_zones(roots: &SysfsRoots) -> Result<Vec<TemperatureSample>> {
    let zones = sysfs::read_zone_entries(&roots.thermal_dir)?;
    Ok(zones
        .map(|z| cpu_zone_sample(&z.type_label, z.raw_millic as f32 / 1000.0))
        .collect())
}
