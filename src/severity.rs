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

//! Threshold bands and the severity classification of temperature samples.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::temperature::{CPU_SHUTDOWN_THRESHOLD_C, CPU_THROTTLING_THRESHOLD_C};

/// Number of severity levels, and therefore of boundaries in each band
/// direction.
pub const SEVERITY_LEVELS: usize = 7;

/// Ordered throttling severity, least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ThrottlingSeverity {
    #[default]
    None,
    Light,
    Moderate,
    Throttling,
    Critical,
    Emergency,
    Shutdown,
}

impl ThrottlingSeverity {
    /// All levels in ascending order; index matches the band boundary slot.
    pub const ALL: [ThrottlingSeverity; SEVERITY_LEVELS] = [
        ThrottlingSeverity::None,
        ThrottlingSeverity::Light,
        ThrottlingSeverity::Moderate,
        ThrottlingSeverity::Throttling,
        ThrottlingSeverity::Critical,
        ThrottlingSeverity::Emergency,
        ThrottlingSeverity::Shutdown,
    ];
}

/// Severity boundaries for one sensor type: one boundary per level in each
/// direction. A NaN boundary is unset and never triggers.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdBand {
    /// Hot direction: a value at or above `hot[level]` is at least `level`.
    pub hot: [f32; SEVERITY_LEVELS],
    /// Cold direction: a value at or below `cold[level]` is at least `level`.
    pub cold: [f32; SEVERITY_LEVELS],
}

impl Default for ThresholdBand {
    fn default() -> Self {
        Self {
            hot: [f32::NAN; SEVERITY_LEVELS],
            cold: [f32::NAN; SEVERITY_LEVELS],
        }
    }
}

impl ThresholdBand {
    /// The band for CPU zones in this deployment: throttling at 100 °C,
    /// shutdown at 120 °C, no cold boundaries.
    pub fn cpu_default() -> Self {
        let mut band = Self::default();
        band.hot[ThrottlingSeverity::Throttling as usize] = CPU_THROTTLING_THRESHOLD_C;
        band.hot[ThrottlingSeverity::Shutdown as usize] = CPU_SHUTDOWN_THRESHOLD_C;
        band
    }

    /// Classifies a value against this band. Both directions are scanned
    /// most-severe-first and the more severe direction wins. A NaN value
    /// classifies as `None`.
    pub fn classify(&self, value: f32) -> ThrottlingSeverity {
        let hot = Self::scan(&self.hot, |boundary| value >= boundary);
        let cold = Self::scan(&self.cold, |boundary| value <= boundary);
        hot.max(cold)
    }

    fn scan(boundaries: &[f32; SEVERITY_LEVELS], hit: impl Fn(f32) -> bool) -> ThrottlingSeverity {
        for idx in (0..SEVERITY_LEVELS).rev() {
            let boundary = boundaries[idx];
            // NaN boundaries (and NaN values) fail the comparison and fall
            // through to None.
            if !boundary.is_nan() && hit(boundary) {
                return ThrottlingSeverity::ALL[idx];
            }
        }
        ThrottlingSeverity::None
    }
}

/// Classifies samples and detects severity transitions. Retains exactly one
/// previous severity per sensor name, nothing deeper.
#[derive(Debug)]
pub struct ThresholdEvaluator {
    band: ThresholdBand,
    last: HashMap<String, ThrottlingSeverity>,
}

impl ThresholdEvaluator {
    pub fn new(band: ThresholdBand) -> Self {
        Self {
            band,
            last: HashMap::new(),
        }
    }

    /// Classifies `value` for the sensor called `name` and reports whether
    /// the severity changed since the previous evaluation of that sensor.
    /// A sensor never seen before starts from `None`.
    pub fn evaluate(&mut self, name: &str, value: f32) -> (ThrottlingSeverity, bool) {
        let severity = self.band.classify(value);
        let previous = self
            .last
            .insert(name.to_string(), severity)
            .unwrap_or_default();
        (severity, severity != previous)
    }

    /// Drops retained severities for sensors not accepted by `keep`, so a
    /// sensor that vanished and reappears starts fresh from `None`.
    pub fn retain_sensors(&mut self, keep: impl Fn(&str) -> bool) {
        self.last.retain(|name, _| keep(name));
    }
}
