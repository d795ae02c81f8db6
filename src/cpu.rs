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

//! Per-core CPU utilization samples built from scheduler tick counters.

use serde::Serialize;

use crate::error::Result;
use crate::sysfs::{self, SysfsRoots};

/// Tick counts for one logical core at one instant. Utilization over an
/// interval comes from deltas of two snapshots; this crate only reports
/// the raw counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuUsageSample {
    /// "CPU<n>" where n is the core number from the counters file.
    pub name: String,
    /// user + nice + system ticks.
    pub active: u64,
    /// active + idle ticks. Always >= active.
    pub total: u64,
    pub is_online: bool,
}

/// Reads the counters file and returns one sample per matched core line,
/// in file order. Unparsable lines were already skipped by the reader; an
/// unopenable counters file is a hard error.
pub fn sample_cpu_usage(roots: &SysfsRoots) -> Result<Vec<CpuUsageSample>> {
    let ticks = sysfs::read_core_ticks(&roots.stat_file)?;
    Ok(ticks
        .into_iter()
        .map(|t| {
            let active = t.user + t.nice + t.system;
            CpuUsageSample {
                name: format!("CPU{}", t.core),
                active,
                total: active + t.idle,
                is_online: sysfs::core_is_online(&roots.cpu_dir, t.core),
            }
        })
        .collect())
}
