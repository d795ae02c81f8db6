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

//! Helpers that build a fake sysfs/procfs tree inside a tempdir so the
//! readers and the service can be exercised without real hardware.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use parking_lot::Mutex;
use tempfile::TempDir;

use crate::registry::ThermalListener;
use crate::severity::ThrottlingSeverity;
use crate::sysfs::SysfsRoots;
use crate::temperature::TemperatureSample;

/// Creates an empty fake tree with the thermal and cpu directories in
/// place. The stat file is left absent so tests can exercise the
/// open-failure path; `write_stat` creates it on demand.
pub fn fake_sysfs() -> (TempDir, SysfsRoots) {
    let tmp = TempDir::new().expect("create tempdir");
    let thermal_dir = tmp.path().join("thermal");
    let cpu_dir = tmp.path().join("cpu");
    fs::create_dir(&thermal_dir).expect("create thermal dir");
    fs::create_dir(&cpu_dir).expect("create cpu dir");

    let roots = SysfsRoots {
        thermal_dir,
        stat_file: tmp.path().join("stat"),
        cpu_dir,
    };
    (tmp, roots)
}

fn zone_dir(roots: &SysfsRoots, idx: u32) -> PathBuf {
    roots.thermal_dir.join(format!("thermal_zone{}", idx))
}

/// Adds thermal_zone<idx> with the given raw temp and type label.
pub fn add_zone(roots: &SysfsRoots, idx: u32, millic: &str, label: &str) {
    let dir = zone_dir(roots, idx);
    fs::create_dir_all(&dir).expect("create zone dir");
    fs::write(dir.join("temp"), format!("{}\n", millic)).expect("write temp");
    fs::write(dir.join("type"), format!("{}\n", label)).expect("write type");
}

/// Overwrites the temp file of an existing zone.
pub fn set_zone_temp(roots: &SysfsRoots, idx: u32, millic: &str) {
    let dir = zone_dir(roots, idx);
    fs::write(dir.join("temp"), format!("{}\n", millic)).expect("write temp");
}

pub fn write_stat(roots: &SysfsRoots, content: &str) {
    fs::write(&roots.stat_file, content).expect("write stat");
}

/// Writes cpu<core>/online with the given content.
pub fn set_core_online(roots: &SysfsRoots, core: u32, val: &str) {
    let dir = roots.cpu_dir.join(format!("cpu{}", core));
    fs::create_dir_all(&dir).expect("create core dir");
    fs::write(dir.join("online"), val).expect("write online");
}

/// A listener that records every delivered sample and never fails.
#[derive(Default)]
pub struct CountingListener {
    seen: Mutex<Vec<TemperatureSample>>,
}

impl CountingListener {
    pub fn count(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn last_severity(&self) -> Option<ThrottlingSeverity> {
        self.seen.lock().last().map(|s| s.throttling_severity)
    }

    pub fn last_sample(&self) -> Option<TemperatureSample> {
        self.seen.lock().last().cloned()
    }
}

impl ThermalListener for CountingListener {
    fn notify_throttling(&self, sample: &TemperatureSample) -> Result<()> {
        self.seen.lock().push(sample.clone());
        Ok(())
    }
}
