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

//! Readers for the kernel pseudo-files thermwatch consumes.
//!
//! Thermal-zone enumeration is fault-tolerant per entry: sysfs directories
//! come and go while we iterate, so an entry whose `temp` or `type` file is
//! missing or garbled is skipped rather than failing the whole read. Only a
//! failure to open the root directory or the counters file is a hard error.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ThermalError};

/// Prefix of thermal-zone directory names under the thermal root.
pub const ZONE_PREFIX: &str = "thermal_zone";

/// Locations of the pseudo-files to read. Injectable so tests can point at
/// a scratch tree instead of the live kernel interfaces.
#[derive(Debug, Clone)]
pub struct SysfsRoots {
    /// Directory containing `thermal_zone*` subdirectories.
    pub thermal_dir: PathBuf,
    /// Per-core scheduler tick counters, one `cpu<n>` line per core.
    pub stat_file: PathBuf,
    /// Directory containing `cpu<n>/online` files.
    pub cpu_dir: PathBuf,
}

impl Default for SysfsRoots {
    fn default() -> Self {
        Self {
            thermal_dir: PathBuf::from("/sys/class/thermal"),
            stat_file: PathBuf::from("/proc/stat"),
            cpu_dir: PathBuf::from("/sys/devices/system/cpu"),
        }
    }
}

/// One successfully-read thermal zone entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneReading {
    /// Raw value of the zone's `temp` file, in millidegrees Celsius.
    pub raw_millic: i64,
    /// Content of the zone's `type` file, trimmed.
    pub type_label: String,
}

/// Enumerates `thermal_zone*` entries under `thermal_dir`, yielding only
/// the entries whose `temp` and `type` files both read and parse. Skipped
/// entries are logged at debug level.
///
/// Opening the root directory itself failing is a hard error.
pub fn read_zone_entries(thermal_dir: &Path) -> Result<impl Iterator<Item = ZoneReading>> {
    let entries = fs::read_dir(thermal_dir).map_err(|e| ThermalError::FileOpen {
        path: thermal_dir.to_path_buf(),
        source: e,
    })?;

    Ok(entries.flatten().filter_map(|ent| {
        let name = ent.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(ZONE_PREFIX) {
            return None;
        }
        let dir = ent.path();

        let raw = match read_trimmed(dir.join("temp")) {
            Ok(s) => s,
            Err(e) => {
                debug!("skipping {}: temp unreadable: {}", name, e);
                return None;
            }
        };
        let raw_millic = match raw.parse::<i64>() {
            Ok(v) => v,
            Err(_) => {
                debug!("skipping {}: temp not numeric: '{}'", name, raw);
                return None;
            }
        };
        let type_label = match read_trimmed(dir.join("type")) {
            Ok(s) => s,
            Err(e) => {
                debug!("skipping {}: type unreadable: {}", name, e);
                return None;
            }
        };

        Some(ZoneReading {
            raw_millic,
            type_label,
        })
    }))
}

/// Raw per-core counters from one matched stat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreTicks {
    pub core: u32,
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
}

/// Reads the counters file and returns the `cpu<n>` lines in file order.
/// Lines that do not match (the aggregate `cpu` line, `intr`, `ctxt`, a
/// truncated core line) are skipped. Failing to open the file is a hard
/// error.
pub fn read_core_ticks(stat_file: &Path) -> Result<Vec<CoreTicks>> {
    let content = fs::read_to_string(stat_file).map_err(|e| ThermalError::FileOpen {
        path: stat_file.to_path_buf(),
        source: e,
    })?;
    Ok(content.lines().filter_map(parse_stat_line).collect())
}

fn parse_stat_line(line: &str) -> Option<CoreTicks> {
    let mut fields = line.split_whitespace();
    // "cpu" without digits is the aggregate line; parse fails and skips it.
    let core = fields.next()?.strip_prefix("cpu")?.parse::<u32>().ok()?;
    let user = fields.next()?.parse::<u64>().ok()?;
    let nice = fields.next()?.parse::<u64>().ok()?;
    let system = fields.next()?.parse::<u64>().ok()?;
    let idle = fields.next()?.parse::<u64>().ok()?;
    Some(CoreTicks {
        core,
        user,
        nice,
        system,
        idle,
    })
}

/// Resolves a core's online state from its `online` file.
///
/// Core 0 commonly cannot be hot-unplugged and exposes no `online` file, so
/// an absent (or unreadable, or malformed) file defaults to online for core
/// 0 and offline for every other core.
pub fn core_is_online(cpu_dir: &Path, core: u32) -> bool {
    let path = cpu_dir.join(format!("cpu{}", core)).join("online");
    match read_trimmed(&path) {
        Ok(s) => match s.parse::<i32>() {
            Ok(v) => v != 0,
            Err(_) => {
                debug!("cpu{}: online file not numeric: '{}'", core, s);
                core == 0
            }
        },
        Err(_) => core == 0,
    }
}

fn read_trimmed<P: AsRef<Path>>(p: P) -> std::io::Result<String> {
    Ok(fs::read_to_string(p)?.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{add_zone, fake_sysfs, set_core_online, write_stat};

    #[test]
    fn test_zone_entries_read_in_full() {
        let (_tmp, roots) = fake_sysfs();
        add_zone(&roots, 0, "45500", "cpu-thermal");
        add_zone(&roots, 1, "61000", "soc-thermal");

        let zones: Vec<_> = read_zone_entries(&roots.thermal_dir).unwrap().collect();
        assert_eq!(zones.len(), 2);
        assert!(zones.contains(&ZoneReading {
            raw_millic: 45500,
            type_label: "cpu-thermal".to_string()
        }));
        assert!(zones.contains(&ZoneReading {
            raw_millic: 61000,
            type_label: "soc-thermal".to_string()
        }));
    }

    #[test]
    fn test_zone_missing_temp_is_skipped() {
        let (_tmp, roots) = fake_sysfs();
        add_zone(&roots, 0, "45500", "cpu-thermal");
        let broken = roots.thermal_dir.join("thermal_zone1");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join("type"), "soc-thermal").unwrap();

        let zones: Vec<_> = read_zone_entries(&roots.thermal_dir).unwrap().collect();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].type_label, "cpu-thermal");
    }

    #[test]
    fn test_zone_missing_type_is_skipped() {
        let (_tmp, roots) = fake_sysfs();
        let broken = roots.thermal_dir.join("thermal_zone0");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join("temp"), "45500").unwrap();

        let zones: Vec<_> = read_zone_entries(&roots.thermal_dir).unwrap().collect();
        assert!(zones.is_empty());
    }

    #[test]
    fn test_zone_non_numeric_temp_is_skipped() {
        let (_tmp, roots) = fake_sysfs();
        add_zone(&roots, 0, "garbage", "cpu-thermal");
        add_zone(&roots, 1, "50000", "soc-thermal");

        let zones: Vec<_> = read_zone_entries(&roots.thermal_dir).unwrap().collect();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].raw_millic, 50000);
    }

    #[test]
    fn test_non_zone_directories_ignored() {
        let (_tmp, roots) = fake_sysfs();
        add_zone(&roots, 0, "45500", "cpu-thermal");
        let other = roots.thermal_dir.join("cooling_device0");
        fs::create_dir_all(&other).unwrap();
        fs::write(other.join("temp"), "1").unwrap();
        fs::write(other.join("type"), "Fan").unwrap();

        let zones: Vec<_> = read_zone_entries(&roots.thermal_dir).unwrap().collect();
        assert_eq!(zones.len(), 1);
    }

    #[test]
    fn test_missing_thermal_root_is_hard_error() {
        let result = read_zone_entries(Path::new("/nonexistent/thermal/root"));
        assert!(matches!(result, Err(ThermalError::FileOpen { .. })));
    }

    #[test]
    fn test_stat_lines_parse_in_file_order() {
        let (_tmp, roots) = fake_sysfs();
        write_stat(
            &roots,
            "cpu  100 20 30 400 5 0 0 0 0 0\n\
             cpu2 7 8 9 10 0 0 0 0 0 0\n\
             cpu0 1 2 3 4 0 0 0 0 0 0\n\
             intr 12345\n\
             ctxt 67890\n",
        );

        let ticks = read_core_ticks(&roots.stat_file).unwrap();
        assert_eq!(ticks.len(), 2);
        // Order follows the file, not ascending core numbers.
        assert_eq!(ticks[0].core, 2);
        assert_eq!(ticks[1].core, 0);
        assert_eq!(
            ticks[1],
            CoreTicks {
                core: 0,
                user: 1,
                nice: 2,
                system: 3,
                idle: 4
            }
        );
    }

    #[test]
    fn test_truncated_stat_line_is_skipped() {
        let (_tmp, roots) = fake_sysfs();
        write_stat(&roots, "cpu0 1 2 3\ncpu1 5 6 7 8 0\n");

        let ticks = read_core_ticks(&roots.stat_file).unwrap();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].core, 1);
    }

    #[test]
    fn test_missing_stat_file_is_hard_error() {
        let (_tmp, roots) = fake_sysfs();
        let result = read_core_ticks(&roots.stat_file);
        assert!(matches!(result, Err(ThermalError::FileOpen { .. })));
    }

    #[test]
    fn test_online_file_present() {
        let (_tmp, roots) = fake_sysfs();
        set_core_online(&roots, 1, "1");
        set_core_online(&roots, 2, "0");
        assert!(core_is_online(&roots.cpu_dir, 1));
        assert!(!core_is_online(&roots.cpu_dir, 2));
    }

    #[test]
    fn test_online_file_absent_defaults_to_core_zero_only() {
        let (_tmp, roots) = fake_sysfs();
        assert!(core_is_online(&roots.cpu_dir, 0));
        assert!(!core_is_online(&roots.cpu_dir, 1));
        assert!(!core_is_online(&roots.cpu_dir, 3));
    }

    #[test]
    fn test_online_file_malformed_falls_back_to_default() {
        let (_tmp, roots) = fake_sysfs();
        set_core_online(&roots, 0, "yes");
        set_core_online(&roots, 1, "yes");
        assert!(core_is_online(&roots.cpu_dir, 0));
        assert!(!core_is_online(&roots.cpu_dir, 1));
    }
}
