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

//! thermwatchd: polls the thermal zones and logs severity transitions,
//! or dumps a one-shot snapshot with `--once`.

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use thermwatch::cpu::CpuUsageSample;
use thermwatch::registry::ThermalListener;
use thermwatch::service::ThermalService;
use thermwatch::severity::ThrottlingSeverity;
use thermwatch::sysfs::SysfsRoots;
use thermwatch::temperature::TemperatureSample;

const DEFAULT_INTERVAL_MS: u64 = 1000;

struct Options {
    once: bool,
    interval: Duration,
    roots: SysfsRoots,
}

fn print_usage() {
    println!("Usage: thermwatchd [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --once               print one snapshot as JSON and exit");
    println!("  --interval-ms <N>    poll interval in milliseconds (default {})", DEFAULT_INTERVAL_MS);
    println!("  --thermal-dir <DIR>  thermal zone directory (default /sys/class/thermal)");
    println!("  --stat-file <FILE>   CPU counters file (default /proc/stat)");
    println!("  --cpu-dir <DIR>      per-core device directory (default /sys/devices/system/cpu)");
    println!("  -h, --help           show this help");
    println!("  -v, --version        show version");
}

fn parse_args() -> Result<Options> {
    let mut opts = Options {
        once: false,
        interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
        roots: SysfsRoots::default(),
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            "-v" | "--version" => {
                println!("thermwatchd {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "--once" => opts.once = true,
            "--interval-ms" => {
                let val = args.next().context("--interval-ms requires a value")?;
                let ms: u64 = val
                    .parse()
                    .with_context(|| format!("invalid interval '{}'", val))?;
                if ms == 0 {
                    bail!("--interval-ms must be greater than zero");
                }
                opts.interval = Duration::from_millis(ms);
            }
            "--thermal-dir" => {
                opts.roots.thermal_dir =
                    PathBuf::from(args.next().context("--thermal-dir requires a value")?);
            }
            "--stat-file" => {
                opts.roots.stat_file =
                    PathBuf::from(args.next().context("--stat-file requires a value")?);
            }
            "--cpu-dir" => {
                opts.roots.cpu_dir =
                    PathBuf::from(args.next().context("--cpu-dir requires a value")?);
            }
            other => bail!("unknown argument '{}' (try --help)", other),
        }
    }
    Ok(opts)
}

#[derive(Serialize)]
struct Snapshot {
    temperatures: Vec<TemperatureSample>,
    cpu_usages: Vec<CpuUsageSample>,
}

fn print_snapshot(service: &ThermalService) -> Result<()> {
    let snapshot = Snapshot {
        temperatures: service.get_temperatures()?,
        cpu_usages: service.get_cpu_usages()?,
    };
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Logs every transition it is notified about.
struct LogListener;

impl ThermalListener for LogListener {
    fn notify_throttling(&self, sample: &TemperatureSample) -> Result<()> {
        if sample.throttling_severity >= ThrottlingSeverity::Throttling {
            warn!(
                "{}: {:.1} C, severity {:?}",
                sample.name, sample.current_value, sample.throttling_severity
            );
        } else {
            info!(
                "{}: {:.1} C, severity {:?}",
                sample.name, sample.current_value, sample.throttling_severity
            );
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("THERMWATCH_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = parse_args()?;
    let service = Arc::new(ThermalService::new(opts.roots));

    if opts.once {
        return print_snapshot(&service);
    }

    service
        .register_listener("thermwatchd-log", None, Arc::new(LogListener))
        .context("register log listener")?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::SeqCst);
        })
        .context("install signal handler")?;
    }

    info!("thermwatchd {} starting", env!("CARGO_PKG_VERSION"));
    service.run_poll_loop(opts.interval, &shutdown);
    info!("thermwatchd exiting");
    Ok(())
}
