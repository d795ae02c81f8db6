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

//! Unified error type for all thermwatch operations.

use std::io;
use std::path::PathBuf;

/// Result type alias using ThermalError
pub type Result<T> = std::result::Result<T, ThermalError>;

#[derive(thiserror::Error, Debug)]
pub enum ThermalError {
    // I/O and file system
    #[error("failed to open {}: {source}", path.display())]
    FileOpen { path: PathBuf, source: io::Error },

    // Sensor availability
    //
    // Display text mirrors the ENOENT strerror the interface contract
    // promises when a query finds zero thermal zones.
    #[error("No such file or directory")]
    NoThermalZones,

    #[error("No cooling devices")]
    NoCoolingDevices,

    // Listener registry
    #[error("invalid listener handle: must be non-empty")]
    InvalidArgument,

    #[error("listener already registered: {0}")]
    AlreadyRegistered(String),

    #[error("listener not registered: {0}")]
    NotRegistered(String),
}
