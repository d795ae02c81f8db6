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

//! Thermwatch reads Linux thermal zones and per-core CPU counters, grades
//! temperatures against a severity ladder, and notifies registered
//! listeners when a sensor crosses between severity levels.

pub mod cpu;
pub mod error;
pub mod registry;
pub mod service;
pub mod severity;
pub mod sysfs;
pub mod temperature;

#[cfg(test)]
pub mod test_utils;
