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

//! Thread-safe registry of throttling-notification listeners.
//!
//! Registrations are keyed by an opaque, non-empty string handle supplied by
//! the client; at most one registration per handle. Notification snapshots
//! the registration set under the lock and delivers outside it, so a slow or
//! dead listener never blocks register/unregister.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{Result, ThermalError};
use crate::temperature::{SensorType, TemperatureSample};

/// Receiver of throttling-severity transition notifications.
#[cfg_attr(test, mockall::automock)]
pub trait ThermalListener: Send + Sync {
    /// Called once per severity transition of a matching sensor. The sample
    /// carries the evaluated severity. Errors are logged by the registry,
    /// never propagated.
    fn notify_throttling(&self, sample: &TemperatureSample) -> anyhow::Result<()>;
}

#[derive(Clone)]
struct Registration {
    handle: String,
    /// None receives every transition; Some(t) only transitions of type t.
    filter: Option<SensorType>,
    listener: Arc<dyn ThermalListener>,
}

/// Owned, lock-guarded set of listener registrations. Constructed once per
/// service instance; there is deliberately no process-global registry.
#[derive(Default)]
pub struct CallbackRegistry {
    inner: Mutex<Vec<Registration>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a registration. Rejects an empty handle before touching the set
    /// and a handle that is already present regardless of its filter.
    pub fn register(
        &self,
        handle: &str,
        filter: Option<SensorType>,
        listener: Arc<dyn ThermalListener>,
    ) -> Result<()> {
        if handle.is_empty() {
            return Err(ThermalError::InvalidArgument);
        }
        let mut inner = self.inner.lock();
        if inner.iter().any(|r| r.handle == handle) {
            return Err(ThermalError::AlreadyRegistered(handle.to_string()));
        }
        inner.push(Registration {
            handle: handle.to_string(),
            filter,
            listener,
        });
        debug!("registered listener '{}' (filter: {:?})", handle, filter);
        Ok(())
    }

    /// Removes a registration; the set is unchanged on failure.
    pub fn unregister(&self, handle: &str) -> Result<()> {
        if handle.is_empty() {
            return Err(ThermalError::InvalidArgument);
        }
        let mut inner = self.inner.lock();
        match inner.iter().position(|r| r.handle == handle) {
            Some(pos) => {
                inner.remove(pos);
                debug!("unregistered listener '{}'", handle);
                Ok(())
            }
            None => Err(ThermalError::NotRegistered(handle.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Delivers `sample` to every registration whose filter matches its
    /// sensor type. Best effort: a listener that fails is logged and skipped,
    /// the rest still receive the notification. Returns the number of
    /// successful deliveries.
    pub fn notify(&self, sample: &TemperatureSample) -> usize {
        // Snapshot under the lock, deliver outside it.
        let matching: Vec<Registration> = self
            .inner
            .lock()
            .iter()
            .filter(|r| match r.filter {
                None => true,
                Some(t) => t == sample.sensor_type,
            })
            .cloned()
            .collect();

        let mut delivered = 0;
        for reg in matching {
            match reg.listener.notify_throttling(sample) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        "failed to notify listener '{}' for sensor '{}': {}",
                        reg.handle, sample.name, e
                    );
                }
            }
        }
        delivered
    }
}
