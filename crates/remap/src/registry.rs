//! Driver registry
//!
//! Maps a driver name to the factory that opens its connections. A registry
//! starts empty (or with the builtin drivers), accepts registrations, and
//! freezes the first time it opens a connection: from then on it is
//! read-only.
//!
//! Most programs use the process-wide instance through [`register`] and
//! [`open`]; tests and embedders that want isolation build their own
//! [`DriverRegistry`].

use crate::map::Map;
use remap_core::errors::{ExError, RemapError, Result};
use remap_core::{log_op_end, log_op_error, log_op_start, Conn, Driver, MemoryDriver};
use remap_store::SqliteDriver;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::Instant;

/// Name the in-memory driver is registered under
pub const MEMORY_DRIVER_NAME: &str = "memory";

/// Name-to-factory table for storage drivers
#[derive(Default)]
pub struct DriverRegistry {
    drivers: RwLock<HashMap<String, Arc<dyn Driver>>>,
    frozen: AtomicBool,
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.drivers())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

fn poisoned() -> ExError {
    RemapError::LockPoisoned {
        resource: "driver registry".to_string(),
    }
    .into()
}

impl DriverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with `sqlite` and `memory` already registered
    pub fn with_builtin_drivers() -> Self {
        let mut drivers: HashMap<String, Arc<dyn Driver>> = HashMap::new();
        drivers.insert(
            remap_store::DRIVER_NAME.to_string(),
            Arc::new(SqliteDriver::new()),
        );
        drivers.insert(MEMORY_DRIVER_NAME.to_string(), Arc::new(MemoryDriver));
        Self {
            drivers: RwLock::new(drivers),
            frozen: AtomicBool::new(false),
        }
    }

    /// Register `driver` under `name`
    ///
    /// ## Errors
    ///
    /// `Configuration` if `name` is taken or the registry has already been
    /// used to open a connection.
    pub fn try_register<D: Driver + 'static>(&self, name: &str, driver: D) -> Result<()> {
        let mut drivers = self.drivers.write().map_err(|_| poisoned())?;
        if drivers.contains_key(name) {
            return Err(RemapError::DuplicateDriver {
                name: name.to_string(),
            }
            .into());
        }
        if self.frozen.load(Ordering::Acquire) {
            return Err(RemapError::RegistryFrozen {
                name: name.to_string(),
            }
            .into());
        }
        drivers.insert(name.to_string(), Arc::new(driver));
        tracing::debug!(driver = name, "registered driver");
        Ok(())
    }

    /// Register `driver` under `name`, treating failure as fatal
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered or the registry is frozen.
    /// Registration belongs to program startup, where either is a bug.
    pub fn register<D: Driver + 'static>(&self, name: &str, driver: D) {
        if let Err(err) = self.try_register(name, driver) {
            panic!("remap: {}", err);
        }
    }

    /// Open a connection with the named driver and wrap it in a [`Map`]
    ///
    /// The first call freezes the registry.
    ///
    /// ## Errors
    ///
    /// - `Configuration`: no driver registered under `name`
    /// - whatever the driver's `open` reports, wrapped with this operation
    pub fn open(&self, name: &str, data_source: &str) -> Result<Map> {
        log_op_start!("registry_open", driver = name);
        let start = Instant::now();

        let map = self.open_impl(name, data_source).map_err(|e| {
            log_op_error!(
                "registry_open",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                driver = name
            );
            e
        })?;

        log_op_end!(
            "registry_open",
            duration_ms = start.elapsed().as_millis() as u64,
            driver = name
        );
        Ok(map)
    }

    fn open_impl(&self, name: &str, data_source: &str) -> Result<Map> {
        self.frozen.store(true, Ordering::Release);

        // Clone the factory out so a slow open doesn't hold the read lock
        let driver = self
            .drivers
            .read()
            .map_err(|_| poisoned())?
            .get(name)
            .cloned()
            .ok_or_else(|| {
                ExError::from(RemapError::UnknownDriver {
                    name: name.to_string(),
                })
                .with_op("registry_open")
            })?;

        let conn = driver
            .open(data_source)
            .map_err(|e| e.wrap("registry_open").with_driver(name))?;
        Ok(Map::new(conn))
    }

    /// Names of all registered drivers, sorted
    ///
    /// The table is only mutated by a single insert, so it is still
    /// consistent after a panicking holder poisoned the lock.
    pub fn drivers(&self) -> Vec<String> {
        let drivers = self.drivers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = drivers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether the registry has stopped accepting registrations
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }
}

static REGISTRY: OnceLock<DriverRegistry> = OnceLock::new();

/// The process-wide registry, created with the builtin drivers on first use
pub fn registry() -> &'static DriverRegistry {
    REGISTRY.get_or_init(DriverRegistry::with_builtin_drivers)
}

/// Register a driver in the process-wide registry
///
/// # Panics
///
/// Panics if `name` is already registered (including the builtin `sqlite`
/// and `memory`) or if the registry has already opened a connection.
pub fn register<D: Driver + 'static>(name: &str, driver: D) {
    registry().register(name, driver)
}

/// Open a [`Map`] through the process-wide registry
pub fn open(name: &str, data_source: &str) -> Result<Map> {
    registry().open(name, data_source)
}

/// Build a [`Map`] over a connection the caller already owns
pub fn adopt(conn: &dyn Conn) -> Result<Map> {
    Map::adopt(conn)
}
