//! Bus registration and dispatch
//!
//! This module maps the `port` argument onto a bus backend and wraps the
//! opened bus in a [`BusHandle`] that always gets closed.
//!
//! Format: "name" or "name:key1=value1,key2=value2"

use servotune_core::bus::DeviceBus;
use servotune_core::error::BusError;
use servotune_core::family::ServoFamily;
use servotune_dummy::{DummyBus, DummyConfig};
use std::collections::HashMap;

/// Information about a bus backend
pub struct BusInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available bus backends
pub fn available_buses() -> Vec<BusInfo> {
    vec![BusInfo {
        name: "dummy",
        aliases: &["emulator"],
        description: "In-memory servo emulator (count=<n>,first=<id>,model=<n>)",
    }]
}

/// Generate help text listing all available buses
pub fn bus_help() -> String {
    let mut help = String::from("Available buses:\n");
    for b in available_buses() {
        let aliases = if b.aliases.is_empty() {
            String::new()
        } else {
            format!(" [aliases: {}]", b.aliases.join(", "))
        };
        help.push_str(&format!("  {:12} - {}{}\n", b.name, b.description, aliases));
    }
    help
}

/// Generate a short list of bus names for CLI help
pub fn bus_names_short() -> String {
    let names: Vec<&str> = available_buses().iter().map(|b| b.name).collect();
    names.join(", ")
}

/// Parsed bus parameters
#[derive(Debug)]
pub struct BusParams {
    /// Bus name as given
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl BusParams {
    /// Get a numeric parameter, accepting decimal or 0x-prefixed hex
    fn number<T: TryFrom<u32>>(&self, key: &str) -> Result<Option<T>, BusError> {
        let Some(raw) = self.params.get(key) else {
            return Ok(None);
        };

        let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };

        parsed
            .and_then(|n| T::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                BusError::ConnectionFailed(format!("Invalid value for '{}': '{}'", key, raw))
            })
    }
}

/// Parse a bus string into name and parameters
pub fn parse_bus_params(s: &str) -> Result<BusParams, BusError> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(BusError::ConnectionFailed(format!(
                    "Invalid parameter format: '{}' (expected key=value)",
                    opt
                )));
            }
        }
    }

    Ok(BusParams {
        name: name.to_string(),
        params,
    })
}

/// Open a servo bus and wrap it in a [`BusHandle`]
///
/// # Arguments
/// * `spec` - Bus specification (e.g., "dummy" or "dummy:count=3")
/// * `baudrate` - Line rate for serial backends
/// * `family` - Servo family on the bus, decides the memory table
pub fn open_bus(spec: &str, baudrate: u32, family: ServoFamily) -> Result<BusHandle, BusError> {
    let params = parse_bus_params(spec)?;

    let bus: Box<dyn DeviceBus> = match params.name.as_str() {
        "dummy" | "emulator" => Box::new(open_dummy(&params, baudrate, family)?),
        _ => {
            return Err(BusError::ConnectionFailed(format!(
                "Unknown bus: {} (available: {})",
                params.name,
                bus_names_short()
            )))
        }
    };

    log::info!("Opened {} bus ({} servos)", params.name, family);
    Ok(BusHandle::new(bus))
}

fn open_dummy(
    params: &BusParams,
    baudrate: u32,
    family: ServoFamily,
) -> Result<DummyBus, BusError> {
    log::debug!("Dummy bus ignores baud rate {}", baudrate);

    let mut config = DummyConfig::for_family(family);
    if let Some(count) = params.number("count")? {
        config.count = count;
    }
    if let Some(first) = params.number("first")? {
        config.first_id = first;
    }
    if let Some(model) = params.number("model")? {
        config.model = model;
    }

    Ok(DummyBus::new(config))
}

/// Owned bus connection
///
/// The handle owns the bus backend and closes it exactly once: either
/// through [`close`](BusHandle::close) or, failing that, when dropped.
pub struct BusHandle {
    bus: Box<dyn DeviceBus>,
    closed: bool,
}

impl BusHandle {
    pub(crate) fn new(bus: Box<dyn DeviceBus>) -> Self {
        Self { bus, closed: false }
    }

    /// Access the bus for running commands
    pub fn bus_mut(&mut self) -> &mut dyn DeviceBus {
        self.bus.as_mut()
    }

    /// Close the bus, reporting any error
    pub fn close(mut self) -> Result<(), BusError> {
        self.closed = true;
        let result = self.bus.close();
        log::info!("Bus closed");
        result
    }
}

impl Drop for BusHandle {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.bus.close() {
            log::warn!("Failed to close bus: {}", e);
        }
    }
}
