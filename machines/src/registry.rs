//! Machine registry for runner discovery.
//!
//! Each machine self-registers via [`inventory::submit!`] with a
//! [`MachineEntry`] containing its CLI name, a one-line description, and a
//! factory function. The runner discovers available machines at runtime
//! without any central list.

use retroscope_core::core::{ConfigError, Machine, MachineConfig};

/// Describes a machine the runner can build.
pub struct MachineEntry {
    /// CLI name used to select this machine (e.g., "simple6510").
    pub name: &'static str,
    pub description: &'static str,
    /// Factory: construct a Machine from validated clock settings.
    pub create: fn(&MachineConfig) -> Result<Box<dyn Machine>, ConfigError>,
}

impl MachineEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        create: fn(&MachineConfig) -> Result<Box<dyn Machine>, ConfigError>,
    ) -> Self {
        Self {
            name,
            description,
            create,
        }
    }
}

inventory::collect!(MachineEntry);

/// Return all registered machines, sorted by name.
pub fn all() -> Vec<&'static MachineEntry> {
    let mut entries: Vec<_> = inventory::iter::<MachineEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

/// Look up a machine by its CLI name.
pub fn find(name: &str) -> Option<&'static MachineEntry> {
    inventory::iter::<MachineEntry>
        .into_iter()
        .find(|e| e.name == name)
}
