//! Emulator backend registry for automatic front-end discovery.
//!
//! Each backend self-registers via [`inventory::submit!`] with a
//! [`BackendEntry`] holding its CLI name and a factory that starts the
//! engine and returns the [`EmulatorContext`] the scene drives.

#[cfg(feature = "engine")]
pub mod engine;
pub mod sim;

use mayhem_core::config::BootConfig;
use mayhem_core::emulator::EmulatorContext;
use mayhem_core::error::ShellError;

#[derive(Debug)]
pub enum BackendError {
    Shell(ShellError),
    /// The engine could not be started.
    Start(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Shell(e) => write!(f, "{e}"),
            BackendError::Start(msg) => write!(f, "cannot start engine: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Shell(e) => Some(e),
            BackendError::Start(_) => None,
        }
    }
}

impl From<ShellError> for BackendError {
    fn from(e: ShellError) -> Self {
        BackendError::Shell(e)
    }
}

pub struct BackendEntry {
    /// CLI name used to select this backend (e.g., "sim").
    pub name: &'static str,
    pub description: &'static str,
    /// Factory: start the engine with the given boot settings.
    pub create: fn(&BootConfig) -> Result<EmulatorContext, BackendError>,
}

impl BackendEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        create: fn(&BootConfig) -> Result<EmulatorContext, BackendError>,
    ) -> Self {
        Self {
            name,
            description,
            create,
        }
    }
}

inventory::collect!(BackendEntry);

/// All registered backends, sorted by name.
pub fn all() -> Vec<&'static BackendEntry> {
    let mut entries: Vec<_> = inventory::iter::<BackendEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

pub fn find(name: &str) -> Option<&'static BackendEntry> {
    inventory::iter::<BackendEntry>
        .into_iter()
        .find(|e| e.name == name)
}
