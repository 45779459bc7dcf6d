use mayhem_core::error::ShellError;

use crate::backend::BackendError;
use crate::config::ConfigError;
use crate::disk_path::DiskError;

/// Everything that can end the program early.
#[derive(Debug)]
pub enum AppError {
    /// SDL reports its errors as plain strings.
    Sdl(String),
    Config(ConfigError),
    Disk(DiskError),
    Backend(BackendError),
    Shell(ShellError),
    Io(std::io::Error),
    UnknownBackend { name: String, available: String },
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Sdl(msg) => write!(f, "SDL: {msg}"),
            AppError::Config(e) => write!(f, "{e}"),
            AppError::Disk(e) => write!(f, "disk image: {e}"),
            AppError::Backend(e) => write!(f, "{e}"),
            AppError::Shell(e) => write!(f, "{e}"),
            AppError::Io(e) => write!(f, "I/O error: {e}"),
            AppError::UnknownBackend { name, available } => {
                write!(f, "unknown backend {name:?} (available: {available})")
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::Disk(e) => Some(e),
            AppError::Backend(e) => Some(e),
            AppError::Shell(e) => Some(e),
            AppError::Io(e) => Some(e),
            AppError::Sdl(_) | AppError::UnknownBackend { .. } => None,
        }
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Sdl(msg)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<DiskError> for AppError {
    fn from(e: DiskError) -> Self {
        AppError::Disk(e)
    }
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        AppError::Backend(e)
    }
}

impl From<ShellError> for AppError {
    fn from(e: ShellError) -> Self {
        AppError::Shell(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e)
    }
}
