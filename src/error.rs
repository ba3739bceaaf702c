//! Error types for time construction, codec capabilities and backend binding.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid time: {0}")]
    InvalidTime(String),

    #[error("{format} codec error: {message}")]
    Codec { format: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a codec backend could not be bound to a format descriptor.
///
/// These never escape [`discover`](crate::registry::discover); they are
/// collected as [`BindFailure`](crate::registry::BindFailure) entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("backend module `{module}` is not installed")]
    NotInstalled { module: String },

    #[error("backend module `{module}` failed to load: {message}")]
    LoadFailed { module: String, message: String },

    #[error("backend module `{module}` speaks API v{found}, expected v{expected}")]
    IncompatibleVersion {
        module: String,
        found: u32,
        expected: u32,
    },

    #[error("backend module `{module}` has no capability `{capability}`")]
    MissingCapability { module: String, capability: String },

    #[error("capability `{module}::{capability}` is not a {expected} capability")]
    WrongCapabilityKind {
        module: String,
        capability: String,
        expected: &'static str,
    },

    #[error("backend module `{module}` panicked while binding: {message}")]
    Panicked { module: String, message: String },
}

impl BindError {
    /// The backend module this error refers to.
    pub fn module(&self) -> &str {
        match self {
            Self::NotInstalled { module }
            | Self::LoadFailed { module, .. }
            | Self::IncompatibleVersion { module, .. }
            | Self::MissingCapability { module, .. }
            | Self::WrongCapabilityKind { module, .. }
            | Self::Panicked { module, .. } => module,
        }
    }
}
