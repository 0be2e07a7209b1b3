//! Error types.
//!
//! Nothing in the per-frame input path is fatal: adapters log and carry on. These
//! types exist for the seams where a caller can act on the failure (platform
//! sources, configuration loading).

use std::path::PathBuf;

use thiserror::Error;

use crate::device::Capabilities;

/// Failure reported by a [`PeripheralSource`](crate::device::PeripheralSource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The device lacks the input profile needed (extended gamepad, keyboard input,
    /// mouse input).
    #[error("device {device_id} is missing capability {missing:?}")]
    MissingCapability {
        device_id: String,
        missing: Capabilities,
    },

    /// No device with this id is known to the source.
    #[error("unknown device: {0}")]
    UnknownDevice(String),

    /// The source does not implement this operation.
    #[error("operation not supported by this source: {0}")]
    Unsupported(&'static str),
}

/// Failure loading an [`InputConfig`](crate::config::InputConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid input config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("queue_capacity must be at least 1 (got {0})")]
    InvalidCapacity(usize),
}
