// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error types for the acquisition pipeline
//!
//! Two classes of failure exist in a measurement run:
//!
//! - **Fatal** failures, chiefly [`DriverError`]s coming back from the device
//!   driver. Once the hardware reports an error its state can no longer be
//!   trusted, so these are wrapped in [`AcquisitionError::Driver`] and
//!   returned all the way up to the run driver, which ends the run.
//! - **Soft** failures (empty smoothing input, transmission never computed,
//!   identity lookup failure). These never produce an error value; the
//!   operation reports `false` or a sentinel and the run continues.

use std::path::PathBuf;

use thiserror::Error;

use crate::channel::BaselineKind;

/// Convenience alias for results of acquisition operations.
pub type AcquisitionResult<T> = std::result::Result<T, AcquisitionError>;

/// A non-zero status returned by the spectrometer driver.
///
/// `description` holds the driver's own text for `code`, obtained through
/// [`SpectrometerDriver::describe_error`](crate::acquisition::SpectrometerDriver::describe_error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("error {code}: {description}")]
pub struct DriverError {
    pub code: i32,
    pub description: String,
}

impl DriverError {
    pub fn new(code: i32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Driver {operation} failed on device {index}: {source}")]
    Driver {
        operation: &'static str,
        index: usize,
        #[source]
        source: DriverError,
    },

    #[error("No spectrometer could be opened")]
    NoDevices,

    #[error("Invalid integration time '{value}': {reason}")]
    IntegrationTime { value: String, reason: String },

    #[error("Device {index}: driver reported no pixels")]
    InvalidPixelCount { index: usize },

    #[error("Device {index}: at least one scan must be averaged")]
    NoScans { index: usize },

    #[error("Device {index}: {baseline} spectrum has not been captured")]
    MissingBaseline { index: usize, baseline: BaselineKind },

    #[error("Device {index}: {baseline} spectrum was already captured")]
    BaselineAlreadySet { index: usize, baseline: BaselineKind },

    #[error("Device {index}: {buffer} has {found} values, expected {expected}")]
    LengthMismatch {
        index: usize,
        buffer: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Operator confirmation failed: {0}")]
    Confirmation(#[source] std::io::Error),

    #[error("Driver '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),

    #[error("Operation '{operation}' is not allowed in state {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

impl AcquisitionError {
    /// Wraps a driver error with the operation and device it occurred on.
    pub fn driver(operation: &'static str, index: usize, source: DriverError) -> Self {
        Self::Driver {
            operation,
            index,
            source,
        }
    }

    /// The driver status code, if this is a fatal driver error.
    pub fn driver_code(&self) -> Option<i32> {
        match self {
            Self::Driver { source, .. } => Some(source.code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_message_carries_code_and_text() {
        let err = AcquisitionError::driver(
            "get_formatted_spectrum",
            1,
            DriverError::new(6, "Data transfer error"),
        );
        let text = err.to_string();
        assert!(text.contains("get_formatted_spectrum"));
        assert!(text.contains("device 1"));
        assert!(text.contains("error 6: Data transfer error"));
        assert_eq!(err.driver_code(), Some(6));

        let source = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(source.as_deref(), Some("error 6: Data transfer error"));
    }

    #[test]
    fn test_non_driver_errors_have_no_code() {
        assert_eq!(AcquisitionError::NoDevices.driver_code(), None);
        let err = AcquisitionError::MissingBaseline {
            index: 0,
            baseline: BaselineKind::Reference,
        };
        assert_eq!(err.to_string(), "Device 0: reference spectrum has not been captured");
    }
}
