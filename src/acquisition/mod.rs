// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Spectrometer acquisition module
//!
//! This module defines the boundary to the spectrometer driver and provides
//! two implementations of it: a deterministic simulator and, with the
//! `seabreeze` feature, the Ocean Optics SeaBreeze library.
//!
//! Devices are addressed by their discovery index, as the SeaBreeze wrapper
//! API does. Every fallible call returns a [`DriverError`] carrying the
//! driver status code and its text.

pub mod error_codes;
#[cfg(feature = "seabreeze")]
pub mod seabreeze;
pub mod simulated;

use anyhow::Result;
use log::info;

use crate::config::{DriverConfig, DriverKind};
use crate::error::DriverError;

pub use simulated::{DriverOperation, SimulatedDevice, SimulatedDriver};

/// Narrow interface to a spectrometer driver.
#[cfg_attr(test, mockall::automock)]
pub trait SpectrometerDriver {
    /// Open the device at `index`.
    fn open(&mut self, index: usize) -> Result<(), DriverError>;

    /// Release the device at `index`.
    fn close(&mut self, index: usize) -> Result<(), DriverError>;

    /// Number of pixels the device reports for one formatted spectrum.
    fn pixel_count(&mut self, index: usize) -> Result<usize, DriverError>;

    /// Wavelength of each of the first `count` pixels.
    fn wavelengths(&mut self, index: usize, count: usize) -> Result<Vec<f64>, DriverError>;

    /// One formatted spectrum of `count` pixels.
    fn intensities(&mut self, index: usize, count: usize) -> Result<Vec<f64>, DriverError>;

    fn set_integration_time_micros(&mut self, index: usize, micros: u64)
        -> Result<(), DriverError>;

    fn set_trigger_mode(&mut self, index: usize, mode: i32) -> Result<(), DriverError>;

    fn model(&mut self, index: usize) -> Result<String, DriverError>;

    fn serial_number(&mut self, index: usize) -> Result<String, DriverError>;

    /// Human readable text for a driver status code.
    fn describe_error(&self, code: i32) -> String;
}

impl<T: SpectrometerDriver + ?Sized> SpectrometerDriver for Box<T> {
    fn open(&mut self, index: usize) -> Result<(), DriverError> {
        (**self).open(index)
    }

    fn close(&mut self, index: usize) -> Result<(), DriverError> {
        (**self).close(index)
    }

    fn pixel_count(&mut self, index: usize) -> Result<usize, DriverError> {
        (**self).pixel_count(index)
    }

    fn wavelengths(&mut self, index: usize, count: usize) -> Result<Vec<f64>, DriverError> {
        (**self).wavelengths(index, count)
    }

    fn intensities(&mut self, index: usize, count: usize) -> Result<Vec<f64>, DriverError> {
        (**self).intensities(index, count)
    }

    fn set_integration_time_micros(
        &mut self,
        index: usize,
        micros: u64,
    ) -> Result<(), DriverError> {
        (**self).set_integration_time_micros(index, micros)
    }

    fn set_trigger_mode(&mut self, index: usize, mode: i32) -> Result<(), DriverError> {
        (**self).set_trigger_mode(index, mode)
    }

    fn model(&mut self, index: usize) -> Result<String, DriverError> {
        (**self).model(index)
    }

    fn serial_number(&mut self, index: usize) -> Result<String, DriverError> {
        (**self).serial_number(index)
    }

    fn describe_error(&self, code: i32) -> String {
        (**self).describe_error(code)
    }
}

/// Pixel count from a signed length reported by a C driver.
pub fn checked_length(reported: i32) -> Result<usize, DriverError> {
    usize::try_from(reported).map_err(|_| {
        DriverError::new(
            error_codes::VALUE_NOT_FOUND,
            format!("negative spectrum length {}", reported),
        )
    })
}

/// Build the driver selected by the configuration.
pub fn get_driver_from_config(config: &DriverConfig) -> Result<Box<dyn SpectrometerDriver>> {
    match config.kind {
        DriverKind::Simulated => {
            info!(
                "Using simulated driver with {} device(s)",
                config.simulated.devices.len()
            );
            Ok(Box::new(SimulatedDriver::from_config(&config.simulated)))
        }
        DriverKind::Seabreeze => get_seabreeze_driver(),
    }
}

#[cfg(feature = "seabreeze")]
fn get_seabreeze_driver() -> Result<Box<dyn SpectrometerDriver>> {
    info!("Using SeaBreeze driver");
    Ok(Box::new(seabreeze::SeaBreezeDriver::new()))
}

#[cfg(not(feature = "seabreeze"))]
fn get_seabreeze_driver() -> Result<Box<dyn SpectrometerDriver>> {
    Err(crate::error::AcquisitionError::FeatureNotEnabled("seabreeze".to_string()).into())
}
