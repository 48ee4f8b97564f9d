// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Simulated spectrometers
//!
//! [`SimulatedDriver`] behaves like the hardware driver for a fixed list of
//! [`SimulatedDevice`]s. Each device returns either scripted scans, in order,
//! or a flat spectrum at its configured intensity with optional seeded noise.
//! Any driver operation can be made to fail with a chosen status code, which
//! is how the error paths of the acquisition controller are exercised.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error_codes;
use super::SpectrometerDriver;
use crate::config::{SimulatedConfig, SimulatedDeviceConfig};
use crate::error::DriverError;

/// Driver operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverOperation {
    Open,
    Close,
    PixelCount,
    Wavelengths,
    Intensities,
    IntegrationTime,
    TriggerMode,
    Model,
    SerialNumber,
}

/// One simulated spectrometer and what has been done to it.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    serial_number: String,
    model: String,
    pixel_count: usize,
    wavelength_start: f64,
    wavelength_step: f64,
    intensity: f64,
    noise: f64,
    scans: VecDeque<Vec<f64>>,
    failures: HashMap<DriverOperation, i32>,

    is_open: bool,
    integration_time_micros: Option<u64>,
    trigger_mode: Option<i32>,
    scans_read: usize,
}

impl SimulatedDevice {
    pub fn new(
        serial_number: impl Into<String>,
        model: impl Into<String>,
        pixel_count: usize,
    ) -> Self {
        Self {
            serial_number: serial_number.into(),
            model: model.into(),
            pixel_count,
            wavelength_start: 0.0,
            wavelength_step: 1.0,
            intensity: 0.0,
            noise: 0.0,
            scans: VecDeque::new(),
            failures: HashMap::new(),
            is_open: false,
            integration_time_micros: None,
            trigger_mode: None,
            scans_read: 0,
        }
    }

    pub fn from_config(config: &SimulatedDeviceConfig) -> Self {
        Self::new(
            config.serial_number.clone(),
            config.model.clone(),
            config.pixel_count,
        )
        .with_wavelengths(config.wavelength_start, config.wavelength_step)
        .with_intensity(config.intensity)
        .with_noise(config.noise)
    }

    /// Linear wavelength axis `start + step * pixel`
    pub fn with_wavelengths(mut self, start: f64, step: f64) -> Self {
        self.wavelength_start = start;
        self.wavelength_step = step;
        self
    }

    /// Level of the flat spectrum returned once scripted scans run out
    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    /// Uniform noise amplitude added to the flat spectrum
    pub fn with_noise(mut self, amplitude: f64) -> Self {
        self.noise = amplitude.abs();
        self
    }

    /// Scans returned verbatim, in order, before falling back to the flat spectrum
    pub fn with_scans<I>(mut self, scans: I) -> Self
    where
        I: IntoIterator<Item = Vec<f64>>,
    {
        self.scans.extend(scans);
        self
    }

    /// Make `operation` fail with status `code`
    pub fn failing(mut self, operation: DriverOperation, code: i32) -> Self {
        self.failures.insert(operation, code);
        self
    }

    pub fn integration_time_micros(&self) -> Option<u64> {
        self.integration_time_micros
    }

    pub fn trigger_mode(&self) -> Option<i32> {
        self.trigger_mode
    }

    /// Number of single scans read so far
    pub fn scans_read(&self) -> usize {
        self.scans_read
    }
}

/// Driver over a list of simulated devices, indexed by position.
#[derive(Debug)]
pub struct SimulatedDriver {
    devices: Vec<SimulatedDevice>,
    rng: StdRng,
    close_order: Vec<usize>,
}

impl SimulatedDriver {
    pub fn new(devices: Vec<SimulatedDevice>) -> Self {
        Self {
            devices,
            rng: StdRng::seed_from_u64(0),
            close_order: Vec::new(),
        }
    }

    pub fn from_config(config: &SimulatedConfig) -> Self {
        let devices = config
            .devices
            .iter()
            .map(SimulatedDevice::from_config)
            .collect();
        Self::new(devices).with_seed(config.seed)
    }

    /// Seed for the noise generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn device(&self, index: usize) -> Option<&SimulatedDevice> {
        self.devices.get(index)
    }

    /// Indices of the devices in the order they were closed
    pub fn close_order(&self) -> &[usize] {
        &self.close_order
    }

    fn error(&self, code: i32) -> DriverError {
        DriverError::new(code, self.describe_error(code))
    }

    fn device_mut(
        &mut self,
        index: usize,
        operation: DriverOperation,
    ) -> Result<&mut SimulatedDevice, DriverError> {
        let failure = match self.devices.get(index) {
            None => Some(error_codes::NO_DEVICE),
            Some(device) => device.failures.get(&operation).copied().or_else(|| {
                (operation != DriverOperation::Open && !device.is_open)
                    .then_some(error_codes::NO_DEVICE)
            }),
        };
        match failure {
            Some(code) => Err(self.error(code)),
            None => Ok(&mut self.devices[index]),
        }
    }
}

impl SpectrometerDriver for SimulatedDriver {
    fn open(&mut self, index: usize) -> Result<(), DriverError> {
        self.device_mut(index, DriverOperation::Open)?.is_open = true;
        Ok(())
    }

    fn close(&mut self, index: usize) -> Result<(), DriverError> {
        let device = self.device_mut(index, DriverOperation::Close)?;
        device.is_open = false;
        self.close_order.push(index);
        Ok(())
    }

    fn pixel_count(&mut self, index: usize) -> Result<usize, DriverError> {
        Ok(self.device_mut(index, DriverOperation::PixelCount)?.pixel_count)
    }

    fn wavelengths(&mut self, index: usize, count: usize) -> Result<Vec<f64>, DriverError> {
        let device = self.device_mut(index, DriverOperation::Wavelengths)?;
        Ok((0..count)
            .map(|pixel| device.wavelength_start + device.wavelength_step * pixel as f64)
            .collect())
    }

    fn intensities(&mut self, index: usize, count: usize) -> Result<Vec<f64>, DriverError> {
        let device = self.device_mut(index, DriverOperation::Intensities)?;
        device.scans_read += 1;

        if let Some(mut scan) = device.scans.pop_front() {
            scan.resize(count, 0.0);
            return Ok(scan);
        }

        let (intensity, noise, valid) = (device.intensity, device.noise, device.pixel_count);
        let mut scan = vec![0.0; count];
        for value in scan.iter_mut().take(valid) {
            *value = if noise > 0.0 {
                intensity + self.rng.random_range(-noise..=noise)
            } else {
                intensity
            };
        }
        Ok(scan)
    }

    fn set_integration_time_micros(
        &mut self,
        index: usize,
        micros: u64,
    ) -> Result<(), DriverError> {
        self.device_mut(index, DriverOperation::IntegrationTime)?
            .integration_time_micros = Some(micros);
        Ok(())
    }

    fn set_trigger_mode(&mut self, index: usize, mode: i32) -> Result<(), DriverError> {
        self.device_mut(index, DriverOperation::TriggerMode)?.trigger_mode = Some(mode);
        Ok(())
    }

    fn model(&mut self, index: usize) -> Result<String, DriverError> {
        Ok(self.device_mut(index, DriverOperation::Model)?.model.clone())
    }

    fn serial_number(&mut self, index: usize) -> Result<String, DriverError> {
        Ok(self
            .device_mut(index, DriverOperation::SerialNumber)?
            .serial_number
            .clone())
    }

    fn describe_error(&self, code: i32) -> String {
        error_codes::describe(code).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_scans_then_flat_spectrum() -> Result<(), DriverError> {
        let mut driver = SimulatedDriver::new(vec![SimulatedDevice::new("SIM1", "SIM", 3)
            .with_intensity(7.0)
            .with_scans(vec![vec![1.0, 2.0, 3.0], vec![4.0]])]);
        driver.open(0)?;

        assert_eq!(driver.intensities(0, 3)?, vec![1.0, 2.0, 3.0]);
        assert_eq!(driver.intensities(0, 3)?, vec![4.0, 0.0, 0.0]);
        assert_eq!(driver.intensities(0, 3)?, vec![7.0, 7.0, 7.0]);
        assert_eq!(driver.device(0).map(|d| d.scans_read()), Some(3));
        Ok(())
    }

    #[test]
    fn test_noise_is_bounded_and_seeded() -> Result<(), DriverError> {
        let device = SimulatedDevice::new("SIM1", "SIM", 64)
            .with_intensity(100.0)
            .with_noise(2.0);
        let mut a = SimulatedDriver::new(vec![device.clone()]).with_seed(42);
        let mut b = SimulatedDriver::new(vec![device]).with_seed(42);
        a.open(0)?;
        b.open(0)?;

        let scan_a = a.intensities(0, 64)?;
        let scan_b = b.intensities(0, 64)?;
        assert_eq!(scan_a, scan_b);
        assert!(scan_a.iter().all(|v| (98.0..=102.0).contains(v)));
        Ok(())
    }

    #[test]
    fn test_unopened_and_missing_devices_fail() {
        let mut driver = SimulatedDriver::new(vec![SimulatedDevice::new("SIM1", "SIM", 3)]);
        let err = driver.pixel_count(0).err();
        assert_eq!(err.map(|e| e.code), Some(error_codes::NO_DEVICE));

        let err = driver.open(5).err();
        assert_eq!(err, Some(DriverError::new(2, "Error: No device found")));
    }

    #[test]
    fn test_injected_failure() -> Result<(), DriverError> {
        let mut driver = SimulatedDriver::new(vec![SimulatedDevice::new("SIM1", "SIM", 3)
            .failing(DriverOperation::Intensities, error_codes::TRANSFER_ERROR)]);
        driver.open(0)?;
        assert_eq!(driver.wavelengths(0, 3)?, vec![0.0, 1.0, 2.0]);

        let err = driver.intensities(0, 3).err();
        assert_eq!(err.map(|e| e.code), Some(error_codes::TRANSFER_ERROR));
        Ok(())
    }

    #[test]
    fn test_configuration_is_recorded() -> Result<(), DriverError> {
        let mut driver = SimulatedDriver::new(vec![
            SimulatedDevice::new("SIM1", "SIM", 3),
            SimulatedDevice::new("SIM2", "SIM", 3),
        ]);
        driver.open(0)?;
        driver.open(1)?;
        driver.set_integration_time_micros(1, 2000)?;
        driver.set_trigger_mode(1, 3)?;
        driver.close(1)?;
        driver.close(0)?;

        let device = driver.device(1).cloned();
        assert_eq!(
            device.as_ref().and_then(|d| d.integration_time_micros()),
            Some(2000)
        );
        assert_eq!(device.as_ref().and_then(|d| d.trigger_mode()), Some(3));
        assert_eq!(driver.close_order(), &[1, 0]);
        Ok(())
    }
}
