// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Spectrometer driver backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Deterministic simulated devices, see [`SimulatedConfig`]
    #[default]
    Simulated,
    /// Ocean Optics devices through libseabreeze (`seabreeze` feature)
    Seabreeze,
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::Seabreeze => write!(f, "seabreeze"),
        }
    }
}

impl FromStr for DriverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simulated" => Ok(Self::Simulated),
            "seabreeze" => Ok(Self::Seabreeze),
            other => Err(format!("unknown driver '{}'", other)),
        }
    }
}

/// Driver selection and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Backend used for the run. Default is `simulated`.
    #[serde(default)]
    pub kind: DriverKind,

    /// Highest number of device indices probed at setup. Default is 16.
    #[serde(default = "default_max_devices")]
    pub max_devices: usize,

    /// Devices served by the simulated backend.
    #[serde(default)]
    pub simulated: SimulatedConfig,
}

fn default_max_devices() -> usize {
    16
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            kind: DriverKind::default(),
            max_devices: default_max_devices(),
            simulated: SimulatedConfig::default(),
        }
    }
}

/// Simulated backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedConfig {
    /// Seed of the noise generator.
    #[serde(default)]
    pub seed: u64,

    #[serde(default = "default_simulated_devices")]
    pub devices: Vec<SimulatedDeviceConfig>,
}

fn default_simulated_devices() -> Vec<SimulatedDeviceConfig> {
    vec![SimulatedDeviceConfig::default()]
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            devices: default_simulated_devices(),
        }
    }
}

/// One simulated spectrometer returning a flat spectrum with uniform noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedDeviceConfig {
    #[serde(default = "default_serial_number")]
    pub serial_number: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_pixel_count")]
    pub pixel_count: usize,
    /// Wavelength of pixel 0, in nm
    #[serde(default = "default_wavelength_start")]
    pub wavelength_start: f64,
    /// Wavelength increment per pixel, in nm
    #[serde(default = "default_wavelength_step")]
    pub wavelength_step: f64,
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    /// Amplitude of the uniform noise added to every pixel
    #[serde(default)]
    pub noise: f64,
}

fn default_serial_number() -> String {
    "SIM00001".to_string()
}

fn default_model() -> String {
    "SIMULATED".to_string()
}

fn default_pixel_count() -> usize {
    2048
}

fn default_wavelength_start() -> f64 {
    340.0
}

fn default_wavelength_step() -> f64 {
    0.35
}

fn default_intensity() -> f64 {
    1000.0
}

impl Default for SimulatedDeviceConfig {
    fn default() -> Self {
        Self {
            serial_number: default_serial_number(),
            model: default_model(),
            pixel_count: default_pixel_count(),
            wavelength_start: default_wavelength_start(),
            wavelength_step: default_wavelength_step(),
            intensity: default_intensity(),
            noise: 0.0,
        }
    }
}
