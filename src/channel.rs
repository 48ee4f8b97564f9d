// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! One spectrometer channel
//!
//! A [`Channel`] owns everything acquired from one physical device during a
//! run: the pixel count and wavelength axis read at setup, the averaged and
//! smoothed spectrum of the latest acquisition, the reference and background
//! baselines captured during calibration, and the transmission derived from
//! them.
//!
//! The channel never owns the driver. Every operation that talks to the
//! hardware borrows it, so the controller keeps exclusive ownership of the
//! driver and the channels at the same time.
//!
//! Buffer lengths are checked before any per-pixel arithmetic: every buffer
//! of a channel is either empty or exactly `pixel_count` long.

use std::fmt;
use std::path::Path;

use log::{debug, warn};

use crate::acquisition::SpectrometerDriver;
use crate::error::{AcquisitionError, AcquisitionResult};
use crate::preprocessing::{BoxcarFilter, Filter, QuirkTable};
use crate::storage;

/// Placeholder used when a device cannot report its identity.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// The two calibration baselines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaselineKind {
    /// Light source through the empty cell
    Reference,
    /// Light source off
    Background,
}

impl fmt::Display for BaselineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Background => write!(f, "background"),
        }
    }
}

/// Serial number and model name of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelIdentity {
    pub serial_number: String,
    pub model: String,
}

impl ChannelIdentity {
    pub fn unknown() -> Self {
        Self {
            serial_number: UNKNOWN_IDENTITY.to_string(),
            model: UNKNOWN_IDENTITY.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.serial_number == UNKNOWN_IDENTITY && self.model == UNKNOWN_IDENTITY
    }
}

impl fmt::Display for ChannelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.model, self.serial_number)
    }
}

/// Acquisition state of one device, addressed by its discovery index.
#[derive(Debug, Clone)]
pub struct Channel {
    index: usize,
    serial_number: Option<String>,
    model: Option<String>,
    pixel_count: usize,
    wavelengths: Vec<f64>,
    raw_sample: Vec<f64>,
    spectrum: Vec<f64>,
    background: Option<Vec<f64>>,
    reference: Option<Vec<f64>>,
    transmission: Option<Vec<f64>>,
}

impl Channel {
    /// A channel that only knows its index.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            serial_number: None,
            model: None,
            pixel_count: 0,
            wavelengths: Vec::new(),
            raw_sample: Vec::new(),
            spectrum: Vec::new(),
            background: None,
            reference: None,
            transmission: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Averaged and smoothed spectrum of the latest acquisition.
    pub fn spectrum(&self) -> &[f64] {
        &self.spectrum
    }

    /// Last single scan, after device corrections.
    pub fn raw_sample(&self) -> &[f64] {
        &self.raw_sample
    }

    pub fn baseline(&self, kind: BaselineKind) -> Option<&[f64]> {
        match kind {
            BaselineKind::Reference => self.reference.as_deref(),
            BaselineKind::Background => self.background.as_deref(),
        }
    }

    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    pub fn transmission(&self) -> Option<&[f64]> {
        self.transmission.as_deref()
    }

    /// Serial number and model, each read once from the driver.
    ///
    /// A failing query yields [`UNKNOWN_IDENTITY`] for that part only and is
    /// not cached, the next call asks the driver again.
    pub fn identity<D>(&mut self, driver: &mut D) -> ChannelIdentity
    where
        D: SpectrometerDriver + ?Sized,
    {
        if self.serial_number.is_none() {
            match driver.serial_number(self.index) {
                Ok(serial_number) => self.serial_number = Some(serial_number),
                Err(err) => warn!("Device {}: serial number unavailable ({})", self.index, err),
            }
        }
        if self.model.is_none() {
            match driver.model(self.index) {
                Ok(model) => self.model = Some(model),
                Err(err) => warn!("Device {}: model unavailable ({})", self.index, err),
            }
        }

        ChannelIdentity {
            serial_number: self.cached_serial().to_string(),
            model: self.model.as_deref().unwrap_or(UNKNOWN_IDENTITY).to_string(),
        }
    }

    /// Serial number used for device corrections, without asking the driver.
    fn cached_serial(&self) -> &str {
        self.serial_number.as_deref().unwrap_or(UNKNOWN_IDENTITY)
    }

    /// Read the pixel count from the driver and apply any length override.
    ///
    /// Sizes the sample and spectrum buffers to the new count. A count of
    /// zero is rejected.
    pub fn discover_pixel_count<D>(
        &mut self,
        driver: &mut D,
        quirks: &QuirkTable,
    ) -> AcquisitionResult<usize>
    where
        D: SpectrometerDriver + ?Sized,
    {
        let reported = driver.pixel_count(self.index).map_err(|e| {
            AcquisitionError::driver("get_formatted_spectrum_length", self.index, e)
        })?;
        let pixel_count = quirks.pixel_count(self.cached_serial(), reported);
        if pixel_count == 0 {
            return Err(AcquisitionError::InvalidPixelCount { index: self.index });
        }
        self.pixel_count = pixel_count;
        self.raw_sample = vec![0.0; self.pixel_count];
        self.spectrum = vec![0.0; self.pixel_count];
        debug!(
            "Device {}: {} pixels (driver reported {})",
            self.index, self.pixel_count, reported
        );
        Ok(self.pixel_count)
    }

    /// Fill the wavelength axis from the driver.
    pub fn discover_wavelengths<D>(&mut self, driver: &mut D) -> AcquisitionResult<&[f64]>
    where
        D: SpectrometerDriver + ?Sized,
    {
        let wavelengths = driver
            .wavelengths(self.index, self.pixel_count)
            .map_err(|e| AcquisitionError::driver("get_wavelengths", self.index, e))?;
        self.check_length("wavelengths", wavelengths.len())?;
        self.wavelengths = wavelengths;
        Ok(&self.wavelengths)
    }

    pub fn apply_integration_time<D>(&self, driver: &mut D, micros: u64) -> AcquisitionResult<()>
    where
        D: SpectrometerDriver + ?Sized,
    {
        driver
            .set_integration_time_micros(self.index, micros)
            .map_err(|e| AcquisitionError::driver("set_integration_time_microsec", self.index, e))
    }

    pub fn apply_trigger_mode<D>(&self, driver: &mut D, mode: i32) -> AcquisitionResult<()>
    where
        D: SpectrometerDriver + ?Sized,
    {
        driver
            .set_trigger_mode(self.index, mode)
            .map_err(|e| AcquisitionError::driver("set_trigger_mode", self.index, e))
    }

    /// Acquire one spectrum: the mean of `scans` corrected single scans,
    /// smoothed with a boxcar of the given radius.
    ///
    /// A radius of 0 leaves the mean unsmoothed.
    pub fn acquire<D>(
        &mut self,
        driver: &mut D,
        quirks: &QuirkTable,
        scans: u32,
        smoothing_radius: usize,
    ) -> AcquisitionResult<&[f64]>
    where
        D: SpectrometerDriver + ?Sized,
    {
        if scans == 0 {
            return Err(AcquisitionError::NoScans { index: self.index });
        }
        let mut accumulated = vec![0.0; self.pixel_count];

        for _ in 0..scans {
            let scan = driver
                .intensities(self.index, self.pixel_count)
                .map_err(|e| AcquisitionError::driver("get_formatted_spectrum", self.index, e))?;
            self.check_length("formatted spectrum", scan.len())?;
            self.raw_sample = scan;
            let serial = self.serial_number.as_deref().unwrap_or(UNKNOWN_IDENTITY);
            quirks.repair(serial, &mut self.raw_sample);

            for (sum, value) in accumulated.iter_mut().zip(&self.raw_sample) {
                *sum += value;
            }
        }

        let divisor = f64::from(scans);
        for value in &mut accumulated {
            *value /= divisor;
        }
        BoxcarFilter::new(smoothing_radius).apply(&mut accumulated);

        self.spectrum = accumulated;
        Ok(&self.spectrum)
    }

    /// Store `spectrum` as a baseline. Each baseline can be set only once.
    pub fn set_baseline(
        &mut self,
        kind: BaselineKind,
        spectrum: Vec<f64>,
    ) -> AcquisitionResult<()> {
        if self.baseline(kind).is_some() {
            return Err(AcquisitionError::BaselineAlreadySet {
                index: self.index,
                baseline: kind,
            });
        }
        self.check_length("baseline", spectrum.len())?;

        match kind {
            BaselineKind::Reference => self.reference = Some(spectrum),
            BaselineKind::Background => self.background = Some(spectrum),
        }
        Ok(())
    }

    /// Keep the latest acquired spectrum as a baseline.
    pub fn capture_baseline(&mut self, kind: BaselineKind) -> AcquisitionResult<&[f64]> {
        self.set_baseline(kind, self.spectrum.clone())?;
        Ok(self.baseline(kind).unwrap_or_default())
    }

    /// `(spectrum - background) / (reference - background)` for every pixel.
    ///
    /// Both baselines must have been captured. A pixel where the reference
    /// equals the background yields a non-finite value.
    pub fn compute_transmission(&mut self) -> AcquisitionResult<&[f64]> {
        let reference = self
            .reference
            .as_deref()
            .ok_or(AcquisitionError::MissingBaseline {
                index: self.index,
                baseline: BaselineKind::Reference,
            })?;
        let background = self
            .background
            .as_deref()
            .ok_or(AcquisitionError::MissingBaseline {
                index: self.index,
                baseline: BaselineKind::Background,
            })?;
        for (buffer, len) in [
            ("spectrum", self.spectrum.len()),
            ("reference", reference.len()),
            ("background", background.len()),
        ] {
            if len != self.pixel_count {
                return Err(AcquisitionError::LengthMismatch {
                    index: self.index,
                    buffer,
                    expected: self.pixel_count,
                    found: len,
                });
            }
        }

        let transmission = self
            .spectrum
            .iter()
            .zip(reference)
            .zip(background)
            .map(|((s, r), b)| (s - b) / (r - b))
            .collect();
        self.transmission = Some(transmission);
        Ok(self.transmission.as_deref().unwrap_or_default())
    }

    /// Write the latest spectrum against the wavelength axis.
    pub fn persist_spectrum(&self, path: &Path) -> AcquisitionResult<()> {
        storage::write_two_column(path, &self.wavelengths, &self.spectrum)
    }

    /// Write a baseline. Returns `false` when it was never captured.
    pub fn persist_baseline(&self, kind: BaselineKind, path: &Path) -> AcquisitionResult<bool> {
        match self.baseline(kind) {
            Some(baseline) => {
                storage::write_two_column(path, &self.wavelengths, baseline).map(|_| true)
            }
            None => Ok(false),
        }
    }

    /// Write the transmission. Returns `false` when it was never computed.
    pub fn persist_transmission(&self, path: &Path) -> AcquisitionResult<bool> {
        match &self.transmission {
            Some(transmission) => {
                storage::write_two_column(path, &self.wavelengths, transmission).map(|_| true)
            }
            None => Ok(false),
        }
    }

    fn check_length(&self, buffer: &'static str, found: usize) -> AcquisitionResult<()> {
        if found == self.pixel_count {
            Ok(())
        } else {
            Err(AcquisitionError::LengthMismatch {
                index: self.index,
                buffer,
                expected: self.pixel_count,
                found,
            })
        }
    }
}
