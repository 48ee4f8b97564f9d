// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Acquisition controller
//!
//! The [`AcquisitionController`] owns the driver and every [`Channel`] of a
//! run and moves them through the run lifecycle:
//!
//! ```text
//! Configured -> Discovering -> [CalibratingReference -> CalibratingBackground]
//!            -> Acquiring -> Closed
//! ```
//!
//! - **Discovering** opens device indices from 0 until the first failure,
//!   reads identity and pixel count, applies integration times and trigger
//!   mode, then reads the wavelength axes.
//! - **Calibrating** (optional) captures the reference then the background
//!   spectrum of every channel, each after an operator confirmation, and
//!   waits once more so the cell can be filled.
//! - **Acquiring** repeats: acquire and save a spectrum per channel, derive
//!   and save the transmission where a reference exists, sleep.
//! - **Closed** releases every opened device in discovery order, even after
//!   a failure, and starts the external plot program.
//!
//! Driver errors are fatal and returned to the caller; the channels opened so
//! far are still closed by [`AcquisitionController::teardown`].

use std::fmt;
use std::thread;
use std::time::Duration;

use chrono::Local;
use log::{debug, error, info, warn};

use crate::acquisition::SpectrometerDriver;
use crate::calibration::{CalibrationStep, OperatorPrompt};
use crate::channel::{BaselineKind, Channel};
use crate::config::Config;
use crate::error::{AcquisitionError, AcquisitionResult};
use crate::preprocessing::QuirkTable;
use crate::storage::{self, ArtifactNames};
use crate::visualization::{NullVisualizer, PlotScript, Series, Visualizer};

/// Vertical range of the transmission diagram.
pub const TRANSMISSION_BOUNDS: (f64, f64) = (-0.1, 1.1);

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Configured,
    Discovering,
    CalibratingReference,
    CalibratingBackground,
    Acquiring,
    Closed,
}

impl ControllerState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configured => "Configured",
            Self::Discovering => "Discovering",
            Self::CalibratingReference => "CalibratingReference",
            Self::CalibratingBackground => "CalibratingBackground",
            Self::Acquiring => "Acquiring",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How many acquisition iterations to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iterations {
    Finite(u64),
    /// Until the process is stopped
    Infinite,
}

impl Iterations {
    /// 0 means [`Iterations::Infinite`].
    pub fn from_count(count: u64) -> Self {
        match count {
            0 => Self::Infinite,
            n => Self::Finite(n),
        }
    }

    pub fn is_exhausted(&self, completed: u64) -> bool {
        match self {
            Self::Finite(n) => completed >= *n,
            Self::Infinite => false,
        }
    }
}

impl fmt::Display for Iterations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(n) => write!(f, "{}", n),
            Self::Infinite => write!(f, "infinite"),
        }
    }
}

/// Sleep between iterations, in a unit that grows with the delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    Milliseconds(u64),
    Seconds(u64),
    Minutes(u64),
}

impl Pacing {
    /// Whole minutes above 600 s, whole seconds above 10 s, milliseconds below.
    pub fn from_seconds(delay: f64) -> Self {
        if !delay.is_finite() || delay <= 0.0 {
            Self::Milliseconds(0)
        } else if delay > 600.0 {
            Self::Minutes((delay / 60.0).floor() as u64)
        } else if delay > 10.0 {
            Self::Seconds(delay.floor() as u64)
        } else {
            Self::Milliseconds((delay * 1000.0).floor() as u64)
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Self::Milliseconds(ms) => Duration::from_millis(*ms),
            Self::Seconds(s) => Duration::from_secs(*s),
            Self::Minutes(m) => Duration::from_secs(m.saturating_mul(60)),
        }
    }
}

/// Integration times in whole microseconds, one per channel.
///
/// Fractions of a microsecond are dropped.
///
/// `spec` lists seconds separated by `:`. When it holds fewer values than
/// `channels`, the last value fills the remaining channels. Extra values are
/// ignored.
pub fn parse_integration_times(spec: &str, channels: usize) -> AcquisitionResult<Vec<u64>> {
    let invalid = |value: &str, reason: &str| AcquisitionError::IntegrationTime {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let mut parsed = Vec::new();
    for value in spec.split(':') {
        let seconds: f64 = value
            .trim()
            .parse()
            .map_err(|_| invalid(value, "not a number"))?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(invalid(value, "must be a finite, non-negative number of seconds"));
        }
        let micros = (seconds * 1_000_000.0).trunc();
        if micros > u64::MAX as f64 {
            return Err(invalid(value, "too large"));
        }
        parsed.push(micros as u64);
    }

    let last = parsed.last().copied().unwrap_or_default();
    parsed.resize(parsed.len().max(channels), last);
    parsed.truncate(channels);
    Ok(parsed)
}

/// Settings of one run, taken from the configuration.
#[derive(Debug, Clone)]
pub struct AcquisitionSettings {
    pub integration_time: String,
    pub scans_to_average: u32,
    pub post_scan_sleep: f64,
    pub boxcar_width: usize,
    pub trigger_mode: i32,
    pub iterations: Iterations,
    pub calibrate: bool,
    pub silent: bool,
    pub max_devices: usize,
    pub artifacts: ArtifactNames,
}

impl AcquisitionSettings {
    pub fn from_config(config: &Config) -> Self {
        let acquisition = &config.acquisition;
        Self {
            integration_time: acquisition.integration_time.clone(),
            scans_to_average: acquisition.scans_to_average,
            post_scan_sleep: acquisition.post_scan_sleep,
            boxcar_width: acquisition.boxcar_width,
            trigger_mode: acquisition.trigger_mode,
            iterations: Iterations::from_count(acquisition.iterations),
            calibrate: acquisition.calibrate,
            silent: acquisition.silent,
            max_devices: config.driver.max_devices,
            artifacts: ArtifactNames::new(&config.output.path, &config.output.identifier),
        }
    }
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub iterations_completed: u64,
    pub channels: usize,
    pub last_iteration_timestamp: Option<String>,
    /// Devices that failed to close; the run itself succeeded.
    pub close_errors: Vec<AcquisitionError>,
}

pub struct AcquisitionController<D: SpectrometerDriver> {
    driver: D,
    settings: AcquisitionSettings,
    quirks: QuirkTable,
    state: ControllerState,
    channels: Vec<Channel>,
    integration_times: Vec<u64>,
    iterations_completed: u64,
    last_iteration_timestamp: Option<String>,
    visualizer: Box<dyn Visualizer>,
    plot_script: Option<PlotScript>,
}

impl<D: SpectrometerDriver> AcquisitionController<D> {
    pub fn new(driver: D, settings: AcquisitionSettings, quirks: QuirkTable) -> Self {
        Self {
            driver,
            settings,
            quirks,
            state: ControllerState::Configured,
            channels: Vec::new(),
            integration_times: Vec::new(),
            iterations_completed: 0,
            last_iteration_timestamp: None,
            visualizer: Box::new(NullVisualizer),
            plot_script: None,
        }
    }

    pub fn with_visualizer(mut self, visualizer: Box<dyn Visualizer>) -> Self {
        self.visualizer = visualizer;
        self
    }

    /// Program started once at teardown.
    pub fn with_plot_script(mut self, plot_script: Option<PlotScript>) -> Self {
        self.plot_script = plot_script;
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn settings(&self) -> &AcquisitionSettings {
        &self.settings
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn integration_times(&self) -> &[u64] {
        &self.integration_times
    }

    pub fn iterations_completed(&self) -> u64 {
        self.iterations_completed
    }

    pub fn last_iteration_timestamp(&self) -> Option<&str> {
        self.last_iteration_timestamp.as_deref()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to a channel, e.g. to load baselines captured earlier.
    pub fn channel_mut(&mut self, position: usize) -> Option<&mut Channel> {
        self.channels.get_mut(position)
    }

    fn say(&self, message: impl fmt::Display) {
        if !self.settings.silent {
            println!("{}", message);
        }
    }

    fn require(
        &self,
        operation: &'static str,
        allowed: &[ControllerState],
    ) -> AcquisitionResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(AcquisitionError::InvalidState {
                operation,
                state: self.state.name(),
            })
        }
    }

    /// Open and configure every reachable device.
    pub fn setup(&mut self) -> AcquisitionResult<()> {
        self.require("setup", &[ControllerState::Configured])?;
        self.state = ControllerState::Discovering;

        for index in 0..self.settings.max_devices {
            match self.driver.open(index) {
                Ok(()) => {
                    debug!("Opened device {}", index);
                    self.channels.push(Channel::new(index));
                }
                Err(err) => {
                    if index == 0 {
                        error!("Opening device 0 failed: {}", err);
                    } else {
                        debug!("Device probe stopped at index {}: {}", index, err);
                    }
                    break;
                }
            }
        }
        if self.channels.is_empty() {
            return Err(AcquisitionError::NoDevices);
        }
        info!("{} device(s) opened", self.channels.len());

        for channel in &mut self.channels {
            let identity = channel.identity(&mut self.driver);
            let pixels = channel.discover_pixel_count(&mut self.driver, &self.quirks)?;
            if !self.settings.silent {
                println!(
                    "Device {}: {}, {} pixels",
                    channel.index(),
                    identity,
                    pixels
                );
            }
        }

        self.integration_times =
            parse_integration_times(&self.settings.integration_time, self.channels.len())?;
        for (channel, &micros) in self.channels.iter().zip(&self.integration_times) {
            channel.apply_integration_time(&mut self.driver, micros)?;
            channel.apply_trigger_mode(&mut self.driver, self.settings.trigger_mode)?;
            debug!(
                "Device {}: integration time {} us, trigger mode {}",
                channel.index(),
                micros,
                self.settings.trigger_mode
            );
        }

        for channel in &mut self.channels {
            let wavelengths = channel.discover_wavelengths(&mut self.driver)?;
            if let (Some(first), Some(last)) = (wavelengths.first(), wavelengths.last()) {
                let summary = match wavelengths.get(1) {
                    Some(second) if wavelengths.len() > 2 => {
                        format!("{:.2} nm, {:.2} nm ... {:.2} nm", first, second, last)
                    }
                    _ => format!("{:.2} nm ... {:.2} nm", first, last),
                };
                if !self.settings.silent {
                    println!("Device {}: wavelengths {}", channel.index(), summary);
                }
            }
        }
        Ok(())
    }

    /// Capture reference and background spectra, each after confirmation.
    pub fn calibrate(&mut self, prompt: &mut dyn OperatorPrompt) -> AcquisitionResult<()> {
        self.require("calibrate", &[ControllerState::Discovering])?;

        for (kind, step, state) in [
            (
                BaselineKind::Reference,
                CalibrationStep::Reference,
                ControllerState::CalibratingReference,
            ),
            (
                BaselineKind::Background,
                CalibrationStep::Background,
                ControllerState::CalibratingBackground,
            ),
        ] {
            self.state = state;
            prompt.confirm(step)?;
            info!("Capturing {} spectra", kind);

            for channel in &mut self.channels {
                channel.acquire(
                    &mut self.driver,
                    &self.quirks,
                    self.settings.scans_to_average,
                    self.settings.boxcar_width,
                )?;
                channel.capture_baseline(kind)?;
                let path = self.settings.artifacts.baseline(kind, channel.index());
                channel.persist_baseline(kind, &path)?;

                if let Some(baseline) = channel.baseline(kind) {
                    let label = format!("Device {} {} spectrum", channel.index(), kind);
                    let series = [Series::new(channel.wavelengths(), baseline)];
                    if let Err(err) = self.visualizer.render(&label, &series, None) {
                        warn!("Could not display {}: {}", label, err);
                    }
                }
            }
        }

        prompt.confirm(CalibrationStep::FillCell)
    }

    /// One acquisition over every channel. Returns the iteration timestamp.
    pub fn acquire_iteration(&mut self) -> AcquisitionResult<String> {
        self.require("acquire_iteration", &[ControllerState::Acquiring])?;

        let now = Local::now();
        let timestamp = storage::timestamp_label(&now);
        self.last_iteration_timestamp = Some(timestamp.clone());

        if !self.settings.silent {
            let indices: Vec<String> = self
                .channels
                .iter()
                .map(|channel| channel.index().to_string())
                .collect();
            println!(
                "Iteration {}/{} at {}: devices {}",
                self.iterations_completed + 1,
                self.settings.iterations,
                now.format("%H:%M:%S"),
                indices.join(", ")
            );
        }

        for channel in &mut self.channels {
            channel.acquire(
                &mut self.driver,
                &self.quirks,
                self.settings.scans_to_average,
                self.settings.boxcar_width,
            )?;
            let path = self.settings.artifacts.spectrum(&timestamp, channel.index());
            channel.persist_spectrum(&path)?;

            if !channel.has_reference() {
                continue;
            }
            match channel.compute_transmission() {
                Ok(_) => {}
                Err(err @ AcquisitionError::MissingBaseline { .. }) => {
                    warn!("{}", err);
                    continue;
                }
                Err(err) => return Err(err),
            }
            let path = self
                .settings
                .artifacts
                .transmission(&timestamp, channel.index());
            channel.persist_transmission(&path)?;

            if let Some(transmission) = channel.transmission() {
                let label = format!("Device {} transmission", channel.index());
                let series = [Series::new(channel.wavelengths(), transmission)];
                let rendered = self
                    .visualizer
                    .render(&label, &series, Some(TRANSMISSION_BOUNDS));
                if let Err(err) = rendered {
                    warn!("Could not display {}: {}", label, err);
                }
            }
        }

        self.iterations_completed += 1;
        Ok(timestamp)
    }

    /// Run the acquisition loop until the iteration count is exhausted.
    ///
    /// Every iteration, the last one included, is followed by the post-scan
    /// sleep.
    pub fn run_loop(&mut self) -> AcquisitionResult<()> {
        self.require(
            "run_loop",
            &[
                ControllerState::Discovering,
                ControllerState::CalibratingBackground,
            ],
        )?;
        self.state = ControllerState::Acquiring;

        let pacing = Pacing::from_seconds(self.settings.post_scan_sleep);
        debug!("Pacing between iterations: {:?}", pacing);
        while !self.settings.iterations.is_exhausted(self.iterations_completed) {
            self.acquire_iteration()?;
            thread::sleep(pacing.duration());
        }
        Ok(())
    }

    /// Close every opened device and start the plot program.
    ///
    /// Close failures do not stop the remaining devices from being closed;
    /// they are logged and returned. Calling it again does nothing.
    pub fn teardown(&mut self) -> Vec<AcquisitionError> {
        if self.state == ControllerState::Closed {
            return Vec::new();
        }
        self.state = ControllerState::Closed;

        let mut errors = Vec::new();
        for channel in &self.channels {
            if let Err(err) = self.driver.close(channel.index()) {
                let err =
                    AcquisitionError::driver("close_spectrometer", channel.index(), err);
                error!("{}", err);
                errors.push(err);
            }
        }

        if let (Some(plot), Some(timestamp)) =
            (&self.plot_script, &self.last_iteration_timestamp)
        {
            let artifacts = &self.settings.artifacts;
            if let Err(err) = plot.run(artifacts.directory(), artifacts.identifier(), timestamp) {
                warn!("Plotting failed: {:#}", err);
            }
        }
        errors
    }

    /// Setup, optional calibration and acquisition loop, then teardown.
    ///
    /// Teardown runs whatever the outcome of the earlier phases.
    pub fn run(&mut self, prompt: &mut dyn OperatorPrompt) -> AcquisitionResult<RunReport> {
        let outcome = self.run_phases(prompt);
        let close_errors = self.teardown();
        outcome?;

        Ok(RunReport {
            iterations_completed: self.iterations_completed,
            channels: self.channels.len(),
            last_iteration_timestamp: self.last_iteration_timestamp.clone(),
            close_errors,
        })
    }

    fn run_phases(&mut self, prompt: &mut dyn OperatorPrompt) -> AcquisitionResult<()> {
        self.setup()?;
        if self.settings.calibrate {
            self.say("Calibration");
            self.calibrate(prompt)?;
        }
        self.run_loop()
    }
}
