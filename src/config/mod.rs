// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the spectrometer application
//!
//! The configuration is backed by a YAML file and validated against a JSON
//! schema before it is deserialized. Command line options are applied on top
//! of the loaded values with [`Config::apply_args`].
//!
//! ## Configuration Structure
//!
//! - `acquisition`: integration times, averaging, smoothing, pacing, calibration
//! - `output`: output directory and run identifier
//! - `driver`: spectrometer backend and simulated devices
//! - `plot`: console diagram and external plotting program
//! - `quirks`: device corrections added to the built-in table
//!
//! ## Usage
//!
//! ```no_run
//! use rust_spectrometer::config::{Config, ConfigOverrides};
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! config.apply_args(ConfigOverrides {
//!     identifier: Some("flowcell".to_string()),
//!     iterations: Some(10),
//!     calibrate: true,
//!     ..ConfigOverrides::default()
//! });
//!
//! println!("Averaging {} scans", config.acquisition.scans_to_average);
//! ```

pub mod acquisition;
pub mod driver;
pub mod output;
pub mod plot;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use acquisition::AcquisitionConfig;
pub use driver::{DriverConfig, DriverKind, SimulatedConfig, SimulatedDeviceConfig};
pub use output::OutputConfig;
pub use plot::PlotConfig;
pub use utils::output_config_schema;

use crate::preprocessing::{QuirkEntry, QuirkTable};

/// Root configuration structure for the spectrometer application.
///
/// Every section falls back to its defaults when absent from the file, so an
/// empty YAML document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Acquisition campaign settings.
    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    /// Output directory and file naming.
    #[serde(default)]
    pub output: OutputConfig,

    /// Spectrometer backend.
    #[serde(default)]
    pub driver: DriverConfig,

    /// Console diagram and external plotting.
    #[serde(default)]
    pub plot: PlotConfig,

    /// Device corrections merged over the built-in ones.
    #[serde(default)]
    pub quirks: Vec<QuirkEntry>,
}

/// Command line values overriding the configuration file.
///
/// `None` (or `false` for flags) keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub identifier: Option<String>,
    pub path: Option<PathBuf>,
    pub iterations: Option<u64>,
    pub integration_time: Option<String>,
    pub scans_to_average: Option<u32>,
    pub post_scan_sleep: Option<f64>,
    pub boxcar_width: Option<usize>,
    pub trigger_mode: Option<i32>,
    pub calibrate: bool,
    pub silent: bool,
    pub driver: Option<DriverKind>,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Original path: {:?}, Sample path: {:?}", path, sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// A missing file is created with the default configuration. A file that
    /// fails validation leaves a `*.sample.yaml` next to it and is rejected.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        let yaml_value: serde_yml::Value = serde_yml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML configuration from {:?}", path))?;

        // An empty document deserializes to null, treat it as an empty mapping
        let json_value = match serde_json::to_value(&yaml_value).with_context(|| {
            format!("Failed to convert YAML to JSON for validation: {:?}", path)
        })? {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            value => value,
        };

        let schema: serde_json::Value = serde_json::from_str(utils::CONFIG_SCHEMA)
            .context("Failed to parse JSON schema")?;
        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        debug!("Validating {} configuration against schema", path.display());
        if let Err(error) = validator.validate(&json_value) {
            error!("Configuration validation error before deserialization");
            Self::create_sample_config(path)?;
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config = match serde_json::from_value(json_value) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration deserialization error: {}", err);
                if let Err(e) = Self::create_sample_config(path) {
                    error!("Failed to create sample config: {}", e);
                }
                return Err(anyhow::anyhow!(
                    "Failed to deserialize configuration from {}: {}",
                    path.display(),
                    err
                ));
            }
        };

        if let Err(err) = utils::validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Validate the configuration held in memory, as done after loading a file.
    pub fn validate(&self) -> Result<()> {
        utils::validate_specific_rules(self)
    }

    /// Built-in device corrections extended with the configured ones.
    pub fn quirk_table(&self) -> QuirkTable {
        let mut table = QuirkTable::builtin();
        table.extend(&self.quirks);
        table
    }

    /// Apply command line arguments to override configuration values.
    pub fn apply_args(&mut self, args: ConfigOverrides) {
        if let Some(identifier) = args.identifier {
            debug!("Overriding identifier from command line: {}", identifier);
            self.output.identifier = identifier;
        }
        if let Some(path) = args.path {
            debug!("Overriding output path from command line: {:?}", path);
            self.output.path = path;
        }
        if let Some(iterations) = args.iterations {
            debug!("Overriding iterations from command line: {}", iterations);
            self.acquisition.iterations = iterations;
        }
        if let Some(integration_time) = args.integration_time {
            debug!(
                "Overriding integration time from command line: {}",
                integration_time
            );
            self.acquisition.integration_time = integration_time;
        }
        if let Some(scans) = args.scans_to_average {
            debug!("Overriding scans to average from command line: {}", scans);
            self.acquisition.scans_to_average = scans;
        }
        if let Some(sleep) = args.post_scan_sleep {
            debug!("Overriding post scan sleep from command line: {}", sleep);
            self.acquisition.post_scan_sleep = sleep;
        }
        if let Some(width) = args.boxcar_width {
            debug!("Overriding boxcar width from command line: {}", width);
            self.acquisition.boxcar_width = width;
        }
        if let Some(mode) = args.trigger_mode {
            debug!("Overriding trigger mode from command line: {}", mode);
            self.acquisition.trigger_mode = mode;
        }
        if args.calibrate {
            self.acquisition.calibrate = true;
        }
        if args.silent {
            self.acquisition.silent = true;
        }
        if let Some(kind) = args.driver {
            debug!("Overriding driver from command line: {}", kind);
            self.driver.kind = kind;
        }
    }
}
