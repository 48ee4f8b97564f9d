// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the spectrometer transmission acquisition
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{error, info};

use rust_spectrometer::calibration::StdinPrompt;
use rust_spectrometer::config::{output_config_schema, Config, ConfigOverrides, DriverKind};
use rust_spectrometer::runner::{self, describe_options};
use rust_spectrometer::DriverError;

/// Transmission measurements with one or more spectrometers
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run identifier, prefix of every data file [default: default]
    #[arg(long, visible_alias = "id")]
    identifier: Option<String>,

    /// Output directory [default: ./]
    #[arg(long)]
    path: Option<PathBuf>,

    /// Number of acquisition iterations, 0 runs until stopped [default: 0]
    #[arg(long, visible_alias = "it")]
    iterations: Option<u64>,

    /// Integration times in seconds, one per device, separated by ':' [default: 1e-3]
    #[arg(long, visible_alias = "int")]
    integration_time: Option<String>,

    /// Number of scans averaged into one spectrum [default: 1]
    #[arg(long, visible_alias = "avg")]
    scans_to_average: Option<u32>,

    /// Delay between iterations in seconds [default: 1.0]
    #[arg(long, visible_alias = "post")]
    post_scan_sleep: Option<f64>,

    /// Boxcar smoothing radius, 0 disables smoothing [default: 1]
    #[arg(long, visible_alias = "box")]
    boxcar_width: Option<usize>,

    /// Trigger mode of every device [default: 0]
    #[arg(long, visible_alias = "trig", allow_negative_numbers = true)]
    trigger_mode: Option<i32>,

    /// Capture reference and background spectra before acquiring
    #[arg(long, visible_alias = "cal")]
    calibrate: bool,

    /// No operator output on the console
    #[arg(short, long)]
    silent: bool,

    /// Spectrometer driver: simulated or seabreeze
    #[arg(long)]
    driver: Option<DriverKind>,

    /// Configuration file, created with defaults when missing
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the JSON schema of the configuration file and exit
    #[arg(long)]
    show_config_schema: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            identifier: self.identifier.clone(),
            path: self.path.clone(),
            iterations: self.iterations,
            integration_time: self.integration_time.clone(),
            scans_to_average: self.scans_to_average,
            post_scan_sleep: self.post_scan_sleep,
            boxcar_width: self.boxcar_width,
            trigger_mode: self.trigger_mode,
            calibrate: self.calibrate,
            silent: self.silent,
            driver: self.driver,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.show_config_schema {
        return output_config_schema();
    }

    let mut config = Config::from_file(&args.config)?;
    config.apply_args(args.overrides());
    config.validate()?;

    if !config.acquisition.silent {
        println!("{}", describe_options(&config));
    }

    let mut prompt = StdinPrompt::new();
    match runner::run(&config, &mut prompt) {
        Ok(report) => {
            info!(
                "Last iteration: {}",
                report.last_iteration_timestamp.as_deref().unwrap_or("none")
            );
            Ok(())
        }
        Err(err) => {
            if let Some(driver_error) = err.chain().find_map(|e| e.downcast_ref::<DriverError>()) {
                error!(
                    "Driver error {}: {}",
                    driver_error.code, driver_error.description
                );
            }
            Err(err)
        }
    }
}
