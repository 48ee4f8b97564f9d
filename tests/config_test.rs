// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use rust_spectrometer::config::{
    Config, ConfigOverrides, DriverKind, SimulatedDeviceConfig,
};
use rust_spectrometer::preprocessing::{QuirkEntry, QuirkRule};
use tempfile::tempdir;

#[test]
fn test_config_load_and_save() -> Result<()> {
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let mut config = Config::default();
    config.acquisition.integration_time = "0.01:0.02".to_string();
    config.acquisition.scans_to_average = 4;
    config.output.identifier = "flowcell".to_string();
    config.driver.simulated.devices = vec![
        SimulatedDeviceConfig {
            serial_number: "SIM-A".to_string(),
            pixel_count: 16,
            ..SimulatedDeviceConfig::default()
        },
        SimulatedDeviceConfig {
            serial_number: "SIM-B".to_string(),
            noise: 2.5,
            ..SimulatedDeviceConfig::default()
        },
    ];
    config.quirks.push(QuirkEntry {
        serial_number: "USB2G1234".to_string(),
        rule: QuirkRule::PointRepair {
            reference_index: 3,
            lower_factor: 0.8,
            upper_factor: 1.25,
        },
    });
    config.plot.command = vec!["gnuplot-wrapper".to_string(), "--png".to_string()];

    config.save_to_file(&config_path)?;
    let loaded_config = Config::from_file(&config_path)?;
    assert_eq!(loaded_config, config);

    // A missing file is created with the defaults
    let non_existent_path = temp_dir.path().join("non_existent.yaml");
    let default_config = Config::from_file(&non_existent_path)?;
    assert!(non_existent_path.exists());
    assert_eq!(default_config, Config::default());
    assert_eq!(default_config.acquisition.integration_time, "1e-3");
    assert_eq!(default_config.output.path, PathBuf::from("./"));
    assert_eq!(default_config.driver.max_devices, 16);

    Ok(())
}

#[test]
fn test_partial_config_uses_defaults() -> Result<()> {
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(
        &config_path,
        r#"
acquisition:
  integration_time: 0.004
  iterations: 3
driver:
  kind: seabreeze
"#,
    )?;

    let config = Config::from_file(&config_path)?;
    assert_eq!(config.acquisition.integration_time, "0.004");
    assert_eq!(config.acquisition.iterations, 3);
    assert_eq!(config.acquisition.scans_to_average, 1);
    assert_eq!(config.acquisition.boxcar_width, 1);
    assert_eq!(config.driver.kind, DriverKind::Seabreeze);
    assert!(config.plot.text_diagram);
    Ok(())
}

#[test]
fn test_empty_file_is_default() -> Result<()> {
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "")?;

    assert_eq!(Config::from_file(&config_path)?, Config::default());
    Ok(())
}

#[test]
fn test_apply_args() {
    let mut config = Config::default();
    config.apply_args(ConfigOverrides {
        identifier: Some("run7".to_string()),
        path: Some(PathBuf::from("/tmp/spectra")),
        iterations: Some(12),
        integration_time: Some("0.002:0.003".to_string()),
        scans_to_average: Some(5),
        post_scan_sleep: Some(0.5),
        boxcar_width: Some(0),
        trigger_mode: Some(3),
        calibrate: true,
        silent: false,
        driver: Some(DriverKind::Seabreeze),
    });

    assert_eq!(config.output.identifier, "run7");
    assert_eq!(config.output.path, PathBuf::from("/tmp/spectra"));
    assert_eq!(config.acquisition.iterations, 12);
    assert_eq!(config.acquisition.integration_time, "0.002:0.003");
    assert_eq!(config.acquisition.scans_to_average, 5);
    assert_eq!(config.acquisition.post_scan_sleep, 0.5);
    assert_eq!(config.acquisition.boxcar_width, 0);
    assert_eq!(config.acquisition.trigger_mode, 3);
    assert!(config.acquisition.calibrate);
    assert!(!config.acquisition.silent);
    assert_eq!(config.driver.kind, DriverKind::Seabreeze);
}

#[test]
fn test_config_validation() {
    assert!(Config::default().validate().is_ok());

    let mut config = Config::default();
    config.acquisition.scans_to_average = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.acquisition.integration_time = "-1".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.acquisition.post_scan_sleep = -2.0;
    assert!(config.validate().is_err());
}
