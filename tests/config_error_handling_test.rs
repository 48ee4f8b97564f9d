// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::fs;
use std::path::Path;
use std::sync::Once;

use anyhow::Result;
use rust_spectrometer::config::Config;
use tempfile::tempdir;

static INIT: Once = Once::new();

// Setup logger for tests
fn setup() {
    INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

fn assert_rejected_with_sample(config_path: &Path) -> Result<()> {
    let result = Config::from_file(config_path);
    assert!(result.is_err(), "Config loading should have failed");

    let sample_path = config_path.with_extension("sample.yaml");
    assert!(sample_path.exists(), "Sample config file was not created");

    // The sample file holds a valid default configuration
    let sample_config = Config::from_file(&sample_path)?;
    assert_eq!(sample_config, Config::default());
    Ok(())
}

#[test]
fn test_config_type_error_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let invalid_yaml = r#"
acquisition:
  scans_to_average: "many"   # Integer field with string value
  calibrate: "yes"           # Boolean field with string value
output:
  identifier: []             # Array instead of string
"#;
    fs::write(&config_path, invalid_yaml)?;

    assert_rejected_with_sample(&config_path)
}

#[test]
fn test_config_schema_violation_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let invalid_config = r#"
acquisition:
  scans_to_average: 0        # At least one scan is required
driver:
  kind: usb                  # Unknown driver
"#;
    fs::write(&config_path, invalid_config)?;

    assert_rejected_with_sample(&config_path)
}

#[test]
fn test_config_unknown_section_is_rejected() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "visualization:\n  port: 8080\n")?;

    assert_rejected_with_sample(&config_path)
}

#[test]
fn test_config_specific_rule_violation_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    // Valid for the schema, but the integration time list does not parse
    let invalid_config = r#"
acquisition:
  integration_time: "0.001:fast"
"#;
    fs::write(&config_path, invalid_config)?;

    assert_rejected_with_sample(&config_path)
}

#[test]
fn test_config_quirk_rule_is_checked() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let invalid_config = r#"
quirks:
  - serial_number: FLMS09999
    rule:
      kind: point_repair
      reference_index: 2
"#;
    fs::write(&config_path, invalid_config)?;

    assert_rejected_with_sample(&config_path)
}
