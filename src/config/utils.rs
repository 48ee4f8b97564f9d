// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::debug;

use super::{Config, DriverKind};
use crate::controller::parse_integration_times;

/// JSON schema of the YAML configuration file.
pub const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./rust_spectrometer --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Validates the configuration against rules the JSON schema cannot express.
///
/// - the integration time list parses into non-negative, finite seconds
/// - at least one scan is averaged
/// - the post scan sleep is finite and non-negative
/// - the simulated backend has at least one device with at least one pixel
/// - quirk entries name a serial number
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    let acquisition = &config.acquisition;
    parse_integration_times(&acquisition.integration_time, 1)
        .context("Invalid acquisition.integration_time")?;

    if acquisition.scans_to_average == 0 {
        anyhow::bail!("acquisition.scans_to_average must be at least 1");
    }

    if !acquisition.post_scan_sleep.is_finite() || acquisition.post_scan_sleep < 0.0 {
        anyhow::bail!(
            "Invalid acquisition.post_scan_sleep: {}",
            acquisition.post_scan_sleep
        );
    }

    if config.driver.max_devices == 0 {
        anyhow::bail!("driver.max_devices must be at least 1");
    }

    if config.driver.kind == DriverKind::Simulated {
        if config.driver.simulated.devices.is_empty() {
            anyhow::bail!("The simulated driver needs at least one device");
        }
        for device in &config.driver.simulated.devices {
            if device.pixel_count == 0 {
                anyhow::bail!("Simulated device '{}' has no pixels", device.serial_number);
            }
        }
    }

    for entry in &config.quirks {
        if entry.serial_number.trim().is_empty() {
            anyhow::bail!("Quirk entry without serial number");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_specific_rules(&Config::default()).is_ok());
    }

    #[test]
    fn test_specific_rules_reject_bad_values() {
        let mut config = Config::default();
        config.acquisition.integration_time = "0.001:abc".to_string();
        assert!(validate_specific_rules(&config).is_err());

        let mut config = Config::default();
        config.acquisition.post_scan_sleep = f64::NAN;
        assert!(validate_specific_rules(&config).is_err());

        let mut config = Config::default();
        config.driver.simulated.devices.clear();
        assert!(validate_specific_rules(&config).is_err());

        // An empty simulated list does not matter for the hardware backend
        config.driver.kind = DriverKind::Seabreeze;
        assert!(validate_specific_rules(&config).is_ok());
    }
}
