// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use rust_spectrometer::config::{self, Config};

#[test]
fn test_config_schema_output() -> Result<()> {
    // The schema goes to stdout, only check that it is produced without error
    config::output_config_schema()?;
    Ok(())
}

#[test]
fn test_default_config_matches_schema() -> Result<()> {
    let schema: serde_json::Value = serde_json::from_str(config::utils::CONFIG_SCHEMA)?;
    let validator = jsonschema::draft202012::new(&schema)?;

    let default_config = serde_json::to_value(Config::default())?;
    assert!(validator.is_valid(&default_config));
    Ok(())
}
