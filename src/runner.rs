// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Run driver
//!
//! Builds the driver, the quirk table and the visualizers from a [`Config`]
//! and runs an [`AcquisitionController`] through its phases.

use std::fs;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::acquisition::{get_driver_from_config, SpectrometerDriver};
use crate::calibration::OperatorPrompt;
use crate::config::Config;
use crate::controller::{AcquisitionController, AcquisitionSettings, Iterations, RunReport};
use crate::visualization::{NullVisualizer, PlotScript, TextDiagram, Visualizer};

/// Run a full acquisition with the driver selected by the configuration.
pub fn run(config: &Config, prompt: &mut dyn OperatorPrompt) -> Result<RunReport> {
    let driver = get_driver_from_config(&config.driver)?;
    run_with_driver(config, driver, prompt)
}

/// Run a full acquisition with the given driver.
pub fn run_with_driver<D: SpectrometerDriver>(
    config: &Config,
    driver: D,
    prompt: &mut dyn OperatorPrompt,
) -> Result<RunReport> {
    let output = &config.output.path;
    if !output.exists() {
        debug!("Creating output directory {:?}", output);
        fs::create_dir_all(output)
            .with_context(|| format!("Failed to create output directory {:?}", output))?;
    }

    let quirks = config.quirk_table();
    debug!("{} device correction(s) known", quirks.len());

    let visualizer: Box<dyn Visualizer> =
        if config.plot.text_diagram && !config.acquisition.silent {
            Box::new(TextDiagram::new())
        } else {
            Box::new(NullVisualizer)
        };

    let mut controller =
        AcquisitionController::new(driver, AcquisitionSettings::from_config(config), quirks)
            .with_visualizer(visualizer)
            .with_plot_script(PlotScript::from_command(&config.plot.command));

    let report = controller
        .run(prompt)
        .context("Acquisition aborted")?;

    for err in &report.close_errors {
        warn!("{}", err);
    }
    info!(
        "Acquisition finished: {} iteration(s) on {} device(s)",
        report.iterations_completed, report.channels
    );
    Ok(report)
}

/// Banner and effective options, as shown to the operator at startup.
pub fn describe_options(config: &Config) -> String {
    let acquisition = &config.acquisition;
    let iterations = Iterations::from_count(acquisition.iterations);
    let lines = [
        format!("Spectrometer acquisition {}", env!("CARGO_PKG_VERSION")),
        "------------------------".to_string(),
        format!("Identifier:        {}", config.output.identifier),
        format!("Output path:       {}", config.output.path.display()),
        format!("Driver:            {}", config.driver.kind),
        format!("Iterations:        {}", iterations),
        format!("Integration time:  {} s", acquisition.integration_time),
        format!("Scans to average:  {}", acquisition.scans_to_average),
        format!("Post scan sleep:   {} s", acquisition.post_scan_sleep),
        format!("Boxcar width:      {}", acquisition.boxcar_width),
        format!("Trigger mode:      {}", acquisition.trigger_mode),
        format!("Calibrate:         {}", acquisition.calibrate),
    ];
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::ScriptedPrompt;
    use crate::config::SimulatedDeviceConfig;

    #[test]
    fn test_describe_options() {
        let mut config = Config::default();
        config.output.identifier = "flowcell".to_string();
        config.acquisition.iterations = 5;

        let text = describe_options(&config);
        assert!(text.contains("Identifier:        flowcell"));
        assert!(text.contains("Iterations:        5"));
        assert!(text.contains("Driver:            simulated"));
        assert!(describe_options(&Config::default()).contains("Iterations:        infinite"));
    }

    #[test]
    fn test_run_creates_output_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut config = Config::default();
        config.output.path = dir.path().join("nested").join("out");
        config.acquisition.iterations = 1;
        config.acquisition.post_scan_sleep = 0.0;
        config.acquisition.silent = true;
        config.driver.simulated.devices = vec![SimulatedDeviceConfig {
            pixel_count: 8,
            ..SimulatedDeviceConfig::default()
        }];

        let report = run(&config, &mut ScriptedPrompt::new())?;
        assert_eq!(report.channels, 1);
        assert_eq!(report.iterations_completed, 1);
        assert!(report.close_errors.is_empty());

        let files = fs::read_dir(&config.output.path)?.count();
        assert_eq!(files, 1);
        Ok(())
    }
}
