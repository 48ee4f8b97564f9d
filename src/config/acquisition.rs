// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use serde::{Deserialize, Deserializer, Serialize};

/// Settings of the acquisition campaign.
///
/// These values are shared by every spectrometer of the run. The integration
/// time is the only per-device value; it is given as a colon separated list
/// of seconds, one entry per device in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Integration times in seconds, separated by `:`.
    ///
    /// When fewer values than devices are given, the last value is used for
    /// the remaining devices. A single bare number is accepted as well.
    /// Default is `"1e-3"`.
    #[serde(
        default = "default_integration_time",
        deserialize_with = "deserialize_integration_time"
    )]
    pub integration_time: String,

    /// Number of single scans averaged into one spectrum. Default is 1.
    #[serde(default = "default_scans_to_average")]
    pub scans_to_average: u32,

    /// Delay between two acquisition iterations, in seconds. Default is 1.0.
    #[serde(default = "default_post_scan_sleep")]
    pub post_scan_sleep: f64,

    /// Radius of the boxcar smoothing window, 0 disables smoothing. Default is 1.
    #[serde(default = "default_boxcar_width")]
    pub boxcar_width: usize,

    /// Trigger mode passed to every device. Default is 0 (free running).
    #[serde(default)]
    pub trigger_mode: i32,

    /// Number of acquisition iterations, 0 runs until the process is stopped.
    #[serde(default)]
    pub iterations: u64,

    /// Capture reference and background spectra interactively before the loop.
    #[serde(default)]
    pub calibrate: bool,

    /// Suppress the console output meant for the operator.
    #[serde(default)]
    pub silent: bool,
}

fn default_integration_time() -> String {
    "1e-3".to_string()
}

fn deserialize_integration_time<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        List(String),
        Single(f64),
    }

    Ok(match Seconds::deserialize(deserializer)? {
        Seconds::List(list) => list,
        Seconds::Single(seconds) => seconds.to_string(),
    })
}

fn default_scans_to_average() -> u32 {
    1
}

fn default_post_scan_sleep() -> f64 {
    1.0
}

fn default_boxcar_width() -> usize {
    1
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            integration_time: default_integration_time(),
            scans_to_average: default_scans_to_average(),
            post_scan_sleep: default_post_scan_sleep(),
            boxcar_width: default_boxcar_width(),
            trigger_mode: 0,
            iterations: 0,
            calibrate: false,
            silent: false,
        }
    }
}
