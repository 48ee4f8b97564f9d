// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use serde::{Deserialize, Serialize};

/// Visualization of the captured spectra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Print a text diagram of baselines and transmission on the console.
    /// Default is `true`.
    #[serde(default = "default_text_diagram")]
    pub text_diagram: bool,

    /// External plotting program and its leading arguments.
    ///
    /// Run once when the acquisition ends with the output path, the run
    /// identifier and the last iteration timestamp appended. Empty disables it.
    #[serde(default)]
    pub command: Vec<String>,
}

fn default_text_diagram() -> bool {
    true
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            text_diagram: default_text_diagram(),
            command: Vec::new(),
        }
    }
}
