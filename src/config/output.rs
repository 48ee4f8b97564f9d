// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where and under which name the data files are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving every `.data` file. Default is `./`.
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Run identifier, used as the prefix of every file name. Default is `default`.
    #[serde(default = "default_identifier")]
    pub identifier: String,
}

fn default_path() -> PathBuf {
    PathBuf::from("./")
}

fn default_identifier() -> String {
    "default".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            identifier: default_identifier(),
        }
    }
}
