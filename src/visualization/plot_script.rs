// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! External plotting program
//!
//! Run once at the end of an acquisition as
//! `<command...> <path> <identifier> <timestamp>`, so it can pick up the data
//! files of the last iteration.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use log::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotScript {
    program: String,
    arguments: Vec<String>,
}

impl PlotScript {
    /// `None` when `command` is empty.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, arguments) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            arguments: arguments.to_vec(),
        })
    }

    /// Run the program and wait for it.
    ///
    /// Fails when it cannot be started or exits unsuccessfully.
    pub fn run(&self, path: &Path, identifier: &str, timestamp: &str) -> Result<()> {
        info!("Plotting with {}", self.program);
        let status = Command::new(&self.program)
            .args(&self.arguments)
            .arg(path)
            .arg(identifier)
            .arg(timestamp)
            .status()
            .with_context(|| format!("Failed to start plot program '{}'", self.program))?;

        debug!("Plot program exited with {}", status);
        if !status.success() {
            anyhow::bail!("Plot program '{}' failed: {}", self.program, status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_command_disables_plotting() {
        assert_eq!(PlotScript::from_command(&[]), None);
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let script = PlotScript::from_command(&command(&["./no-such-plot-program"]));
        let result = script.map(|s| s.run(Path::new("./"), "default", "2025-01-01T00.00.00"));
        assert!(matches!(result, Some(Err(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_arguments_are_appended() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("args.txt");
        let script = format!("echo \"$@\" > {}", out.display());
        let plot = PlotScript::from_command(&command(&["sh", "-c", &script, "plot"]))
            .context("command is not empty")?;

        plot.run(Path::new("/data"), "flowcell", "2025-01-01T00.00.00")?;

        let written = std::fs::read_to_string(&out)?;
        assert_eq!(written.trim_end(), "/data flowcell 2025-01-01T00.00.00");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_is_an_error() {
        let plot = PlotScript::from_command(&command(&["false"]));
        assert!(plot.map(|p| p.run(Path::new("."), "id", "ts").is_err()) == Some(true));
    }
}
