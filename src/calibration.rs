// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Operator confirmation during calibration
//!
//! The calibration waits three times for the operator: before the reference
//! capture, before the background capture, and once more before the
//! acquisition loop so the cell can be filled. Each wait goes through an
//! [`OperatorPrompt`]; [`StdinPrompt`] blocks on the terminal while
//! [`ScriptedPrompt`] answers immediately and records what was asked.

use std::fmt;
use std::io::{self, BufRead, Write};

use crate::error::{AcquisitionError, AcquisitionResult};

/// A point where the calibration waits for the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStep {
    Reference,
    Background,
    FillCell,
}

impl CalibrationStep {
    /// The steps in the order they occur.
    pub const ALL: [CalibrationStep; 3] = [Self::Reference, Self::Background, Self::FillCell];

    /// What the operator has to do before confirming.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Reference => {
                "Reference: insert the empty cell, switch the light source on and press <Enter>"
            }
            Self::Background => "Background: switch the light source off and press <Enter>",
            Self::FillCell => {
                "Fill the cell with the sample, switch the light source on and press <Enter>"
            }
        }
    }
}

impl fmt::Display for CalibrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Background => write!(f, "background"),
            Self::FillCell => write!(f, "fill cell"),
        }
    }
}

/// Source of operator confirmations.
pub trait OperatorPrompt {
    /// Block until the operator confirms `step`.
    fn confirm(&mut self, step: CalibrationStep) -> AcquisitionResult<()>;
}

/// Prints the instruction and waits for a line on the input, stdin by default.
///
/// There is no timeout; end of input is reported as an error.
pub struct StdinPrompt<R = io::StdinLock<'static>, W = io::Stdout> {
    input: R,
    output: W,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self {
            input: io::stdin().lock(),
            output: io::stdout(),
        }
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead, W: Write> StdinPrompt<R, W> {
    pub fn with_io(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> OperatorPrompt for StdinPrompt<R, W> {
    fn confirm(&mut self, step: CalibrationStep) -> AcquisitionResult<()> {
        writeln!(self.output, "{}", step.instruction()).map_err(AcquisitionError::Confirmation)?;
        self.output.flush().map_err(AcquisitionError::Confirmation)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(AcquisitionError::Confirmation)?;
        if read == 0 {
            return Err(AcquisitionError::Confirmation(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("input closed while waiting for the {} step", step),
            )));
        }
        Ok(())
    }
}

/// Confirms every step at once and keeps the list of confirmed steps.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    confirmed: Vec<CalibrationStep>,
    refuse: Option<CalibrationStep>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail instead of confirming when `step` is reached.
    pub fn refusing(step: CalibrationStep) -> Self {
        Self {
            confirmed: Vec::new(),
            refuse: Some(step),
        }
    }

    pub fn confirmed(&self) -> &[CalibrationStep] {
        &self.confirmed
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn confirm(&mut self, step: CalibrationStep) -> AcquisitionResult<()> {
        if self.refuse == Some(step) {
            return Err(AcquisitionError::Confirmation(io::Error::new(
                io::ErrorKind::Interrupted,
                format!("{} step refused", step),
            )));
        }
        self.confirmed.push(step);
        Ok(())
    }
}
