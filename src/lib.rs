// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rust Spectrometer library
//!
//! This library drives one or more spectrometers through a calibrated
//! transmission measurement campaign: averaged and smoothed spectra are
//! acquired on a fixed cadence, normalised against reference and background
//! baselines, and written to disk.

pub mod acquisition;
pub mod calibration;
pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod preprocessing;
pub mod runner;
pub mod storage;
pub mod visualization;

pub use channel::{BaselineKind, Channel, ChannelIdentity};
pub use controller::{AcquisitionController, AcquisitionSettings, RunReport};
pub use error::{AcquisitionError, AcquisitionResult, DriverError};
