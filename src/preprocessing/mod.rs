// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).
//! Spectrum preprocessing module
//!
//! This module handles preprocessing of the acquired spectra,
//! including boxcar smoothing and per-device hardware corrections.

pub mod filters;
#[cfg(test)]
mod filters_test;
pub mod quirks;

pub use filters::{BoxcarFilter, Filter};
pub use quirks::{QuirkEntry, QuirkRule, QuirkTable};
