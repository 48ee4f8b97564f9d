// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Per-device hardware corrections
//!
//! Some individual spectrometers have known defects. A [`QuirkTable`] maps a
//! device serial number to the [`QuirkRule`] that fixes it. The table is built
//! once at startup ([`QuirkTable::builtin`], optionally extended from the
//! configuration) and handed by reference to every channel.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

/// A correction for one known hardware defect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuirkRule {
    /// The device reports a longer buffer than it fills; only the first
    /// `pixels` values are valid.
    PixelCountOverride { pixels: usize },

    /// The pixels before `reference_index` are unreliable. Each of them is
    /// replaced by the value at `reference_index` when it lies outside
    /// `[lower_factor, upper_factor] * reference`.
    PointRepair {
        reference_index: usize,
        lower_factor: f64,
        upper_factor: f64,
    },
}

/// A serial-number keyed rule, as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuirkEntry {
    pub serial_number: String,
    pub rule: QuirkRule,
}

/// Immutable lookup of quirk rules by serial number.
#[derive(Debug, Clone, Default)]
pub struct QuirkTable {
    rules: HashMap<String, QuirkRule>,
}

impl QuirkTable {
    /// An empty table: no device gets corrected.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The corrections known for deployed devices.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        // Reports 2048 pixels but only the first 128 carry data
        table.insert("FLMN01736", QuirkRule::PixelCountOverride { pixels: 128 });
        // Pixels 0 and 1 are frequently garbage
        table.insert(
            "FLMS03141",
            QuirkRule::PointRepair {
                reference_index: 2,
                lower_factor: 0.5,
                upper_factor: 2.0,
            },
        );
        table
    }

    /// Add or replace the rule for `serial_number`.
    pub fn insert(&mut self, serial_number: impl Into<String>, rule: QuirkRule) {
        self.rules.insert(serial_number.into(), rule);
    }

    /// Add configured entries on top of the current rules.
    pub fn extend<'a>(&mut self, entries: impl IntoIterator<Item = &'a QuirkEntry>) {
        for entry in entries {
            self.insert(entry.serial_number.clone(), entry.rule.clone());
        }
    }

    pub fn rule_for(&self, serial_number: &str) -> Option<&QuirkRule> {
        self.rules.get(serial_number)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Pixel count to use for a device that reported `reported` pixels.
    pub fn pixel_count(&self, serial_number: &str, reported: usize) -> usize {
        match self.rule_for(serial_number) {
            Some(QuirkRule::PixelCountOverride { pixels }) => {
                debug!(
                    "Individual correction for device '{}': pixel count {} -> {}",
                    serial_number, reported, pixels
                );
                *pixels
            }
            _ => reported,
        }
    }

    /// Repair a freshly read raw scan in place.
    ///
    /// Returns the number of pixels that were replaced.
    pub fn repair(&self, serial_number: &str, scan: &mut [f64]) -> usize {
        let Some(QuirkRule::PointRepair {
            reference_index,
            lower_factor,
            upper_factor,
        }) = self.rule_for(serial_number)
        else {
            return 0;
        };
        let Some(&reference) = scan.get(*reference_index) else {
            return 0;
        };

        let mut repaired = 0;
        for value in &mut scan[..*reference_index] {
            if *value < lower_factor * reference || *value > upper_factor * reference {
                *value = reference;
                repaired += 1;
            }
        }
        if repaired > 0 {
            debug!(
                "Individual correction for device '{}': {} pixel(s) repaired",
                serial_number, repaired
            );
        }
        repaired
    }
}
