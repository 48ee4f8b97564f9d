// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Digital filters for spectrum preprocessing

/// Trait for implementing in-place spectrum filters
pub trait Filter: Send + Sync {
    /// Apply the filter to a spectrum in place.
    ///
    /// Returns `false` when the filter is not applicable to the input, in which
    /// case the spectrum is left untouched.
    fn apply(&self, spectrum: &mut [f64]) -> bool;
}

/// A boxcar (moving average) filter along the wavelength axis.
///
/// Interior pixels are replaced by the mean of the `2 * radius + 1` original
/// samples centred on them. The first and last `radius` pixels are replaced by
/// a flat plateau: the mean of the first (respectively last) `radius` original
/// samples.
///
/// A radius of zero disables smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxcarFilter {
    radius: usize,
}

impl BoxcarFilter {
    /// Create a new boxcar filter averaging `radius` neighbours on each side
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }
}

impl Filter for BoxcarFilter {
    fn apply(&self, spectrum: &mut [f64]) -> bool {
        let r = self.radius;
        let n = spectrum.len();
        if n == 0 || r == 0 {
            return false;
        }

        // Every window reads the unfiltered input
        let original = spectrum.to_vec();
        let width = (2 * r + 1) as f64;

        if n > 2 * r {
            for i in r..(n - r) {
                spectrum[i] = original[i - r..=i + r].iter().sum::<f64>() / width;
            }
        }

        // When n < 2r the two plateaus overlap and the right one wins
        let left = r.min(n);
        let left_mean = original[..left].iter().sum::<f64>() / r as f64;
        spectrum[..left].fill(left_mean);

        let right = n.saturating_sub(r);
        let right_mean = original[right..].iter().sum::<f64>() / r as f64;
        spectrum[right..].fill(right_mean);

        true
    }
}
