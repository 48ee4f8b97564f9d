// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use super::filters::{BoxcarFilter, Filter};

#[cfg(test)]
mod tests {
    use super::*;

    // Mean of the 2r+1 original samples centred on `i`
    fn window_mean(samples: &[f64], i: usize, r: usize) -> f64 {
        samples[i - r..=i + r].iter().sum::<f64>() / (2 * r + 1) as f64
    }

    #[test]
    fn test_boxcar_interior_uses_original_samples() {
        let original: Vec<f64> = (0..20).map(|i| ((i * 7) % 11) as f64 * 1.5).collect();

        for r in 1..5 {
            let mut smoothed = original.clone();
            assert!(BoxcarFilter::new(r).apply(&mut smoothed));
            assert_eq!(smoothed.len(), original.len());

            for i in r..(original.len() - r) {
                assert_eq!(
                    smoothed[i],
                    window_mean(&original, i, r),
                    "radius {} pixel {}",
                    r,
                    i
                );
            }
        }
    }

    #[test]
    fn test_boxcar_end_plateaus() {
        let original = vec![1.0, 3.0, 5.0, 7.0, 9.0, 11.0, 13.0, 15.0];
        let mut smoothed = original.clone();
        assert!(BoxcarFilter::new(2).apply(&mut smoothed));

        // Flat plateau of the first two samples, not a shrinking window
        assert_eq!(smoothed[0], 2.0);
        assert_eq!(smoothed[1], 2.0);
        // Flat plateau of the last two samples
        assert_eq!(smoothed[6], 14.0);
        assert_eq!(smoothed[7], 14.0);
        // Interior: mean of five
        assert_eq!(smoothed[2], 5.0);
        assert_eq!(smoothed[5], 11.0);
    }

    #[test]
    fn test_boxcar_radius_zero_is_not_applicable() {
        let original = vec![4.0, 1.0, 8.0];
        let mut spectrum = original.clone();
        assert!(!BoxcarFilter::new(0).apply(&mut spectrum));
        assert_eq!(spectrum, original);
    }

    #[test]
    fn test_boxcar_empty_input_is_not_applicable() {
        let mut spectrum: Vec<f64> = Vec::new();
        assert!(!BoxcarFilter::new(3).apply(&mut spectrum));
        assert!(spectrum.is_empty());
    }

    #[test]
    fn test_boxcar_constant_spectrum_is_unchanged() {
        let mut spectrum = vec![2.5; 16];
        assert!(BoxcarFilter::new(3).apply(&mut spectrum));
        assert!(spectrum.iter().all(|&v| v == 2.5));
    }

    #[test]
    fn test_boxcar_short_input_keeps_length() {
        // n < 2r: plateaus overlap, only the length is guaranteed
        let mut spectrum = vec![1.0, 2.0, 3.0];
        assert!(BoxcarFilter::new(2).apply(&mut spectrum));
        assert_eq!(spectrum.len(), 3);
    }
}
