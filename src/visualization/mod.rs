// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).
//!
//! Visualization module
//!
//! This module handles the presentation of captured spectra: a text diagram
//! printed on the console while the run progresses, and an external plotting
//! program started once the run is over.
//!
//! Visualization is best effort. Callers log a failing [`Visualizer`] and
//! carry on with the acquisition.

pub mod plot_script;
pub mod text_diagram;

use anyhow::Result;

pub use plot_script::PlotScript;
pub use text_diagram::TextDiagram;

/// One curve: `y` plotted against `x`.
#[derive(Debug, Clone, Copy)]
pub struct Series<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
}

impl<'a> Series<'a> {
    pub fn new(x: &'a [f64], y: &'a [f64]) -> Self {
        Self { x, y }
    }
}

/// Renders labelled curves.
pub trait Visualizer {
    /// Render `series` under `label`. `y_bounds` fixes the vertical range,
    /// otherwise it follows the data.
    fn render(
        &mut self,
        label: &str,
        series: &[Series<'_>],
        y_bounds: Option<(f64, f64)>,
    ) -> Result<()>;
}

/// Discards everything, used when the console output is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVisualizer;

impl Visualizer for NullVisualizer {
    fn render(&mut self, _: &str, _: &[Series<'_>], _: Option<(f64, f64)>) -> Result<()> {
        Ok(())
    }
}

impl<V: Visualizer + ?Sized> Visualizer for Box<V> {
    fn render(
        &mut self,
        label: &str,
        series: &[Series<'_>],
        y_bounds: Option<(f64, f64)>,
    ) -> Result<()> {
        (**self).render(label, series, y_bounds)
    }
}
