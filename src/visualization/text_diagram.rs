// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Console diagram of spectra
//!
//! Each series is drawn with its own marker on a fixed character grid.
//! Non-finite points and points outside the vertical range are skipped.

use std::io::{self, Write};

use anyhow::Result;

use super::{Series, Visualizer};

const MARKERS: [char; 5] = ['*', '+', 'o', 'x', '#'];

/// Character grid plot written to stdout, or any writer.
pub struct TextDiagram<W = io::Stdout> {
    output: W,
    width: usize,
    height: usize,
}

impl TextDiagram {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for TextDiagram {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TextDiagram<W> {
    pub fn with_output(output: W) -> Self {
        Self {
            output,
            width: 72,
            height: 18,
        }
    }

    /// Plot area size in characters, at least 2x2.
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width.max(2);
        self.height = height.max(2);
        self
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn draw(&self, series: &[Series<'_>], y_bounds: Option<(f64, f64)>) -> Option<Drawing> {
        let points = || {
            series.iter().enumerate().flat_map(|(n, s)| {
                s.x.iter()
                    .zip(s.y)
                    .filter(|(x, y)| x.is_finite() && y.is_finite())
                    .map(move |(&x, &y)| (n, x, y))
            })
        };

        let (x_min, x_max) = range(points().map(|(_, x, _)| x))?;
        let (y_min, y_max) = match y_bounds {
            Some(bounds) => bounds,
            None => range(points().map(|(_, _, y)| y))?,
        };
        let (x_min, x_max) = widen(x_min, x_max);
        let (y_min, y_max) = widen(y_min, y_max);

        let mut grid = vec![vec![' '; self.width]; self.height];
        for (n, x, y) in points() {
            if y < y_min || y > y_max {
                continue;
            }
            let column = scale(x, x_min, x_max, self.width);
            let row = self.height - 1 - scale(y, y_min, y_max, self.height);
            grid[row][column] = MARKERS[n % MARKERS.len()];
        }

        Some(Drawing {
            grid,
            x_range: (x_min, x_max),
            y_range: (y_min, y_max),
        })
    }
}

struct Drawing {
    grid: Vec<Vec<char>>,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

// A flat range would divide by zero
fn widen(min: f64, max: f64) -> (f64, f64) {
    if max > min {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    }
}

fn scale(value: f64, min: f64, max: f64, cells: usize) -> usize {
    let position = ((value - min) / (max - min) * (cells - 1) as f64).round();
    (position.max(0.0) as usize).min(cells - 1)
}

impl<W: Write> Visualizer for TextDiagram<W> {
    fn render(
        &mut self,
        label: &str,
        series: &[Series<'_>],
        y_bounds: Option<(f64, f64)>,
    ) -> Result<()> {
        writeln!(self.output, "{}", label)?;
        let Some(drawing) = self.draw(series, y_bounds) else {
            writeln!(self.output, "  (no finite data)")?;
            return Ok(());
        };

        let (y_min, y_max) = drawing.y_range;
        let last = drawing.grid.len() - 1;
        for (row, cells) in drawing.grid.iter().enumerate() {
            let axis = match row {
                0 => format!("{:>10.3}", y_max),
                r if r == last => format!("{:>10.3}", y_min),
                _ => " ".repeat(10),
            };
            let line: String = cells.iter().collect();
            writeln!(self.output, "{} |{}", axis, line.trim_end())?;
        }

        let (x_min, x_max) = drawing.x_range;
        writeln!(self.output, "{} +{}", " ".repeat(10), "-".repeat(self.width))?;
        writeln!(
            self.output,
            "{}  {:<w$.1}{:>w2$.1}",
            " ".repeat(10),
            x_min,
            x_max,
            w = self.width / 2,
            w2 = self.width - self.width / 2
        )?;
        self.output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(series: &[Series<'_>], y_bounds: Option<(f64, f64)>) -> Vec<String> {
        let mut diagram = TextDiagram::with_output(Vec::new()).with_size(5, 3);
        diagram
            .render("test", series, y_bounds)
            .expect("rendering into a buffer");
        String::from_utf8_lossy(&diagram.into_inner())
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_points_land_on_the_grid() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 0.5, 1.0, 0.5, 0.0];
        let lines = render(&[Series::new(&x, &y)], None);

        assert_eq!(lines[0], "test");
        assert_eq!(lines[1], "     1.000 |  *");
        assert_eq!(lines[2], "           | * *");
        assert_eq!(lines[3], "     0.000 |*   *");
    }

    #[test]
    fn test_bounds_clip_and_non_finite_are_skipped() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [f64::NAN, 5.0, 0.5, f64::INFINITY, 0.5];
        let lines = render(&[Series::new(&x, &y)], Some((0.0, 1.0)));

        assert_eq!(lines[1], "     1.000 |");
        assert_eq!(lines[2], "           | *  *");
        assert_eq!(lines[3], "     0.000 |");
    }

    #[test]
    fn test_empty_series() {
        let lines = render(&[Series::new(&[], &[])], None);
        assert_eq!(lines, vec!["test", "  (no finite data)"]);
    }
}
