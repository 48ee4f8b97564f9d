// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Data files
//!
//! Every spectrum is written as a headerless two-column `x,y` text file, one
//! line per pixel. [`ArtifactNames`] builds the file names from the output
//! directory, the run identifier, the iteration timestamp and the device index.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::debug;

use crate::channel::BaselineKind;
use crate::error::{AcquisitionError, AcquisitionResult};

/// Format of the iteration timestamp embedded in file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H.%M.%S";

/// Timestamp label of an acquisition iteration.
pub fn timestamp_label(time: &DateTime<Local>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Write `x` and `y` as `x,y` lines to `path`, replacing any existing file.
pub fn write_two_column(path: &Path, x: &[f64], y: &[f64]) -> AcquisitionResult<()> {
    let persist_error = |source: io::Error| AcquisitionError::Persist {
        path: path.to_path_buf(),
        source,
    };

    if x.len() != y.len() {
        return Err(persist_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} x values for {} y values", x.len(), y.len()),
        )));
    }

    let file = File::create(path).map_err(persist_error)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);
    for (x, y) in x.iter().zip(y) {
        writer
            .write_record([x.to_string(), y.to_string()])
            .map_err(|e| persist_error(e.into()))?;
    }
    writer.flush().map_err(persist_error)?;

    debug!("Wrote {} points to {}", x.len(), path.display());
    Ok(())
}

/// File names of the data written during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    directory: PathBuf,
    identifier: String,
}

impl ArtifactNames {
    pub fn new(directory: impl Into<PathBuf>, identifier: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            identifier: identifier.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// `{identifier}_{kind}_spectrum_device{index}.data`
    pub fn baseline(&self, kind: BaselineKind, index: usize) -> PathBuf {
        self.directory.join(format!(
            "{}_{}_spectrum_device{}.data",
            self.identifier, kind, index
        ))
    }

    /// `{identifier}_{timestamp}_spectrum_device{index}.data`
    pub fn spectrum(&self, timestamp: &str, index: usize) -> PathBuf {
        self.directory.join(format!(
            "{}_{}_spectrum_device{}.data",
            self.identifier, timestamp, index
        ))
    }

    /// `{identifier}_{timestamp}_transmission_device{index}.data`
    pub fn transmission(&self, timestamp: &str, index: usize) -> PathBuf {
        self.directory.join(format!(
            "{}_{}_transmission_device{}.data",
            self.identifier, timestamp, index
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_write_two_column() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("spectrum.data");

        write_two_column(&path, &[400.0, 400.5, 401.0], &[1.0, 0.25, -3.0])?;

        let contents = std::fs::read_to_string(&path)?;
        assert_eq!(contents, "400,1\n400.5,0.25\n401,-3\n");
        Ok(())
    }

    #[test]
    fn test_write_two_column_errors() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        let err = write_two_column(&dir.path().join("a.data"), &[1.0, 2.0], &[1.0]);
        assert!(matches!(err, Err(AcquisitionError::Persist { .. })));

        let missing = dir.path().join("missing").join("a.data");
        let err = write_two_column(&missing, &[1.0], &[1.0]);
        match err {
            Err(AcquisitionError::Persist { path, .. }) => assert_eq!(path, missing),
            other => panic!("unexpected result: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_artifact_names() {
        let names = ArtifactNames::new("/data/run", "flowcell");
        assert_eq!(
            names.baseline(BaselineKind::Reference, 0),
            PathBuf::from("/data/run/flowcell_reference_spectrum_device0.data")
        );
        assert_eq!(
            names.baseline(BaselineKind::Background, 2),
            PathBuf::from("/data/run/flowcell_background_spectrum_device2.data")
        );
        assert_eq!(
            names.spectrum("2025-03-01T14.05.09", 1),
            PathBuf::from("/data/run/flowcell_2025-03-01T14.05.09_spectrum_device1.data")
        );
        assert_eq!(
            names.transmission("2025-03-01T14.05.09", 1),
            PathBuf::from("/data/run/flowcell_2025-03-01T14.05.09_transmission_device1.data")
        );
    }

    #[test]
    fn test_timestamp_label() {
        let time = Local
            .with_ymd_and_hms(2025, 3, 1, 14, 5, 9)
            .single()
            .expect("unambiguous local time");
        assert_eq!(timestamp_label(&time), "2025-03-01T14.05.09");
    }
}
