// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Ocean Optics spectrometers through the SeaBreeze wrapper API
//!
//! Requires `libseabreeze` at link time. Every wrapper call reports its status
//! through an `int *error_code` out-parameter; zero means success.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_ulong};

use super::{checked_length, SpectrometerDriver};
use crate::error::DriverError;

const STRING_BUFFER_LENGTH: usize = 256;

#[link(name = "seabreeze")]
extern "C" {
    fn seabreeze_open_spectrometer(index: c_int, error_code: *mut c_int) -> c_int;
    fn seabreeze_close_spectrometer(index: c_int, error_code: *mut c_int) -> c_int;
    fn seabreeze_get_error_string(
        error_code: c_int,
        buffer: *mut c_char,
        buffer_length: c_int,
    ) -> c_int;
    fn seabreeze_get_model(
        index: c_int,
        error_code: *mut c_int,
        buffer: *mut c_char,
        buffer_length: c_int,
    ) -> c_int;
    fn seabreeze_get_serial_number(
        index: c_int,
        error_code: *mut c_int,
        buffer: *mut c_char,
        buffer_length: c_int,
    ) -> c_int;
    fn seabreeze_set_trigger_mode(index: c_int, error_code: *mut c_int, mode: c_int);
    fn seabreeze_set_integration_time_microsec(
        index: c_int,
        error_code: *mut c_int,
        integration_time_micros: c_ulong,
    );
    fn seabreeze_get_formatted_spectrum_length(index: c_int, error_code: *mut c_int) -> c_int;
    fn seabreeze_get_formatted_spectrum(
        index: c_int,
        error_code: *mut c_int,
        buffer: *mut f64,
        buffer_length: c_int,
    ) -> c_int;
    fn seabreeze_get_wavelengths(
        index: c_int,
        error_code: *mut c_int,
        wavelengths: *mut f64,
        length: c_int,
    ) -> c_int;
}

/// Driver backed by the SeaBreeze shared library.
#[derive(Debug, Default)]
pub struct SeaBreezeDriver;

impl SeaBreezeDriver {
    pub fn new() -> Self {
        Self
    }

    fn check(&self, error_code: c_int) -> Result<(), DriverError> {
        if error_code == 0 {
            Ok(())
        } else {
            Err(DriverError::new(error_code, self.describe_error(error_code)))
        }
    }

    fn read_string(
        &self,
        index: usize,
        getter: unsafe extern "C" fn(c_int, *mut c_int, *mut c_char, c_int) -> c_int,
    ) -> Result<String, DriverError> {
        let mut buffer = [0 as c_char; STRING_BUFFER_LENGTH];
        let mut error_code: c_int = 0;
        // SAFETY: the buffer outlives the call and its length is passed along
        unsafe {
            getter(
                index as c_int,
                &mut error_code,
                buffer.as_mut_ptr(),
                STRING_BUFFER_LENGTH as c_int,
            );
        }
        self.check(error_code)?;
        buffer[STRING_BUFFER_LENGTH - 1] = 0;
        // SAFETY: NUL terminated above
        let text = unsafe { CStr::from_ptr(buffer.as_ptr()) };
        Ok(text.to_string_lossy().into_owned())
    }

    fn read_doubles(
        &self,
        index: usize,
        count: usize,
        getter: unsafe extern "C" fn(c_int, *mut c_int, *mut f64, c_int) -> c_int,
    ) -> Result<Vec<f64>, DriverError> {
        let mut values = vec![0.0; count];
        let mut error_code: c_int = 0;
        // SAFETY: `values` holds exactly `count` doubles
        unsafe {
            getter(
                index as c_int,
                &mut error_code,
                values.as_mut_ptr(),
                count as c_int,
            );
        }
        self.check(error_code)?;
        Ok(values)
    }
}

impl SpectrometerDriver for SeaBreezeDriver {
    fn open(&mut self, index: usize) -> Result<(), DriverError> {
        let mut error_code: c_int = 0;
        // SAFETY: plain value arguments and a valid out-pointer
        unsafe { seabreeze_open_spectrometer(index as c_int, &mut error_code) };
        self.check(error_code)
    }

    fn close(&mut self, index: usize) -> Result<(), DriverError> {
        let mut error_code: c_int = 0;
        // SAFETY: plain value arguments and a valid out-pointer
        unsafe { seabreeze_close_spectrometer(index as c_int, &mut error_code) };
        self.check(error_code)
    }

    fn pixel_count(&mut self, index: usize) -> Result<usize, DriverError> {
        let mut error_code: c_int = 0;
        // SAFETY: plain value arguments and a valid out-pointer
        let length =
            unsafe { seabreeze_get_formatted_spectrum_length(index as c_int, &mut error_code) };
        self.check(error_code)?;
        checked_length(length)
    }

    fn wavelengths(&mut self, index: usize, count: usize) -> Result<Vec<f64>, DriverError> {
        self.read_doubles(index, count, seabreeze_get_wavelengths)
    }

    fn intensities(&mut self, index: usize, count: usize) -> Result<Vec<f64>, DriverError> {
        self.read_doubles(index, count, seabreeze_get_formatted_spectrum)
    }

    fn set_integration_time_micros(
        &mut self,
        index: usize,
        micros: u64,
    ) -> Result<(), DriverError> {
        let mut error_code: c_int = 0;
        // SAFETY: plain value arguments and a valid out-pointer
        unsafe {
            seabreeze_set_integration_time_microsec(
                index as c_int,
                &mut error_code,
                micros as c_ulong,
            )
        };
        self.check(error_code)
    }

    fn set_trigger_mode(&mut self, index: usize, mode: i32) -> Result<(), DriverError> {
        let mut error_code: c_int = 0;
        // SAFETY: plain value arguments and a valid out-pointer
        unsafe { seabreeze_set_trigger_mode(index as c_int, &mut error_code, mode as c_int) };
        self.check(error_code)
    }

    fn model(&mut self, index: usize) -> Result<String, DriverError> {
        self.read_string(index, seabreeze_get_model)
    }

    fn serial_number(&mut self, index: usize) -> Result<String, DriverError> {
        self.read_string(index, seabreeze_get_serial_number)
    }

    fn describe_error(&self, code: i32) -> String {
        let mut buffer = [0 as c_char; STRING_BUFFER_LENGTH];
        // SAFETY: the buffer outlives the call and its length is passed along
        unsafe {
            seabreeze_get_error_string(
                code as c_int,
                buffer.as_mut_ptr(),
                STRING_BUFFER_LENGTH as c_int,
            )
        };
        buffer[STRING_BUFFER_LENGTH - 1] = 0;
        // SAFETY: NUL terminated above
        unsafe { CStr::from_ptr(buffer.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }
}
