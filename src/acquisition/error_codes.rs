// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-spectrometer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Driver status codes, numbered as in the SeaBreeze wrapper API

pub const SUCCESS: i32 = 0;
pub const INVALID_ERROR: i32 = 1;
pub const NO_DEVICE: i32 = 2;
pub const FAILED_TO_CLOSE: i32 = 3;
pub const NOT_IMPLEMENTED: i32 = 4;
pub const FEATURE_NOT_FOUND: i32 = 5;
pub const TRANSFER_ERROR: i32 = 6;
pub const BAD_USER_BUFFER: i32 = 7;
pub const INPUT_OUT_OF_BOUNDS: i32 = 8;
pub const SPECTROMETER_SATURATED: i32 = 9;
pub const VALUE_NOT_FOUND: i32 = 10;

/// Text for a status code
pub fn describe(code: i32) -> &'static str {
    match code {
        SUCCESS => "Success",
        INVALID_ERROR => "Error: Undefined error",
        NO_DEVICE => "Error: No device found",
        FAILED_TO_CLOSE => "Error: Could not close device",
        NOT_IMPLEMENTED => "Error: Feature not implemented",
        FEATURE_NOT_FOUND => "Error: No such feature on device",
        TRANSFER_ERROR => "Error: Data transfer error",
        BAD_USER_BUFFER => "Error: Invalid user buffer provided",
        INPUT_OUT_OF_BOUNDS => "Error: Input was out of bounds",
        SPECTROMETER_SATURATED => "Error: Spectrometer was saturated",
        VALUE_NOT_FOUND => "Error: Value not found",
        _ => "Error: Undefined error",
    }
}
