// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Standard error enum for peripheral operations.

use core::fmt;

/// Errors reported by the AUX peripheral drivers.
///
/// Only precondition violations are reported this way. Conditions the
/// hardware itself keeps silent about (overruns, a full transmit FIFO, reads
/// from an empty receive FIFO) are exposed as status bits instead.
///
/// The discriminants match the Tock kernel `ErrorCode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition. No accessor in this crate returns it; it
    /// keeps the kernel numbering for callers forwarding codes upward.
    FAIL = 1,
    /// The component is powered down
    OFF = 4,
    /// An invalid parameter was passed
    INVAL = 6,
    /// Parameter passed was too large
    SIZE = 7,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            ErrorCode::FAIL => "generic failure",
            ErrorCode::OFF => "peripheral is disabled",
            ErrorCode::INVAL => "invalid parameter",
            ErrorCode::SIZE => "parameter out of range",
        };
        write!(f, "{} ({})", description, usize::from(*self))
    }
}
