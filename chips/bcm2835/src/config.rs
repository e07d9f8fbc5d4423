// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Data structure for storing compile-time configuration options.
//!
//! The Raspberry Pi SoCs share the AUX block but place the peripheral window
//! at different physical addresses and clock the block from different core
//! frequencies. Those two values are collected in a typed `const` object so
//! every code path stays type-checked regardless of which SoC is selected, and
//! the compiler folds the constants away.

/// Data structure holding compile-time configuration options.
pub(crate) struct Config {
    /// Physical address of the ARM peripheral window.
    ///
    /// The AUX block sits at a fixed offset from this address.
    pub(crate) peripheral_base: usize,

    /// Frequency of the core (VPU) clock feeding the AUX block, in Hz.
    ///
    /// Both the Mini UART baud divisor and the SPI speed field are relative
    /// to this clock.
    pub(crate) system_clock_hz: u32,
}

/// A unique instance of `Config` where compile-time configuration options are
/// defined. This is the only location in the crate where `cfg!(feature = ..)`
/// is consulted.
pub(crate) const CONFIG: Config = Config {
    peripheral_base: if cfg!(feature = "bcm2711") {
        0xFE00_0000
    } else if cfg!(any(feature = "bcm2836", feature = "bcm2837")) {
        0x3F00_0000
    } else {
        0x2000_0000
    },
    system_clock_hz: if cfg!(feature = "bcm2711") {
        500_000_000
    } else {
        250_000_000
    },
};

/// Physical address of the peripheral window for the selected SoC.
pub const fn peripheral_base() -> usize {
    CONFIG.peripheral_base
}

/// Core clock frequency feeding the AUX block, in Hz.
pub const fn system_clock_hz() -> u32 {
    CONFIG.system_clock_hz
}
