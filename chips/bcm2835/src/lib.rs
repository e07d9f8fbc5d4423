// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Register interface for the BCM2835 auxiliary peripherals.
//!
//! The AUX block of the Raspberry Pi SoCs holds a Mini UART and two SPI
//! masters. This crate describes its register map with `tock-registers` and
//! wraps each register in a small accessor. Select the SoC with one of the
//! `bcm2836`, `bcm2837` or `bcm2711` features; the default is BCM2835.

#![cfg_attr(not(test), no_std)]
#![crate_name = "bcm2835"]
#![crate_type = "rlib"]

pub mod aux;
pub mod config;
pub mod debug;
pub mod errorcode;
pub mod mini_uart;
pub mod spi;
pub mod static_ref;

#[cfg(test)]
mod testing;

pub use crate::aux::{get_aux, Aux, AuxDevice, AUX_BASE};
pub use crate::errorcode::ErrorCode;
pub use crate::mini_uart::{DataSize, InterruptSource, MiniUart, Parameters};
pub use crate::spi::{ClockPolarity, DoutHold, Spi};
pub use crate::static_ref::StaticRef;
