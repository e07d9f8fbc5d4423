// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Support for early debug output over the Mini UART.
//!
//! Early in boot there is nothing but a polled UART to print to. The
//! [`debug!`](crate::debug!) and [`debug_verbose!`](crate::debug_verbose!)
//! macros format a message into a [`DebugWriter`] that wraps an initialized
//! [`MiniUart`]:
//!
//! ```ignore
//! let uart = bcm2835::get_aux().init_mini_uart(115_200, 8)?;
//! let mut writer = bcm2835::debug::DebugWriter::new(uart);
//! debug!(&mut writer, "booted in {} ms", elapsed);
//! debug_verbose!(&mut writer, "aux irq {:#x}", status);
//! ```
//!
//! Output is blocking and unbuffered. `\n` is sent as `\r\n`.

use core::fmt::{write, Arguments, Result, Write};

use crate::mini_uart::MiniUart;

pub struct DebugWriter<'a> {
    uart: MiniUart<'a>,
    count: usize,
}

impl<'a> DebugWriter<'a> {
    pub fn new(uart: MiniUart<'a>) -> DebugWriter<'a> {
        DebugWriter { uart, count: 0 }
    }

    /// Number of messages printed so far.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Write for DebugWriter<'_> {
    fn write_str(&mut self, s: &str) -> Result {
        for &byte in s.as_bytes() {
            if byte == b'\n' {
                self.uart.write_byte(b'\r');
            }
            self.uart.write_byte(byte);
        }
        Ok(())
    }
}

pub fn debug_println(writer: &mut DebugWriter, args: Arguments) {
    writer.count += 1;
    let _ = write(writer, args);
    let _ = writer.write_str("\n");
}

pub fn debug_verbose_println(
    writer: &mut DebugWriter,
    args: Arguments,
    file_line: &(&'static str, u32),
) {
    writer.count += 1;
    let count = writer.count;
    let (file, line) = *file_line;
    let _ = writer.write_fmt(format_args!("TOCK_DEBUG({}): {}:{}: ", count, file, line));
    let _ = write(writer, args);
    let _ = writer.write_str("\n");
}

/// In-kernel `println()` debugging over a [`DebugWriter`].
#[macro_export]
macro_rules! debug {
    ($w:expr $(,)?) => ({
        // Allow an empty debug!() to print a blank line
        $crate::debug::debug_println($w, format_args!(""))
    });
    ($w:expr, $msg:expr $(,)?) => ({
        $crate::debug::debug_println($w, format_args!("{}", $msg))
    });
    ($w:expr, $fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_println($w, format_args!($fmt, $($arg)+))
    });
}

/// Like `debug!`, prefixed with the message count and the call site.
#[macro_export]
macro_rules! debug_verbose {
    ($w:expr $(,)?) => ({
        // Allow an empty debug_verbose!() to print the location when hit
        $crate::debug_verbose!($w, "")
    });
    ($w:expr, $msg:expr $(,)?) => ({
        $crate::debug::debug_verbose_println($w, format_args!("{}", $msg), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
    ($w:expr, $fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_verbose_println($w, format_args!($fmt, $($arg)+), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
}
