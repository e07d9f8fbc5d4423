// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! RAM-backed stand-in for the AUX register block used by host tests.
//!
//! Plain memory keeps whatever was written last, so side effects of the real
//! hardware (FIFOs, clear-on-read, write-one-to-clear) are not modelled. Tests
//! seed status registers with `poke` and inspect the outcome with `peek`.

use core::cell::UnsafeCell;
use core::mem::size_of;

use crate::aux::{Aux, AuxRegisters};
use crate::mini_uart::MiniUart;
use crate::spi::Spi;
use crate::static_ref::StaticRef;

pub(crate) const AUX_BLOCK_WORDS: usize = 0xD4 / 4;

#[repr(C, align(4))]
pub(crate) struct FakeAux {
    words: UnsafeCell<[u32; AUX_BLOCK_WORDS]>,
}

impl FakeAux {
    /// Leak a zeroed block so register handles can be `'static` like the
    /// hardware they stand in for.
    pub(crate) fn new() -> &'static FakeAux {
        assert_eq!(size_of::<AuxRegisters>(), AUX_BLOCK_WORDS * 4);
        Box::leak(Box::new(FakeAux {
            words: UnsafeCell::new([0; AUX_BLOCK_WORDS]),
        }))
    }

    pub(crate) fn registers(&'static self) -> StaticRef<AuxRegisters> {
        // SAFETY: the block is leaked, 4-byte aligned, and exactly the size of
        // `AuxRegisters`, whose fields are all `u32` cells.
        unsafe { StaticRef::new(self.words.get().cast::<AuxRegisters>()) }
    }

    pub(crate) fn aux(&'static self) -> Aux {
        Aux::new(self.registers())
    }

    pub(crate) fn mini_uart(&'static self) -> MiniUart<'static> {
        let registers: &'static AuxRegisters = self.registers_ref();
        MiniUart::new(&registers.mini_uart)
    }

    pub(crate) fn spi0(&'static self) -> Spi<'static> {
        Spi::new(&self.registers_ref().spi0)
    }

    pub(crate) fn spi1(&'static self) -> Spi<'static> {
        Spi::new(&self.registers_ref().spi1)
    }

    fn registers_ref(&'static self) -> &'static AuxRegisters {
        // SAFETY: see `registers`.
        unsafe { &*self.words.get().cast::<AuxRegisters>() }
    }

    /// Read the word at byte `offset` from the start of the AUX block.
    pub(crate) fn peek(&self, offset: usize) -> u32 {
        let index = Self::index(offset);
        // SAFETY: `index` is in bounds and the word is only ever accessed
        // through volatile cells.
        unsafe { self.words.get().cast::<u32>().add(index).read_volatile() }
    }

    /// Overwrite the word at byte `offset`, standing in for the hardware
    /// updating a status register.
    pub(crate) fn poke(&self, offset: usize, value: u32) {
        let index = Self::index(offset);
        // SAFETY: see `peek`.
        unsafe {
            self.words
                .get()
                .cast::<u32>()
                .add(index)
                .write_volatile(value)
        }
    }

    fn index(offset: usize) -> usize {
        assert_eq!(offset % 4, 0, "unaligned register offset {:#x}", offset);
        assert!(offset / 4 < AUX_BLOCK_WORDS, "offset {:#x} outside AUX", offset);
        offset / 4
    }
}
