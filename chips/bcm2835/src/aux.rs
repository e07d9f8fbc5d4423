// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Auxiliary peripheral block.
//!
//! The AUX block groups the Mini UART and two SPI masters behind a shared
//! interrupt status register and a shared enable register. A sub-block only
//! responds while its enable bit is set, so [`Aux`] hands out accessor
//! handles for enabled sub-blocks only.

use tock_registers::fields::Field;
use tock_registers::interfaces::{ReadWriteable, Readable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

use crate::config::CONFIG;
use crate::errorcode::ErrorCode;
use crate::mini_uart::{MiniUart, MiniUartRegisters, Parameters};
use crate::spi::{Spi, SpiRegisters};
use crate::static_ref::StaticRef;

register_structs! {
    pub AuxRegisters {
        /// AUXIRQ: pending interrupt per sub-block
        (0x00 => irq: ReadOnly<u32, AUX_DEVICES::Register>),
        /// AUXENB: sub-block enables
        (0x04 => enables: ReadWrite<u32, AUX_DEVICES::Register>),
        (0x08 => _reserved0),
        (0x40 => pub(crate) mini_uart: MiniUartRegisters),
        (0x6C => _reserved1),
        /// SPI 1 in the datasheet
        (0x80 => pub(crate) spi0: SpiRegisters),
        (0x94 => _reserved2),
        /// SPI 2 in the datasheet
        (0xC0 => pub(crate) spi1: SpiRegisters),
        (0xD4 => @END),
    }
}

register_bitfields![u32,
    AUX_DEVICES [
        MINI_UART OFFSET(0) NUMBITS(1) [],
        SPI0 OFFSET(1) NUMBITS(1) [],
        SPI1 OFFSET(2) NUMBITS(1) []
    ]
];

/// Offset of the AUX block inside the peripheral window.
pub const AUX_OFFSET: usize = 0x21_5000;

// SAFETY: the AUX block is always mapped at this address on the selected SoC.
pub const AUX_BASE: StaticRef<AuxRegisters> =
    unsafe { StaticRef::new((CONFIG.peripheral_base + AUX_OFFSET) as *const AuxRegisters) };

/// Handle on the AUX block of the selected SoC.
pub fn get_aux() -> Aux {
    Aux::new(AUX_BASE)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuxDevice {
    MiniUart,
    Spi0,
    Spi1,
}

impl AuxDevice {
    fn field(self) -> Field<u32, AUX_DEVICES::Register> {
        match self {
            AuxDevice::MiniUart => AUX_DEVICES::MINI_UART,
            AuxDevice::Spi0 => AUX_DEVICES::SPI0,
            AuxDevice::Spi1 => AUX_DEVICES::SPI1,
        }
    }
}

#[derive(Clone, Copy)]
pub struct Aux {
    registers: StaticRef<AuxRegisters>,
}

impl Aux {
    pub const fn new(registers: StaticRef<AuxRegisters>) -> Aux {
        Aux { registers }
    }

    /// Set the enable bit of `device`, leaving the others alone.
    pub fn enable(&self, device: AuxDevice) {
        self.registers.enables.modify(device.field().val(1));
    }

    /// Clear the enable bit of `device`. Its registers stop responding.
    pub fn disable(&self, device: AuxDevice) {
        self.registers.enables.modify(device.field().val(0));
    }

    pub fn is_enabled(&self, device: AuxDevice) -> bool {
        self.registers.enables.is_set(device.field())
    }

    pub fn is_irq_pending(&self, device: AuxDevice) -> bool {
        self.registers.irq.is_set(device.field())
    }

    pub fn mini_uart(&self) -> Result<MiniUart<'_>, ErrorCode> {
        if !self.is_enabled(AuxDevice::MiniUart) {
            return Err(ErrorCode::OFF);
        }
        Ok(MiniUart::new(&self.registers.mini_uart))
    }

    pub fn spi0(&self) -> Result<Spi<'_>, ErrorCode> {
        if !self.is_enabled(AuxDevice::Spi0) {
            return Err(ErrorCode::OFF);
        }
        Ok(Spi::new(&self.registers.spi0))
    }

    pub fn spi1(&self) -> Result<Spi<'_>, ErrorCode> {
        if !self.is_enabled(AuxDevice::Spi1) {
            return Err(ErrorCode::OFF);
        }
        Ok(Spi::new(&self.registers.spi1))
    }

    /// Enable the Mini UART and bring it up at `baud` with `bits` data bits,
    /// transmitter and receiver on, interrupts and flow control off.
    ///
    /// Arguments are validated before any register is written.
    pub fn init_mini_uart(&self, baud: u32, bits: u8) -> Result<MiniUart<'_>, ErrorCode> {
        let params = Parameters::new(baud, bits)?;
        self.enable(AuxDevice::MiniUart);
        let uart = self.mini_uart()?;
        uart.configure(&params);
        Ok(uart)
    }
}
