// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Mini UART of the BCM2835 AUX block.
//!
//! The Mini UART is a cut-down 16550: 8-entry FIFOs in each direction, 7 or
//! 8 data bits, no parity and no framing error detection. It samples with
//! 8x oversampling, so the baud rate follows
//!
//! ```text
//! baudrate = system_clock_freq / (8 * (baudrate_reg + 1))
//! ```
//!
//! With a 250 MHz core clock a divisor of zero gives 31.25 Mbaud and the
//! lowest reachable rate is 476 baud.
//!
//! [`MiniUart`] is a stateless view over the register group. Apart from
//! `configure` and the polled byte helpers, each accessor is a single load,
//! store or read-modify-write of one register. Overruns and a full transmit
//! FIFO are only visible through the status accessors.

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{Aliased, ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

use crate::config;
use crate::errorcode::ErrorCode;

register_structs! {
    /// Mini UART register group, mapped at offset 0x40 of the AUX block.
    pub MiniUartRegisters {
        /// AUX_MU_IO_REG: Tx/Rx FIFO port, LS byte of the baud divisor when
        /// DLAB is set
        (0x00 => io: ReadWrite<u32, IO::Register>),
        /// AUX_MU_IER_REG: interrupt enables, MS byte of the baud divisor
        /// when DLAB is set
        (0x04 => ier: ReadWrite<u32, IER::Register>),
        /// AUX_MU_IIR_REG: interrupt identify on read, FIFO clear on write
        (0x08 => iir: Aliased<u32, IIR::Register, IIR_FIFO::Register>),
        /// AUX_MU_LCR_REG
        (0x0C => lcr: ReadWrite<u32, LCR::Register>),
        /// AUX_MU_MCR_REG
        (0x10 => mcr: ReadWrite<u32, MCR::Register>),
        /// AUX_MU_LSR_REG: reading clears the overrun flag
        (0x14 => lsr: ReadOnly<u32, LSR::Register>),
        /// AUX_MU_MSR_REG
        (0x18 => msr: ReadOnly<u32, MSR::Register>),
        /// AUX_MU_SCRATCH
        (0x1C => scratch: ReadWrite<u32, SCRATCH::Register>),
        /// AUX_MU_CNTL_REG: extra control
        (0x20 => cntl: ReadWrite<u32, CNTL::Register>),
        /// AUX_MU_STAT_REG: extra status, non-destructive
        (0x24 => stat: ReadOnly<u32, STAT::Register>),
        /// AUX_MU_BAUD_REG: direct access to the 16-bit divisor
        (0x28 => baud: ReadWrite<u32, BAUD::Register>),
        (0x2C => @END),
    }
}

register_bitfields![u32,
    IO [
        /// Transmit data on write, receive data on read (DLAB=0). LS 8 bits
        /// of the baud divisor (DLAB=1).
        DATA OFFSET(0) NUMBITS(8) []
    ],
    IER [
        /// MS 8 bits of the baud divisor (DLAB=1)
        BAUD_MSB OFFSET(0) NUMBITS(8) [],
        /// Interrupt while the receive FIFO holds at least one byte
        RX_INTERRUPT OFFSET(1) NUMBITS(1) [],
        /// Interrupt while the transmit FIFO is empty
        TX_INTERRUPT OFFSET(0) NUMBITS(1) []
    ],
    IIR [
        /// Always read as 0b11, the FIFOs are always enabled
        FIFO_ENABLES OFFSET(6) NUMBITS(2) [],
        INTERRUPT_ID OFFSET(1) NUMBITS(2) [
            NoInterrupt = 0,
            TxEmpty = 1,
            RxReady = 2
        ],
        /// Clear whenever an interrupt is pending
        PENDING OFFSET(0) NUMBITS(1) []
    ],
    IIR_FIFO [
        CLEAR_TX OFFSET(2) NUMBITS(1) [],
        CLEAR_RX OFFSET(1) NUMBITS(1) []
    ],
    LCR [
        /// Divisor latch access: io and ier expose the baud divisor
        DLAB OFFSET(7) NUMBITS(1) [],
        /// Pull Tx low continuously
        BREAK OFFSET(6) NUMBITS(1) [],
        DATA_SIZE OFFSET(0) NUMBITS(1) [
            SevenBit = 0,
            EightBit = 1
        ]
    ],
    MCR [
        /// Set drives UART1_RTS low. Ignored under RTS auto-flow.
        RTS OFFSET(1) NUMBITS(1) []
    ],
    LSR [
        /// Tx FIFO empty and the shifter has finished
        TX_IDLE OFFSET(6) NUMBITS(1) [],
        /// Tx FIFO can accept at least one byte
        TX_EMPTY OFFSET(5) NUMBITS(1) [],
        RX_OVERRUN OFFSET(1) NUMBITS(1) [],
        DATA_READY OFFSET(0) NUMBITS(1) []
    ],
    MSR [
        /// Inverse of the UART1_CTS input
        CTS OFFSET(5) NUMBITS(1) []
    ],
    SCRATCH [
        SCRATCH OFFSET(0) NUMBITS(8) []
    ],
    CNTL [
        /// Set makes the CTS auto-flow assert level low
        CTS_ASSERT_LEVEL OFFSET(7) NUMBITS(1) [],
        /// Set makes the RTS auto-flow assert level low
        RTS_ASSERT_LEVEL OFFSET(6) NUMBITS(1) [],
        /// Free Rx FIFO entries left when RTS is de-asserted
        RTS_AUTO_FLOW_LEVEL OFFSET(4) NUMBITS(2) [
            ThreeSpaces = 0,
            TwoSpaces = 1,
            OneSpace = 2,
            FourSpaces = 3
        ],
        CTS_AUTO_FLOW OFFSET(3) NUMBITS(1) [],
        RTS_AUTO_FLOW OFFSET(2) NUMBITS(1) [],
        TX_ENABLE OFFSET(1) NUMBITS(1) [],
        RX_ENABLE OFFSET(0) NUMBITS(1) []
    ],
    STAT [
        /// Symbols in the Tx FIFO, 0-8
        TX_FIFO_LEVEL OFFSET(24) NUMBITS(4) [],
        /// Symbols in the Rx FIFO, 0-8
        RX_FIFO_LEVEL OFFSET(16) NUMBITS(4) [],
        /// Transmitter idle and Tx FIFO empty
        TX_DONE OFFSET(9) NUMBITS(1) [],
        TX_FIFO_EMPTY OFFSET(8) NUMBITS(1) [],
        CTS_LINE OFFSET(7) NUMBITS(1) [],
        RTS_STATUS OFFSET(6) NUMBITS(1) [],
        TX_FIFO_FULL OFFSET(5) NUMBITS(1) [],
        /// Same flag as LSR, but reading it here does not clear it
        RX_OVERRUN OFFSET(4) NUMBITS(1) [],
        TX_IDLE OFFSET(3) NUMBITS(1) [],
        RX_IDLE OFFSET(2) NUMBITS(1) [],
        SPACE_AVAILABLE OFFSET(1) NUMBITS(1) [],
        SYMBOL_AVAILABLE OFFSET(0) NUMBITS(1) []
    ],
    BAUD [
        BAUDRATE OFFSET(0) NUMBITS(16) []
    ]
];

/// Source of a pending Mini UART interrupt, as reported by AUX_MU_IIR_REG.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptSource {
    /// No interrupt
    None,
    /// Transmit holding register empty
    Tx,
    /// Receiver holds a valid byte
    Rx,
}

/// Number of data bits per symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSize {
    SevenBit,
    EightBit,
}

impl TryFrom<u8> for DataSize {
    type Error = ErrorCode;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            7 => Ok(DataSize::SevenBit),
            8 => Ok(DataSize::EightBit),
            _ => Err(ErrorCode::INVAL),
        }
    }
}

/// Compute the AUX_MU_BAUD_REG divisor for `baud` given the core clock.
///
/// Returns `INVAL` when `baud` is zero or too fast for the clock and `SIZE`
/// when the divisor does not fit the 16-bit register.
pub fn divisor_for_baud(clock_hz: u32, baud: u32) -> Result<u16, ErrorCode> {
    if baud == 0 {
        return Err(ErrorCode::INVAL);
    }
    let ticks = u64::from(clock_hz) / (8 * u64::from(baud));
    let divisor = ticks.checked_sub(1).ok_or(ErrorCode::INVAL)?;
    u16::try_from(divisor).map_err(|_| ErrorCode::SIZE)
}

/// Baud rate produced by `divisor` given the core clock.
pub fn baud_for_divisor(clock_hz: u32, divisor: u16) -> u32 {
    clock_hz / (8 * (u32::from(divisor) + 1))
}

/// Validated line settings for [`MiniUart::configure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parameters {
    divisor: u16,
    width: DataSize,
}

impl Parameters {
    /// Settings for `baud` and `bits` data bits on the configured core clock.
    pub fn new(baud: u32, bits: u8) -> Result<Parameters, ErrorCode> {
        Parameters::with_clock(config::system_clock_hz(), baud, bits)
    }

    /// Settings for `baud` and `bits` data bits on an explicit core clock.
    pub fn with_clock(clock_hz: u32, baud: u32, bits: u8) -> Result<Parameters, ErrorCode> {
        let width = DataSize::try_from(bits)?;
        let divisor = divisor_for_baud(clock_hz, baud)?;
        Ok(Parameters { divisor, width })
    }

    pub fn divisor(&self) -> u16 {
        self.divisor
    }

    pub fn width(&self) -> DataSize {
        self.width
    }
}

/// Accessor layer over one Mini UART register group.
///
/// The Mini UART registers are only reachable while the Mini UART enable bit
/// in AUXENB is set; [`Aux::mini_uart`](crate::aux::Aux::mini_uart) checks
/// that before handing out a `MiniUart`.
///
/// Every read-modify-write here is a separate load and store. Callers sharing
/// a `MiniUart` between an interrupt handler and other code must serialize
/// access themselves.
#[derive(Clone, Copy)]
pub struct MiniUart<'a> {
    registers: &'a MiniUartRegisters,
}

impl<'a> MiniUart<'a> {
    pub const fn new(registers: &'a MiniUartRegisters) -> MiniUart<'a> {
        MiniUart { registers }
    }

    /// One-time line setup. Leaves the transmitter and receiver enabled,
    /// interrupts and flow control off.
    ///
    /// Enabling the block in AUXENB is the caller's job, see
    /// [`Aux::init_mini_uart`](crate::aux::Aux::init_mini_uart).
    pub fn configure(&self, params: &Parameters) {
        let regs = self.registers;

        // Stop both directions while the line format changes.
        regs.cntl.set(0);
        regs.ier.set(0);
        regs.lcr.write(match params.width {
            DataSize::SevenBit => LCR::DATA_SIZE::SevenBit,
            DataSize::EightBit => LCR::DATA_SIZE::EightBit,
        });
        regs.mcr.set(0);
        regs.iir.write(IIR_FIFO::CLEAR_TX::SET + IIR_FIFO::CLEAR_RX::SET);
        regs.baud.write(BAUD::BAUDRATE.val(params.divisor.into()));
        regs.cntl.write(CNTL::TX_ENABLE::SET + CNTL::RX_ENABLE::SET);
    }

    /// Transmit one byte, spinning until the Tx FIFO has room.
    pub fn write_byte(&self, byte: u8) {
        while !self.registers.lsr.is_set(LSR::TX_EMPTY) {}
        self.write_data(byte);
    }

    pub fn write_bytes(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }

    /// Take one byte from the Rx FIFO if one is there.
    pub fn try_read_byte(&self) -> Option<u8> {
        if self.registers.lsr.is_set(LSR::DATA_READY) {
            Some(self.read_data())
        } else {
            None
        }
    }

    // Data

    /// Put a byte in the Tx FIFO. The byte is dropped if the FIFO is full.
    pub fn write_data(&self, data: u8) {
        self.registers.io.write(IO::DATA.val(data.into()));
    }

    /// Take a byte from the Rx FIFO. An empty FIFO returns the last byte
    /// received.
    pub fn read_data(&self) -> u8 {
        self.registers.io.read(IO::DATA) as u8
    }

    pub fn clear_tx_fifo(&self) {
        self.registers.iir.write(IIR_FIFO::CLEAR_TX::SET);
    }

    pub fn clear_rx_fifo(&self) {
        self.registers.iir.write(IIR_FIFO::CLEAR_RX::SET);
    }

    pub fn write_scratch(&self, data: u8) {
        self.registers.scratch.write(SCRATCH::SCRATCH.val(data.into()));
    }

    pub fn read_scratch(&self) -> u8 {
        self.registers.scratch.read(SCRATCH::SCRATCH) as u8
    }

    // Interrupts

    /// Interrupt whenever the Rx FIFO holds a byte.
    pub fn enable_rx_interrupt(&self) {
        self.registers.ier.modify(IER::RX_INTERRUPT::SET);
    }

    pub fn disable_rx_interrupt(&self) {
        self.registers.ier.modify(IER::RX_INTERRUPT::CLEAR);
    }

    /// Interrupt whenever the Tx FIFO is empty.
    pub fn enable_tx_interrupt(&self) {
        self.registers.ier.modify(IER::TX_INTERRUPT::SET);
    }

    pub fn disable_tx_interrupt(&self) {
        self.registers.ier.modify(IER::TX_INTERRUPT::CLEAR);
    }

    /// The pending bit reads as zero while an interrupt is pending.
    pub fn is_interrupt_pending(&self) -> bool {
        !self.registers.iir.is_set(IIR::PENDING)
    }

    /// Decode the interrupt ID field. `None` means the ID read as `0b11`,
    /// which the hardware documents as impossible.
    pub fn get_interrupt_source(&self) -> Option<InterruptSource> {
        let id: Option<IIR::INTERRUPT_ID::Value> =
            self.registers.iir.read_as_enum(IIR::INTERRUPT_ID);
        match id {
            Some(IIR::INTERRUPT_ID::Value::NoInterrupt) => Some(InterruptSource::None),
            Some(IIR::INTERRUPT_ID::Value::TxEmpty) => Some(InterruptSource::Tx),
            Some(IIR::INTERRUPT_ID::Value::RxReady) => Some(InterruptSource::Rx),
            None => None,
        }
    }

    // Flow control

    /// Pull Tx low. Held for at least 12 bit times this is a break.
    pub fn assert_break(&self) {
        self.registers.lcr.modify(LCR::BREAK::SET);
    }

    pub fn deassert_break(&self) {
        self.registers.lcr.modify(LCR::BREAK::CLEAR);
    }

    pub fn assert_rts(&self) {
        self.registers.mcr.modify(MCR::RTS::SET);
    }

    pub fn deassert_rts(&self) {
        self.registers.mcr.modify(MCR::RTS::CLEAR);
    }

    pub fn get_cts_status(&self) -> bool {
        self.registers.stat.is_set(STAT::CTS_LINE)
    }

    pub fn get_rts_status(&self) -> bool {
        self.registers.stat.is_set(STAT::RTS_STATUS)
    }

    /// Stop the transmitter while CTS is de-asserted. `invert` makes CTS
    /// active low.
    pub fn enable_cts_auto_flow(&self, invert: bool) {
        self.registers.cntl.modify(
            CNTL::CTS_ASSERT_LEVEL.val(invert.into()) + CNTL::CTS_AUTO_FLOW::SET,
        );
    }

    pub fn disable_cts_auto_flow(&self) {
        self.registers.cntl.modify(CNTL::CTS_AUTO_FLOW::CLEAR);
    }

    /// De-assert RTS once only `level` Rx FIFO entries are free. `invert`
    /// makes RTS active low.
    ///
    /// `level` must be 1, 2 or 4. Anything else is rejected with `INVAL`
    /// before the register is touched.
    pub fn enable_rts_auto_flow(&self, invert: bool, level: u8) -> Result<(), ErrorCode> {
        let level = match level {
            1 => CNTL::RTS_AUTO_FLOW_LEVEL::OneSpace,
            2 => CNTL::RTS_AUTO_FLOW_LEVEL::TwoSpaces,
            4 => CNTL::RTS_AUTO_FLOW_LEVEL::FourSpaces,
            _ => return Err(ErrorCode::INVAL),
        };
        self.registers.cntl.modify(
            CNTL::RTS_ASSERT_LEVEL.val(invert.into()) + level + CNTL::RTS_AUTO_FLOW::SET,
        );
        Ok(())
    }

    pub fn disable_rts_auto_flow(&self) {
        self.registers.cntl.modify(CNTL::RTS_AUTO_FLOW::CLEAR);
    }

    // Control

    pub fn set_data_size(&self, size: DataSize) {
        self.registers.lcr.modify(match size {
            DataSize::SevenBit => LCR::DATA_SIZE::SevenBit,
            DataSize::EightBit => LCR::DATA_SIZE::EightBit,
        });
    }

    /// Expose the divisor through io/ier instead of the data port. Must be
    /// off during normal operation.
    ///
    /// No accessor reads or writes the divisor bytes through io/ier while
    /// the latch is set. Program the divisor with [`MiniUart::set_baudrate`],
    /// which goes through AUX_MU_BAUD_REG and ignores DLAB.
    pub fn set_divisor_latch(&self, enable: bool) {
        self.registers.lcr.modify(LCR::DLAB.val(enable.into()));
    }

    pub fn enable_tx(&self) {
        self.registers.cntl.modify(CNTL::TX_ENABLE::SET);
    }

    pub fn disable_tx(&self) {
        self.registers.cntl.modify(CNTL::TX_ENABLE::CLEAR);
    }

    pub fn enable_rx(&self) {
        self.registers.cntl.modify(CNTL::RX_ENABLE::SET);
    }

    pub fn disable_rx(&self) {
        self.registers.cntl.modify(CNTL::RX_ENABLE::CLEAR);
    }

    /// Write the raw divisor, see [`divisor_for_baud`].
    pub fn set_baudrate(&self, divisor: u16) {
        self.registers.baud.write(BAUD::BAUDRATE.val(divisor.into()));
    }

    /// Read back the raw divisor, see [`baud_for_divisor`].
    pub fn get_baudrate(&self) -> u16 {
        self.registers.baud.read(BAUD::BAUDRATE) as u16
    }

    // Status

    /// Whether bytes were dropped because the Rx FIFO was full.
    ///
    /// With `clear` the flag is read from AUX_MU_LSR_REG, which clears it as
    /// a side effect. Without, it is read from AUX_MU_STAT_REG and left set.
    pub fn is_rx_overrun(&self, clear: bool) -> bool {
        if clear {
            self.registers.lsr.is_set(LSR::RX_OVERRUN)
        } else {
            self.registers.stat.is_set(STAT::RX_OVERRUN)
        }
    }

    pub fn get_tx_fifo_level(&self) -> u8 {
        self.registers.stat.read(STAT::TX_FIFO_LEVEL) as u8
    }

    pub fn get_rx_fifo_level(&self) -> u8 {
        self.registers.stat.read(STAT::RX_FIFO_LEVEL) as u8
    }

    /// The Tx FIFO holds nothing. The shifter may still be busy, see
    /// [`MiniUart::is_tx_idle`].
    pub fn is_tx_fifo_empty(&self) -> bool {
        self.registers.stat.is_set(STAT::TX_FIFO_EMPTY)
    }

    pub fn is_tx_full(&self) -> bool {
        self.registers.stat.is_set(STAT::TX_FIFO_FULL)
    }

    /// The Tx FIFO can accept at least one more symbol.
    pub fn is_tx_fifo_ready(&self) -> bool {
        self.registers.stat.is_set(STAT::SPACE_AVAILABLE)
    }

    /// The Rx FIFO holds at least one symbol.
    pub fn is_rx_fifo_ready(&self) -> bool {
        self.registers.stat.is_set(STAT::SYMBOL_AVAILABLE)
    }

    /// Tx FIFO empty and the last bit shifted out.
    pub fn is_tx_idle(&self) -> bool {
        self.registers.stat.is_set(STAT::TX_DONE)
    }

    /// Only meaningful with the receiver disabled.
    pub fn is_rx_idle(&self) -> bool {
        self.registers.stat.is_set(STAT::RX_IDLE)
    }

    /// Inverse of the UART1_CTS pin, from the modem status register.
    pub fn is_cts_low(&self) -> bool {
        self.registers.msr.is_set(MSR::CTS)
    }
}
