// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Universal SPI masters of the BCM2835 AUX block.
//!
//! The AUX block carries two identical SPI masters (SPI 1 and SPI 2 in the
//! datasheet). Each has a 4-entry FIFO per direction and shifts up to 32
//! bits per data unit. The clock is derived from the core clock:
//!
//! ```text
//! spi_clk_freq = system_clock_freq / (2 * (speed + 1))
//! ```

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

use crate::config;
use crate::errorcode::ErrorCode;

register_structs! {
    /// One SPI register group. Mapped at offsets 0x80 and 0xC0 of the AUX
    /// block.
    pub SpiRegisters {
        /// AUXSPIx_CNTL0_REG
        (0x00 => cntl0: ReadWrite<u32, CNTL0::Register>),
        /// AUXSPIx_CNTL1_REG
        (0x04 => cntl1: ReadWrite<u32, CNTL1::Register>),
        /// AUXSPIx_STAT_REG
        (0x08 => stat: ReadOnly<u32, STAT::Register>),
        /// AUXSPIx_IO_REG: writes go to the Tx FIFO, reads take from the Rx
        /// FIFO
        (0x0C => io: ReadWrite<u32, DATA::Register>),
        /// AUXSPIx_PEEK_REG: top of the Rx FIFO without taking it
        (0x10 => peek: ReadOnly<u32, DATA::Register>),
        (0x14 => @END),
    }
}

register_bitfields![u32,
    CNTL0 [
        /// Clock divider, see the module documentation
        SPEED OFFSET(20) NUMBITS(12) [],
        /// Pattern driven on the CS pins while active
        CHIP_SELECTS OFFSET(17) NUMBITS(3) [],
        POST_INPUT OFFSET(16) NUMBITS(1) [],
        /// CS pattern comes from the Tx FIFO. Requires VARIABLE_WIDTH.
        VARIABLE_CS OFFSET(15) NUMBITS(1) [],
        /// Shift length comes from the Tx FIFO
        VARIABLE_WIDTH OFFSET(14) NUMBITS(1) [],
        /// Extra DOUT hold time in system clock cycles
        DOUT_HOLD OFFSET(12) NUMBITS(2) [
            None = 0,
            OneClock = 1,
            FourClocks = 2,
            SevenClocks = 3
        ],
        /// Whilst clear the FIFOs stay accessible
        ENABLE OFFSET(11) NUMBITS(1) [],
        IN_RISING OFFSET(10) NUMBITS(1) [],
        /// Holds both FIFOs in reset while set
        CLEAR_FIFOS OFFSET(9) NUMBITS(1) [],
        OUT_RISING OFFSET(8) NUMBITS(1) [],
        /// Idle clock level is high
        INVERT_CLK OFFSET(7) NUMBITS(1) [],
        OUT_MS_BIT_FIRST OFFSET(6) NUMBITS(1) [],
        /// Bits per data unit, ignored in variable width mode
        SHIFT_LENGTH OFFSET(0) NUMBITS(6) []
    ],
    CNTL1 [
        /// Extra SPI clock cycles CS stays high
        CS_HIGH_TIME OFFSET(8) NUMBITS(3) [],
        TX_EMPTY_IRQ OFFSET(7) NUMBITS(1) [],
        /// Interrupt line high while the interface is idle
        DONE_IRQ OFFSET(6) NUMBITS(1) [],
        IN_MS_BIT_FIRST OFFSET(1) NUMBITS(1) [],
        /// Do not clear the receive shifter between transactions
        KEEP_INPUT OFFSET(0) NUMBITS(1) []
    ],
    STAT [
        TX_FIFO_LEVEL OFFSET(24) NUMBITS(8) [],
        RX_FIFO_LEVEL OFFSET(12) NUMBITS(12) [],
        BUSY OFFSET(6) NUMBITS(1) [],
        TX_FULL OFFSET(4) NUMBITS(1) [],
        TX_EMPTY OFFSET(3) NUMBITS(1) [],
        RX_EMPTY OFFSET(2) NUMBITS(1) [],
        /// Bits still to shift, counting down from the shift length
        BIT_COUNT OFFSET(0) NUMBITS(6) []
    ],
    DATA [
        DATA OFFSET(0) NUMBITS(16) []
    ]
];

/// Level of the SPI clock while idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockPolarity {
    IdleLow,
    IdleHigh,
}

/// Extra DOUT hold time after each clock edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoutHold {
    None,
    OneClock,
    FourClocks,
    SevenClocks,
}

const MAX_SPEED: u32 = (1 << 12) - 1;
const MAX_SHIFT_LENGTH: u8 = (1 << 6) - 1;
const MAX_CS_FIELD: u8 = 0b111;

/// Accessor layer over one SPI register group.
///
/// As with the Mini UART, the group is only reachable while its AUXENB bit
/// is set, and read-modify-write sequences are not atomic.
#[derive(Clone, Copy)]
pub struct Spi<'a> {
    registers: &'a SpiRegisters,
}

impl<'a> Spi<'a> {
    pub const fn new(registers: &'a SpiRegisters) -> Spi<'a> {
        Spi { registers }
    }

    pub fn enable(&self) {
        self.registers.cntl0.modify(CNTL0::ENABLE::SET);
    }

    pub fn disable(&self) {
        self.registers.cntl0.modify(CNTL0::ENABLE::CLEAR);
    }

    pub fn is_enabled(&self) -> bool {
        self.registers.cntl0.is_set(CNTL0::ENABLE)
    }

    /// Flush both FIFOs by holding them in reset and releasing them again.
    pub fn clear_fifos(&self) {
        self.registers.cntl0.modify(CNTL0::CLEAR_FIFOS::SET);
        self.registers.cntl0.modify(CNTL0::CLEAR_FIFOS::CLEAR);
    }

    // Clocking

    /// Raw 12-bit clock divider.
    pub fn set_speed(&self, speed: u16) -> Result<(), ErrorCode> {
        if u32::from(speed) > MAX_SPEED {
            return Err(ErrorCode::SIZE);
        }
        self.registers.cntl0.modify(CNTL0::SPEED.val(speed.into()));
        Ok(())
    }

    pub fn get_speed(&self) -> u16 {
        self.registers.cntl0.read(CNTL0::SPEED) as u16
    }

    /// Program the fastest clock not above `rate` Hz and return the rate
    /// actually produced.
    pub fn set_rate(&self, rate: u32) -> Result<u32, ErrorCode> {
        let speed = speed_for_rate(config::system_clock_hz(), rate)?;
        self.set_speed(speed)?;
        Ok(rate_for_speed(config::system_clock_hz(), speed))
    }

    pub fn get_rate(&self) -> u32 {
        rate_for_speed(config::system_clock_hz(), self.get_speed())
    }

    pub fn set_clock_polarity(&self, polarity: ClockPolarity) {
        match polarity {
            ClockPolarity::IdleLow => self.registers.cntl0.modify(CNTL0::INVERT_CLK::CLEAR),
            ClockPolarity::IdleHigh => self.registers.cntl0.modify(CNTL0::INVERT_CLK::SET),
        }
    }

    pub fn get_clock_polarity(&self) -> ClockPolarity {
        if self.registers.cntl0.is_set(CNTL0::INVERT_CLK) {
            ClockPolarity::IdleHigh
        } else {
            ClockPolarity::IdleLow
        }
    }

    /// Clock data out on the rising (true) or falling edge.
    pub fn set_out_rising(&self, rising: bool) {
        self.registers.cntl0.modify(CNTL0::OUT_RISING.val(rising.into()));
    }

    /// Clock data in on the rising (true) or falling edge.
    pub fn set_in_rising(&self, rising: bool) {
        self.registers.cntl0.modify(CNTL0::IN_RISING.val(rising.into()));
    }

    pub fn set_dout_hold(&self, hold: DoutHold) {
        self.registers.cntl0.modify(match hold {
            DoutHold::None => CNTL0::DOUT_HOLD::None,
            DoutHold::OneClock => CNTL0::DOUT_HOLD::OneClock,
            DoutHold::FourClocks => CNTL0::DOUT_HOLD::FourClocks,
            DoutHold::SevenClocks => CNTL0::DOUT_HOLD::SevenClocks,
        });
    }

    // Framing

    /// CS pin pattern while a transfer is active, 3 bits.
    pub fn set_chip_selects(&self, pattern: u8) -> Result<(), ErrorCode> {
        if pattern > MAX_CS_FIELD {
            return Err(ErrorCode::SIZE);
        }
        self.registers
            .cntl0
            .modify(CNTL0::CHIP_SELECTS.val(pattern.into()));
        Ok(())
    }

    /// Bits per data unit, 6 bits.
    pub fn set_shift_length(&self, bits: u8) -> Result<(), ErrorCode> {
        if bits > MAX_SHIFT_LENGTH {
            return Err(ErrorCode::SIZE);
        }
        self.registers
            .cntl0
            .modify(CNTL0::SHIFT_LENGTH.val(bits.into()));
        Ok(())
    }

    pub fn set_variable_width(&self, enable: bool) {
        self.registers
            .cntl0
            .modify(CNTL0::VARIABLE_WIDTH.val(enable.into()));
    }

    /// Only valid together with variable width.
    pub fn set_variable_cs(&self, enable: bool) {
        self.registers
            .cntl0
            .modify(CNTL0::VARIABLE_CS.val(enable.into()));
    }

    pub fn set_post_input(&self, enable: bool) {
        self.registers
            .cntl0
            .modify(CNTL0::POST_INPUT.val(enable.into()));
    }

    pub fn set_out_ms_bit_first(&self, msb_first: bool) {
        self.registers
            .cntl0
            .modify(CNTL0::OUT_MS_BIT_FIRST.val(msb_first.into()));
    }

    pub fn set_in_ms_bit_first(&self, msb_first: bool) {
        self.registers
            .cntl1
            .modify(CNTL1::IN_MS_BIT_FIRST.val(msb_first.into()));
    }

    /// Concatenate new input to the old shifter contents instead of clearing
    /// it before each transaction.
    pub fn set_keep_input(&self, keep: bool) {
        self.registers.cntl1.modify(CNTL1::KEEP_INPUT.val(keep.into()));
    }

    /// Extra clock cycles with CS high between transfers, 3 bits.
    pub fn set_cs_high_time(&self, cycles: u8) -> Result<(), ErrorCode> {
        if cycles > MAX_CS_FIELD {
            return Err(ErrorCode::SIZE);
        }
        self.registers
            .cntl1
            .modify(CNTL1::CS_HIGH_TIME.val(cycles.into()));
        Ok(())
    }

    // Interrupts

    pub fn enable_tx_empty_irq(&self) {
        self.registers.cntl1.modify(CNTL1::TX_EMPTY_IRQ::SET);
    }

    pub fn disable_tx_empty_irq(&self) {
        self.registers.cntl1.modify(CNTL1::TX_EMPTY_IRQ::CLEAR);
    }

    pub fn enable_done_irq(&self) {
        self.registers.cntl1.modify(CNTL1::DONE_IRQ::SET);
    }

    pub fn disable_done_irq(&self) {
        self.registers.cntl1.modify(CNTL1::DONE_IRQ::CLEAR);
    }

    // Status

    pub fn is_busy(&self) -> bool {
        self.registers.stat.is_set(STAT::BUSY)
    }

    pub fn is_tx_full(&self) -> bool {
        self.registers.stat.is_set(STAT::TX_FULL)
    }

    pub fn is_tx_empty(&self) -> bool {
        self.registers.stat.is_set(STAT::TX_EMPTY)
    }

    pub fn is_rx_empty(&self) -> bool {
        self.registers.stat.is_set(STAT::RX_EMPTY)
    }

    pub fn get_tx_fifo_level(&self) -> u8 {
        self.registers.stat.read(STAT::TX_FIFO_LEVEL) as u8
    }

    pub fn get_rx_fifo_level(&self) -> u16 {
        self.registers.stat.read(STAT::RX_FIFO_LEVEL) as u16
    }

    pub fn get_bit_count(&self) -> u8 {
        self.registers.stat.read(STAT::BIT_COUNT) as u8
    }

    // Data

    /// Queue a data unit. Dropped if the Tx FIFO is full.
    pub fn write_data(&self, data: u16) {
        self.registers.io.write(DATA::DATA.val(data.into()));
    }

    /// Take a data unit from the Rx FIFO. An empty FIFO returns the last
    /// data received.
    pub fn read_data(&self) -> u16 {
        self.registers.io.read(DATA::DATA) as u16
    }

    /// Look at the Rx FIFO head without taking it.
    pub fn peek(&self) -> u16 {
        self.registers.peek.read(DATA::DATA) as u16
    }

    /// Polled full-duplex transfer of one data unit.
    pub fn read_write_word(&self, data: u16) -> u16 {
        while self.is_tx_full() {}
        self.write_data(data);
        while self.is_rx_empty() {}
        self.read_data()
    }
}

/// Smallest speed field whose clock does not exceed `rate`.
pub fn speed_for_rate(clock_hz: u32, rate: u32) -> Result<u16, ErrorCode> {
    if rate == 0 {
        return Err(ErrorCode::INVAL);
    }
    let divider = u64::from(clock_hz).div_ceil(2 * u64::from(rate));
    let speed = divider.saturating_sub(1);
    if speed > u64::from(MAX_SPEED) {
        return Err(ErrorCode::SIZE);
    }
    Ok(speed as u16)
}

pub fn rate_for_speed(clock_hz: u32, speed: u16) -> u32 {
    clock_hz / (2 * (u32::from(speed) + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeAux;
    use core::mem::{offset_of, size_of};

    const SPI0: usize = 0x80;
    const CNTL0_REG: usize = SPI0;
    const CNTL1_REG: usize = SPI0 + 0x04;
    const STAT_REG: usize = SPI0 + 0x08;
    const IO_REG: usize = SPI0 + 0x0C;
    const PEEK_REG: usize = SPI0 + 0x10;

    fn spi() -> (&'static FakeAux, Spi<'static>) {
        let fake = FakeAux::new();
        (fake, fake.spi0())
    }

    #[test]
    fn register_offsets() {
        assert_eq!(offset_of!(SpiRegisters, cntl0), 0x00);
        assert_eq!(offset_of!(SpiRegisters, cntl1), 0x04);
        assert_eq!(offset_of!(SpiRegisters, stat), 0x08);
        assert_eq!(offset_of!(SpiRegisters, io), 0x0C);
        assert_eq!(offset_of!(SpiRegisters, peek), 0x10);
        assert_eq!(size_of::<SpiRegisters>(), 0x14);
    }

    #[test]
    fn enable_and_clear_preserve_control() {
        let (fake, spi) = spi();
        fake.poke(CNTL0_REG, 0xFFF0_00FF);
        spi.enable();
        assert!(spi.is_enabled());
        assert_eq!(fake.peek(CNTL0_REG), 0xFFF0_08FF);
        spi.clear_fifos();
        assert_eq!(fake.peek(CNTL0_REG), 0xFFF0_08FF);
        spi.disable();
        assert_eq!(fake.peek(CNTL0_REG), 0xFFF0_00FF);
    }

    #[test]
    fn speed_field() {
        let (fake, spi) = spi();
        fake.poke(CNTL0_REG, 0x000F_FFFF);
        spi.set_speed(0xABC).unwrap();
        assert_eq!(fake.peek(CNTL0_REG), 0xABCF_FFFF);
        assert_eq!(spi.get_speed(), 0xABC);
        assert_eq!(spi.set_speed(0x1000), Err(ErrorCode::SIZE));
        assert_eq!(fake.peek(CNTL0_REG), 0xABCF_FFFF);
    }

    #[test]
    fn rate_conversion() {
        assert_eq!(speed_for_rate(250_000_000, 125_000_000), Ok(0));
        assert_eq!(speed_for_rate(250_000_000, 500_000_000), Ok(0));
        assert_eq!(speed_for_rate(250_000_000, 1_000_000), Ok(124));
        assert_eq!(rate_for_speed(250_000_000, 124), 1_000_000);
        // 250 MHz / (2 * 3_000_000) = 41.67, so the divider rounds up to 42.
        assert_eq!(speed_for_rate(250_000_000, 3_000_000), Ok(41));
        assert!(rate_for_speed(250_000_000, 41) <= 3_000_000);
        assert_eq!(speed_for_rate(250_000_000, 0), Err(ErrorCode::INVAL));
        assert_eq!(speed_for_rate(250_000_000, 1_000), Err(ErrorCode::SIZE));
    }

    #[test]
    fn framing_fields() {
        let (fake, spi) = spi();
        spi.set_chip_selects(0b101).unwrap();
        spi.set_shift_length(16).unwrap();
        spi.set_out_ms_bit_first(true);
        spi.set_variable_width(true);
        spi.set_variable_cs(true);
        spi.set_post_input(true);
        spi.set_dout_hold(DoutHold::FourClocks);
        assert_eq!(
            fake.peek(CNTL0_REG),
            (0b101 << 17) | (1 << 16) | (1 << 15) | (1 << 14) | (0b10 << 12) | (1 << 6) | 16
        );

        assert_eq!(spi.set_chip_selects(8), Err(ErrorCode::SIZE));
        assert_eq!(spi.set_shift_length(64), Err(ErrorCode::SIZE));
    }

    #[test]
    fn clock_edges_and_polarity() {
        let (fake, spi) = spi();
        spi.set_clock_polarity(ClockPolarity::IdleHigh);
        assert_eq!(spi.get_clock_polarity(), ClockPolarity::IdleHigh);
        spi.set_out_rising(true);
        spi.set_in_rising(true);
        assert_eq!(fake.peek(CNTL0_REG), (1 << 10) | (1 << 8) | (1 << 7));
        spi.set_clock_polarity(ClockPolarity::IdleLow);
        spi.set_in_rising(false);
        assert_eq!(fake.peek(CNTL0_REG), 1 << 8);
        assert_eq!(spi.get_clock_polarity(), ClockPolarity::IdleLow);
    }

    #[test]
    fn control1_fields() {
        let (fake, spi) = spi();
        spi.set_cs_high_time(7).unwrap();
        spi.enable_tx_empty_irq();
        spi.enable_done_irq();
        spi.set_in_ms_bit_first(true);
        spi.set_keep_input(true);
        assert_eq!(fake.peek(CNTL1_REG), (0b111 << 8) | (1 << 7) | (1 << 6) | 0b11);

        spi.disable_tx_empty_irq();
        spi.disable_done_irq();
        assert_eq!(fake.peek(CNTL1_REG), (0b111 << 8) | 0b11);
        assert_eq!(spi.set_cs_high_time(8), Err(ErrorCode::SIZE));
    }

    #[test]
    fn status_fields() {
        let (fake, spi) = spi();
        fake.poke(STAT_REG, (3 << 24) | (2 << 12) | (1 << 6));
        assert_eq!(spi.get_tx_fifo_level(), 3);
        assert_eq!(spi.get_rx_fifo_level(), 2);
        assert!(spi.is_busy());
        assert!(!spi.is_tx_full());

        fake.poke(STAT_REG, (1 << 4) | (1 << 3) | (1 << 2));
        assert!(spi.is_tx_full());
        assert!(spi.is_tx_empty());
        assert!(spi.is_rx_empty());
        assert!(!spi.is_busy());
    }

    #[test]
    fn data_and_peek() {
        let (fake, spi) = spi();
        spi.write_data(0xBEEF);
        assert_eq!(fake.peek(IO_REG), 0xBEEF);
        fake.poke(PEEK_REG, 0xFFFF_1234);
        assert_eq!(spi.peek(), 0x1234);
        assert_eq!(fake.peek(PEEK_REG), 0xFFFF_1234);
    }

    #[test]
    fn read_write_word_with_ready_fifos() {
        let (fake, spi) = spi();
        // Tx has room, Rx holds data. RAM echoes the written word back.
        fake.poke(STAT_REG, 0);
        assert_eq!(spi.read_write_word(0x00A5), 0x00A5);
        assert_eq!(fake.peek(IO_REG), 0x00A5);
    }

    #[test]
    fn rate_uses_speed_field_only() {
        let (fake, spi) = spi();
        fake.poke(CNTL0_REG, 0x000F_FFFF);
        assert_eq!(spi.set_rate(1_000_000), Ok(1_000_000));
        let speed = fake.peek(CNTL0_REG) >> 20;
        assert_eq!(speed, u32::from(spi.get_speed()));
        assert_eq!(fake.peek(CNTL0_REG) & 0x000F_FFFF, 0x000F_FFFF);
        assert_eq!(spi.get_rate(), 1_000_000);

        assert_eq!(spi.set_rate(0), Err(ErrorCode::INVAL));
        assert_eq!(spi.get_rate(), 1_000_000);
    }

    #[test]
    fn bit_count_overlaps_fifo_flags() {
        let (fake, spi) = spi();
        fake.poke(STAT_REG, 0xFFFF_FFEA);
        assert_eq!(spi.get_bit_count(), 0x2A);
        // 0x2A has bits 3 and 5 set, bits 2 and 4 clear.
        assert!(spi.is_tx_empty());
        assert!(!spi.is_tx_full());
        assert!(!spi.is_rx_empty());

        fake.poke(STAT_REG, 0xFFFF_FFC0);
        assert_eq!(spi.get_bit_count(), 0);
        assert!(spi.is_busy());
    }

    #[test]
    fn spi1_is_independent() {
        let fake = FakeAux::new();
        fake.spi1().set_shift_length(8).unwrap();
        assert_eq!(fake.peek(0xC0), 8);
        assert_eq!(fake.peek(CNTL0_REG), 0);
    }
}
