//! # Bit-Clock Transport
//!
//! Shifts bytes across the storage link one bit at a time. One call moves
//! 8 bits out and 8 bits in, most-significant bit first: data-out is set
//! with the clock low, the clock rises with data-out held stable, and the
//! input line is sampled immediately after the rising edge. Chip-select is
//! driven low for the duration of every transfer.
//!
//! This layer cannot fail; its only observable effect is line transitions.

use sdboot_hal::{Lines, LinkPins};

use crate::FILLER;

/// Byte-level transport over the injected link lines.
#[derive(Debug)]
pub struct SpiBus<P: LinkPins> {
    pins: P,
}

impl<P: LinkPins> SpiBus<P> {
    /// Take ownership of the link lines.
    pub fn new(pins: P) -> Self {
        Self { pins }
    }

    /// Shift `out` onto the wire MSB-first while sampling one byte in.
    ///
    /// Leaves the data-out line high and the clock low afterward, so the
    /// bus idles at an inert level between operations.
    pub fn transfer(&mut self, out: u8) -> u8 {
        let mut sampled = 0u8;
        for i in (0..8).rev() {
            let mut lines = Lines::empty();
            if (out >> i) & 1 != 0 {
                lines |= Lines::DATA_OUT;
            }
            self.pins.drive(lines);
            self.pins.drive(lines | Lines::CLOCK);
            if self.pins.sense() {
                sampled |= 1 << i;
            }
        }
        self.pins.drive(Lines::DATA_OUT);
        sampled
    }

    /// Clock one filler byte, discarding whatever comes back.
    pub fn clock_filler(&mut self) {
        self.transfer(FILLER);
    }

    /// Raise select together with the idle data line, without clocking.
    ///
    /// Power-up line state: the card sees its select bit high while the
    /// wake clocks run.
    pub fn release(&mut self) {
        self.pins.drive(Lines::SELECT | Lines::DATA_OUT);
    }

    /// Drop select with the data line idle-high, ready to clock a frame.
    pub fn engage(&mut self) {
        self.pins.drive(Lines::DATA_OUT);
    }

    /// Borrow the underlying pins.
    pub fn pins(&self) -> &P {
        &self.pins
    }
}
