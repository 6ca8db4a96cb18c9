//! # Storage Link Line Access
//!
//! The storage device hangs off a bit-banged serial link: three output lines
//! (clock, data-out, chip-select) and one sampled input line. This module
//! defines the line-level capability the boot core is injected with, plus the
//! memory-mapped implementation for the reference SoC, where all three
//! outputs share a single port register and the input line reads back on
//! bit 0 of the same register.

use bitflags::bitflags;

bitflags! {
    /// Output line levels of the storage link port.
    ///
    /// Bit positions match the SoC port register layout: writing the whole
    /// set drives all three lines in one store.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Lines: u32 {
        /// Serial clock (SCK).
        const CLOCK = 1 << 0;
        /// Host data-out (MOSI).
        const DATA_OUT = 1 << 1;
        /// Chip-select register bit.
        const SELECT = 1 << 2;
    }
}

// The port register is a full machine word on the reference SoC.
static_assertions::const_assert_eq!(core::mem::size_of::<Lines>(), 4);

/// Injected line/register access used by the boot core.
///
/// Exactly one logical operation is in flight at any time (the boot core is
/// fully synchronous), so implementations need no interior locking.
pub trait LinkPins {
    /// Drive the three output lines to the given levels.
    fn drive(&mut self, lines: Lines);

    /// Sample the input line (MISO).
    fn sense(&mut self) -> bool;
}

/// Memory-mapped link port.
///
/// One write-combined register for the three outputs; the input line reads
/// back on bit 0.
#[derive(Debug)]
pub struct MmioPort {
    reg: *mut u32,
}

impl MmioPort {
    /// Wrap the link port register at the given address.
    ///
    /// # Safety
    ///
    /// `reg` must be the address of the link port register, mapped
    /// read/write for the lifetime of the returned value, and must not be
    /// accessed through any other path while this value exists.
    #[must_use]
    pub const unsafe fn new(reg: usize) -> Self {
        Self { reg: reg as *mut u32 }
    }
}

impl LinkPins for MmioPort {
    fn drive(&mut self, lines: Lines) {
        // SAFETY: `reg` is valid per the `new` contract.
        unsafe { self.reg.write_volatile(lines.bits()) }
    }

    fn sense(&mut self) -> bool {
        // SAFETY: `reg` is valid per the `new` contract.
        unsafe { self.reg.read_volatile() & 1 != 0 }
    }
}
