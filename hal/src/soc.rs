//! # Reference SoC Memory Map
//!
//! Register and region addresses for the reference SoC the boot firmware
//! ships on. Nothing below is required by the boot core; these are the
//! values the firmware front-end wires into the HAL constructors.

/// Storage link port register: outputs on bits 0-2, input reads on bit 0.
pub const SD_PORT: usize = 0x3000_0000;

/// UART transmit register.
pub const UART_TX: usize = 0x2000_0000;

/// Post-byte settle spins for the UART shifter (it has no ready flag).
pub const UART_SETTLE: u32 = 2000;

/// Base of the RAM region images load into and execute from.
pub const SRAM_BASE: usize = 0x1000_0000;
