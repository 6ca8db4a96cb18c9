//! # sdboot Core - SD-over-SPI Boot Core
//!
//! This crate drives a storage card over a bit-banged SPI link, streams a
//! fixed range of 512-byte blocks into a destination memory region, and
//! hands control to the loaded image. Hardware access is injected through
//! the `sdboot-hal` traits, so every layer below the hand-off runs
//! unmodified against simulated hardware in the test suite.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Layer 4: Hand-off Controller (handoff)                     │
//! │           └─ Bootloader::run / EntryPoint::launch           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layer 3: Block Loader (loader)                             │
//! │           └─ CMD17 per block, token wait, 512-byte stream   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layer 2: Initialization Sequencer (init)                   │
//! │           └─ Wake → Reset → VoltageCheck → Negotiation      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layer 1: Command Framer (command)                          │
//! │           └─ 6-byte frames, bounded reply polling           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layer 0: Bit-Clock Transport (bus)                         │
//! │           └─ 8 bits out / 8 bits in per call, MSB-first     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Control flows strictly downward; there is no concurrency and no
//! interrupt anywhere on the boot path.
//!
//! ## Boot Entry (reference SoC)
//!
//! ```no_run
//! use sdboot_core::{BootConfig, Bootloader};
//! use sdboot_hal::{logger, soc, MmioUart, MmioPort};
//!
//! fn start() -> ! {
//!     let _ = logger::init(
//!         unsafe { MmioUart::new(soc::UART_TX, soc::UART_SETTLE) },
//!         log::LevelFilter::Info,
//!     );
//!
//!     let pins = unsafe { MmioPort::new(soc::SD_PORT) };
//!     let sink = unsafe { MmioUart::new(soc::UART_TX, soc::UART_SETTLE) };
//!     let config = BootConfig::default();
//!     let dest: &'static mut [u8] = unsafe {
//!         core::slice::from_raw_parts_mut(soc::SRAM_BASE as *mut u8, config.policy.byte_len())
//!     };
//!
//!     let loader = Bootloader::new(pins, sink, config);
//!     unsafe { loader.boot(dest) }
//! }
//! # fn main() {}
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Bit-clock byte transport over the injected link lines
pub mod bus;

/// Command framing and status replies
pub mod command;

/// Load policy and retry bounds
pub mod config;

/// Boot failure taxonomy
pub mod error;

/// Hand-off controller and entry-point descriptor
pub mod handoff;

/// Card bring-up state machine
pub mod init;

/// Block-by-block image loader
pub mod loader;

#[cfg(test)]
pub(crate) mod sim;


// =============================================================================
// Re-exports
// =============================================================================

pub use bus::SpiBus;
pub use command::{CommandFrame, R1Flags, StatusReply};
pub use config::{BootConfig, LoadPolicy};
pub use error::{BootError, BootResult};
pub use handoff::{Bootloader, EntryPoint};
pub use init::{InitState, Sequencer};

// =============================================================================
// Wire Protocol Constants
// =============================================================================

/// Payload length of one storage block in bytes.
pub const BLOCK_LEN: usize = 512;

/// Trailing checksum bytes after each block payload (clocked, never checked).
pub const BLOCK_CRC_LEN: usize = 2;

/// Dummy byte transfers clocked during wake-up (80 clocks; cards require 74).
pub const WAKE_CLOCK_BYTES: usize = 10;

/// Filler byte kept on the data-out line while shifting data in.
pub const FILLER: u8 = 0xFF;

/// Command indices used by the boot path.
pub mod cmd {
    /// GO_IDLE_STATE - reset the card into SPI mode.
    pub const GO_IDLE_STATE: u8 = 0;
    /// SEND_IF_COND - voltage/interface condition probe.
    pub const SEND_IF_COND: u8 = 8;
    /// READ_SINGLE_BLOCK - read one 512-byte block.
    pub const READ_SINGLE_BLOCK: u8 = 17;
    /// SD_SEND_OP_COND - capacity negotiation (application command).
    pub const SD_SEND_OP_COND: u8 = 41;
    /// APP_CMD - escape prefix for application commands.
    pub const APP_CMD: u8 = 55;
}

/// Fixed frame checksums. Only CMD0 and CMD8 are sent while the card still
/// checks CRCs; everything later takes a dummy value.
pub mod crc {
    /// Checksum for GO_IDLE_STATE with argument 0.
    pub const GO_IDLE_STATE: u8 = 0x95;
    /// Checksum for SEND_IF_COND with argument 0x1AA.
    pub const SEND_IF_COND: u8 = 0x87;
    /// Placeholder checksum once CRC checking is off.
    pub const DUMMY: u8 = 0xFF;
}

/// Exact status reply values the boot path keys on.
pub mod reply {
    /// Command accepted, card out of idle.
    pub const READY: u8 = 0x00;
    /// Card in idle state (expected after GO_IDLE_STATE).
    pub const IDLE: u8 = 0x01;
    /// High bit set means no reply observed yet.
    pub const NOT_READY_MASK: u8 = 0x80;
}

/// Data-framing tokens.
pub mod token {
    /// Marks the first payload byte of a read block on the wire.
    pub const DATA_START: u8 = 0xFE;
}

/// SEND_IF_COND argument: 2.7-3.6V range plus check pattern 0xAA.
pub const IF_COND_ARG: u32 = 0x1AA;

/// Bytes to flush after SEND_IF_COND (the R7 response trailer).
pub const IF_COND_TRAILER_LEN: usize = 4;

/// SD_SEND_OP_COND argument: request high-capacity addressing.
pub const OCR_HIGH_CAPACITY: u32 = 0x4000_0000;

// =============================================================================
// Compile-Time Assertions
// =============================================================================

static_assertions::const_assert_eq!(BLOCK_LEN, 512);
static_assertions::const_assert!(WAKE_CLOCK_BYTES * 8 >= 74);
static_assertions::const_assert_eq!(cmd::GO_IDLE_STATE & 0xC0, 0);
static_assertions::const_assert_eq!(cmd::APP_CMD & 0xC0, 0);
