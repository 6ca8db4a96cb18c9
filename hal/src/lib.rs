//! # sdboot HAL - Hardware Abstraction Layer
//!
//! This crate defines the capabilities the boot core depends on and their
//! memory-mapped implementations for the reference SoC. The boot core never
//! touches a hardware register directly; everything goes through the traits
//! defined here so the protocol logic can run against simulated hardware.
//!
//! ## Design Philosophy
//!
//! - **Injected access**: line and register access are traits, not globals
//! - **Minimal**: only what the boot core actually consumes
//! - **Safe boundary**: all volatile access is encapsulated behind `unsafe`
//!   constructors that name their register contract

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

/// CPU-level primitives (spin hints, terminal park state)
pub mod cpu;

/// Storage link line access
pub mod link;

/// One-byte diagnostic sink
pub mod console;

/// UART-backed `log` facade implementation
pub mod logger;

/// Reference SoC register map
pub mod soc;

pub use console::{ByteSink, MmioUart, NullSink};
pub use link::{Lines, LinkPins, MmioPort};
