//! # Diagnostic Sink
//!
//! The boot core reports progress with single literal characters. The only
//! capability it asks for is "emit one byte"; everything else (the UART
//! itself, its settle timing) lives behind that boundary.

/// One-byte diagnostic sink consumed by the boot core.
pub trait ByteSink {
    /// Emit a single byte.
    fn put(&mut self, byte: u8);

    /// Emit a run of bytes in order.
    fn put_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.put(b);
        }
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ByteSink for NullSink {
    fn put(&mut self, _byte: u8) {}
}

/// Memory-mapped UART transmit register.
///
/// The reference SoC UART has no ready flag; a short spin after each byte
/// lets the shifter drain before the next store.
#[derive(Debug)]
pub struct MmioUart {
    reg: *mut u32,
    settle: u32,
}

// SAFETY: the UART register is only ever driven from the single boot core;
// Send is needed so the logger can hold the UART in a static.
unsafe impl Send for MmioUart {}

impl MmioUart {
    /// Wrap the UART transmit register at the given address.
    ///
    /// `settle` is the number of spin iterations after each byte.
    ///
    /// # Safety
    ///
    /// `reg` must be the address of the UART transmit register, mapped
    /// write-only or read/write for the lifetime of the returned value.
    #[must_use]
    pub const unsafe fn new(reg: usize, settle: u32) -> Self {
        Self {
            reg: reg as *mut u32,
            settle,
        }
    }
}

impl ByteSink for MmioUart {
    fn put(&mut self, byte: u8) {
        // SAFETY: `reg` is valid per the `new` contract.
        unsafe { self.reg.write_volatile(u32::from(byte)) }
        for _ in 0..self.settle {
            crate::cpu::pause();
        }
    }
}
