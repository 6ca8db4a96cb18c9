//! # Hand-off Controller
//!
//! The top of the boot path. On success, execution transfers to the first
//! address of the destination region through a single well-named operation
//! on an explicit entry-point descriptor; ownership of the region passes to
//! the loaded code and the bootloader never touches it again. On any
//! failure, the fixed marker goes to the diagnostic sink once and the CPU
//! parks forever. All failure kinds are equally terminal.

use sdboot_hal::{ByteSink, LinkPins};

use crate::bus::SpiBus;
use crate::config::BootConfig;
use crate::error::BootResult;
use crate::init::Sequencer;
use crate::loader;

/// Address of independently-owned executable code, with no return contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    addr: usize,
}

impl EntryPoint {
    /// Describe an entry point at `addr`.
    #[must_use]
    pub const fn new(addr: usize) -> Self {
        Self { addr }
    }

    /// The entry address.
    #[must_use]
    pub const fn address(self) -> usize {
        self.addr
    }

    /// Transfer execution to the loaded image.
    ///
    /// The image defines no calling convention and no return contract; if
    /// it ever comes back, the CPU parks forever.
    ///
    /// # Safety
    ///
    /// The address must point to a fully loaded, executable image built for
    /// this machine. Nothing about the bytes there is verified.
    pub unsafe fn launch(self) -> ! {
        let entry: extern "C" fn() = unsafe { core::mem::transmute(self.addr) };
        entry();
        sdboot_hal::cpu::park()
    }
}

/// The boot path, top to bottom: bring-up, block load, hand-off descriptor.
#[derive(Debug)]
pub struct Bootloader<P: LinkPins, S: ByteSink> {
    bus: SpiBus<P>,
    sink: S,
    config: BootConfig,
    sequencer: Sequencer,
}

impl<P: LinkPins, S: ByteSink> Bootloader<P, S> {
    /// Assemble a bootloader over the injected lines and diagnostic sink.
    pub fn new(pins: P, sink: S, config: BootConfig) -> Self {
        Self {
            bus: SpiBus::new(pins),
            sink,
            config,
            sequencer: Sequencer::new(),
        }
    }

    /// Run the boot path and return the entry descriptor for `dest`.
    ///
    /// `dest` must hold at least the policy's byte length. On failure the
    /// literal `ERR` marker is emitted exactly once and the error returned;
    /// nothing is retried.
    pub fn run(&mut self, dest: &mut [u8]) -> BootResult<EntryPoint> {
        match self.drive(dest) {
            Ok(entry) => Ok(entry),
            Err(e) => {
                log::warn!("boot failed: {e}");
                self.sink.put_bytes(b"ERR");
                Err(e)
            }
        }
    }

    fn drive(&mut self, dest: &mut [u8]) -> BootResult<EntryPoint> {
        self.sequencer.run(&mut self.bus, &self.config)?;

        self.sink.put_bytes(b"LOAD\r\n");
        loader::load_range(&mut self.bus, &self.config, dest, &mut self.sink)?;
        self.sink.put_bytes(b"\r\nBOOT!\r\n");

        Ok(EntryPoint::new(dest.as_ptr() as usize))
    }

    /// Borrow the diagnostic sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Borrow the transport.
    pub fn bus(&self) -> &SpiBus<P> {
        &self.bus
    }

    /// State of the bring-up machine, for diagnostics.
    pub fn init_state(&self) -> crate::init::InitState {
        self.sequencer.state()
    }

    /// Firmware front door: run the boot path and never return.
    ///
    /// On success, control transfers to the loaded image; on failure (or if
    /// the image returns) the CPU parks forever.
    ///
    /// # Safety
    ///
    /// `dest` must be the executable memory region the image is linked for;
    /// its contents are executed unverified after a successful load.
    pub unsafe fn boot(mut self, dest: &'static mut [u8]) -> ! {
        match self.run(dest) {
            // SAFETY: caller guarantees `dest` is the executable region the
            // image targets.
            Ok(entry) => unsafe { entry.launch() },
            Err(_) => sdboot_hal::cpu::park(),
        }
    }
}
