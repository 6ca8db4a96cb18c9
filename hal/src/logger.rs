//! # UART Logger
//!
//! `log` facade backend for the diagnostic UART. The boot core logs through
//! the `log` macros; this module renders those records onto the same UART
//! that carries the one-character boot markers. The UART sits behind a
//! `spin::Mutex` so the logger can live in a static.

use core::fmt::{self, Write as _};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

use crate::console::{ByteSink, MmioUart};

/// `log::Log` implementation writing to a memory-mapped UART.
#[derive(Debug)]
pub struct UartLogger {
    uart: Mutex<Option<MmioUart>>,
}

impl UartLogger {
    /// Create an empty logger; it stays silent until [`init`] hands it a UART.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            uart: Mutex::new(None),
        }
    }
}

impl Default for UartLogger {
    fn default() -> Self {
        Self::new()
    }
}

static LOGGER: UartLogger = UartLogger::new();

/// Install the UART logger as the global `log` backend.
///
/// Fails if a logger is already installed.
pub fn init(uart: MmioUart, level: LevelFilter) -> Result<(), SetLoggerError> {
    *LOGGER.uart.lock() = Some(uart);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

impl Log for UartLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut guard = self.uart.lock();
        if let Some(uart) = guard.as_mut() {
            let _ = writeln!(SinkWriter(uart), "[{:5}] {}\r", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Adapter from `core::fmt::Write` onto a byte sink.
struct SinkWriter<'a, S: ByteSink>(&'a mut S);

impl<S: ByteSink> fmt::Write for SinkWriter<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.put_bytes(s.as_bytes());
        Ok(())
    }
}
