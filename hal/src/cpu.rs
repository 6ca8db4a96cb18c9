//! # CPU Primitives
//!
//! There are no interrupts and no scheduler on the boot path; the only CPU
//! operations the core needs are a spin hint and a terminal park state.

/// Hint the CPU that we are busy-waiting.
#[inline(always)]
pub fn pause() {
    core::hint::spin_loop();
}

/// Park the CPU forever.
///
/// Terminal state for both boot failure and a loaded image that returns.
/// There is no retry and no exit; the system stays here until reset.
pub fn park() -> ! {
    loop {
        pause();
    }
}
