//! # Load Policy and Retry Bounds
//!
//! Everything tunable on the boot path lives here: which blocks hold the
//! image and how long the two bounded waits run. Defaults load 128 blocks
//! (64 KiB) starting at block 1.

use core::num::NonZeroU32;

use crate::BLOCK_LEN;

/// Block range holding the loadable image.
///
/// The first block is non-zero by construction: block 0 carries the
/// partition table and is never read by the boot path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPolicy {
    /// First block of the image.
    pub first_block: NonZeroU32,
    /// Number of consecutive blocks to read.
    pub block_count: u32,
}

impl LoadPolicy {
    /// Policy for `block_count` blocks starting at `first_block`.
    #[must_use]
    pub const fn new(first_block: NonZeroU32, block_count: u32) -> Self {
        Self {
            first_block,
            block_count,
        }
    }

    /// Total bytes the policy loads.
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        self.block_count as usize * BLOCK_LEN
    }
}

impl Default for LoadPolicy {
    /// Blocks 1..=128: 64 KiB, skipping the partition table in block 0.
    fn default() -> Self {
        Self {
            first_block: NonZeroU32::MIN,
            block_count: 128,
        }
    }
}

/// Boot-path configuration: load policy plus the two retry bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootConfig {
    /// Which blocks to load.
    pub policy: LoadPolicy,
    /// Bound on CMD55/ACMD41 pairs during capacity negotiation.
    pub negotiation_attempt_limit: u32,
    /// Bound on filler polls while waiting for the data-start token.
    ///
    /// A silent card would otherwise hang the load invisibly; the bound
    /// turns that into a distinct, reportable error. The wait itself still
    /// clocks plain filler bytes.
    pub token_poll_limit: u32,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            policy: LoadPolicy::default(),
            negotiation_attempt_limit: 20_000,
            token_poll_limit: 100_000,
        }
    }
}
