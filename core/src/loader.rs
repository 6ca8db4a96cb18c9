//! # Block Loader
//!
//! Streams the image into the destination region one block at a time:
//! CMD17 per block, wait for the data-start token, clock 512 payload bytes
//! in, clock the 2-byte block checksum out of the way. The checksum is
//! deliberately not verified: a corrupted block is accepted silently,
//! trading integrity checking for boot-time simplicity.

use sdboot_hal::{ByteSink, LinkPins};

use crate::bus::SpiBus;
use crate::command::CommandFrame;
use crate::config::BootConfig;
use crate::error::{BootError, BootResult};
use crate::{cmd, crc, reply, token, BLOCK_CRC_LEN, BLOCK_LEN};

/// A progress mark goes to the diagnostic sink every this many blocks.
pub const PROGRESS_INTERVAL: u32 = 16;

/// Load the policy's block range into `dest`, in strictly ascending order.
///
/// `dest` must hold at least [`LoadPolicy::byte_len`](crate::config::LoadPolicy::byte_len)
/// bytes; the loader owns
/// it exclusively until it returns. Any rejected read aborts the whole load
/// before the next block is attempted; there is no partial-success state.
pub fn load_range<P: LinkPins, S: ByteSink>(
    bus: &mut SpiBus<P>,
    config: &BootConfig,
    dest: &mut [u8],
    sink: &mut S,
) -> BootResult<()> {
    let policy = &config.policy;
    assert!(
        dest.len() >= policy.byte_len(),
        "destination region smaller than the load policy"
    );

    let first = policy.first_block.get();
    for (offset, block) in (first..first + policy.block_count).enumerate() {
        read_block(
            bus,
            block,
            &mut dest[offset * BLOCK_LEN..(offset + 1) * BLOCK_LEN],
            config.token_poll_limit,
        )?;
        if block % PROGRESS_INTERVAL == 0 {
            sink.put(b'.');
        }
    }
    log::debug!("loaded {} blocks from block {}", policy.block_count, first);
    Ok(())
}

/// Read one 512-byte block into `dest`.
fn read_block<P: LinkPins>(
    bus: &mut SpiBus<P>,
    block: u32,
    dest: &mut [u8],
    token_poll_limit: u32,
) -> BootResult<()> {
    let status = bus.send_command(CommandFrame::new(cmd::READ_SINGLE_BLOCK, block, crc::DUMMY));
    if status.raw() != reply::READY {
        return Err(BootError::BlockReadReject {
            block,
            reply: status.raw(),
        });
    }

    wait_data_token(bus, block, token_poll_limit)?;

    for slot in dest.iter_mut() {
        *slot = bus.transfer(crate::FILLER);
    }

    // Block checksum: clocked off the wire, never checked.
    for _ in 0..BLOCK_CRC_LEN {
        bus.clock_filler();
    }
    Ok(())
}

/// Poll for the data-start token, bounded by `limit` filler transfers.
fn wait_data_token<P: LinkPins>(bus: &mut SpiBus<P>, block: u32, limit: u32) -> BootResult<()> {
    for _ in 0..limit {
        if bus.transfer(crate::FILLER) == token::DATA_START {
            return Ok(());
        }
    }
    Err(BootError::DataTokenTimeout { block })
}
