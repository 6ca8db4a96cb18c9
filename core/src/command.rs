//! # Command Framer
//!
//! Builds the fixed 6-byte command frame, clocks it out, and polls for the
//! 1-byte status reply. Polling is bounded at [`REPLY_POLL_LIMIT`] filler
//! transfers; that bound is the only timeout the wire protocol itself has.

use bitflags::bitflags;
use sdboot_hal::LinkPins;

use crate::bus::SpiBus;
use crate::{reply, FILLER};

/// Length of a command frame on the wire.
pub const FRAME_LEN: usize = 6;

/// Framing marker OR'd onto every command index (start + transmission bits).
pub const FRAME_MARKER: u8 = 0x40;

/// Maximum filler transfers while polling for a status reply.
pub const REPLY_POLL_LIMIT: usize = 16;

/// One command exchange: 6-bit index, 32-bit argument, 8-bit checksum.
///
/// Immutable once constructed; lives only for the duration of the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    index: u8,
    argument: u32,
    checksum: u8,
}

impl CommandFrame {
    /// Build a frame. The index is masked to its 6 protocol bits.
    #[must_use]
    pub const fn new(index: u8, argument: u32, checksum: u8) -> Self {
        Self {
            index: index & 0x3F,
            argument,
            checksum,
        }
    }

    /// Wire representation: marker+index, argument MSB-first, checksum.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; FRAME_LEN] {
        let arg = self.argument.to_be_bytes();
        [
            FRAME_MARKER | self.index,
            arg[0],
            arg[1],
            arg[2],
            arg[3],
            self.checksum,
        ]
    }
}

bitflags! {
    /// Protocol-defined bits of an R1 status reply.
    ///
    /// Diagnostics only: acceptance logic looks at the not-ready bit and the
    /// exact values 0x00/0x01, never at individual error bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct R1Flags: u8 {
        /// Card is in the idle state.
        const IDLE = 0x01;
        /// Erase sequence was cleared by an out-of-sequence command.
        const ERASE_RESET = 0x02;
        /// Command index not recognized.
        const ILLEGAL_COMMAND = 0x04;
        /// Frame checksum rejected.
        const CRC_ERROR = 0x08;
        /// Error in the erase command sequence.
        const ERASE_SEQUENCE_ERROR = 0x10;
        /// Misaligned address.
        const ADDRESS_ERROR = 0x20;
        /// Argument outside the card's range.
        const PARAMETER_ERROR = 0x40;
    }
}

/// One-byte status reply returned after a command frame.
///
/// Bit 7 clear means the card answered; otherwise the value is the last
/// filler sampled from the wire and must not be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReply(u8);

impl StatusReply {
    /// Wrap a raw reply byte.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// The raw reply byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Did the card produce a reply at all (bit 7 clear)?
    #[must_use]
    pub const fn is_ready(self) -> bool {
        self.0 & reply::NOT_READY_MASK == 0
    }

    /// Decoded R1 bits, valid only when [`is_ready`](Self::is_ready).
    #[must_use]
    pub const fn flags(self) -> R1Flags {
        R1Flags::from_bits_truncate(self.0)
    }
}

impl<P: LinkPins> SpiBus<P> {
    /// Transmit one command frame and poll for its status reply.
    ///
    /// Drops select with the data line idle, clocks one synchronization
    /// filler byte, sends the 6 frame bytes, then polls up to
    /// [`REPLY_POLL_LIMIT`] times. If the card never answers, the last
    /// sampled byte (not-ready bit still set) is returned as the sentinel;
    /// callers must check [`StatusReply::is_ready`] before trusting it.
    pub fn send_command(&mut self, frame: CommandFrame) -> StatusReply {
        self.engage();
        self.clock_filler();
        for byte in frame.to_bytes() {
            self.transfer(byte);
        }
        let mut status = StatusReply::from_raw(FILLER);
        for _ in 0..REPLY_POLL_LIMIT {
            status = StatusReply::from_raw(self.transfer(FILLER));
            if status.is_ready() {
                break;
            }
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimCard;
    use crate::{cmd, crc};

    #[test]
    fn frame_bytes_are_marker_argument_checksum() {
        let frame = CommandFrame::new(cmd::READ_SINGLE_BLOCK, 0xDEAD_BEEF, crc::DUMMY);
        assert_eq!(
            frame.to_bytes(),
            [0x51, 0xDE, 0xAD, 0xBE, 0xEF, 0xFF]
        );
    }

    #[test]
    fn index_is_masked_to_six_bits() {
        let frame = CommandFrame::new(0xFF, 0, 0);
        assert_eq!(frame.to_bytes()[0], FRAME_MARKER | 0x3F);
    }

    #[test]
    fn transmits_exactly_six_frame_bytes_after_sync() {
        let card = SimCard::new();
        let mut bus = SpiBus::new(card);
        bus.send_command(CommandFrame::new(cmd::SEND_IF_COND, 0x1AA, crc::SEND_IF_COND));

        let wire = &bus.pins().wire;
        assert_eq!(wire[0], 0xFF, "sync padding byte");
        assert_eq!(wire[1..7], [0x48, 0x00, 0x00, 0x01, 0xAA, 0x87]);
    }

    #[test]
    fn polls_at_most_sixteen_times_then_returns_sentinel() {
        let mut card = SimCard::new();
        card.reply_delay = 40; // longer than the poll bound
        let mut bus = SpiBus::new(card);
        let status = bus.send_command(CommandFrame::new(cmd::GO_IDLE_STATE, 0, crc::GO_IDLE_STATE));

        assert!(!status.is_ready());
        // 1 sync + 6 frame + 16 polls, nothing more.
        assert_eq!(bus.pins().wire.len(), 1 + FRAME_LEN + REPLY_POLL_LIMIT);
    }

    #[test]
    fn stops_polling_on_first_ready_reply() {
        let mut card = SimCard::new();
        card.reply_delay = 3;
        let mut bus = SpiBus::new(card);
        let status = bus.send_command(CommandFrame::new(cmd::GO_IDLE_STATE, 0, crc::GO_IDLE_STATE));

        assert!(status.is_ready());
        assert_eq!(status.raw(), crate::reply::IDLE);
        // 1 sync + 6 frame + 3 filler polls + the reply itself.
        assert_eq!(bus.pins().wire.len(), 1 + FRAME_LEN + 4);
    }

    #[test]
    fn reply_flags_decode() {
        let status = StatusReply::from_raw(0x05);
        assert!(status.is_ready());
        assert!(status.flags().contains(R1Flags::IDLE));
        assert!(status.flags().contains(R1Flags::ILLEGAL_COMMAND));
        assert!(!StatusReply::from_raw(0xFF).is_ready());
    }
}
