//! # Simulated Card
//!
//! A bit-level SPI slave for the test suite. It decodes the same line
//! transitions the transport produces (sample data-out on the rising clock
//! edge, present data-in MSB-first), runs a small SD command state machine
//! behind the shift registers, and records everything the host put on the
//! wire. Failure modes are scriptable per test: wrong reset reply, delayed
//! or absent replies, rejected reads, a withheld data token.

use std::collections::{BTreeMap, VecDeque};

use sdboot_hal::{ByteSink, Lines, LinkPins};

use crate::{BLOCK_LEN, FILLER};

/// Scriptable SD card behind a simulated link.
pub(crate) struct SimCard {
    // Line-level state.
    lines: Lines,
    miso: bool,
    bit_count: u8,
    shift_in: u8,
    shift_out: u8,
    out_queue: VecDeque<u8>,
    frame: Vec<u8>,

    // Recorded traffic.
    /// Every byte the host clocked out, in order.
    pub wire: Vec<u8>,
    /// Read-block indices in the order they were issued.
    pub reads: Vec<u32>,

    // Scripting knobs.
    /// Reply to GO_IDLE_STATE.
    pub reset_reply: u8,
    /// Reply to SEND_IF_COND.
    pub if_cond_reply: u8,
    /// Filler bytes clocked before each status reply.
    pub reply_delay: usize,
    /// ACMD41 attempt on which the card reports ready (`u32::MAX` = never).
    pub acmd41_accept_after: u32,
    /// Reject the read of this block with this status byte.
    pub read_reject: Option<(u32, u8)>,
    /// Accept reads but never send the data-start token.
    pub withhold_token: bool,
    /// Filler bytes between a read's status reply and its data token.
    pub token_gap: usize,

    acmd41_attempts: u32,
    blocks: BTreeMap<u32, [u8; BLOCK_LEN]>,
}

impl SimCard {
    pub fn new() -> Self {
        Self {
            lines: Lines::empty(),
            miso: false,
            bit_count: 0,
            shift_in: 0,
            shift_out: FILLER,
            out_queue: VecDeque::new(),
            frame: Vec::new(),
            wire: Vec::new(),
            reads: Vec::new(),
            reset_reply: 0x01,
            if_cond_reply: 0x01,
            reply_delay: 1,
            acmd41_accept_after: 1,
            read_reject: None,
            withhold_token: false,
            token_gap: 2,
            acmd41_attempts: 0,
            blocks: BTreeMap::new(),
        }
    }

    /// ACMD41 attempts observed so far.
    pub fn acmd41_attempts(&self) -> u32 {
        self.acmd41_attempts
    }

    /// Store a block's contents.
    pub fn set_block(&mut self, index: u32, data: [u8; BLOCK_LEN]) {
        self.blocks.insert(index, data);
    }

    /// Fill `count` blocks starting at `first` with the deterministic pattern.
    pub fn load_pattern(&mut self, first: u32, count: u32) {
        for index in first..first + count {
            self.set_block(index, Self::pattern_block(index));
        }
    }

    /// Deterministic per-block test pattern.
    pub fn pattern_block(index: u32) -> [u8; BLOCK_LEN] {
        let mut data = [0u8; BLOCK_LEN];
        for (i, slot) in data.iter_mut().enumerate() {
            *slot = (index as usize)
                .wrapping_mul(31)
                .wrapping_add(i.wrapping_mul(7)) as u8;
        }
        data
    }

    fn respond(&mut self, byte: u8) {
        self.out_queue.push_back(byte);
    }

    fn byte_received(&mut self, byte: u8) {
        self.wire.push(byte);
        if !self.frame.is_empty() {
            self.frame.push(byte);
            if self.frame.len() == 6 {
                let frame: Vec<u8> = core::mem::take(&mut self.frame);
                self.execute(&frame);
            }
        } else if byte & 0xC0 == 0x40 {
            self.frame.push(byte);
        }
        // Anything else is filler; replies already sit in the out queue.
    }

    fn execute(&mut self, frame: &[u8]) {
        let index = frame[0] & 0x3F;
        let arg = u32::from_be_bytes([frame[1], frame[2], frame[3], frame[4]]);

        for _ in 0..self.reply_delay {
            self.respond(FILLER);
        }

        match index {
            0 => {
                let r = self.reset_reply;
                self.respond(r);
            }
            8 => {
                let r = self.if_cond_reply;
                self.respond(r);
                // R7 trailer: voltage accepted, check pattern echoed.
                for b in [0x00, 0x00, 0x01, 0xAA] {
                    self.respond(b);
                }
            }
            55 => self.respond(0x01),
            41 => {
                self.acmd41_attempts += 1;
                let r = if self.acmd41_attempts >= self.acmd41_accept_after {
                    0x00
                } else {
                    0x01
                };
                self.respond(r);
            }
            17 => self.execute_read(arg),
            _ => self.respond(0x04), // illegal command
        }
    }

    fn execute_read(&mut self, block: u32) {
        self.reads.push(block);
        if let Some((bad, status)) = self.read_reject {
            if bad == block {
                self.respond(status);
                return;
            }
        }
        self.respond(0x00);
        if self.withhold_token {
            return;
        }
        for _ in 0..self.token_gap {
            self.respond(FILLER);
        }
        self.respond(crate::token::DATA_START);
        let data = self.blocks.get(&block).copied().unwrap_or([0; BLOCK_LEN]);
        for b in data {
            self.respond(b);
        }
        // Block checksum; the host clocks it off and drops it.
        self.respond(0xAA);
        self.respond(0x55);
    }
}

impl LinkPins for SimCard {
    fn drive(&mut self, lines: Lines) {
        let rising = lines.contains(Lines::CLOCK) && !self.lines.contains(Lines::CLOCK);
        self.lines = lines;
        if !rising {
            return;
        }

        if self.bit_count == 0 {
            self.shift_out = self.out_queue.pop_front().unwrap_or(FILLER);
        }
        self.miso = (self.shift_out >> (7 - self.bit_count)) & 1 != 0;
        self.shift_in = (self.shift_in << 1) | u8::from(lines.contains(Lines::DATA_OUT));
        self.bit_count += 1;

        if self.bit_count == 8 {
            self.bit_count = 0;
            let byte = self.shift_in;
            self.shift_in = 0;
            self.byte_received(byte);
        }
    }

    fn sense(&mut self) -> bool {
        self.miso
    }
}

/// Diagnostic sink capturing the marker stream.
pub(crate) struct RecordingSink {
    /// Everything emitted, in order.
    pub bytes: Vec<u8>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }
}

impl ByteSink for RecordingSink {
    fn put(&mut self, byte: u8) {
        self.bytes.push(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::SpiBus;

    #[test]
    fn card_echoes_queued_bytes_bit_for_bit() {
        let mut card = SimCard::new();
        card.out_queue.extend([0xA5, 0x3C]);
        let mut bus = SpiBus::new(card);

        assert_eq!(bus.transfer(0xFF), 0xA5);
        assert_eq!(bus.transfer(0xFF), 0x3C);
        assert_eq!(bus.transfer(0xFF), 0xFF); // queue drained
    }

    #[test]
    fn card_reassembles_host_bytes() {
        let card = SimCard::new();
        let mut bus = SpiBus::new(card);
        bus.transfer(0x51);
        bus.transfer(0x00);
        assert_eq!(bus.pins().wire, vec![0x51, 0x00]);
    }
}
