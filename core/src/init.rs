//! # Initialization Sequencer
//!
//! Drives the card from power-up into the ready state:
//! Idle → Wake → Reset → VoltageCheck → CapacityNegotiation → Ready, with
//! Fault as the single terminal failure state. The capacity-negotiation
//! loop is the only bounded busy-wait retry in the bring-up.

use sdboot_hal::LinkPins;

use crate::bus::SpiBus;
use crate::command::CommandFrame;
use crate::config::BootConfig;
use crate::error::{BootError, BootResult};
use crate::{cmd, crc, reply, IF_COND_ARG, IF_COND_TRAILER_LEN, OCR_HIGH_CAPACITY, WAKE_CLOCK_BYTES};

/// States of the bring-up machine, in driving order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// Nothing has happened yet.
    Idle,
    /// Clocking the power-up dummy bytes.
    Wake,
    /// Waiting for the card to acknowledge GO_IDLE_STATE.
    Reset,
    /// Probing the voltage/interface condition (reply ignored).
    VoltageCheck,
    /// Looping CMD55/ACMD41 until the card leaves idle.
    CapacityNegotiation,
    /// The card accepted negotiation; block reads may begin.
    Ready,
    /// Terminal failure; control passes to the failure path.
    Fault,
}

/// Card bring-up state machine.
#[derive(Debug)]
pub struct Sequencer {
    state: InitState,
}

impl Sequencer {
    /// A sequencer that has not run yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: InitState::Idle,
        }
    }

    /// Current state, for diagnostics.
    #[must_use]
    pub const fn state(&self) -> InitState {
        self.state
    }

    /// Run the bring-up to completion.
    ///
    /// Ends in `Ready` on success and `Fault` on any error; a faulted
    /// sequencer is not reusable (the policy is halt, not retry).
    pub fn run<P: LinkPins>(&mut self, bus: &mut SpiBus<P>, config: &BootConfig) -> BootResult<()> {
        match self.drive(bus, config) {
            Ok(()) => {
                self.state = InitState::Ready;
                log::info!("card ready");
                Ok(())
            }
            Err(e) => {
                self.state = InitState::Fault;
                log::warn!("card bring-up failed: {e}");
                Err(e)
            }
        }
    }

    fn drive<P: LinkPins>(&mut self, bus: &mut SpiBus<P>, config: &BootConfig) -> BootResult<()> {
        // Power-up: select high, data high, at least 74 clocks before any
        // command. Select drops during the actual byte clocking.
        self.state = InitState::Wake;
        bus.release();
        for _ in 0..WAKE_CLOCK_BYTES {
            bus.clock_filler();
        }

        self.state = InitState::Reset;
        let status =
            bus.send_command(CommandFrame::new(cmd::GO_IDLE_STATE, 0, crc::GO_IDLE_STATE));
        if status.raw() != reply::IDLE {
            return Err(BootError::ProtocolReject {
                reply: status.raw(),
            });
        }
        log::debug!("card entered idle state");

        // Older cards reject this command harmlessly; the reply is not
        // validated, but the 4-byte response trailer must leave the wire.
        self.state = InitState::VoltageCheck;
        let _ = bus.send_command(CommandFrame::new(cmd::SEND_IF_COND, IF_COND_ARG, crc::SEND_IF_COND));
        for _ in 0..IF_COND_TRAILER_LEN {
            bus.clock_filler();
        }

        self.state = InitState::CapacityNegotiation;
        for attempt in 1..=config.negotiation_attempt_limit {
            let _ = bus.send_command(CommandFrame::new(cmd::APP_CMD, 0, crc::DUMMY));
            let status = bus.send_command(CommandFrame::new(
                cmd::SD_SEND_OP_COND,
                OCR_HIGH_CAPACITY,
                crc::DUMMY,
            ));
            if status.raw() == reply::READY {
                log::debug!("capacity negotiation complete after {attempt} attempts");
                return Ok(());
            }
        }
        Err(BootError::NegotiationTimeout {
            attempts: config.negotiation_attempt_limit,
        })
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}
