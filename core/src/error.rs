//! # Boot Failure Taxonomy
//!
//! Every failure on the boot path is terminal at this layer: the policy is
//! abort the whole load, report once, park forever. The variants exist so
//! the report and the logs can say which stage gave up.

use core::fmt;

/// Errors that can abort the boot path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BootError {
    /// The card replied with an unexpected status during reset.
    ProtocolReject {
        /// The raw status byte received.
        reply: u8,
    },

    /// Capacity negotiation exhausted its bounded retry count.
    NegotiationTimeout {
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// A read-block command was rejected.
    BlockReadReject {
        /// Block index whose read was rejected.
        block: u32,
        /// The raw status byte received.
        reply: u8,
    },

    /// The data-start token never appeared within the poll bound.
    ///
    /// Without the bound a silent card would hang the load invisibly;
    /// with it, the condition is a reportable failure like any other.
    DataTokenTimeout {
        /// Block index being waited on.
        block: u32,
    },
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProtocolReject { reply } => {
                write!(f, "card rejected reset, status {reply:#04x}")
            }

            Self::NegotiationTimeout { attempts } => {
                write!(f, "capacity negotiation gave up after {attempts} attempts")
            }

            Self::BlockReadReject { block, reply } => {
                write!(f, "read of block {block} rejected, status {reply:#04x}")
            }

            Self::DataTokenTimeout { block } => {
                write!(f, "no data token for block {block} within the poll bound")
            }
        }
    }
}

/// Result type for boot-path operations.
pub type BootResult<T> = Result<T, BootError>;
