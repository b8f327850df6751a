//! Error taxonomy for the CPU core.
//!
//! Everything the reference hardware handled by halting the machine is a
//! typed [`CpuError`] here; the host decides whether to abort, log and halt,
//! or drop into a debugger. Stack faults are deliberately *not* part of this
//! taxonomy: they are recovered in-band by the stack fault protocol and never
//! surface to the caller.

use thiserror::Error;

/// Fatal or stop-worthy conditions surfaced through `run`/`execute_one`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    /// The opcode at `pc` matched no instruction descriptor.
    #[error("no instruction matches opcode {opcode:#08o} at {pc:#010o}")]
    DecodeFailed {
        /// Physical address of the failing fetch.
        pc: u32,
        /// The unmatched first word.
        opcode: u16,
    },
    /// A classified instruction reached dispatch without a handler.
    #[error("instruction {mnemonic} is not implemented")]
    Unimplemented {
        /// Mnemonic of the offending instruction.
        mnemonic: &'static str,
    },
    /// An indirection chain exceeded the configured hop limit.
    #[error("indirection chain exceeded {limit} hops at {addr:#010o}")]
    IndirectionLimit {
        /// Last address fetched before giving up.
        addr: u32,
        /// Configured hop limit.
        limit: u32,
    },
    /// A fallible memory access failed mid-instruction.
    #[error("memory access out of range at {addr:#010o}")]
    MemoryFault {
        /// The out-of-range word address.
        addr: u32,
    },
}

/// Numeric codes reported to the stack-fault handler in AC1.
///
/// These values are part of the machine's software contract: existing
/// program images test them by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StackFaultCode {
    /// Growth would pass the stack limit.
    Overflow = 0,
    /// A save-type operation detected the overflow before committing.
    Pending = 1,
    /// Shrink would pass the stack base.
    Underflow = 2,
}

impl StackFaultCode {
    /// The code value delivered to the handler.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// A detected stack bounds violation: a primary code plus, for save-type
/// operations, the secondary condition the save pre-check absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackFault {
    /// Code delivered in the low half of AC1.
    pub primary: StackFaultCode,
    /// Secondary condition delivered in the high half of AC1, if any.
    pub secondary: Option<StackFaultCode>,
}

impl StackFault {
    /// A plain single-code fault.
    #[must_use]
    pub const fn of(primary: StackFaultCode) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// A save-type pending fault wrapping the underlying condition.
    #[must_use]
    pub const fn pending(secondary: StackFaultCode) -> Self {
        Self {
            primary: StackFaultCode::Pending,
            secondary: Some(secondary),
        }
    }

    /// Packs the fault pair into the AC1 word given to the handler.
    #[must_use]
    pub fn ac1_word(self) -> u32 {
        let mut word = u32::from(self.primary.as_u16());
        if let Some(secondary) = self.secondary {
            word |= u32::from(secondary.as_u16()) << 16;
        }
        word
    }
}

#[cfg(test)]
mod tests {
    use super::{StackFault, StackFaultCode};

    #[test]
    fn plain_fault_packs_primary_only() {
        let fault = StackFault::of(StackFaultCode::Underflow);
        assert_eq!(fault.ac1_word(), 2);
    }

    #[test]
    fn pending_fault_packs_both_codes() {
        let fault = StackFault::pending(StackFaultCode::Overflow);
        assert_eq!(fault.primary, StackFaultCode::Pending);
        assert_eq!(fault.ac1_word(), 1);
    }

    #[test]
    fn pending_underflow_keeps_secondary_in_high_half() {
        let fault = StackFault::pending(StackFaultCode::Underflow);
        assert_eq!(fault.ac1_word(), (2 << 16) | 1);
    }
}
