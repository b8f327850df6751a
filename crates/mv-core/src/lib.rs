//! Instruction decode/execute core for the Eclipse MV minicomputer family.
//!
//! Three overlapping instruction sets share a 16-bit first word: the legacy
//! accumulator machine, the extended-register set and the 32-bit wide set.
//! This crate owns the descriptor table, the opcode classifier, the operand
//! decoder, the addressing-mode resolver, the execution dispatch with both
//! hardware stack disciplines, and the interrupt/fault protocol. Memory and
//! the peripheral bus are collaborators consumed through the [`MemoryBus`]
//! and [`IoBus`] contracts.

/// Physical address model: rings, offsets, byte pointers.
pub mod addr;
pub use addr::{Address, NO_ATU_MASK, OFFSET_MASK, PHYS_MASK, RING_MASK, SEGMENT_COUNT};

/// Error taxonomy for fatal and stop-worthy conditions.
pub mod fault;
pub use fault::{CpuError, StackFault, StackFaultCode};

/// Instruction descriptors for the three instruction sets.
pub mod isa;
pub use isa::{InstrClass, InstrDescriptor, InstrFormat, InstrIndex, INSTRUCTION_TABLE};

/// Start-up-built opcode classification.
pub mod classify;
pub use classify::OpcodeClassifier;

/// Operand decode pipeline and disassembly.
pub mod decode;
pub use decode::{AddrMode, DecodedInstruction, Decoder, OperandPayload, Radix};

/// Effective-address resolution with bounded indirection chains.
pub mod resolve;
pub use resolve::{resolve_15bit, resolve_31bit, resolve_8bit, resolve_byte};

/// Memory collaborator contract and the flat reference implementation.
pub mod memory;
pub use memory::{FlatMemory, MemoryBus};

/// Peripheral bus collaborator contract.
pub mod bus;
pub use bus::{IoBus, IoFlag, IoReg, IoTest, NullBus, DEV_CPU};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{CpuState, SbrEntry, StackPhase, PSW_OVK, PSW_OVR};

/// Floating-point wire format conversion.
pub mod fp;

/// The two hardware call-stack disciplines and their fault protocol.
pub mod stack;
pub use stack::{wsp_check_bounds, NARROW_FAULT_VECTOR, WIDE_FAULT_VECTOR};

/// Instruction execution dispatch.
pub mod execute;
pub use execute::Flow;

/// Interrupt controller.
pub mod interrupt;

/// The processor instance and run loop.
pub mod cpu;
pub use cpu::{Cpu, CpuConfig, RunOptions, RunReport, StopReason};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
