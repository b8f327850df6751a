//! Instruction execution dispatch.
//!
//! One handler module per instruction class. Handlers mutate CPU state and
//! talk to the memory and bus collaborators; the dispatcher owns the generic
//! PC advance so transfer-of-control handlers can return early with
//! [`Flow::Jump`]. Stack faults are handled entirely in here via the stack
//! fault protocol and never escape as errors.

mod eagle_fpu;
mod eagle_io;
mod eagle_mem;
mod eagle_op;
mod eagle_pc;
mod eagle_stack;
mod eclipse_mem;
mod eclipse_op;
mod eclipse_pc;
mod eclipse_stack;
pub mod helpers;
mod nova_io;
mod nova_mem;
mod nova_op;
mod nova_pc;

use crate::bus::IoBus;
use crate::decode::DecodedInstruction;
use crate::fault::CpuError;
use crate::isa::InstrClass;
use crate::memory::MemoryBus;
use crate::state::CpuState;

/// What the program counter should do after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Advance past the instruction.
    Advance,
    /// Advance past the instruction and the following word.
    Skip,
    /// The handler set the program counter itself.
    Jump,
    /// Stop the run loop cleanly; the program counter has advanced.
    Halt,
}

/// Executes one decoded instruction against the CPU state and collaborators.
///
/// `limit` is the configured indirection hop bound.
///
/// # Errors
///
/// [`CpuError::Unimplemented`] for an instruction index no handler claims,
/// plus whatever the handlers surface ([`CpuError::IndirectionLimit`],
/// [`CpuError::MemoryFault`]).
pub fn execute(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    bus: &mut dyn IoBus,
    limit: u32,
    instr: &DecodedInstruction,
) -> Result<Flow, CpuError> {
    let flow = match instr.class {
        InstrClass::NovaMemRef => nova_mem::execute(state, mem, limit, instr),
        InstrClass::NovaOp => nova_op::execute(state, instr),
        InstrClass::NovaIo => nova_io::execute(state, bus, instr),
        InstrClass::NovaPc => nova_pc::execute(state, mem, limit, instr),
        InstrClass::EclipseMemRef => eclipse_mem::execute(state, mem, limit, instr),
        InstrClass::EclipseOp => eclipse_op::execute(state, mem, instr),
        InstrClass::EclipsePc => eclipse_pc::execute(state, mem, limit, instr),
        InstrClass::EclipseStack => eclipse_stack::execute(state, mem, limit, instr),
        InstrClass::EagleMemRef => eagle_mem::execute(state, mem, limit, instr),
        InstrClass::EagleOp => eagle_op::execute(state, instr),
        InstrClass::EaglePc => eagle_pc::execute(state, mem, limit, instr),
        InstrClass::EagleStack => eagle_stack::execute(state, mem, limit, instr),
        InstrClass::EagleIo => eagle_io::execute(state, bus, instr),
        InstrClass::EagleFpu => eagle_fpu::execute(state, mem, limit, instr),
    }?;

    match flow {
        Flow::Advance | Flow::Halt => {
            state.set_pc(state.pc().advance(u32::from(instr.len)));
        }
        Flow::Skip => {
            state.set_pc(state.pc().advance(u32::from(instr.len) + 1));
        }
        Flow::Jump => {}
    }
    Ok(flow)
}
