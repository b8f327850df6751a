//! The two hardware call-stack disciplines.
//!
//! The narrow stack predates the wide set: 16-bit cells, pointer and limit
//! living only in the fixed page-zero cells of the current segment. The wide
//! stack uses 32-bit cells with its pointer, frame, limit and base registers
//! held in the CPU and mirrored to page zero only on explicit saves and on
//! faults.
//!
//! The wide-stack fault protocol is binary-compatible with existing program
//! images: the recovery block shape, the push/pop symmetry and the
//! frame-size encoding must not change. Block layout, pushed bottom-up:
//! status word (argument count in the low half), AC0, AC1, AC2, old frame
//! pointer, tagged return word (carry in the top bit, return address in the
//! low 31).

use log::debug;

use crate::addr::Address;
use crate::fault::{CpuError, StackFault, StackFaultCode};
use crate::memory::MemoryBus;
use crate::resolve::{resolve_vector_dword, resolve_vector_word};
use crate::state::{CpuState, StackPhase};

/// Page-zero cell of the wide stack-fault vector (doubleword).
pub const WIDE_FAULT_VECTOR: u32 = 0o14;
/// Page-zero mirror of the wide frame pointer (doubleword).
pub const WFP_LOC: u32 = 0o20;
/// Page-zero mirror of the wide stack pointer (doubleword).
pub const WSP_LOC: u32 = 0o22;
/// Page-zero mirror of the wide stack limit (doubleword).
pub const WSL_LOC: u32 = 0o24;
/// Page-zero mirror of the wide stack base (doubleword).
pub const WSB_LOC: u32 = 0o26;

/// Page-zero home of the narrow stack pointer.
pub const NSP_LOC: u32 = 0o40;
/// Page-zero home of the narrow frame pointer.
pub const NFP_LOC: u32 = 0o41;
/// Page-zero home of the narrow stack limit.
pub const NSL_LOC: u32 = 0o42;
/// Page-zero cell of the narrow stack-fault vector (word).
pub const NARROW_FAULT_VECTOR: u32 = 0o43;

/// Top bit of a tagged return word: the saved carry flag.
pub const RETURN_CARRY_BIT: u32 = 0x8000_0000;

// --- wide stack -------------------------------------------------------

/// Pushes one doubleword cell.
pub fn ws_push(state: &mut CpuState, mem: &mut dyn MemoryBus, value: u32) {
    let wsp = state.wsp().wrapping_add(2);
    state.set_wsp(wsp);
    mem.write_dword(wsp, value);
}

/// Pops one doubleword cell.
pub fn ws_pop(state: &mut CpuState, mem: &dyn MemoryBus) -> u32 {
    let wsp = state.wsp();
    let value = mem.read_dword(wsp);
    state.set_wsp(wsp.wrapping_sub(2));
    value
}

/// Bounds pre-check for an operation growing or shrinking the wide stack by
/// `delta` cells. A zero delta never faults. Save-type operations report the
/// violation as pending rather than as an immediate fault, so the save's
/// own block push can still be redirected by the handler dispatch.
///
/// # Errors
///
/// The detected [`StackFault`] pair.
pub fn wsp_check_bounds(state: &CpuState, delta: i32, save: bool) -> Result<(), StackFault> {
    if delta == 0 {
        return Ok(());
    }
    let prospective = state
        .wsp()
        .wrapping_add_signed(delta.wrapping_mul(2));
    if delta > 0 && prospective > state.wsl() {
        return Err(wrap(StackFaultCode::Overflow, save));
    }
    if delta < 0 && prospective < state.wsb() {
        return Err(wrap(StackFaultCode::Underflow, save));
    }
    Ok(())
}

const fn wrap(code: StackFaultCode, save: bool) -> StackFault {
    if save {
        StackFault::pending(code)
    } else {
        StackFault::of(code)
    }
}

/// Mirrors the wide-stack registers into their page-zero homes.
pub fn mirror_wide_regs(state: &CpuState, mem: &mut dyn MemoryBus) {
    let pc = state.pc();
    mem.write_dword(pc.page_zero(WFP_LOC), state.wfp());
    mem.write_dword(pc.page_zero(WSP_LOC), state.wsp());
    mem.write_dword(pc.page_zero(WSL_LOC), state.wsl());
    mem.write_dword(pc.page_zero(WSB_LOC), state.wsb());
}

/// Reloads the wide-stack registers from their page-zero homes.
pub fn load_wide_regs(state: &mut CpuState, mem: &dyn MemoryBus) {
    let pc = state.pc();
    state.set_wfp(mem.read_dword(pc.page_zero(WFP_LOC)));
    state.set_wsp(mem.read_dword(pc.page_zero(WSP_LOC)));
    state.set_wsl(mem.read_dword(pc.page_zero(WSL_LOC)));
    state.set_wsb(mem.read_dword(pc.page_zero(WSB_LOC)));
}

/// Pushes the six-cell recovery block.
///
/// `ret` is the tagged return word: the current carry flag in the top bit
/// and the return address in the low 31 bits. After the block is down, the
/// frame pointer points at its tagged return cell.
pub fn push_return_block(state: &mut CpuState, mem: &mut dyn MemoryBus, argc: u16, ret: u32) {
    let status = state.psw() | u32::from(argc);
    let (ac0, ac1, ac2) = (state.ac(0), state.ac(1), state.ac(2));
    let old_wfp = state.wfp();
    ws_push(state, mem, status);
    ws_push(state, mem, ac0);
    ws_push(state, mem, ac1);
    ws_push(state, mem, ac2);
    ws_push(state, mem, old_wfp);
    ws_push(state, mem, ret);
    state.set_wfp(state.wsp());
}

/// Pops the recovery block pushed by [`push_return_block`], restoring carry,
/// PC, accumulators 0-3, frame pointer and status word, then releases the
/// frame-size cells recorded in the status word's low half.
pub fn pop_return_block(state: &mut CpuState, mem: &dyn MemoryBus) {
    state.set_wsp(state.wfp());
    let ret = ws_pop(state, mem);
    state.set_carry(ret & RETURN_CARRY_BIT != 0);
    state.set_pc(Address::from_phys(ret & !RETURN_CARRY_BIT));
    let old_wfp = ws_pop(state, mem);
    state.set_wfp(old_wfp);
    state.set_ac(3, old_wfp);
    let ac2 = ws_pop(state, mem);
    let ac1 = ws_pop(state, mem);
    let ac0 = ws_pop(state, mem);
    state.set_ac(2, ac2);
    state.set_ac(1, ac1);
    state.set_ac(0, ac0);
    let status = ws_pop(state, mem);
    state.set_psw(status);
    let argc = status & 0xFFFF;
    state.set_wsp(state.wsp().wrapping_sub(argc * 2));
    if state.stack_phase() == StackPhase::FaultHandlerActive {
        state.set_stack_phase(StackPhase::Normal);
    }
}

/// Dispatches a wide stack fault.
///
/// An underflow first snaps the stack pointer back to the limit so the
/// recovery block lands inside the stack region. The block is pushed, both
/// overflow status bits are cleared, the stack registers are mirrored to
/// page zero, AC0 receives the faulting PC, AC1 the packed fault codes, and
/// control transfers through the per-segment wide fault vector.
///
/// # Errors
///
/// [`CpuError::IndirectionLimit`] when the vector's indirection chain runs
/// away; stack faults themselves never surface as errors.
pub fn dispatch_wide_fault(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    fault: StackFault,
    fault_pc: Address,
    limit: u32,
) -> Result<(), CpuError> {
    debug!(
        "wide stack fault {:?} at {:#o}, phase {:?}",
        fault,
        fault_pc.phys(),
        state.stack_phase()
    );

    let underflow = fault.primary == StackFaultCode::Underflow
        || fault.secondary == Some(StackFaultCode::Underflow);
    if underflow {
        state.set_wsp(state.wsl());
    }

    let ret = (u32::from(state.carry()) * RETURN_CARRY_BIT) | fault_pc.phys();
    push_return_block(state, mem, 0, ret);
    state.set_ovk(false);
    state.set_ovr(false);
    mirror_wide_regs(state, mem);

    state.set_ac(0, fault_pc.phys());
    state.set_ac(1, fault.ac1_word());
    state.set_stack_phase(StackPhase::FaultHandlerActive);

    let target = resolve_vector_dword(state, mem, limit, fault_pc.page_zero(WIDE_FAULT_VECTOR))?;
    state.set_pc(Address::from_phys(target));
    Ok(())
}

// --- narrow stack -----------------------------------------------------

/// Reads the narrow stack pointer from page zero.
#[must_use]
pub fn nsp(state: &CpuState, mem: &dyn MemoryBus) -> u16 {
    mem.read_word(state.pc().page_zero(NSP_LOC))
}

/// Writes the narrow stack pointer to page zero.
pub fn set_nsp(state: &CpuState, mem: &mut dyn MemoryBus, value: u16) {
    mem.write_word(state.pc().page_zero(NSP_LOC), value);
}

/// Reads the narrow frame pointer from page zero.
#[must_use]
pub fn nfp(state: &CpuState, mem: &dyn MemoryBus) -> u16 {
    mem.read_word(state.pc().page_zero(NFP_LOC))
}

/// Writes the narrow frame pointer to page zero.
pub fn set_nfp(state: &CpuState, mem: &mut dyn MemoryBus, value: u16) {
    mem.write_word(state.pc().page_zero(NFP_LOC), value);
}

/// Pushes one word cell onto the narrow stack.
pub fn ns_push(state: &CpuState, mem: &mut dyn MemoryBus, value: u16) {
    let new = nsp(state, mem).wrapping_add(1);
    set_nsp(state, mem, new);
    mem.write_word(state.pc().rejoin(u32::from(new)), value);
}

/// Pops one word cell from the narrow stack.
pub fn ns_pop(state: &CpuState, mem: &mut dyn MemoryBus) -> u16 {
    let old = nsp(state, mem);
    let value = mem.read_word(state.pc().rejoin(u32::from(old)));
    set_nsp(state, mem, old.wrapping_sub(1));
    value
}

/// Narrow-stack bounds pre-check: the discipline predates a base register,
/// so only growth past the limit faults.
///
/// # Errors
///
/// The detected [`StackFault`].
pub fn nsp_check_bounds(
    state: &CpuState,
    mem: &dyn MemoryBus,
    delta: i32,
) -> Result<(), StackFault> {
    if delta <= 0 {
        return Ok(());
    }
    let limit = mem.read_word(state.pc().page_zero(NSL_LOC));
    let prospective = nsp(state, mem).wrapping_add_signed(delta as i16);
    if prospective > limit {
        return Err(StackFault::of(StackFaultCode::Overflow));
    }
    Ok(())
}

/// Dispatches a narrow stack fault: AC3 receives the faulting PC and
/// control transfers through the per-segment narrow fault vector.
///
/// # Errors
///
/// [`CpuError::IndirectionLimit`] when the vector's chain runs away.
pub fn dispatch_narrow_fault(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    fault_pc: Address,
    limit: u32,
) -> Result<(), CpuError> {
    debug!("narrow stack fault at {:#o}", fault_pc.phys());
    state.set_ac(3, fault_pc.phys());
    let target = resolve_vector_word(state, mem, limit, fault_pc.page_zero(NARROW_FAULT_VECTOR))?;
    state.set_pc(Address::from_phys(target));
    Ok(())
}
