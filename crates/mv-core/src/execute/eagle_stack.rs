//! Wide-stack handlers: WPSH, WPOP, WMSP, WSAVR, WSAVS, WRTN, WPOPJ.
//!
//! The save instructions complete the recovery block a call began: the call
//! pushed the status/argument-count cell, the save pushes AC0-AC2, the old
//! frame pointer and the tagged carry/return cell, then allocates the frame
//! named in its second word. A save that cannot fit reports the pending
//! fault pair and redirects through the fault protocol before committing
//! anything.

use super::helpers::unimplemented;
use super::Flow;
use crate::addr::Address;
use crate::decode::{DecodedInstruction, OperandPayload};
use crate::fault::CpuError;
use crate::memory::MemoryBus;
use crate::stack::{
    dispatch_wide_fault, mirror_wide_regs, pop_return_block, ws_pop, ws_push, wsp_check_bounds,
    RETURN_CARRY_BIT,
};
use crate::state::{CpuState, StackPhase};

pub fn execute(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    limit: u32,
    instr: &DecodedInstruction,
) -> Result<Flow, CpuError> {
    match (instr.mnemonic, instr.payload) {
        ("WPSH", OperandPayload::TwoAcc { acs, acd }) => {
            let count = range_len(acs, acd);
            if let Err(fault) = wsp_check_bounds(state, count, false) {
                let pc = state.pc();
                dispatch_wide_fault(state, mem, fault, pc, limit)?;
                return Ok(Flow::Jump);
            }
            let mut reg = usize::from(acs);
            for _ in 0..count {
                let value = state.ac(reg);
                ws_push(state, mem, value);
                reg = (reg + 1) & 3;
            }
            Ok(Flow::Advance)
        }
        ("WPOP", OperandPayload::TwoAcc { acs, acd }) => {
            let count = range_len(acs, acd);
            if let Err(fault) = wsp_check_bounds(state, -count, false) {
                let pc = state.pc();
                dispatch_wide_fault(state, mem, fault, pc, limit)?;
                return Ok(Flow::Jump);
            }
            let mut reg = usize::from(acd);
            for _ in 0..count {
                let value = ws_pop(state, mem);
                state.set_ac(reg, value);
                reg = (reg + 3) & 3;
            }
            Ok(Flow::Advance)
        }
        ("WMSP", OperandPayload::OneAcc { ac }) => {
            let delta = state.ac(usize::from(ac)) as i32;
            if let Err(fault) = wsp_check_bounds(state, delta, false) {
                let pc = state.pc();
                dispatch_wide_fault(state, mem, fault, pc, limit)?;
                return Ok(Flow::Jump);
            }
            state.set_wsp(state.wsp().wrapping_add_signed(delta.wrapping_mul(2)));
            Ok(Flow::Advance)
        }
        (save @ ("WSAVR" | "WSAVS"), OperandPayload::Param { value }) => {
            let frame = i32::from(value);
            if let Err(fault) = wsp_check_bounds(state, 5 + frame, true) {
                state.set_stack_phase(StackPhase::FaultPending);
                let pc = state.pc();
                dispatch_wide_fault(state, mem, fault, pc, limit)?;
                return Ok(Flow::Jump);
            }
            let (ac0, ac1, ac2) = (state.ac(0), state.ac(1), state.ac(2));
            let old_wfp = state.wfp();
            let ret =
                (u32::from(state.carry()) * RETURN_CARRY_BIT) | (state.ac(3) & !RETURN_CARRY_BIT);
            ws_push(state, mem, ac0);
            ws_push(state, mem, ac1);
            ws_push(state, mem, ac2);
            ws_push(state, mem, old_wfp);
            ws_push(state, mem, ret);
            state.set_wfp(state.wsp());
            state.set_ac(3, state.wsp());
            state.set_wsp(state.wsp().wrapping_add((frame as u32) * 2));
            state.set_ovk(save == "WSAVS");
            mirror_wide_regs(state, mem);
            Ok(Flow::Advance)
        }
        ("WRTN", OperandPayload::Implicit) => {
            pop_return_block(state, mem);
            Ok(Flow::Jump)
        }
        ("WPOPJ", OperandPayload::Implicit) => {
            if let Err(fault) = wsp_check_bounds(state, -1, false) {
                let pc = state.pc();
                dispatch_wide_fault(state, mem, fault, pc, limit)?;
                return Ok(Flow::Jump);
            }
            let target = ws_pop(state, mem) & !RETURN_CARRY_BIT;
            state.set_pc(Address::from_phys(target));
            Ok(Flow::Jump)
        }
        _ => Err(unimplemented(instr)),
    }
}

/// Number of accumulators in the inclusive, wrapping range `acs..=acd`.
const fn range_len(acs: u8, acd: u8) -> i32 {
    ((acd.wrapping_sub(acs) & 3) + 1) as i32
}
