//! Narrow-stack handlers: PSH, POP, SAV, RTN, MSP, PSHJ, POPJ.
//!
//! The narrow discipline keeps its pointer, frame pointer and limit only in
//! the page-zero cells of the current segment. Its save block is five words:
//! AC0, AC1, AC2, the old frame pointer, and a tagged return word with the
//! carry flag in the top bit and the 15-bit return offset below it.

use super::helpers::unimplemented;
use super::Flow;
use crate::addr::Address;
use crate::decode::{DecodedInstruction, OperandPayload};
use crate::fault::CpuError;
use crate::memory::MemoryBus;
use crate::resolve::resolve_15bit;
use crate::stack::{
    dispatch_narrow_fault, nfp, ns_pop, ns_push, nsp, nsp_check_bounds, set_nfp, set_nsp,
};
use crate::state::CpuState;

pub fn execute(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    limit: u32,
    instr: &DecodedInstruction,
) -> Result<Flow, CpuError> {
    match (instr.mnemonic, instr.payload) {
        ("PSH", OperandPayload::TwoAcc { acs, acd }) => {
            let count = range_len(acs, acd);
            if nsp_check_bounds(state, mem, count).is_err() {
                let pc = state.pc();
                dispatch_narrow_fault(state, mem, pc, limit)?;
                return Ok(Flow::Jump);
            }
            let mut reg = usize::from(acs);
            for _ in 0..count {
                ns_push(state, mem, state.ac16(reg));
                reg = (reg + 1) & 3;
            }
            Ok(Flow::Advance)
        }
        ("POP", OperandPayload::TwoAcc { acs, acd }) => {
            let count = range_len(acs, acd);
            let mut reg = usize::from(acd);
            for _ in 0..count {
                let value = ns_pop(state, mem);
                state.set_ac16(reg, value);
                reg = (reg + 3) & 3;
            }
            Ok(Flow::Advance)
        }
        ("SAV", OperandPayload::Implicit) => {
            if nsp_check_bounds(state, mem, 5).is_err() {
                let pc = state.pc();
                dispatch_narrow_fault(state, mem, pc, limit)?;
                return Ok(Flow::Jump);
            }
            let old_nfp = nfp(state, mem);
            let ret = (u16::from(state.carry()) << 15) | (state.ac16(3) & 0x7FFF);
            ns_push(state, mem, state.ac16(0));
            ns_push(state, mem, state.ac16(1));
            ns_push(state, mem, state.ac16(2));
            ns_push(state, mem, old_nfp);
            ns_push(state, mem, ret);
            let frame = nsp(state, mem);
            set_nfp(state, mem, frame);
            state.set_ac16(3, frame);
            Ok(Flow::Advance)
        }
        ("RTN", OperandPayload::Implicit) => {
            let frame = nfp(state, mem);
            set_nsp(state, mem, frame);
            let ret = ns_pop(state, mem);
            state.set_carry(ret & 0x8000 != 0);
            let target = state.pc().rejoin(u32::from(ret & 0x7FFF));
            let old_nfp = ns_pop(state, mem);
            set_nfp(state, mem, old_nfp);
            state.set_ac16(3, old_nfp);
            let ac2 = ns_pop(state, mem);
            let ac1 = ns_pop(state, mem);
            let ac0 = ns_pop(state, mem);
            state.set_ac16(2, ac2);
            state.set_ac16(1, ac1);
            state.set_ac16(0, ac0);
            state.set_pc(Address::from_phys(target));
            Ok(Flow::Jump)
        }
        ("MSP", OperandPayload::OneAcc { ac }) => {
            let delta = i32::from(state.ac16(usize::from(ac)) as i16);
            if nsp_check_bounds(state, mem, delta).is_err() {
                let pc = state.pc();
                dispatch_narrow_fault(state, mem, pc, limit)?;
                return Ok(Flow::Jump);
            }
            let new = nsp(state, mem).wrapping_add_signed(delta as i16);
            set_nsp(state, mem, new);
            Ok(Flow::Advance)
        }
        ("PSHJ", OperandPayload::Eff15 { ind, mode, disp }) => {
            if nsp_check_bounds(state, mem, 1).is_err() {
                let pc = state.pc();
                dispatch_narrow_fault(state, mem, pc, limit)?;
                return Ok(Flow::Jump);
            }
            let ea = resolve_15bit(state, mem, limit, ind, mode, disp, 0)?;
            let ret = (state.pc().offset().wrapping_add(u32::from(instr.len)) & 0x7FFF) as u16;
            ns_push(state, mem, ret);
            state.set_pc(Address::from_phys(ea));
            Ok(Flow::Jump)
        }
        ("POPJ", OperandPayload::Implicit) => {
            let target = u32::from(ns_pop(state, mem) & 0x7FFF);
            let target = state.pc().rejoin(target);
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
