//! Wide-set transfers, calls and skips.
//!
//! The call instructions push the packed status/argument-count word, leave
//! the return address in AC3, and jump; the callee's save instruction
//! completes the six-cell recovery block. A call that would overflow the
//! wide stack is redirected through the stack-fault protocol instead.

use super::helpers::{sx32, unimplemented};
use super::Flow;
use crate::addr::Address;
use crate::decode::{DecodedInstruction, OperandPayload};
use crate::fault::CpuError;
use crate::memory::MemoryBus;
use crate::resolve::{resolve_15bit, resolve_31bit};
use crate::stack::{dispatch_wide_fault, ws_push, wsp_check_bounds};
use crate::state::CpuState;

/// Extra PC offset of the wide relative forms.
const DISP_WORD: u32 = 1;

pub fn execute(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    limit: u32,
    instr: &DecodedInstruction,
) -> Result<Flow, CpuError> {
    match (instr.mnemonic, instr.payload) {
        (_, OperandPayload::Eff15 { ind, mode, disp }) => {
            let ea = resolve_15bit(state, mem, limit, ind, mode, disp, DISP_WORD)?;
            transfer(state, instr, ea)
        }
        (_, OperandPayload::Eff31 { ind, mode, disp }) => {
            let ea = resolve_31bit(state, mem, limit, ind, mode, disp, DISP_WORD)?;
            transfer(state, instr, ea)
        }
        (_, OperandPayload::Call15 { ind, mode, disp, argc }) => {
            let ea = resolve_15bit(state, mem, limit, ind, mode, disp, DISP_WORD)?;
            call(state, mem, limit, instr, ea, argc)
        }
        (_, OperandPayload::Call31 { ind, mode, disp, argc }) => {
            let ea = resolve_31bit(state, mem, limit, ind, mode, disp, DISP_WORD)?;
            call(state, mem, limit, instr, ea, argc)
        }
        ("WBR", OperandPayload::SplitDisp { disp }) => {
            let target = state
                .pc()
                .offset()
                .wrapping_add_signed(disp);
            state.set_pc(state.pc().with_offset(target));
            Ok(Flow::Jump)
        }
        (_, OperandPayload::TwoAcc { acs, acd }) => {
            let s = sx32(state.ac(usize::from(acs)));
            // With both fields naming one register, the comparison is
            // against zero.
            let d = if acs == acd {
                0
            } else {
                sx32(state.ac(usize::from(acd)))
            };
            let skip = match instr.mnemonic {
                "WSEQ" => s == d,
                "WSNE" => s != d,
                "WSGT" => s > d,
                "WSGE" => s >= d,
                "WSLE" => s <= d,
                "WSLT" => s < d,
                _ => return Err(unimplemented(instr)),
            };
            Ok(if skip { Flow::Skip } else { Flow::Advance })
        }
        (_, OperandPayload::AccImm16 { ac, imm }) => {
            let bit = (imm as u32) & 31;
            let set = state.ac(usize::from(ac)) & (1 << (31 - bit)) != 0;
            let skip = match instr.mnemonic {
                "WSKBO" => set,
                "WSKBZ" => !set,
                _ => return Err(unimplemented(instr)),
            };
            Ok(if skip { Flow::Skip } else { Flow::Advance })
        }
        _ => Err(unimplemented(instr)),
    }
}

fn transfer(
    state: &mut CpuState,
    instr: &DecodedInstruction,
    ea: u32,
) -> Result<Flow, CpuError> {
    match instr.mnemonic {
        "XJMP" | "LJMP" => {
            state.set_pc(Address::from_phys(ea));
            Ok(Flow::Jump)
        }
        "XJSR" | "LJSR" => {
            let ret = state.pc().advance(u32::from(instr.len)).phys();
            state.set_ac(3, ret);
            state.set_pc(Address::from_phys(ea));
            Ok(Flow::Jump)
        }
        _ => Err(unimplemented(instr)),
    }
}

fn call(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    limit: u32,
    instr: &DecodedInstruction,
    ea: u32,
    argc: u16,
) -> Result<Flow, CpuError> {
    match instr.mnemonic {
        "XCALL" | "LCALL" => {
            if let Err(fault) = wsp_check_bounds(state, 1, false) {
                let pc = state.pc();
                dispatch_wide_fault(state, mem, fault, pc, limit)?;
                return Ok(Flow::Jump);
            }
            let status = state.psw() | u32::from(argc);
            ws_push(state, mem, status);
            let ret = state.pc().advance(u32::from(instr.len)).phys();
            state.set_ac(3, ret);
            state.set_pc(Address::from_phys(ea));
            Ok(Flow::Jump)
        }
        _ => Err(unimplemented(instr)),
    }
}
