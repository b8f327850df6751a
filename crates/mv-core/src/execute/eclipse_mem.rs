//! Extended-set memory reference handlers, including the mode-flag
//! instruction's load-effective-address semantics.

use super::helpers::{ring_byte_addr, unimplemented};
use super::Flow;
use crate::decode::{DecodedInstruction, OperandPayload};
use crate::fault::CpuError;
use crate::memory::MemoryBus;
use crate::resolve::{resolve_15bit, resolve_8bit};
use crate::state::CpuState;

pub fn execute(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    limit: u32,
    instr: &DecodedInstruction,
) -> Result<Flow, CpuError> {
    match (instr.mnemonic, instr.payload) {
        ("LEF", OperandPayload::LoadEff { ac, ind, mode, disp }) => {
            let ea = resolve_8bit(state, mem, limit, ind, mode, disp)?;
            state.set_ac16(usize::from(ac), (ea & 0x7FFF) as u16);
            Ok(Flow::Advance)
        }
        ("ELDA", OperandPayload::AccEff15 { ac, ind, mode, disp }) => {
            let ea = resolve_15bit(state, mem, limit, ind, mode, disp, 0)?;
            state.set_ac16(usize::from(ac), mem.read_word(ea));
            Ok(Flow::Advance)
        }
        ("ESTA", OperandPayload::AccEff15 { ac, ind, mode, disp }) => {
            let ea = resolve_15bit(state, mem, limit, ind, mode, disp, 0)?;
            mem.write_word(ea, state.ac16(usize::from(ac)));
            Ok(Flow::Advance)
        }
        ("ELEF", OperandPayload::AccEff15 { ac, ind, mode, disp }) => {
            let ea = resolve_15bit(state, mem, limit, ind, mode, disp, 0)?;
            state.set_ac16(usize::from(ac), (ea & 0x7FFF) as u16);
            Ok(Flow::Advance)
        }
        ("ELDB", OperandPayload::TwoAcc { acs, acd }) => {
            let bp = ring_byte_addr(state.pc(), u32::from(state.ac16(usize::from(acs))));
            state.set_ac16(usize::from(acd), u16::from(mem.read_byte(bp)));
            Ok(Flow::Advance)
        }
        ("ESTB", OperandPayload::TwoAcc { acs, acd }) => {
            let bp = ring_byte_addr(state.pc(), u32::from(state.ac16(usize::from(acs))));
            mem.write_byte(bp, state.ac16(usize::from(acd)) as u8);
            Ok(Flow::Advance)
        }
        ("EISZ", OperandPayload::Eff15 { ind, mode, disp }) => {
            let ea = resolve_15bit(state, mem, limit, ind, mode, disp, 0)?;
            let value = mem.read_word(ea).wrapping_add(1);
            mem.write_word(ea, value);
            Ok(if value == 0 { Flow::Skip } else { Flow::Advance })
        }
        ("EDSZ", OperandPayload::Eff15 { ind, mode, disp }) => {
            let ea = resolve_15bit(state, mem, limit, ind, mode, disp, 0)?;
            let value = mem.read_word(ea).wrapping_sub(1);
            mem.write_word(ea, value);
            Ok(if value == 0 { Flow::Skip } else { Flow::Advance })
        }
        _ => Err(unimplemented(instr)),
    }
}
