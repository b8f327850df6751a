//! Wide-set memory reference handlers.
//!
//! Narrow (`..N..`) forms move 16 bits and sign-extend into the 32-bit
//! accumulator; wide (`..W..`) forms move doublewords; byte forms go
//! through byte pointers and move one byte zero-extended. The 15-bit and
//! 31-bit relative forms both count their displacement from the
//! displacement word, one word past the opcode.

use super::helpers::unimplemented;
use super::Flow;
use crate::decode::{DecodedInstruction, OperandPayload};
use crate::fault::CpuError;
use crate::memory::MemoryBus;
use crate::resolve::{resolve_15bit, resolve_31bit, resolve_byte};
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
        (_, OperandPayload::AccEff15 { ac, ind, mode, disp }) => {
            let ea = resolve_15bit(state, mem, limit, ind, mode, disp, DISP_WORD)?;
            acc_reference(state, mem, instr, usize::from(ac), ea)
        }
        (_, OperandPayload::AccEff31 { ac, ind, mode, disp }) => {
            let ea = resolve_31bit(state, mem, limit, ind, mode, disp, DISP_WORD)?;
            acc_reference(state, mem, instr, usize::from(ac), ea)
        }
        (_, OperandPayload::Eff15 { ind, mode, disp }) => {
            let ea = resolve_15bit(state, mem, limit, ind, mode, disp, DISP_WORD)?;
            modify_test(mem, instr, ea)
        }
        (_, OperandPayload::Eff31 { ind, mode, disp }) => {
            let ea = resolve_31bit(state, mem, limit, ind, mode, disp, DISP_WORD)?;
            modify_test(mem, instr, ea)
        }
        (_, OperandPayload::AccByte16 { ac, mode, disp })
        | (_, OperandPayload::AccByte32 { ac, mode, disp }) => {
            let bp = resolve_byte(state, mode, disp);
            let ac = usize::from(ac);
            match instr.mnemonic {
                "XLDB" | "LLDB" => {
                    state.set_ac(ac, u32::from(mem.read_byte(bp)));
                    Ok(Flow::Advance)
                }
                "XSTB" | "LSTB" => {
                    mem.write_byte(bp, state.ac(ac) as u8);
                    Ok(Flow::Advance)
                }
                _ => Err(unimplemented(instr)),
            }
        }
        _ => Err(unimplemented(instr)),
    }
}

fn acc_reference(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    instr: &DecodedInstruction,
    ac: usize,
    ea: u32,
) -> Result<Flow, CpuError> {
    match instr.mnemonic {
        "XNLDA" | "LNLDA" => {
            state.set_ac(ac, mem.read_word(ea) as i16 as i32 as u32);
            Ok(Flow::Advance)
        }
        "XNSTA" | "LNSTA" => {
            mem.write_word(ea, state.ac(ac) as u16);
            Ok(Flow::Advance)
        }
        "XWLDA" | "LWLDA" => {
            state.set_ac(ac, mem.read_dword(ea));
            Ok(Flow::Advance)
        }
        "XWSTA" | "LWSTA" => {
            mem.write_dword(ea, state.ac(ac));
            Ok(Flow::Advance)
        }
        "XLEF" | "LLEF" => {
            state.set_ac(ac, ea);
            Ok(Flow::Advance)
        }
        _ => Err(unimplemented(instr)),
    }
}

fn modify_test(
    mem: &mut dyn MemoryBus,
    instr: &DecodedInstruction,
    ea: u32,
) -> Result<Flow, CpuError> {
    let value = match instr.mnemonic {
        "XNISZ" | "LNISZ" => mem.read_word(ea).wrapping_add(1),
        "XNDSZ" | "LNDSZ" => mem.read_word(ea).wrapping_sub(1),
        _ => return Err(unimplemented(instr)),
    };
    mem.write_word(ea, value);
    Ok(if value == 0 { Flow::Skip } else { Flow::Advance })
}
