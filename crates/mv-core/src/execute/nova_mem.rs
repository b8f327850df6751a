//! Legacy memory-reference handlers: LDA, STA, ISZ, DSZ.

use super::helpers::unimplemented;
use super::Flow;
use crate::decode::{DecodedInstruction, OperandPayload};
use crate::fault::CpuError;
use crate::memory::MemoryBus;
use crate::resolve::resolve_8bit;
use crate::state::CpuState;

pub fn execute(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    limit: u32,
    instr: &DecodedInstruction,
) -> Result<Flow, CpuError> {
    match (instr.mnemonic, instr.payload) {
        ("LDA", OperandPayload::OneAccEff { ac, ind, mode, disp }) => {
            let ea = resolve_8bit(state, mem, limit, ind, mode, disp)?;
            state.set_ac16(usize::from(ac), mem.read_word(ea));
            Ok(Flow::Advance)
        }
        ("STA", OperandPayload::OneAccEff { ac, ind, mode, disp }) => {
            let ea = resolve_8bit(state, mem, limit, ind, mode, disp)?;
            mem.write_word(ea, state.ac16(usize::from(ac)));
            Ok(Flow::Advance)
        }
        ("ISZ", OperandPayload::NoAccEff { ind, mode, disp }) => {
            let ea = resolve_8bit(state, mem, limit, ind, mode, disp)?;
            let value = mem.read_word(ea).wrapping_add(1);
            mem.write_word(ea, value);
            Ok(if value == 0 { Flow::Skip } else { Flow::Advance })
        }
        ("DSZ", OperandPayload::NoAccEff { ind, mode, disp }) => {
            let ea = resolve_8bit(state, mem, limit, ind, mode, disp)?;
            let value = mem.read_word(ea).wrapping_sub(1);
            mem.write_word(ea, value);
            Ok(if value == 0 { Flow::Skip } else { Flow::Advance })
        }
        _ => Err(unimplemented(instr)),
    }
}
