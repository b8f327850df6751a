//! Legacy transfer-of-control handlers: JMP, JSR.

use super::helpers::unimplemented;
use super::Flow;
use crate::addr::Address;
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
        ("JMP", OperandPayload::NoAccEff { ind, mode, disp }) => {
            let ea = resolve_8bit(state, mem, limit, ind, mode, disp)?;
            state.set_pc(Address::from_phys(ea));
            Ok(Flow::Jump)
        }
        ("JSR", OperandPayload::NoAccEff { ind, mode, disp }) => {
            let ea = resolve_8bit(state, mem, limit, ind, mode, disp)?;
            // The legacy convention: the 15-bit return offset lands in AC3.
            let ret = (state.pc().offset().wrapping_add(1) & 0x7FFF) as u16;
            state.set_ac16(3, ret);
            state.set_pc(Address::from_phys(ea));
            Ok(Flow::Jump)
        }
        _ => Err(unimplemented(instr)),
    }
}
