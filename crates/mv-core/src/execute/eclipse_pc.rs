//! Extended-set conditional skips and transfers: EJMP, EJSR, the compare
//! skips and the bit-test skips.

use super::helpers::unimplemented;
use super::Flow;
use crate::addr::Address;
use crate::decode::{DecodedInstruction, OperandPayload};
use crate::fault::CpuError;
use crate::memory::MemoryBus;
use crate::resolve::resolve_15bit;
use crate::state::CpuState;

pub fn execute(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    limit: u32,
    instr: &DecodedInstruction,
) -> Result<Flow, CpuError> {
    match (instr.mnemonic, instr.payload) {
        ("EJMP", OperandPayload::Eff15 { ind, mode, disp }) => {
            let ea = resolve_15bit(state, mem, limit, ind, mode, disp, 0)?;
            state.set_pc(Address::from_phys(ea));
            Ok(Flow::Jump)
        }
        ("EJSR", OperandPayload::Eff15 { ind, mode, disp }) => {
            let ea = resolve_15bit(state, mem, limit, ind, mode, disp, 0)?;
            let ret = (state.pc().offset().wrapping_add(u32::from(instr.len)) & 0x7FFF) as u16;
            state.set_ac16(3, ret);
            state.set_pc(Address::from_phys(ea));
            Ok(Flow::Jump)
        }
        ("SGT", OperandPayload::TwoAcc { acs, acd }) => Ok(skip_if(
            (state.ac16(usize::from(acs)) as i16) > (state.ac16(usize::from(acd)) as i16),
        )),
        ("SGE", OperandPayload::TwoAcc { acs, acd }) => Ok(skip_if(
            (state.ac16(usize::from(acs)) as i16) >= (state.ac16(usize::from(acd)) as i16),
        )),
        ("CLM", OperandPayload::TwoAcc { acs, acd }) => {
            // Limits are the word pair the destination accumulator points at.
            let base = state.pc().rejoin(u32::from(state.ac16(usize::from(acd))));
            let low = mem.read_word(base) as i16;
            let high = mem.read_word(base.wrapping_add(1)) as i16;
            let value = state.ac16(usize::from(acs)) as i16;
            Ok(skip_if(value >= low && value <= high))
        }
        ("SZB", OperandPayload::TwoAcc { acs, acd }) => Ok(skip_if(!test_bit(state, mem, acs, acd))),
        ("SNB", OperandPayload::TwoAcc { acs, acd }) => Ok(skip_if(test_bit(state, mem, acs, acd))),
        _ => Err(unimplemented(instr)),
    }
}

const fn skip_if(condition: bool) -> Flow {
    if condition {
        Flow::Skip
    } else {
        Flow::Advance
    }
}

/// Same bit-pointer convention as BTO/BTZ: word address in the source
/// accumulator, bit number in the destination accumulator.
fn test_bit(state: &CpuState, mem: &dyn MemoryBus, acs: u8, acd: u8) -> bool {
    let addr = state.pc().rejoin(u32::from(state.ac16(usize::from(acs))));
    let bit = 15 - (state.ac16(usize::from(acd)) & 0xF);
    mem.read_word(addr) & (1 << bit) != 0
}
