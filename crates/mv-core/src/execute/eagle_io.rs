//! Wide-set I/O and identification handlers.
//!
//! CIO's command word carries the device number in its low 6 bits and the
//! direction in bit 6 (set for output); the data moves through register A.

use super::helpers::unimplemented;
use super::Flow;
use crate::bus::{IoBus, IoFlag, IoReg};
use crate::decode::{DecodedInstruction, OperandPayload};
use crate::fault::CpuError;
use crate::state::CpuState;

/// Model identifier reported by the identification instructions.
pub const CPU_MODEL_ID: u16 = 0o21704;
/// Microcode revision reported by NCLID.
pub const MICROCODE_REV: u16 = 0o16;

const CIO_OUTPUT_BIT: u16 = 1 << 6;

pub fn execute(
    state: &mut CpuState,
    bus: &mut dyn IoBus,
    instr: &DecodedInstruction,
) -> Result<Flow, CpuError> {
    match (instr.mnemonic, instr.payload) {
        ("CIO", OperandPayload::TwoAcc { acs, acd }) => {
            let command = state.ac16(usize::from(acs));
            channel_io(state, bus, command, usize::from(acd));
            Ok(Flow::Advance)
        }
        ("CIOI", OperandPayload::TwoAccImm { acd, imm, .. }) => {
            channel_io(state, bus, imm, usize::from(acd));
            Ok(Flow::Advance)
        }
        ("ECLID", OperandPayload::OneAcc { ac }) => {
            state.set_ac16(usize::from(ac), CPU_MODEL_ID);
            Ok(Flow::Advance)
        }
        ("LCPID", OperandPayload::OneAcc { ac }) => {
            state.set_ac(
                usize::from(ac),
                (u32::from(CPU_MODEL_ID) << 16) | u32::from(MICROCODE_REV),
            );
            Ok(Flow::Advance)
        }
        ("NCLID", OperandPayload::Implicit) => {
            state.set_ac16(0, CPU_MODEL_ID);
            state.set_ac16(1, MICROCODE_REV);
            state.set_ac16(2, 0);
            Ok(Flow::Advance)
        }
        ("PRTSEL", OperandPayload::Implicit) => {
            // Single-port machine: port select is a no-op.
            Ok(Flow::Advance)
        }
        _ => Err(unimplemented(instr)),
    }
}

fn channel_io(state: &mut CpuState, bus: &mut dyn IoBus, command: u16, data_ac: usize) {
    let device = (command & 0x3F) as u8;
    if command & CIO_OUTPUT_BIT != 0 {
        bus.data_out(device, state.ac16(data_ac), IoReg::A, IoFlag::None);
    } else {
        let value = if bus.is_attached(device) {
            bus.data_in(device, IoReg::A, IoFlag::None)
        } else {
            0
        };
        state.set_ac16(data_ac, value);
    }
}
