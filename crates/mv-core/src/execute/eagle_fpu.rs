//! Floating-point handlers.
//!
//! Floating accumulators are host doubles; loads and stores convert through
//! the packed sign/excess-64-hex-exponent/mantissa wire format, four words
//! per double. A zero divisor routes through the overflow flag like the
//! fixed-point divides.

use super::helpers::{set_overflow, unimplemented};
use super::Flow;
use crate::decode::{DecodedInstruction, OperandPayload};
use crate::fault::CpuError;
use crate::fp::{decode_double, encode_double};
use crate::memory::MemoryBus;
use crate::resolve::{resolve_15bit, resolve_31bit};
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
            load_store(state, mem, instr, usize::from(ac), ea)
        }
        (_, OperandPayload::AccEff31 { ac, ind, mode, disp }) => {
            let ea = resolve_31bit(state, mem, limit, ind, mode, disp, DISP_WORD)?;
            load_store(state, mem, instr, usize::from(ac), ea)
        }
        ("FAB", OperandPayload::OneFpac { fpac }) => {
            let fpac = usize::from(fpac);
            state.set_fpac(fpac, state.fpac(fpac).abs());
            Ok(Flow::Advance)
        }
        ("FNEG", OperandPayload::OneFpac { fpac }) => {
            let fpac = usize::from(fpac);
            state.set_fpac(fpac, -state.fpac(fpac));
            Ok(Flow::Advance)
        }
        (_, OperandPayload::TwoFpac { fps, fpd }) => {
            let (fps, fpd) = (usize::from(fps), usize::from(fpd));
            let s = state.fpac(fps);
            let d = state.fpac(fpd);
            let value = match instr.mnemonic {
                "FMOV" => s,
                "FAD" => d + s,
                "FSD" => d - s,
                "FMD" => d * s,
                "FDD" => {
                    if s == 0.0 {
                        set_overflow(state, true);
                        return Ok(Flow::Advance);
                    }
                    d / s
                }
                "FCMP" => {
                    let verdict: i32 = if s < d {
                        -1
                    } else {
                        i32::from(s > d)
                    };
                    state.set_ac(1, verdict as u32);
                    return Ok(Flow::Advance);
                }
                _ => return Err(unimplemented(instr)),
            };
            state.set_fpac(fpd, value);
            Ok(Flow::Advance)
        }
        ("FINT", OperandPayload::FpacAc { fpac, ac }) => {
            let value = state.fpac(usize::from(fpac));
            if value > f64::from(i32::MAX) || value < f64::from(i32::MIN) {
                set_overflow(state, true);
            } else {
                state.set_ac(usize::from(ac), (value as i32) as u32);
            }
            Ok(Flow::Advance)
        }
        ("FFLT", OperandPayload::FpacAc { fpac, ac }) => {
            state.set_fpac(usize::from(fpac), f64::from(state.ac(usize::from(ac)) as i32));
            Ok(Flow::Advance)
        }
        _ => Err(unimplemented(instr)),
    }
}

fn load_store(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    instr: &DecodedInstruction,
    fpac: usize,
    ea: u32,
) -> Result<Flow, CpuError> {
    match instr.mnemonic {
        "XFLDD" | "LFLDD" => {
            let wire = (u64::from(mem.read_dword(ea)) << 32)
                | u64::from(mem.read_dword(ea.wrapping_add(2)));
            state.set_fpac(fpac, decode_double(wire));
            Ok(Flow::Advance)
        }
        "XFSTD" | "LFSTD" => {
            let wire = encode_double(state.fpac(fpac));
            mem.write_dword(ea, (wire >> 32) as u32);
            mem.write_dword(ea.wrapping_add(2), wire as u32);
            Ok(Flow::Advance)
        }
        _ => Err(unimplemented(instr)),
    }
}
