//! Wide-set operate handlers.
//!
//! Wide arithmetic runs in 64-bit intermediates and applies the signed
//! 32-bit carry/overflow convention; the narrow (`N`-prefixed) forms apply
//! the signed 16-bit convention and sign-extend their result through the
//! full accumulator. Logical and move forms leave the flags alone.

use super::helpers::{narrow_signed_result, set_overflow, sx16, sx32, unimplemented};
use super::Flow;
use crate::decode::{DecodedInstruction, OperandPayload};
use crate::fault::CpuError;
use crate::state::CpuState;

pub fn execute(state: &mut CpuState, instr: &DecodedInstruction) -> Result<Flow, CpuError> {
    match (instr.mnemonic, instr.payload) {
        (_, OperandPayload::TwoAcc { acs, acd }) => two_acc(state, instr, acs, acd),
        (_, OperandPayload::ImmPlusOne { imm, ac }) => {
            let ac = usize::from(ac);
            let imm = i64::from(imm);
            let value = match instr.mnemonic {
                "WADI" => wide(state, sx32(state.ac(ac)) + imm),
                "WSBI" => wide(state, sx32(state.ac(ac)) - imm),
                "NADI" => narrow_signed_result(state, sx16(state.ac16(ac)) + imm),
                "NSBI" => narrow_signed_result(state, sx16(state.ac16(ac)) - imm),
                _ => return Err(unimplemented(instr)),
            };
            state.set_ac(ac, value);
            Ok(Flow::Advance)
        }
        ("NLDAI", OperandPayload::AccImm16 { ac, imm }) => {
            state.set_ac(usize::from(ac), imm as i32 as u32);
            Ok(Flow::Advance)
        }
        ("WLDAI", OperandPayload::AccImm32 { ac, imm }) => {
            state.set_ac(usize::from(ac), imm);
            Ok(Flow::Advance)
        }
        ("WADDI", OperandPayload::AccImm32 { ac, imm }) => {
            let ac = usize::from(ac);
            let value = wide(state, sx32(state.ac(ac)) + i64::from(imm as i32));
            state.set_ac(ac, value);
            Ok(Flow::Advance)
        }
        ("WANDI", OperandPayload::AccImm32 { ac, imm }) => {
            let ac = usize::from(ac);
            state.set_ac(ac, state.ac(ac) & imm);
            Ok(Flow::Advance)
        }
        ("WIORI", OperandPayload::AccImm32 { ac, imm }) => {
            let ac = usize::from(ac);
            state.set_ac(ac, state.ac(ac) | imm);
            Ok(Flow::Advance)
        }
        ("CRYTC", OperandPayload::Implicit) => {
            state.set_carry(!state.carry());
            Ok(Flow::Advance)
        }
        ("CRYTO", OperandPayload::Implicit) => {
            state.set_carry(true);
            Ok(Flow::Advance)
        }
        ("CRYTZ", OperandPayload::Implicit) => {
            state.set_carry(false);
            Ok(Flow::Advance)
        }
        ("LPSR", OperandPayload::OneAcc { ac }) => {
            state.set_ac(usize::from(ac), state.psw());
            Ok(Flow::Advance)
        }
        _ => Err(unimplemented(instr)),
    }
}

fn two_acc(
    state: &mut CpuState,
    instr: &DecodedInstruction,
    acs: u8,
    acd: u8,
) -> Result<Flow, CpuError> {
    let (acs, acd) = (usize::from(acs), usize::from(acd));
    let src = state.ac(acs);
    let dst = state.ac(acd);

    let value = match instr.mnemonic {
        "WADD" => wide(state, sx32(dst) + sx32(src)),
        "WSUB" => wide(state, sx32(dst) - sx32(src)),
        "WNEG" => wide(state, -sx32(src)),
        "WMOV" => src,
        "WINC" => wide(state, sx32(src) + 1),
        "WCOM" => !src,
        "WADC" => wide(state, sx32(dst) + sx32(!src)),
        "WAND" => dst & src,
        "WIOR" => dst | src,
        "WXOR" => dst ^ src,
        "WXCH" => {
            state.set_ac(acs, dst);
            src
        }
        "WLSH" => logical_shift(dst, state.ac(acs) as i8),
        "WASH" => arithmetic_shift(dst, src as i8),
        "WMUL" => wide(state, sx32(dst) * sx32(src)),
        "WDIV" => {
            if sx32(src) == 0 {
                // Divide-by-zero routes through the overflow flag.
                set_overflow(state, true);
                return Ok(Flow::Advance);
            }
            wide(state, sx32(dst) / sx32(src))
        }
        "NADD" => narrow_signed_result(state, sx16(state.ac16(acd)) + sx16(state.ac16(acs))),
        "NSUB" => narrow_signed_result(state, sx16(state.ac16(acd)) - sx16(state.ac16(acs))),
        "NMUL" => narrow_signed_result(state, sx16(state.ac16(acd)) * sx16(state.ac16(acs))),
        "NDIV" => {
            if state.ac16(acs) as i16 == 0 {
                set_overflow(state, true);
                return Ok(Flow::Advance);
            }
            narrow_signed_result(state, sx16(state.ac16(acd)) / sx16(state.ac16(acs)))
        }
        "SEX" => state.ac16(acs) as i16 as i32 as u32,
        "ZEX" => u32::from(state.ac16(acs)),
        _ => return Err(unimplemented(instr)),
    };

    state.set_ac(acd, value);
    Ok(Flow::Advance)
}

fn wide(state: &mut CpuState, exact: i64) -> u32 {
    super::helpers::wide_signed_result(state, exact)
}

fn logical_shift(value: u32, count: i8) -> u32 {
    match i32::from(count) {
        0 => value,
        1..=31 => value << count,
        -31..=-1 => value >> -i32::from(count),
        _ => 0,
    }
}

fn arithmetic_shift(value: u32, count: i8) -> u32 {
    match i32::from(count) {
        0 => value,
        1..=31 => value << count,
        -31..=-1 => ((value as i32) >> -i32::from(count)) as u32,
        _ if count > 0 => 0,
        _ => ((value as i32) >> 31) as u32,
    }
}
