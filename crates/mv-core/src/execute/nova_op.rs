//! The legacy two-accumulator multiple-operation word.
//!
//! Every instruction in this class runs the same micro-sequence: pick a
//! carry base, compute a 17-bit function result (carry out in bit 16),
//! shift or swap, test the skip condition, then commit result and carry
//! unless the no-load bit inhibits both.

use super::helpers::unimplemented;
use super::Flow;
use crate::decode::{DecodedInstruction, MultCarry, MultShift, MultSkip, OperandPayload};
use crate::fault::CpuError;
use crate::state::CpuState;

pub fn execute(state: &mut CpuState, instr: &DecodedInstruction) -> Result<Flow, CpuError> {
    let OperandPayload::MultOp {
        acs,
        acd,
        shift,
        carry,
        no_load,
        skip,
    } = instr.payload
    else {
        return Err(unimplemented(instr));
    };

    let src = u32::from(state.ac16(usize::from(acs)));
    let dst = u32::from(state.ac16(usize::from(acd)));

    let base = match carry {
        MultCarry::Current => state.carry(),
        MultCarry::Zero => false,
        MultCarry::One => true,
        MultCarry::Complement => !state.carry(),
    };

    // 17-bit intermediate: bit 16 is the carry out of the function unit.
    let wide = match instr.mnemonic {
        "COM" => (!src & 0xFFFF) | carry_in(base),
        "NEG" => with_carry_out(src.wrapping_neg() & 0xFFFF, src == 0, base),
        "MOV" => src | carry_in(base),
        "INC" => with_carry_out(src + 1, src == 0xFFFF, base),
        "ADC" => {
            let sum = dst + (!src & 0xFFFF);
            with_carry_out(sum, sum > 0xFFFF, base)
        }
        "SUB" => {
            let sum = dst + (!src & 0xFFFF) + 1;
            with_carry_out(sum, sum > 0xFFFF, base)
        }
        "ADD" => {
            let sum = dst + src;
            with_carry_out(sum, sum > 0xFFFF, base)
        }
        "AND" => (dst & src) | carry_in(base),
        _ => return Err(unimplemented(instr)),
    };

    let shifted = match shift {
        MultShift::None => wide,
        MultShift::Left => {
            let rotated = (wide << 1) | (wide >> 16);
            rotated & 0x1_FFFF
        }
        MultShift::Right => {
            let rotated = (wide >> 1) | ((wide & 1) << 16);
            rotated & 0x1_FFFF
        }
        MultShift::Swap => (wide & 0x1_0000) | ((wide & 0xFF) << 8) | ((wide >> 8) & 0xFF),
    };

    let result = (shifted & 0xFFFF) as u16;
    let carry_flag = shifted & 0x1_0000 != 0;

    let take_skip = match skip {
        MultSkip::Never => false,
        MultSkip::Always => true,
        MultSkip::CarryZero => !carry_flag,
        MultSkip::CarryNonzero => carry_flag,
        MultSkip::ResultZero => result == 0,
        MultSkip::ResultNonzero => result != 0,
        MultSkip::EitherZero => !carry_flag || result == 0,
        MultSkip::BothNonzero => carry_flag && result != 0,
    };

    if !no_load {
        state.set_ac16(usize::from(acd), result);
        state.set_carry(carry_flag);
    }

    Ok(if take_skip { Flow::Skip } else { Flow::Advance })
}

/// Positions the carry base in bit 16.
const fn carry_in(base: bool) -> u32 {
    (base as u32) << 16
}

/// Applies the function's carry-out rule: a carry out of bit 15 complements
/// the base.
const fn with_carry_out(sum_17: u32, carry_out: bool, base: bool) -> u32 {
    let carry = base != carry_out;
    (sum_17 & 0xFFFF) | carry_in(carry)
}
