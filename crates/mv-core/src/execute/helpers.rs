//! Shared arithmetic and addressing helpers for the class handlers.

use crate::addr::{byte_pointer, split_byte_pointer, Address};
use crate::decode::DecodedInstruction;
use crate::fault::CpuError;
use crate::state::CpuState;

/// Records the outcome of a signed-bounds check: carry mirrors the
/// condition, the status word's overflow bit is sticky.
pub fn set_overflow(state: &mut CpuState, condition: bool) {
    state.set_carry(condition);
    if condition {
        state.set_ovr(true);
    }
}

/// Wraps a mathematically exact result to the signed 16-bit convention:
/// carry and overflow when it exceeds the 16-bit range, and the truncated
/// result sign-extended to the full accumulator width.
pub fn narrow_signed_result(state: &mut CpuState, exact: i64) -> u32 {
    let out_of_range = exact > i64::from(i16::MAX) || exact < i64::from(i16::MIN);
    set_overflow(state, out_of_range);
    exact as i16 as i32 as u32
}

/// Wraps a mathematically exact result to the signed 32-bit convention.
pub fn wide_signed_result(state: &mut CpuState, exact: i64) -> u32 {
    let out_of_range = exact > i64::from(i32::MAX) || exact < i64::from(i32::MIN);
    set_overflow(state, out_of_range);
    exact as i32 as u32
}

/// A 16-bit accumulator value as signed.
#[must_use]
pub const fn sx16(value: u16) -> i64 {
    value as i16 as i64
}

/// A 32-bit accumulator value as signed.
#[must_use]
pub const fn sx32(value: u32) -> i64 {
    value as i32 as i64
}

/// Joins a byte pointer held in an accumulator onto the current ring.
#[must_use]
pub const fn ring_byte_addr(pc: Address, bp: u32) -> u32 {
    let (word, right) = split_byte_pointer(bp);
    byte_pointer(pc.rejoin(word), right)
}

/// The error for an instruction variant that reached the wrong handler or
/// an unimplemented arm: emulation cannot proceed past it.
#[must_use]
pub const fn unimplemented(instr: &DecodedInstruction) -> CpuError {
    CpuError::Unimplemented {
        mnemonic: instr.mnemonic,
    }
}

#[cfg(test)]
mod tests {
    use super::{narrow_signed_result, wide_signed_result};
    use crate::state::CpuState;

    #[test]
    fn in_range_narrow_results_clear_carry() {
        let mut state = CpuState::default();
        state.set_carry(true);
        let value = narrow_signed_result(&mut state, -2);
        assert_eq!(value, 0xFFFF_FFFE);
        assert!(!state.carry());
        assert!(!state.ovr());
    }

    #[test]
    fn out_of_range_narrow_results_set_carry_and_sticky_overflow() {
        let mut state = CpuState::default();
        let value = narrow_signed_result(&mut state, 40000);
        assert_eq!(value & 0xFFFF, 40000 & 0xFFFF);
        assert!(state.carry());
        assert!(state.ovr());
        // The next in-range result clears carry but not the sticky bit.
        narrow_signed_result(&mut state, 1);
        assert!(!state.carry());
        assert!(state.ovr());
    }

    #[test]
    fn wide_bounds_are_the_32_bit_range() {
        let mut state = CpuState::default();
        wide_signed_result(&mut state, i64::from(i32::MAX));
        assert!(!state.carry());
        wide_signed_result(&mut state, i64::from(i32::MAX) + 1);
        assert!(state.carry());
    }
}
