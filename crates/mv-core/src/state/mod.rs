//! Architectural CPU state model primitives.

/// Register block, status word and segment base registers.
pub mod registers;

pub use registers::{
    CpuState, SbrEntry, StackPhase, AC_COUNT, FPAC_COUNT, PSW_OVK, PSW_OVR,
};
