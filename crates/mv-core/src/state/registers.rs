//! Architectural register file for the MV-family processor.

use crate::addr::Address;

/// Number of fixed-point accumulators.
pub const AC_COUNT: usize = 4;
/// Number of floating-point accumulators.
pub const FPAC_COUNT: usize = 4;

/// Processor status word bit: fixed-point overflow mask.
pub const PSW_OVK: u32 = 1 << 31;
/// Processor status word bit: fixed-point overflow occurred.
pub const PSW_OVR: u32 = 1 << 30;
/// Mask of architecturally active status word bits.
const PSW_ACTIVE_MASK: u32 = PSW_OVK | PSW_OVR;

/// One segment base register.
///
/// The LEF flag puts the segment's legacy I/O encoding space into
/// extended-mode-flag interpretation; the I/O flag grants the segment the
/// right to touch the peripheral bus at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SbrEntry {
    /// Entry describes a mapped segment.
    pub valid: bool,
    /// Segment is the short (single-page-table) form.
    pub short_form: bool,
    /// Extended-mode-flag interpretation of the legacy I/O space.
    pub lef: bool,
    /// Segment may execute programmed I/O.
    pub io: bool,
    /// Physical base of the segment's page tables.
    pub base: u32,
}

/// Wide-stack fault protocol phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StackPhase {
    /// No fault outstanding.
    #[default]
    Normal,
    /// A save-type operation detected a fault it could not absorb yet.
    FaultPending,
    /// Control is inside the stack-fault handler.
    FaultHandlerActive,
}

/// The long-lived register block, exclusively owned by one processor's
/// fetch-decode-execute loop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuState {
    ac: [u32; AC_COUNT],
    fpac: [f64; FPAC_COUNT],
    pc: Address,
    carry: bool,
    psw: u32,
    atu_on: bool,
    ion: bool,
    sbr: [SbrEntry; 8],
    wfp: u32,
    wsp: u32,
    wsl: u32,
    wsb: u32,
    stack_phase: StackPhase,
    switches: u16,
}

impl Default for CpuState {
    fn default() -> Self {
        Self {
            ac: [0; AC_COUNT],
            fpac: [0.0; FPAC_COUNT],
            pc: Address::default(),
            carry: false,
            psw: 0,
            atu_on: false,
            ion: false,
            sbr: [SbrEntry::default(); 8],
            wfp: 0,
            wsp: 0,
            wsl: 0,
            wsb: 0,
            stack_phase: StackPhase::Normal,
            switches: 0,
        }
    }
}

impl CpuState {
    /// Reads an accumulator.
    #[must_use]
    pub const fn ac(&self, n: usize) -> u32 {
        self.ac[n & 3]
    }

    /// Writes an accumulator.
    pub const fn set_ac(&mut self, n: usize, value: u32) {
        self.ac[n & 3] = value;
    }

    /// Reads the low 16 bits of an accumulator, the view the legacy
    /// instruction set operates on.
    #[must_use]
    pub const fn ac16(&self, n: usize) -> u16 {
        self.ac[n & 3] as u16
    }

    /// Writes the low 16 bits of an accumulator, zeroing the high half the
    /// way the legacy set leaves wide registers.
    pub const fn set_ac16(&mut self, n: usize, value: u16) {
        self.ac[n & 3] = value as u32;
    }

    /// Reads a floating accumulator.
    #[must_use]
    pub const fn fpac(&self, n: usize) -> f64 {
        self.fpac[n & 3]
    }

    /// Writes a floating accumulator.
    pub const fn set_fpac(&mut self, n: usize, value: f64) {
        self.fpac[n & 3] = value;
    }

    /// The program counter.
    #[must_use]
    pub const fn pc(&self) -> Address {
        self.pc
    }

    /// Replaces the program counter.
    pub const fn set_pc(&mut self, pc: Address) {
        self.pc = pc;
    }

    /// The carry flag.
    #[must_use]
    pub const fn carry(&self) -> bool {
        self.carry
    }

    /// Sets or clears the carry flag.
    pub const fn set_carry(&mut self, carry: bool) {
        self.carry = carry;
    }

    /// The processor status word.
    #[must_use]
    pub const fn psw(&self) -> u32 {
        self.psw
    }

    /// Replaces the processor status word, keeping only active bits.
    pub const fn set_psw(&mut self, value: u32) {
        self.psw = value & PSW_ACTIVE_MASK;
    }

    /// Whether the fixed-point overflow mask is enabled.
    #[must_use]
    pub const fn ovk(&self) -> bool {
        self.psw & PSW_OVK != 0
    }

    /// Whether fixed-point overflow has occurred.
    #[must_use]
    pub const fn ovr(&self) -> bool {
        self.psw & PSW_OVR != 0
    }

    /// Sets or clears the overflow mask bit.
    pub const fn set_ovk(&mut self, on: bool) {
        if on {
            self.psw |= PSW_OVK;
        } else {
            self.psw &= !PSW_OVK;
        }
    }

    /// Sets or clears the overflow bit.
    pub const fn set_ovr(&mut self, on: bool) {
        if on {
            self.psw |= PSW_OVR;
        } else {
            self.psw &= !PSW_OVR;
        }
    }

    /// Whether address translation is enabled.
    #[must_use]
    pub const fn atu_on(&self) -> bool {
        self.atu_on
    }

    /// Enables or disables address translation.
    pub const fn set_atu_on(&mut self, on: bool) {
        self.atu_on = on;
    }

    /// Whether interrupts are enabled.
    #[must_use]
    pub const fn ion(&self) -> bool {
        self.ion
    }

    /// Enables or disables interrupts.
    pub const fn set_ion(&mut self, on: bool) {
        self.ion = on;
    }

    /// Reads a segment base register.
    #[must_use]
    pub const fn sbr(&self, ring: u8) -> SbrEntry {
        self.sbr[(ring & 7) as usize]
    }

    /// Replaces a segment base register.
    pub const fn set_sbr(&mut self, ring: u8, entry: SbrEntry) {
        self.sbr[(ring & 7) as usize] = entry;
    }

    /// The active segment base register, always the one the program
    /// counter's ring selects.
    #[must_use]
    pub const fn active_sbr(&self) -> SbrEntry {
        self.sbr(self.pc.ring())
    }

    /// Whether the current segment runs with the extended-mode flag.
    #[must_use]
    pub const fn lef_mode(&self) -> bool {
        self.active_sbr().lef
    }

    /// Whether the current segment may execute programmed I/O.
    #[must_use]
    pub const fn io_allowed(&self) -> bool {
        self.active_sbr().io
    }

    /// The wide-stack frame pointer.
    #[must_use]
    pub const fn wfp(&self) -> u32 {
        self.wfp
    }

    /// Replaces the wide-stack frame pointer.
    pub const fn set_wfp(&mut self, value: u32) {
        self.wfp = value;
    }

    /// The wide-stack pointer.
    #[must_use]
    pub const fn wsp(&self) -> u32 {
        self.wsp
    }

    /// Replaces the wide-stack pointer.
    pub const fn set_wsp(&mut self, value: u32) {
        self.wsp = value;
    }

    /// The wide-stack limit.
    #[must_use]
    pub const fn wsl(&self) -> u32 {
        self.wsl
    }

    /// Replaces the wide-stack limit.
    pub const fn set_wsl(&mut self, value: u32) {
        self.wsl = value;
    }

    /// The wide-stack base.
    #[must_use]
    pub const fn wsb(&self) -> u32 {
        self.wsb
    }

    /// Replaces the wide-stack base.
    pub const fn set_wsb(&mut self, value: u32) {
        self.wsb = value;
    }

    /// The wide-stack fault phase.
    #[must_use]
    pub const fn stack_phase(&self) -> StackPhase {
        self.stack_phase
    }

    /// Advances the wide-stack fault phase.
    pub const fn set_stack_phase(&mut self, phase: StackPhase) {
        self.stack_phase = phase;
    }

    /// The front-panel data switches, set by the hosting console.
    #[must_use]
    pub const fn switches(&self) -> u16 {
        self.switches
    }

    /// Updates the front-panel data switches.
    pub const fn set_switches(&mut self, value: u16) {
        self.switches = value;
    }

    /// Restores power-on register values. Memory contents are the memory
    /// collaborator's concern and are left alone; the data switches belong
    /// to the console and survive a reset.
    pub fn reset(&mut self) {
        let switches = self.switches;
        *self = Self {
            switches,
            ..Self::default()
        };
    }
}
