//! Opcode classification.
//!
//! The classifier walks every possible 16-bit first word once, at
//! construction, and records the winning descriptor index per word. Run-time
//! classification is a single indexed read. The table is owned by the
//! classifier instance; there is no module-level mutable state, so several
//! processor instances can be classified independently.

use crate::isa::{InstrIndex, INSTRUCTION_TABLE, LEF_MNEMONIC};

/// First-word pattern shared by the whole legacy programmed-I/O space, which
/// the extended-mode-flag instruction takes over while that mode is active.
const IO_SPACE_MASK: u16 = 0xE000;
const IO_SPACE_BITS: u16 = 0x6000;

/// The two first-word tail patterns reserved for the newer encodings.
const fn is_reserved_tail(word: u16) -> bool {
    matches!(word & 0x000F, 0o10 | 0o11)
}

/// O(1) first-word classifier built from [`INSTRUCTION_TABLE`].
pub struct OpcodeClassifier {
    slots: Box<[Option<InstrIndex>; 0x1_0000]>,
    lef_index: InstrIndex,
}

impl OpcodeClassifier {
    /// Builds the 65536-entry lookup by matching every word against the
    /// instruction table in declaration order.
    #[must_use]
    pub fn new() -> Self {
        let lef_index = INSTRUCTION_TABLE
            .iter()
            .position(|d| d.mnemonic == LEF_MNEMONIC)
            .map(|i| i as InstrIndex)
            .unwrap_or_default();

        let mut slots = vec![None; 0x1_0000];
        for (word, slot) in slots.iter_mut().enumerate() {
            *slot = Self::scan(word as u16);
        }
        let slots = slots
            .into_boxed_slice()
            .try_into()
            .unwrap_or_else(|_| unreachable!("slot count is fixed"));

        Self { slots, lef_index }
    }

    /// First-match table scan with the documented precedence carve-out for
    /// the reserved tail patterns.
    fn scan(word: u16) -> Option<InstrIndex> {
        INSTRUCTION_TABLE
            .iter()
            .enumerate()
            .find(|(_, d)| d.matches(word) && !(d.reserved_tail && is_reserved_tail(word)))
            .map(|(i, _)| i as InstrIndex)
    }

    /// Classifies one first word.
    ///
    /// While the extended-mode flag is active, every word in the legacy I/O
    /// space *is* the mode-flag instruction; the answer is returned directly
    /// without consulting the lookup.
    #[must_use]
    pub fn classify(&self, word: u16, lef_mode: bool) -> Option<InstrIndex> {
        if lef_mode && word & IO_SPACE_MASK == IO_SPACE_BITS {
            return Some(self.lef_index);
        }
        self.slots[usize::from(word)]
    }

    /// The table index of the extended-mode-flag instruction.
    #[must_use]
    pub const fn lef_index(&self) -> InstrIndex {
        self.lef_index
    }
}

impl Default for OpcodeClassifier {
    fn default() -> Self {
        Self::new()
    }
}
