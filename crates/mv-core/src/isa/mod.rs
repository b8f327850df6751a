//! Instruction set descriptors for the three overlapping MV-family ISAs.
//!
//! The legacy 16-bit accumulator machine, the extended-register set layered
//! on top of it, and the 32-bit wide set all share the same 16-bit first
//! word. [`INSTRUCTION_TABLE`] is the single source of truth: one immutable
//! descriptor per mnemonic, in precedence order. Any first word matching no
//! descriptor is illegal by definition.

mod table;

pub use table::{INSTRUCTION_TABLE, LEF_MNEMONIC};

/// Index of a descriptor inside [`INSTRUCTION_TABLE`].
pub type InstrIndex = u16;

/// Dispatch group of an instruction.
///
/// The legacy accumulator machine contributes the four `Nova*` groups, the
/// extended-register set the four `Eclipse*` groups, and the wide set the
/// six `Eagle*` groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum InstrClass {
    NovaMemRef,
    NovaOp,
    NovaIo,
    NovaPc,
    EclipseMemRef,
    EclipseOp,
    EclipsePc,
    EclipseStack,
    EagleMemRef,
    EagleOp,
    EaglePc,
    EagleStack,
    EagleIo,
    EagleFpu,
}

/// Operand-format families.
///
/// Each tag names the bit layout of the instruction's operand fields; the
/// operand decoder dispatches purely on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum InstrFormat {
    /// Legacy effective address, no accumulator: indirect bit, 2-bit mode,
    /// 8-bit displacement in the first word.
    NovaNoAccEff,
    /// Legacy effective address plus a 2-bit accumulator selector.
    NovaOneAccEff,
    /// Legacy two-accumulator multiple-operation word: function, shift,
    /// carry control, no-load bit, skip condition.
    NovaTwoAccMultOp,
    /// Flag control + device number, no data accumulator.
    IoFlagsDev,
    /// Accumulator + flag control + device number.
    IoDataDev,
    /// Busy/Done test + device number.
    IoTestDev,
    /// CPU pseudo-device operation using one accumulator.
    CpuDeviceOneAcc,
    /// CPU pseudo-device operation with no operands.
    CpuDeviceNone,
    /// Single word, no operand fields.
    UniqueOneWord,
    /// First word fixed, second word is an unsigned parameter.
    UniqueTwoWord,
    /// One accumulator in the first word.
    OneAccOneWord,
    /// Source and destination accumulators in the first word.
    TwoAccOneWord,
    /// One floating accumulator in the first word.
    OneFpacOneWord,
    /// Source and destination floating accumulators in the first word.
    TwoFpacOneWord,
    /// Floating accumulator + fixed accumulator pair.
    FpacAcOneWord,
    /// 2-bit immediate (decoded as value + 1) plus one accumulator.
    ImmOneAcc,
    /// One accumulator + sign-extended 16-bit immediate word.
    OneAccImm2Word,
    /// One accumulator + raw 16-bit immediate word.
    OneAccImmWd2Word,
    /// One accumulator + 32-bit immediate doubleword.
    OneAccImmDwd3Word,
    /// Two accumulators + 16-bit immediate word.
    TwoAccImm2Word,
    /// Extended no-accumulator reference: mode in word 0, indirect bit and
    /// 15-bit displacement in word 1.
    NoAccModeInd2WordE,
    /// Extended one-accumulator reference, 15-bit displacement.
    OneAccModeInd2WordE,
    /// Wide no-accumulator reference, 15-bit displacement counted from the
    /// displacement word itself.
    NoAccModeInd2WordX,
    /// Wide one-accumulator reference, 15-bit displacement counted from the
    /// displacement word itself.
    OneAccModeInd2WordX,
    /// Wide byte reference: 16-bit byte displacement, no indirection.
    OneAccMode2WordXB,
    /// Wide no-accumulator reference, 31-bit displacement doubleword.
    NoAccModeInd3WordL,
    /// Wide one-accumulator reference, 31-bit displacement doubleword.
    OneAccModeInd3WordL,
    /// Wide byte reference with a 32-bit byte displacement doubleword.
    OneAccMode3WordLB,
    /// Wide call: 15-bit target word plus argument-count word.
    NoAccModeInd3WordXcall,
    /// Wide call: 31-bit target doubleword plus argument-count word.
    NoAccModeInd4WordLcall,
    /// 8-bit displacement split across the two spare nibbles of the word.
    Split8bitDisp,
    /// The extended-mode-flag instruction: legacy effective-address shape
    /// reached only through the classifier's mode carve-out.
    LefFmt,
}

/// One immutable instruction descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrDescriptor {
    /// Assembler mnemonic.
    pub mnemonic: &'static str,
    /// Fixed bits of the first word.
    pub bits: u16,
    /// Mask of significant first-word bits.
    pub mask: u16,
    /// Instruction length in words (1-4).
    pub len: u8,
    /// Operand format family.
    pub fmt: InstrFormat,
    /// Dispatch group.
    pub class: InstrClass,
    /// Word offset of the displacement/parameter field, when one exists.
    pub disp_offset: u8,
    /// Legacy multiple-operation entries whose low-4-bit tail patterns
    /// `1000`/`1001` are reserved for the newer encodings and must fall
    /// through to later table entries.
    pub reserved_tail: bool,
}

impl InstrDescriptor {
    /// Whether `word` matches this descriptor's fixed bits, before the
    /// precedence carve-outs are applied.
    #[must_use]
    pub const fn matches(&self, word: u16) -> bool {
        word & self.mask == self.bits
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{InstrClass, InstrFormat, INSTRUCTION_TABLE};

    #[test]
    fn mnemonics_are_unique() {
        let names: HashSet<_> = INSTRUCTION_TABLE.iter().map(|d| d.mnemonic).collect();
        assert_eq!(names.len(), INSTRUCTION_TABLE.len());
    }

    #[test]
    fn fixed_bits_always_lie_inside_the_mask() {
        for d in INSTRUCTION_TABLE {
            assert_eq!(d.bits & !d.mask, 0, "{} has bits outside its mask", d.mnemonic);
        }
    }

    #[test]
    fn lengths_are_one_to_four_words() {
        for d in INSTRUCTION_TABLE {
            assert!((1..=4).contains(&d.len), "{} length {}", d.mnemonic, d.len);
        }
    }

    #[test]
    fn reserved_tail_flags_mark_exactly_the_five_legacy_arithmetics() {
        let flagged: Vec<_> = INSTRUCTION_TABLE
            .iter()
            .filter(|d| d.reserved_tail)
            .map(|d| d.mnemonic)
            .collect();
        assert_eq!(flagged, ["NEG", "ADC", "SUB", "ADD", "AND"]);
    }

    #[test]
    fn all_fourteen_classes_are_populated() {
        let classes: HashSet<_> = INSTRUCTION_TABLE.iter().map(|d| d.class).collect();
        for class in [
            InstrClass::NovaMemRef,
            InstrClass::NovaOp,
            InstrClass::NovaIo,
            InstrClass::NovaPc,
            InstrClass::EclipseMemRef,
            InstrClass::EclipseOp,
            InstrClass::EclipsePc,
            InstrClass::EclipseStack,
            InstrClass::EagleMemRef,
            InstrClass::EagleOp,
            InstrClass::EaglePc,
            InstrClass::EagleStack,
            InstrClass::EagleIo,
            InstrClass::EagleFpu,
        ] {
            assert!(classes.contains(&class), "{class:?} has no entries");
        }
    }

    #[test]
    fn extended_entries_only_use_reserved_tail_patterns() {
        for d in INSTRUCTION_TABLE {
            if d.mask & 0x000F == 0x000F && d.bits & 0x8000 != 0 {
                let tail = d.bits & 0x000F;
                assert!(
                    tail == 0o10 || tail == 0o11,
                    "{} tail {tail:#06b} is not a reserved pattern",
                    d.mnemonic
                );
                let func = (d.bits >> 8) & 0x7;
                assert!(
                    matches!(func, 1 | 4..=7),
                    "{} function prefix {func} collides with a non-excluded legacy entry",
                    d.mnemonic
                );
            }
        }
    }

    #[test]
    fn multi_word_formats_carry_a_displacement_offset() {
        for d in INSTRUCTION_TABLE {
            if matches!(
                d.fmt,
                InstrFormat::NoAccModeInd2WordE
                    | InstrFormat::OneAccModeInd2WordE
                    | InstrFormat::NoAccModeInd2WordX
                    | InstrFormat::OneAccModeInd2WordX
                    | InstrFormat::NoAccModeInd3WordL
                    | InstrFormat::OneAccModeInd3WordL
            ) {
                assert_eq!(d.disp_offset, 1, "{}", d.mnemonic);
            }
        }
    }
}
