//! Operand decode pipeline.
//!
//! Decoding dispatches purely on the descriptor's format tag, reads the
//! 0-3 words following the first through the memory collaborator's fallible
//! accessors, and packages the extracted fields into one arm of
//! [`OperandPayload`]. It never resolves addresses and never writes
//! anything: the same call powers both execution and disassembly.

use crate::addr::Address;
use crate::bus::{IoFlag, IoReg, IoTest};
use crate::classify::OpcodeClassifier;
use crate::fault::CpuError;
use crate::isa::{InstrClass, InstrFormat, InstrIndex, INSTRUCTION_TABLE};
use crate::memory::MemoryBus;

/// The four legacy addressing modes, shared by every displacement width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrMode {
    /// Displacement is the address (zero-extended).
    Absolute,
    /// Displacement is relative to the program counter.
    PcRel,
    /// Displacement is relative to accumulator 2.
    Ac2Rel,
    /// Displacement is relative to accumulator 3.
    Ac3Rel,
}

impl AddrMode {
    /// Decodes the 2-bit mode field.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => Self::Absolute,
            0b01 => Self::PcRel,
            0b10 => Self::Ac2Rel,
            _ => Self::Ac3Rel,
        }
    }

    /// The index digit used in disassembly.
    #[must_use]
    pub const fn digit(self) -> u8 {
        match self {
            Self::Absolute => 0,
            Self::PcRel => 1,
            Self::Ac2Rel => 2,
            Self::Ac3Rel => 3,
        }
    }
}

/// Shift subfield of the legacy multiple-operation word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultShift {
    /// No shift.
    None,
    /// Rotate left one bit through carry.
    Left,
    /// Rotate right one bit through carry.
    Right,
    /// Swap the two bytes of the result.
    Swap,
}

/// Carry-base subfield of the legacy multiple-operation word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultCarry {
    /// Start from the current carry flag.
    Current,
    /// Start from zero.
    Zero,
    /// Start from one.
    One,
    /// Start from the complemented carry flag.
    Complement,
}

/// Skip subfield of the legacy multiple-operation word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultSkip {
    /// Never skip.
    Never,
    /// Always skip.
    Always,
    /// Skip on zero carry.
    CarryZero,
    /// Skip on nonzero carry.
    CarryNonzero,
    /// Skip on zero result.
    ResultZero,
    /// Skip on nonzero result.
    ResultNonzero,
    /// Skip when either carry or result is zero.
    EitherZero,
    /// Skip when both carry and result are nonzero.
    BothNonzero,
}

/// Closed sum of every operand shape the instruction set produces.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum OperandPayload {
    NoAccEff { ind: bool, mode: AddrMode, disp: i32 },
    OneAccEff { ac: u8, ind: bool, mode: AddrMode, disp: i32 },
    MultOp { acs: u8, acd: u8, shift: MultShift, carry: MultCarry, no_load: bool, skip: MultSkip },
    IoFlags { flag: IoFlag, device: u8 },
    IoData { ac: u8, reg: IoReg, out: bool, flag: IoFlag, device: u8 },
    IoTestDev { test: IoTest, device: u8 },
    CpuAcc { ac: u8 },
    Implicit,
    Param { value: u16 },
    OneAcc { ac: u8 },
    TwoAcc { acs: u8, acd: u8 },
    OneFpac { fpac: u8 },
    TwoFpac { fps: u8, fpd: u8 },
    FpacAc { fpac: u8, ac: u8 },
    ImmPlusOne { imm: u8, ac: u8 },
    AccImm16 { ac: u8, imm: i16 },
    AccImmWord { ac: u8, imm: u16 },
    AccImm32 { ac: u8, imm: u32 },
    TwoAccImm { acs: u8, acd: u8, imm: u16 },
    Eff15 { ind: bool, mode: AddrMode, disp: i32 },
    AccEff15 { ac: u8, ind: bool, mode: AddrMode, disp: i32 },
    Eff31 { ind: bool, mode: AddrMode, disp: i32 },
    AccEff31 { ac: u8, ind: bool, mode: AddrMode, disp: i32 },
    AccByte16 { ac: u8, mode: AddrMode, disp: i32 },
    AccByte32 { ac: u8, mode: AddrMode, disp: i32 },
    Call15 { ind: bool, mode: AddrMode, disp: i32, argc: u16 },
    Call31 { ind: bool, mode: AddrMode, disp: i32, argc: u16 },
    SplitDisp { disp: i32 },
    LoadEff { ac: u8, ind: bool, mode: AddrMode, disp: i32 },
}

/// A fully decoded instruction, alive for one fetch-decode-execute cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedInstruction {
    /// Index of the matched descriptor.
    pub index: InstrIndex,
    /// Mnemonic of the matched descriptor.
    pub mnemonic: &'static str,
    /// Dispatch group of the matched descriptor.
    pub class: InstrClass,
    /// Length in words.
    pub len: u8,
    /// Extracted operand fields.
    pub payload: OperandPayload,
    /// Human-readable rendering, when disassembly was requested.
    pub text: Option<String>,
}

/// Number radix for disassembly text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radix {
    /// Octal, the machine's conventional radix.
    #[default]
    Octal,
    /// Decimal.
    Decimal,
    /// Hexadecimal.
    Hex,
}

impl Radix {
    fn render(self, value: i64) -> String {
        let (sign, magnitude) = if value < 0 {
            ("-", value.unsigned_abs())
        } else {
            ("", value.unsigned_abs())
        };
        match self {
            Self::Octal => format!("{sign}{magnitude:o}"),
            Self::Decimal => format!("{sign}{magnitude}"),
            Self::Hex => format!("{sign}{magnitude:X}"),
        }
    }
}

/// Sign-extends the low `bits` of `raw`.
const fn sign_extend(raw: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((raw << shift) as i32) >> shift
}

/// Mode-aware extension of a displacement field: absolute mode zero-extends,
/// every relative mode sign-extends.
const fn extend_disp(raw: u32, bits: u32, mode: AddrMode) -> i32 {
    match mode {
        AddrMode::Absolute => raw as i32,
        _ => sign_extend(raw, bits),
    }
}

/// The operand decoder. Owns the classifier so a classification and its
/// decode always agree on the descriptor table.
pub struct Decoder {
    classifier: OpcodeClassifier,
}

impl Decoder {
    /// Builds a decoder (and its classifier lookup) once at start-up.
    #[must_use]
    pub fn new() -> Self {
        Self {
            classifier: OpcodeClassifier::new(),
        }
    }

    /// The classifier built for this decoder.
    #[must_use]
    pub const fn classifier(&self) -> &OpcodeClassifier {
        &self.classifier
    }

    /// Decodes the instruction whose first word is `opcode`, fetched at
    /// `pc`. Additional words are read at `pc+1..` through the fallible
    /// accessors so a speculative decode can never take the machine down.
    ///
    /// `lef_mode` selects the extended-mode-flag interpretation of the
    /// legacy I/O space; `io_on` reports whether the current segment may
    /// perform programmed I/O at all.
    ///
    /// # Errors
    ///
    /// [`CpuError::DecodeFailed`] when no descriptor matches (or an I/O word
    /// arrives while I/O is forbidden), [`CpuError::MemoryFault`] when an
    /// operand word is out of range.
    pub fn decode(
        &self,
        opcode: u16,
        pc: Address,
        lef_mode: bool,
        io_on: bool,
        disassemble: bool,
        radix: Radix,
        mem: &dyn MemoryBus,
    ) -> Result<DecodedInstruction, CpuError> {
        let decode_failed = || CpuError::DecodeFailed {
            pc: pc.phys(),
            opcode,
        };

        let index = self
            .classifier
            .classify(opcode, lef_mode)
            .ok_or_else(decode_failed)?;
        let d = &INSTRUCTION_TABLE[usize::from(index)];

        if d.class == InstrClass::NovaIo && !io_on {
            return Err(decode_failed());
        }

        let word = |offset: u8| -> Result<u16, CpuError> {
            let addr = pc.advance(u32::from(offset)).phys();
            mem.try_read_word(addr)
                .ok_or(CpuError::MemoryFault { addr })
        };
        let dword = |offset: u8| -> Result<u32, CpuError> {
            Ok((u32::from(word(offset)?) << 16) | u32::from(word(offset + 1)?))
        };

        let payload = match d.fmt {
            InstrFormat::NovaNoAccEff => {
                let mode = AddrMode::from_bits(opcode >> 8);
                OperandPayload::NoAccEff {
                    ind: opcode & 0x0400 != 0,
                    mode,
                    disp: extend_disp(u32::from(opcode & 0xFF), 8, mode),
                }
            }
            InstrFormat::NovaOneAccEff | InstrFormat::LefFmt => {
                let mode = AddrMode::from_bits(opcode >> 8);
                let ac = ((opcode >> 11) & 3) as u8;
                let ind = opcode & 0x0400 != 0;
                let disp = extend_disp(u32::from(opcode & 0xFF), 8, mode);
                if d.fmt == InstrFormat::LefFmt {
                    OperandPayload::LoadEff { ac, ind, mode, disp }
                } else {
                    OperandPayload::OneAccEff { ac, ind, mode, disp }
                }
            }
            InstrFormat::NovaTwoAccMultOp => OperandPayload::MultOp {
                acs: ((opcode >> 13) & 3) as u8,
                acd: ((opcode >> 11) & 3) as u8,
                shift: match (opcode >> 6) & 3 {
                    1 => MultShift::Left,
                    2 => MultShift::Right,
                    3 => MultShift::Swap,
                    _ => MultShift::None,
                },
                carry: match (opcode >> 4) & 3 {
                    1 => MultCarry::Zero,
                    2 => MultCarry::One,
                    3 => MultCarry::Complement,
                    _ => MultCarry::Current,
                },
                no_load: opcode & 0x0008 != 0,
                skip: match opcode & 7 {
                    1 => MultSkip::Always,
                    2 => MultSkip::CarryZero,
                    3 => MultSkip::CarryNonzero,
                    4 => MultSkip::ResultZero,
                    5 => MultSkip::ResultNonzero,
                    6 => MultSkip::EitherZero,
                    7 => MultSkip::BothNonzero,
                    _ => MultSkip::Never,
                },
            },
            InstrFormat::IoFlagsDev => OperandPayload::IoFlags {
                flag: IoFlag::from_bits(opcode >> 6),
                device: (opcode & 0x3F) as u8,
            },
            InstrFormat::IoDataDev => {
                let op = (opcode >> 8) & 7;
                let (reg, out) = match op {
                    1 => (IoReg::A, false),
                    2 => (IoReg::A, true),
                    3 => (IoReg::B, false),
                    4 => (IoReg::B, true),
                    5 => (IoReg::C, false),
                    _ => (IoReg::C, true),
                };
                OperandPayload::IoData {
                    ac: ((opcode >> 11) & 3) as u8,
                    reg,
                    out,
                    flag: IoFlag::from_bits(opcode >> 6),
                    device: (opcode & 0x3F) as u8,
                }
            }
            InstrFormat::IoTestDev => OperandPayload::IoTestDev {
                test: IoTest::from_bits(opcode >> 6),
                device: (opcode & 0x3F) as u8,
            },
            InstrFormat::CpuDeviceOneAcc => OperandPayload::CpuAcc {
                ac: ((opcode >> 11) & 3) as u8,
            },
            InstrFormat::CpuDeviceNone | InstrFormat::UniqueOneWord => OperandPayload::Implicit,
            InstrFormat::UniqueTwoWord => OperandPayload::Param { value: word(1)? },
            InstrFormat::OneAccOneWord => OperandPayload::OneAcc {
                ac: ((opcode >> 13) & 3) as u8,
            },
            InstrFormat::TwoAccOneWord => OperandPayload::TwoAcc {
                acs: ((opcode >> 13) & 3) as u8,
                acd: ((opcode >> 11) & 3) as u8,
            },
            InstrFormat::OneFpacOneWord => OperandPayload::OneFpac {
                fpac: ((opcode >> 13) & 3) as u8,
            },
            InstrFormat::TwoFpacOneWord => OperandPayload::TwoFpac {
                fps: ((opcode >> 13) & 3) as u8,
                fpd: ((opcode >> 11) & 3) as u8,
            },
            InstrFormat::FpacAcOneWord => OperandPayload::FpacAc {
                fpac: ((opcode >> 13) & 3) as u8,
                ac: ((opcode >> 11) & 3) as u8,
            },
            InstrFormat::ImmOneAcc => OperandPayload::ImmPlusOne {
                // The 2-bit field encodes 1-4.
                imm: (((opcode >> 13) & 3) + 1) as u8,
                ac: ((opcode >> 11) & 3) as u8,
            },
            InstrFormat::OneAccImm2Word => OperandPayload::AccImm16 {
                ac: ((opcode >> 13) & 3) as u8,
                imm: word(1)? as i16,
            },
            InstrFormat::OneAccImmWd2Word => OperandPayload::AccImmWord {
                ac: ((opcode >> 13) & 3) as u8,
                imm: word(1)?,
            },
            InstrFormat::OneAccImmDwd3Word => OperandPayload::AccImm32 {
                ac: ((opcode >> 13) & 3) as u8,
                imm: dword(1)?,
            },
            InstrFormat::TwoAccImm2Word => OperandPayload::TwoAccImm {
                acs: ((opcode >> 13) & 3) as u8,
                acd: ((opcode >> 11) & 3) as u8,
                imm: word(1)?,
            },
            InstrFormat::NoAccModeInd2WordE | InstrFormat::NoAccModeInd2WordX => {
                let mode = AddrMode::from_bits(opcode >> 11);
                let w = word(1)?;
                OperandPayload::Eff15 {
                    ind: w & 0x8000 != 0,
                    mode,
                    disp: extend_disp(u32::from(w & 0x7FFF), 15, mode),
                }
            }
            InstrFormat::OneAccModeInd2WordE | InstrFormat::OneAccModeInd2WordX => {
                let mode = AddrMode::from_bits(opcode >> 11);
                let w = word(1)?;
                OperandPayload::AccEff15 {
                    ac: ((opcode >> 13) & 3) as u8,
                    ind: w & 0x8000 != 0,
                    mode,
                    disp: extend_disp(u32::from(w & 0x7FFF), 15, mode),
                }
            }
            InstrFormat::NoAccModeInd3WordL => {
                let mode = AddrMode::from_bits(opcode >> 11);
                let dw = dword(1)?;
                OperandPayload::Eff31 {
                    ind: dw & 0x8000_0000 != 0,
                    mode,
                    disp: extend_disp(dw & 0x7FFF_FFFF, 31, mode),
                }
            }
            InstrFormat::OneAccModeInd3WordL => {
                let mode = AddrMode::from_bits(opcode >> 11);
                let dw = dword(1)?;
                OperandPayload::AccEff31 {
                    ac: ((opcode >> 13) & 3) as u8,
                    ind: dw & 0x8000_0000 != 0,
                    mode,
                    disp: extend_disp(dw & 0x7FFF_FFFF, 31, mode),
                }
            }
            InstrFormat::OneAccMode2WordXB => {
                let mode = AddrMode::from_bits(opcode >> 11);
                OperandPayload::AccByte16 {
                    ac: ((opcode >> 13) & 3) as u8,
                    mode,
                    disp: extend_disp(u32::from(word(1)?), 16, mode),
                }
            }
            InstrFormat::OneAccMode3WordLB => {
                let mode = AddrMode::from_bits(opcode >> 11);
                OperandPayload::AccByte32 {
                    ac: ((opcode >> 13) & 3) as u8,
                    mode,
                    disp: dword(1)? as i32,
                }
            }
            InstrFormat::NoAccModeInd3WordXcall => {
                let mode = AddrMode::from_bits(opcode >> 11);
                let w = word(1)?;
                OperandPayload::Call15 {
                    ind: w & 0x8000 != 0,
                    mode,
                    disp: extend_disp(u32::from(w & 0x7FFF), 15, mode),
                    argc: word(2)?,
                }
            }
            InstrFormat::NoAccModeInd4WordLcall => {
                let mode = AddrMode::from_bits(opcode >> 11);
                let dw = dword(1)?;
                OperandPayload::Call31 {
                    ind: dw & 0x8000_0000 != 0,
                    mode,
                    disp: extend_disp(dw & 0x7FFF_FFFF, 31, mode),
                    argc: word(3)?,
                }
            }
            InstrFormat::Split8bitDisp => {
                let raw = u32::from((opcode >> 11) & 0xF) << 4 | u32::from((opcode >> 4) & 0xF);
                OperandPayload::SplitDisp {
                    disp: sign_extend(raw, 8),
                }
            }
        };

        let text = disassemble.then(|| render(d.mnemonic, &payload, radix));

        Ok(DecodedInstruction {
            index,
            mnemonic: d.mnemonic,
            class: d.class,
            len: d.len,
            payload,
            text,
        })
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the disassembly text from the already-extracted fields.
fn render(mnemonic: &str, payload: &OperandPayload, radix: Radix) -> String {
    let n = |value: i64| radix.render(value);
    let eff = |ind: bool, disp: i32, mode: AddrMode| {
        format!(
            "{}{},{}",
            if ind { "@" } else { "" },
            n(i64::from(disp)),
            mode.digit()
        )
    };

    match *payload {
        OperandPayload::NoAccEff { ind, mode, disp } => {
            format!("{mnemonic} {}", eff(ind, disp, mode))
        }
        OperandPayload::OneAccEff { ac, ind, mode, disp }
        | OperandPayload::LoadEff { ac, ind, mode, disp } => {
            format!("{mnemonic} {ac},{}", eff(ind, disp, mode))
        }
        OperandPayload::MultOp {
            acs,
            acd,
            shift,
            carry,
            no_load,
            skip,
        } => {
            let carry = match carry {
                MultCarry::Current => "",
                MultCarry::Zero => "Z",
                MultCarry::One => "O",
                MultCarry::Complement => "C",
            };
            let shift = match shift {
                MultShift::None => "",
                MultShift::Left => "L",
                MultShift::Right => "R",
                MultShift::Swap => "S",
            };
            let no_load = if no_load { "#" } else { "" };
            let skip = match skip {
                MultSkip::Never => "",
                MultSkip::Always => ",SKP",
                MultSkip::CarryZero => ",SZC",
                MultSkip::CarryNonzero => ",SNC",
                MultSkip::ResultZero => ",SZR",
                MultSkip::ResultNonzero => ",SNR",
                MultSkip::EitherZero => ",SEZ",
                MultSkip::BothNonzero => ",SBN",
            };
            format!("{mnemonic}{carry}{shift}{no_load} {acs},{acd}{skip}")
        }
        OperandPayload::IoFlags { flag, device } => {
            format!("{mnemonic}{} {}", flag_letter(flag), n(i64::from(device)))
        }
        OperandPayload::IoData { ac, flag, device, .. } => {
            format!(
                "{mnemonic}{} {ac},{}",
                flag_letter(flag),
                n(i64::from(device))
            )
        }
        OperandPayload::IoTestDev { device, .. } => {
            format!("{mnemonic} {}", n(i64::from(device)))
        }
        OperandPayload::CpuAcc { ac } | OperandPayload::OneAcc { ac } => {
            format!("{mnemonic} {ac}")
        }
        OperandPayload::Implicit => mnemonic.to_string(),
        OperandPayload::Param { value } => format!("{mnemonic} {}", n(i64::from(value))),
        OperandPayload::TwoAcc { acs, acd } => format!("{mnemonic} {acs},{acd}"),
        OperandPayload::OneFpac { fpac } => format!("{mnemonic} {fpac}"),
        OperandPayload::TwoFpac { fps, fpd } => format!("{mnemonic} {fps},{fpd}"),
        OperandPayload::FpacAc { fpac, ac } => format!("{mnemonic} {fpac},{ac}"),
        OperandPayload::ImmPlusOne { imm, ac } => format!("{mnemonic} {imm},{ac}"),
        OperandPayload::AccImm16 { ac, imm } => {
            format!("{mnemonic} {},{ac}", n(i64::from(imm)))
        }
        OperandPayload::AccImmWord { ac, imm } => {
            format!("{mnemonic} {},{ac}", n(i64::from(imm)))
        }
        OperandPayload::AccImm32 { ac, imm } => {
            format!("{mnemonic} {},{ac}", n(i64::from(imm)))
        }
        OperandPayload::TwoAccImm { acs, acd, imm } => {
            format!("{mnemonic} {},{acs},{acd}", n(i64::from(imm)))
        }
        OperandPayload::Eff15 { ind, mode, disp } | OperandPayload::Eff31 { ind, mode, disp } => {
            format!("{mnemonic} {}", eff(ind, disp, mode))
        }
        OperandPayload::AccEff15 { ac, ind, mode, disp }
        | OperandPayload::AccEff31 { ac, ind, mode, disp } => {
            format!("{mnemonic} {ac},{}", eff(ind, disp, mode))
        }
        OperandPayload::AccByte16 { ac, mode, disp }
        | OperandPayload::AccByte32 { ac, mode, disp } => {
            format!("{mnemonic} {ac},{},{}", n(i64::from(disp)), mode.digit())
        }
        OperandPayload::Call15 { ind, mode, disp, argc }
        | OperandPayload::Call31 { ind, mode, disp, argc } => {
            format!(
                "{mnemonic} {},{}",
                eff(ind, disp, mode),
                n(i64::from(argc))
            )
        }
        OperandPayload::SplitDisp { disp } => format!("{mnemonic} {}", n(i64::from(disp))),
    }
}

const fn flag_letter(flag: IoFlag) -> &'static str {
    match flag {
        IoFlag::None => "",
        IoFlag::Start => "S",
        IoFlag::Clear => "C",
        IoFlag::Pulse => "P",
    }
}
