//! The instruction descriptor table.
//!
//! Declaration order is precedence order: the classifier scans this table
//! top to bottom and the first match wins. The CPU pseudo-device entries
//! therefore precede the generic programmed-I/O entries, and the legacy
//! multiple-operation entries precede the extended sets they shadow.
//!
//! Extended (non-legacy) first words live entirely inside the legacy
//! multiple-operation space, in the no-load/never-skip tail patterns
//! (`....1000`/`....1001`) that the five flagged legacy arithmetics decline.
//! Their fixed pattern is `1 .. .. fff gggg tail` with the function prefix
//! `fff` restricted to the five flagged codes; `gggg` distinguishes
//! instructions inside a prefix. Field bits (accumulators or addressing
//! mode) occupy bits 14-11 where a format calls for them.

use super::{InstrClass, InstrDescriptor, InstrFormat};

/// Mnemonic of the extended-mode-flag instruction, reachable only through
/// the classifier's mode carve-out.
pub const LEF_MNEMONIC: &str = "LEF";

/// Mask for extended entries with operand fields in bits 14-11.
const M_FIELDS: u16 = 0x87FF;
/// Mask for extended one-operand entries (field in bits 14-13, 12-11 zero).
const M_ONE: u16 = 0x9FFF;
/// Mask for extended no-accumulator entries (mode in bits 12-11, 14-13 zero).
const M_MODE: u16 = 0xE7FF;
/// Mask for extended entries with no field bits at all.
const M_FIXED: u16 = 0xFFFF;
/// Mask for the split-displacement entry, which owns a whole function prefix.
const M_SPLIT: u16 = 0x870F;

/// Fixed bits of an extended-register-set entry (`....1000` tail).
const fn eop(fff: u16, g: u16) -> u16 {
    0x8000 | (fff << 8) | (g << 4) | 0o10
}

/// Fixed bits of a wide-set entry (`....1001` tail).
const fn wop(fff: u16, g: u16) -> u16 {
    0x8000 | (fff << 8) | (g << 4) | 0o11
}

const fn entry(
    mnemonic: &'static str,
    bits: u16,
    mask: u16,
    len: u8,
    fmt: InstrFormat,
    class: InstrClass,
    disp_offset: u8,
) -> InstrDescriptor {
    InstrDescriptor {
        mnemonic,
        bits,
        mask,
        len,
        fmt,
        class,
        disp_offset,
        reserved_tail: false,
    }
}

const fn multop(mnemonic: &'static str, bits: u16, reserved_tail: bool) -> InstrDescriptor {
    InstrDescriptor {
        mnemonic,
        bits,
        mask: 0x8700,
        len: 1,
        fmt: InstrFormat::NovaTwoAccMultOp,
        class: InstrClass::NovaOp,
        disp_offset: 0,
        reserved_tail,
    }
}

use InstrClass as C;
use InstrFormat as F;

/// Every instruction the core understands, in precedence order.
#[rustfmt::skip]
pub static INSTRUCTION_TABLE: &[InstrDescriptor] = &[
    // Legacy memory reference and transfer of control.
    entry("JMP",   0x0000, 0xF800, 1, F::NovaNoAccEff,  C::NovaPc,     0),
    entry("JSR",   0x0800, 0xF800, 1, F::NovaNoAccEff,  C::NovaPc,     0),
    entry("ISZ",   0x1000, 0xF800, 1, F::NovaNoAccEff,  C::NovaMemRef, 0),
    entry("DSZ",   0x1800, 0xF800, 1, F::NovaNoAccEff,  C::NovaMemRef, 0),
    entry("LDA",   0x2000, 0xE000, 1, F::NovaOneAccEff, C::NovaMemRef, 0),
    entry("STA",   0x4000, 0xE000, 1, F::NovaOneAccEff, C::NovaMemRef, 0),

    // CPU pseudo-device (device 77) aliases, ahead of the generic I/O
    // entries that would otherwise swallow them.
    entry("INTEN", 0x607F, 0xE7FF, 1, F::CpuDeviceNone,   C::NovaIo, 0),
    entry("INTDS", 0x60BF, 0xE7FF, 1, F::CpuDeviceNone,   C::NovaIo, 0),
    entry("READS", 0x613F, 0xE73F, 1, F::CpuDeviceOneAcc, C::NovaIo, 0),
    entry("INTA",  0x633F, 0xE73F, 1, F::CpuDeviceOneAcc, C::NovaIo, 0),
    entry("MSKO",  0x643F, 0xE73F, 1, F::CpuDeviceOneAcc, C::NovaIo, 0),
    entry("IORST", 0x653F, 0xE73F, 1, F::CpuDeviceNone,   C::NovaIo, 0),
    entry("HALT",  0x663F, 0xE73F, 1, F::CpuDeviceNone,   C::NovaIo, 0),

    // Generic programmed I/O.
    entry("NIO",   0x6000, 0xE700, 1, F::IoFlagsDev, C::NovaIo, 0),
    entry("DIA",   0x6100, 0xE700, 1, F::IoDataDev,  C::NovaIo, 0),
    entry("DOA",   0x6200, 0xE700, 1, F::IoDataDev,  C::NovaIo, 0),
    entry("DIB",   0x6300, 0xE700, 1, F::IoDataDev,  C::NovaIo, 0),
    entry("DOB",   0x6400, 0xE700, 1, F::IoDataDev,  C::NovaIo, 0),
    entry("DIC",   0x6500, 0xE700, 1, F::IoDataDev,  C::NovaIo, 0),
    entry("DOC",   0x6600, 0xE700, 1, F::IoDataDev,  C::NovaIo, 0),
    entry("SKPBN", 0x6700, 0xE7C0, 1, F::IoTestDev,  C::NovaIo, 0),
    entry("SKPBZ", 0x6740, 0xE7C0, 1, F::IoTestDev,  C::NovaIo, 0),
    entry("SKPDN", 0x6780, 0xE7C0, 1, F::IoTestDev,  C::NovaIo, 0),
    entry("SKPDZ", 0x67C0, 0xE7C0, 1, F::IoTestDev,  C::NovaIo, 0),
    // The extended-mode-flag instruction shares the whole I/O space; the
    // entries above cover every word of it, so this entry is reachable
    // only through the classifier's mode carve-out.
    entry("LEF",   0x6000, 0xE000, 1, F::LefFmt, C::EclipseMemRef, 0),

    // Legacy two-accumulator multiple-operation set. The flagged entries
    // decline the reserved tails, letting the extended sets through.
    multop("COM", 0x8000, false),
    multop("NEG", 0x8100, true),
    multop("MOV", 0x8200, false),
    multop("INC", 0x8300, false),
    multop("ADC", 0x8400, true),
    multop("SUB", 0x8500, true),
    multop("ADD", 0x8600, true),
    multop("AND", 0x8700, true),

    // Extended-register set (tail 1000).
    entry("ADI",   eop(1, 0),  M_FIELDS, 1, F::ImmOneAcc,          C::EclipseOp,     0),
    entry("SBI",   eop(1, 1),  M_FIELDS, 1, F::ImmOneAcc,          C::EclipseOp,     0),
    entry("XCH",   eop(1, 2),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("ADDI",  eop(1, 3),  M_ONE,    2, F::OneAccImm2Word,     C::EclipseOp,     1),
    entry("ANDI",  eop(1, 4),  M_ONE,    2, F::OneAccImmWd2Word,   C::EclipseOp,     1),
    entry("IORI",  eop(1, 5),  M_ONE,    2, F::OneAccImmWd2Word,   C::EclipseOp,     1),
    entry("XORI",  eop(1, 6),  M_ONE,    2, F::OneAccImmWd2Word,   C::EclipseOp,     1),
    entry("LSH",   eop(1, 7),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("DLSH",  eop(1, 8),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("HXL",   eop(1, 9),  M_FIELDS, 1, F::ImmOneAcc,          C::EclipseOp,     0),
    entry("HXR",   eop(1, 10), M_FIELDS, 1, F::ImmOneAcc,          C::EclipseOp,     0),
    entry("IOR",   eop(1, 11), M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("XOR",   eop(1, 12), M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("ANC",   eop(1, 13), M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("HLV",   eop(1, 14), M_ONE,    1, F::OneAccOneWord,      C::EclipseOp,     0),
    entry("CLM",   eop(1, 15), M_FIELDS, 1, F::TwoAccOneWord,      C::EclipsePc,     0),
    entry("BTO",   eop(4, 0),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("BTZ",   eop(4, 1),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("SZB",   eop(4, 2),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipsePc,     0),
    entry("SNB",   eop(4, 3),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipsePc,     0),
    entry("SGT",   eop(4, 4),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipsePc,     0),
    entry("SGE",   eop(4, 5),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipsePc,     0),
    entry("LOB",   eop(4, 6),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("LRB",   eop(4, 7),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("COB",   eop(4, 8),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("DAD",   eop(4, 9),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("DSB",   eop(4, 10), M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseOp,     0),
    entry("MUL",   eop(4, 11), M_FIXED,  1, F::UniqueOneWord,      C::EclipseOp,     0),
    entry("DIV",   eop(4, 12), M_FIXED,  1, F::UniqueOneWord,      C::EclipseOp,     0),
    entry("MULS",  eop(4, 13), M_FIXED,  1, F::UniqueOneWord,      C::EclipseOp,     0),
    entry("DIVS",  eop(4, 14), M_FIXED,  1, F::UniqueOneWord,      C::EclipseOp,     0),
    entry("CMV",   eop(4, 15), M_FIXED,  1, F::UniqueOneWord,      C::EclipseOp,     0),
    entry("CMP",   eop(5, 0),  M_FIXED,  1, F::UniqueOneWord,      C::EclipseOp,     0),
    entry("CTR",   eop(5, 1),  M_FIXED,  1, F::UniqueOneWord,      C::EclipseOp,     0),
    entry("CMT",   eop(5, 2),  M_FIXED,  1, F::UniqueOneWord,      C::EclipseOp,     0),
    entry("PSH",   eop(5, 3),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseStack,  0),
    entry("POP",   eop(5, 4),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseStack,  0),
    entry("SAV",   eop(5, 5),  M_FIXED,  1, F::UniqueOneWord,      C::EclipseStack,  0),
    entry("RTN",   eop(5, 6),  M_FIXED,  1, F::UniqueOneWord,      C::EclipseStack,  0),
    entry("MSP",   eop(5, 7),  M_ONE,    1, F::OneAccOneWord,      C::EclipseStack,  0),
    entry("PSHJ",  eop(5, 8),  M_MODE,   2, F::NoAccModeInd2WordE, C::EclipseStack,  1),
    entry("POPJ",  eop(5, 9),  M_FIXED,  1, F::UniqueOneWord,      C::EclipseStack,  0),
    entry("EJMP",  eop(5, 10), M_MODE,   2, F::NoAccModeInd2WordE, C::EclipsePc,     1),
    entry("EJSR",  eop(5, 11), M_MODE,   2, F::NoAccModeInd2WordE, C::EclipsePc,     1),
    entry("EISZ",  eop(5, 12), M_MODE,   2, F::NoAccModeInd2WordE, C::EclipseMemRef, 1),
    entry("EDSZ",  eop(5, 13), M_MODE,   2, F::NoAccModeInd2WordE, C::EclipseMemRef, 1),
    entry("ELDA",  eop(5, 14), M_FIELDS, 2, F::OneAccModeInd2WordE, C::EclipseMemRef, 1),
    entry("ESTA",  eop(5, 15), M_FIELDS, 2, F::OneAccModeInd2WordE, C::EclipseMemRef, 1),
    entry("ELEF",  eop(6, 0),  M_FIELDS, 2, F::OneAccModeInd2WordE, C::EclipseMemRef, 1),
    entry("ELDB",  eop(6, 1),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseMemRef, 0),
    entry("ESTB",  eop(6, 2),  M_FIELDS, 1, F::TwoAccOneWord,      C::EclipseMemRef, 0),

    // Wide instructions that overflowed into the spare extended tails.
    entry("LCALL", eop(6, 3),  M_MODE,   4, F::NoAccModeInd4WordLcall, C::EaglePc,    1),
    entry("LNLDA", eop(6, 4),  M_FIELDS, 3, F::OneAccModeInd3WordL, C::EagleMemRef,  1),
    entry("LNSTA", eop(6, 5),  M_FIELDS, 3, F::OneAccModeInd3WordL, C::EagleMemRef,  1),
    entry("LWLDA", eop(6, 6),  M_FIELDS, 3, F::OneAccModeInd3WordL, C::EagleMemRef,  1),
    entry("LWSTA", eop(6, 7),  M_FIELDS, 3, F::OneAccModeInd3WordL, C::EagleMemRef,  1),
    entry("LLEF",  eop(6, 8),  M_FIELDS, 3, F::OneAccModeInd3WordL, C::EagleMemRef,  1),
    entry("LLDB",  eop(6, 9),  M_FIELDS, 3, F::OneAccMode3WordLB,  C::EagleMemRef,   1),
    entry("LSTB",  eop(6, 10), M_FIELDS, 3, F::OneAccMode3WordLB,  C::EagleMemRef,   1),
    entry("LNISZ", eop(6, 11), M_MODE,   3, F::NoAccModeInd3WordL, C::EagleMemRef,   1),
    entry("LNDSZ", eop(6, 12), M_MODE,   3, F::NoAccModeInd3WordL, C::EagleMemRef,   1),
    entry("XFSTD", eop(6, 13), M_FIELDS, 2, F::OneAccModeInd2WordX, C::EagleFpu,     1),
    entry("LFLDD", eop(6, 14), M_FIELDS, 3, F::OneAccModeInd3WordL, C::EagleFpu,     1),
    entry("LFSTD", eop(6, 15), M_FIELDS, 3, F::OneAccModeInd3WordL, C::EagleFpu,     1),
    entry("CIO",   eop(7, 0),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleIo,       0),
    entry("CIOI",  eop(7, 1),  M_FIELDS, 2, F::TwoAccImm2Word,     C::EagleIo,       1),
    entry("ECLID", eop(7, 2),  M_ONE,    1, F::OneAccOneWord,      C::EagleIo,       0),
    entry("NCLID", eop(7, 3),  M_FIXED,  1, F::UniqueOneWord,      C::EagleIo,       0),
    entry("LCPID", eop(7, 4),  M_ONE,    1, F::OneAccOneWord,      C::EagleIo,       0),
    entry("PRTSEL", eop(7, 5), M_FIXED,  1, F::UniqueOneWord,      C::EagleIo,       0),
    entry("FAB",   eop(7, 6),  M_ONE,    1, F::OneFpacOneWord,     C::EagleFpu,      0),
    entry("FNEG",  eop(7, 7),  M_ONE,    1, F::OneFpacOneWord,     C::EagleFpu,      0),
    entry("FMOV",  eop(7, 8),  M_FIELDS, 1, F::TwoFpacOneWord,     C::EagleFpu,      0),
    entry("FAD",   eop(7, 9),  M_FIELDS, 1, F::TwoFpacOneWord,     C::EagleFpu,      0),
    entry("FSD",   eop(7, 10), M_FIELDS, 1, F::TwoFpacOneWord,     C::EagleFpu,      0),
    entry("FMD",   eop(7, 11), M_FIELDS, 1, F::TwoFpacOneWord,     C::EagleFpu,      0),
    entry("FDD",   eop(7, 12), M_FIELDS, 1, F::TwoFpacOneWord,     C::EagleFpu,      0),
    entry("FCMP",  eop(7, 13), M_FIELDS, 1, F::TwoFpacOneWord,     C::EagleFpu,      0),
    entry("FINT",  eop(7, 14), M_FIELDS, 1, F::FpacAcOneWord,      C::EagleFpu,      0),
    entry("FFLT",  eop(7, 15), M_FIELDS, 1, F::FpacAcOneWord,      C::EagleFpu,      0),

    // Wide set (tail 1001). The split-displacement branch owns its whole
    // function prefix.
    entry("WBR",   0x8109,     M_SPLIT,  1, F::Split8bitDisp,      C::EaglePc,       0),
    entry("WADD",  wop(4, 0),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WSUB",  wop(4, 1),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WNEG",  wop(4, 2),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WMOV",  wop(4, 3),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WINC",  wop(4, 4),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WCOM",  wop(4, 5),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WADC",  wop(4, 6),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WAND",  wop(4, 7),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WIOR",  wop(4, 8),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WXOR",  wop(4, 9),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WXCH",  wop(4, 10), M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WLSH",  wop(4, 11), M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WASH",  wop(4, 12), M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WMUL",  wop(4, 13), M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WDIV",  wop(4, 14), M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("SEX",   wop(4, 15), M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("ZEX",   wop(5, 0),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("NADD",  wop(5, 1),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("NSUB",  wop(5, 2),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("NMUL",  wop(5, 3),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("NDIV",  wop(5, 4),  M_FIELDS, 1, F::TwoAccOneWord,      C::EagleOp,       0),
    entry("WADI",  wop(5, 5),  M_FIELDS, 1, F::ImmOneAcc,          C::EagleOp,       0),
    entry("WSBI",  wop(5, 6),  M_FIELDS, 1, F::ImmOneAcc,          C::EagleOp,       0),
    entry("NADI",  wop(5, 7),  M_FIELDS, 1, F::ImmOneAcc,          C::EagleOp,       0),
    entry("NSBI",  wop(5, 8),  M_FIELDS, 1, F::ImmOneAcc,          C::EagleOp,       0),
    entry("WLDAI", wop(5, 9),  M_ONE,    3, F::OneAccImmDwd3Word,  C::EagleOp,       1),
    entry("NLDAI", wop(5, 10), M_ONE,    2, F::OneAccImm2Word,     C::EagleOp,       1),
    entry("WADDI", wop(5, 11), M_ONE,    3, F::OneAccImmDwd3Word,  C::EagleOp,       1),
    entry("WANDI", wop(5, 12), M_ONE,    3, F::OneAccImmDwd3Word,  C::EagleOp,       1),
    entry("WIORI", wop(5, 13), M_ONE,    3, F::OneAccImmDwd3Word,  C::EagleOp,       1),
    entry("CRYTC", wop(5, 14), M_FIXED,  1, F::UniqueOneWord,      C::EagleOp,       0),
    entry("CRYTO", wop(5, 15), M_FIXED,  1, F::UniqueOneWord,      C::EagleOp,       0),
    entry("CRYTZ", wop(6, 0),  M_FIXED,  1, F::UniqueOneWord,      C::EagleOp,       0),
    entry("LPSR",  wop(6, 1),  M_ONE,    1, F::OneAccOneWord,      C::EagleOp,       0),
    entry("WSKBO", wop(6, 2),  M_ONE,    2, F::OneAccImm2Word,     C::EaglePc,       1),
    entry("WSKBZ", wop(6, 3),  M_ONE,    2, F::OneAccImm2Word,     C::EaglePc,       1),
    entry("WSEQ",  wop(6, 4),  M_FIELDS, 1, F::TwoAccOneWord,      C::EaglePc,       0),
    entry("WSNE",  wop(6, 5),  M_FIELDS, 1, F::TwoAccOneWord,      C::EaglePc,       0),
    entry("WSGT",  wop(6, 6),  M_FIELDS, 1, F::TwoAccOneWord,      C::EaglePc,       0),
    entry("WSGE",  wop(6, 7),  M_FIELDS, 1, F::TwoAccOneWord,      C::EaglePc,       0),
    entry("WSLE",  wop(6, 8),  M_FIELDS, 1, F::TwoAccOneWord,      C::EaglePc,       0),
    entry("WSLT",  wop(6, 9),  M_FIELDS, 1, F::TwoAccOneWord,      C::EaglePc,       0),
    entry("WPSH",  wop(6, 10), M_FIELDS, 1, F::TwoAccOneWord,      C::EagleStack,    0),
    entry("WPOP",  wop(6, 11), M_FIELDS, 1, F::TwoAccOneWord,      C::EagleStack,    0),
    entry("WMSP",  wop(6, 12), M_ONE,    1, F::OneAccOneWord,      C::EagleStack,    0),
    entry("WRTN",  wop(6, 13), M_FIXED,  1, F::UniqueOneWord,      C::EagleStack,    0),
    entry("WPOPJ", wop(6, 14), M_FIXED,  1, F::UniqueOneWord,      C::EagleStack,    0),
    entry("WSAVR", wop(6, 15), M_FIXED,  2, F::UniqueTwoWord,      C::EagleStack,    1),
    entry("WSAVS", wop(7, 0),  M_FIXED,  2, F::UniqueTwoWord,      C::EagleStack,    1),
    entry("XJMP",  wop(7, 1),  M_MODE,   2, F::NoAccModeInd2WordX, C::EaglePc,       1),
    entry("XJSR",  wop(7, 2),  M_MODE,   2, F::NoAccModeInd2WordX, C::EaglePc,       1),
    entry("XNISZ", wop(7, 3),  M_MODE,   2, F::NoAccModeInd2WordX, C::EagleMemRef,   1),
    entry("XNDSZ", wop(7, 4),  M_MODE,   2, F::NoAccModeInd2WordX, C::EagleMemRef,   1),
    entry("XCALL", wop(7, 5),  M_MODE,   3, F::NoAccModeInd3WordXcall, C::EaglePc,   1),
    entry("XNLDA", wop(7, 6),  M_FIELDS, 2, F::OneAccModeInd2WordX, C::EagleMemRef,  1),
    entry("XNSTA", wop(7, 7),  M_FIELDS, 2, F::OneAccModeInd2WordX, C::EagleMemRef,  1),
    entry("XWLDA", wop(7, 8),  M_FIELDS, 2, F::OneAccModeInd2WordX, C::EagleMemRef,  1),
    entry("XWSTA", wop(7, 9),  M_FIELDS, 2, F::OneAccModeInd2WordX, C::EagleMemRef,  1),
    entry("XLEF",  wop(7, 10), M_FIELDS, 2, F::OneAccModeInd2WordX, C::EagleMemRef,  1),
    entry("XLDB",  wop(7, 11), M_FIELDS, 2, F::OneAccMode2WordXB,  C::EagleMemRef,   1),
    entry("XSTB",  wop(7, 12), M_FIELDS, 2, F::OneAccMode2WordXB,  C::EagleMemRef,   1),
    entry("XFLDD", wop(7, 13), M_FIELDS, 2, F::OneAccModeInd2WordX, C::EagleFpu,     1),
    entry("LJMP",  wop(7, 14), M_MODE,   3, F::NoAccModeInd3WordL, C::EaglePc,       1),
    entry("LJSR",  wop(7, 15), M_MODE,   3, F::NoAccModeInd3WordL, C::EaglePc,       1),
];

#[cfg(test)]
mod tests {
    use super::{eop, wop, INSTRUCTION_TABLE};

    #[test]
    fn extended_helpers_build_the_documented_patterns() {
        assert_eq!(eop(1, 0), 0x8108);
        assert_eq!(eop(7, 15), 0x87F8);
        assert_eq!(wop(5, 1), 0x8519);
    }

    #[test]
    fn fully_masked_extended_patterns_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for d in INSTRUCTION_TABLE {
            if d.bits & 0x8000 != 0 && d.mask & 0x000F == 0x000F {
                assert!(
                    seen.insert(d.bits & 0x07FF),
                    "{} shares an extended slot",
                    d.mnemonic
                );
            }
        }
    }

    #[test]
    fn split_displacement_prefix_is_not_reused() {
        for d in INSTRUCTION_TABLE {
            if d.mnemonic == "WBR" {
                continue;
            }
            if d.bits & 0x8000 != 0 && d.bits & 0x000F == 0o11 {
                assert_ne!((d.bits >> 8) & 0x7, 1, "{} invades the WBR prefix", d.mnemonic);
            }
        }
    }
}
