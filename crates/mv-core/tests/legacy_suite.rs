//! Legacy instruction-set behavior: memory reference, the multiple-operation
//! word, programmed I/O and the CPU pseudo-device.

use proptest as _;
use log as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use rstest::rstest;

use mv_core::bus::NullBus;
use mv_core::memory::{FlatMemory, MemoryBus};
use mv_core::{Cpu, RunOptions, StopReason};

/// DOC 0,CPU.
const HALT: u16 = 0x663F;

fn lda(ac: u16, ind: bool, mode: u16, disp: u16) -> u16 {
    0x2000 | (ac << 11) | (u16::from(ind) << 10) | (mode << 8) | (disp & 0xFF)
}

fn sta(ac: u16, mode: u16, disp: u16) -> u16 {
    0x4000 | (ac << 11) | (mode << 8) | (disp & 0xFF)
}

fn multop(func: u16, acs: u16, acd: u16, tail: u16) -> u16 {
    0x8000 | (acs << 13) | (acd << 11) | (func << 8) | tail
}

fn step(cpu: &mut Cpu, mem: &mut FlatMemory) {
    let mut bus = NullBus;
    let instr = cpu.decode_current(mem, false).expect("decode");
    cpu.execute_one(&instr, mem, &mut bus).expect("execute");
}

#[test]
fn absolute_load_pulls_the_addressed_word_into_the_accumulator() {
    // Opcode 020000: length one, effective address equal to the absolute
    // displacement field, accumulator 0 loaded from it.
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(0x1000);
    mem.load(0o100, &[0o020000 | 0o177]);
    mem.write_word(0o177, 0o123456);
    cpu.state_mut().set_pc(mv_core::Address::from_phys(0o100));

    let instr = cpu.decode_current(&mem, false).expect("decode");
    assert_eq!(instr.len, 1);
    step(&mut cpu, &mut mem);

    assert_eq!(cpu.state().ac(0), 0o123456);
    assert_eq!(cpu.state().pc().phys(), 0o101);
}

#[test]
fn store_and_reload_round_trips_through_memory() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(0x1000);
    mem.load(0, &[sta(1, 0, 0o200), lda(2, false, 0, 0o200), HALT]);
    cpu.state_mut().set_ac(1, 0xBEEF);

    let mut bus = NullBus;
    let run = cpu.run(&mut mem, &mut bus, &RunOptions::default());
    assert_eq!(run.stop, StopReason::Halted);
    assert_eq!(mem.read_word(0o200), 0xBEEF);
    assert_eq!(cpu.state().ac(2), 0xBEEF);
}

#[rstest]
// ADD: 0xFFFF + 1 carries out and wraps.
#[case(0b110, 0xFFFF, 0x0001, 0x0000, true)]
// ADD without carry out.
#[case(0b110, 0x0002, 0x0003, 0x0005, false)]
// SUB with ACD >= ACS complements carry.
#[case(0b101, 0x0003, 0x0005, 0x0002, true)]
// SUB with ACD < ACS leaves the base carry.
#[case(0b101, 0x0005, 0x0003, 0xFFFE, false)]
// AND never touches carry.
#[case(0b111, 0x00FF, 0x0F0F, 0x000F, false)]
// NEG of zero carries out.
#[case(0b001, 0x0000, 0x0000, 0x0000, true)]
fn multop_functions_follow_the_carry_rules(
    #[case] func: u16,
    #[case] src: u16,
    #[case] dst: u16,
    #[case] expected: u16,
    #[case] carry: bool,
) {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(64);
    mem.load(0, &[multop(func, 0, 1, 0)]);
    cpu.state_mut().set_ac16(0, src);
    cpu.state_mut().set_ac16(1, dst);

    step(&mut cpu, &mut mem);

    assert_eq!(cpu.state().ac16(1), expected);
    assert_eq!(cpu.state().carry(), carry);
}

#[test]
fn no_load_computes_the_skip_without_committing() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(64);
    // SUB# 0,1,SZR with equal operands: result would be zero, so the skip
    // is taken, but AC1 and carry stay put.
    mem.load(0, &[multop(0b101, 0, 1, 0b1100)]);
    cpu.state_mut().set_ac16(0, 0o42);
    cpu.state_mut().set_ac16(1, 0o42);

    step(&mut cpu, &mut mem);

    assert_eq!(cpu.state().ac16(1), 0o42);
    assert!(!cpu.state().carry());
    assert_eq!(cpu.state().pc().phys(), 2);
}

#[test]
fn left_rotate_moves_carry_through_bit_zero() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(64);
    // MOVOL 0,0: carry base one, rotate left.
    mem.load(0, &[multop(0b010, 0, 0, (0b01 << 6) | (0b10 << 4))]);
    cpu.state_mut().set_ac16(0, 0x8000);

    step(&mut cpu, &mut mem);

    // Bit 15 went to carry, the forced-one carry base came in at bit 0.
    assert_eq!(cpu.state().ac16(0), 0x0001);
    assert!(cpu.state().carry());
}

#[test]
fn swap_exchanges_the_bytes() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(64);
    mem.load(0, &[multop(0b010, 0, 1, 0b11 << 6)]);
    cpu.state_mut().set_ac16(0, 0x12AB);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.state().ac16(1), 0xAB12);
}

#[test]
fn increment_skip_on_zero_counts_to_the_skip() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(0x1000);
    // ISZ 300; HALT; HALT -- the counter starts at -1 so the first ISZ
    // wraps it to zero and skips the first HALT.
    mem.load(0, &[0x1000 | 0o300, HALT, HALT]);
    mem.write_word(0o300, 0xFFFF);

    let mut bus = NullBus;
    let run = cpu.run(&mut mem, &mut bus, &RunOptions::default());
    assert_eq!(run.stop, StopReason::Halted);
    assert_eq!(cpu.state().pc().phys(), 3);
    assert_eq!(mem.read_word(0o300), 0);
}

#[test]
fn jsr_leaves_the_return_offset_in_ac3() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(0x1000);
    // JSR 400 at address 100.
    mem.load(0o100, &[0x0800 | 0o200]);
    cpu.state_mut().set_pc(mv_core::Address::from_phys(0o100));

    step(&mut cpu, &mut mem);

    assert_eq!(cpu.state().pc().phys(), 0o200);
    assert_eq!(cpu.state().ac16(3), 0o101);
}

#[test]
fn reads_returns_the_console_switches() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(64);
    // READS 2.
    mem.load(0, &[0x613F | (2 << 11)]);
    cpu.state_mut().set_switches(0o1701);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.state().ac16(2), 0o1701);
}

#[test]
fn interrupt_enable_and_disable_flip_ion() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(64);
    mem.load(0, &[0x607F, 0x60BF]);

    step(&mut cpu, &mut mem);
    assert!(cpu.state().ion());
    step(&mut cpu, &mut mem);
    assert!(!cpu.state().ion());
}

#[test]
fn indirect_loads_follow_the_pointer_chain() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(0x1000);
    mem.load(0, &[lda(0, true, 0, 0o50)]);
    mem.write_word(0o50, 0x8000 | 0o60);
    mem.write_word(0o60, 0o70);
    mem.write_word(0o70, 0o5555);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.state().ac(0), 0o5555);
}
