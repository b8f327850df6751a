//! Extended-register-set behavior: 15-bit references, the narrow stack,
//! and the byte-string primitives.

use proptest as _;
use log as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use rstest as _;

use mv_core::bus::NullBus;
use mv_core::memory::{FlatMemory, MemoryBus};
use mv_core::stack::{NFP_LOC, NSL_LOC, NSP_LOC};
use mv_core::{Address, Cpu};

const fn eop(fff: u16, g: u16) -> u16 {
    0x8000 | (fff << 8) | (g << 4) | 0o10
}

fn step(cpu: &mut Cpu, mem: &mut FlatMemory) {
    let mut bus = NullBus;
    let instr = cpu.decode_current(mem, false).expect("decode");
    cpu.execute_one(&instr, mem, &mut bus).expect("execute");
}

fn setup_narrow_stack(mem: &mut FlatMemory, base: u16, limit: u16) {
    mem.write_word(NSP_LOC, base);
    mem.write_word(NFP_LOC, base);
    mem.write_word(NSL_LOC, limit);
}

#[test]
fn fifteen_bit_load_and_store_round_trip() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(0x2000);
    // ESTA 1, absolute 1000; ELDA 2, absolute 1000.
    mem.load(
        0,
        &[
            eop(5, 15) | (1 << 13),
            0o1000,
            eop(5, 14) | (2 << 13),
            0o1000,
        ],
    );
    cpu.state_mut().set_ac16(1, 0o7777);

    step(&mut cpu, &mut mem);
    step(&mut cpu, &mut mem);

    assert_eq!(mem.read_word(0o1000), 0o7777);
    assert_eq!(cpu.state().ac16(2), 0o7777);
    assert_eq!(cpu.state().pc().phys(), 4);
}

#[test]
fn load_effective_address_yields_the_address_not_the_word() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(0x2000);
    // ELEF 0, PC-relative +5 from address 100.
    mem.load(0o100, &[eop(6, 0) | (1 << 11), 5]);
    mem.write_word(0o105, 0o4444);
    cpu.state_mut().set_pc(Address::from_phys(0o100));

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.state().ac16(0), 0o105);
}

#[test]
fn two_bit_immediate_add_covers_one_to_four() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(64);
    // ADI 4,1 (field 3 encodes 4).
    mem.load(0, &[eop(1, 0) | (3 << 13) | (1 << 11)]);
    cpu.state_mut().set_ac16(1, 10);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.state().ac16(1), 14);
}

#[test]
fn narrow_push_pop_restores_the_pointer_and_reverses_order() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(0x2000);
    setup_narrow_stack(&mut mem, 0o1000, 0o1100);
    // PSH 0,2 ; POP 0,2.
    mem.load(0, &[eop(5, 3) | (2 << 11), eop(5, 4) | (2 << 11)]);
    cpu.state_mut().set_ac16(0, 0o11);
    cpu.state_mut().set_ac16(1, 0o22);
    cpu.state_mut().set_ac16(2, 0o33);

    step(&mut cpu, &mut mem);
    assert_eq!(mem.read_word(NSP_LOC), 0o1003);

    cpu.state_mut().set_ac16(0, 0);
    cpu.state_mut().set_ac16(1, 0);
    cpu.state_mut().set_ac16(2, 0);
    step(&mut cpu, &mut mem);

    assert_eq!(mem.read_word(NSP_LOC), 0o1000);
    assert_eq!(cpu.state().ac16(0), 0o11);
    assert_eq!(cpu.state().ac16(1), 0o22);
    assert_eq!(cpu.state().ac16(2), 0o33);
}

#[test]
fn save_and_return_frame_the_narrow_stack() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(0x2000);
    setup_narrow_stack(&mut mem, 0o1000, 0o1100);
    // SAV at 200; RTN at 300.
    mem.load(0o200, &[eop(5, 5)]);
    mem.load(0o300, &[eop(5, 6)]);
    cpu.state_mut().set_pc(Address::from_phys(0o200));
    cpu.state_mut().set_ac16(0, 0o101);
    cpu.state_mut().set_ac16(1, 0o102);
    cpu.state_mut().set_ac16(2, 0o103);
    cpu.state_mut().set_ac16(3, 0o777);
    cpu.state_mut().set_carry(true);

    step(&mut cpu, &mut mem);
    // The frame pointer now names the block and mirrors into AC3.
    assert_eq!(mem.read_word(NFP_LOC), 0o1005);
    assert_eq!(cpu.state().ac16(3), 0o1005);

    // Clobber, jump to the return site, and unwind.
    cpu.state_mut().set_ac16(0, 0);
    cpu.state_mut().set_ac16(1, 0);
    cpu.state_mut().set_ac16(2, 0);
    cpu.state_mut().set_carry(false);
    cpu.state_mut().set_pc(Address::from_phys(0o300));
    step(&mut cpu, &mut mem);

    assert_eq!(cpu.state().ac16(0), 0o101);
    assert_eq!(cpu.state().ac16(1), 0o102);
    assert_eq!(cpu.state().ac16(2), 0o103);
    assert!(cpu.state().carry());
    assert_eq!(cpu.state().pc().phys(), 0o777);
    assert_eq!(mem.read_word(NSP_LOC), 0o1000);
}

#[test]
fn string_move_pads_a_short_source_with_blanks() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(0x2000);
    // Source "AB" at byte pointer 1000, destination of four bytes at 2000.
    mem.write_byte(0o1000, b'A');
    mem.write_byte(0o1001, b'B');
    mem.load(0, &[eop(4, 15)]);
    cpu.state_mut().set_ac(0, 0o2000);
    cpu.state_mut().set_ac(1, 0o1000);
    cpu.state_mut().set_ac16(2, 4);
    cpu.state_mut().set_ac16(3, 2);

    step(&mut cpu, &mut mem);

    assert_eq!(mem.read_byte(0o2000), b'A');
    assert_eq!(mem.read_byte(0o2001), b'B');
    assert_eq!(mem.read_byte(0o2002), 0o40);
    assert_eq!(mem.read_byte(0o2003), 0o40);
    assert_eq!(cpu.state().ac16(2), 0);
    assert_eq!(cpu.state().ac16(3), 0);
    assert_eq!(cpu.state().ac(0), 0o2004);
}

#[test]
fn string_compare_honors_blank_padding() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(0x2000);
    // "X " versus "X": equal under the padding rule.
    mem.write_byte(0o1000, b'X');
    mem.write_byte(0o1001, b' ');
    mem.write_byte(0o1100, b'X');
    mem.load(0, &[eop(5, 0)]);
    cpu.state_mut().set_ac(0, 0o1000);
    cpu.state_mut().set_ac16(2, 2);
    cpu.state_mut().set_ac(1, 0o1100);
    cpu.state_mut().set_ac16(3, 1);

    step(&mut cpu, &mut mem);
    assert_eq!(cpu.state().ac16(1), 0);
}

#[test]
fn descending_string_move_walks_backwards() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(0x2000);
    mem.write_byte(0o1000, b'Z');
    mem.write_byte(0o0777, b'Y');
    mem.load(0, &[eop(4, 15)]);
    // Both counts negative: descending with two bytes each.
    cpu.state_mut().set_ac(0, 0o2000);
    cpu.state_mut().set_ac(1, 0o1000);
    cpu.state_mut().set_ac16(2, (-2i16) as u16);
    cpu.state_mut().set_ac16(3, (-2i16) as u16);

    step(&mut cpu, &mut mem);

    assert_eq!(mem.read_byte(0o2000), b'Z');
    assert_eq!(mem.read_byte(0o1777), b'Y');
}

#[test]
fn unsigned_multiply_accumulates_into_the_pair() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(64);
    mem.load(0, &[eop(4, 11)]);
    cpu.state_mut().set_ac16(0, 3);
    cpu.state_mut().set_ac16(1, 0x4000);
    cpu.state_mut().set_ac16(2, 4);

    step(&mut cpu, &mut mem);
    // 0x4000 * 4 + 3 = 0x10003.
    assert_eq!(cpu.state().ac16(0), 1);
    assert_eq!(cpu.state().ac16(1), 3);
}

#[test]
fn divide_overflow_sets_carry_and_leaves_the_pair() {
    let mut cpu = Cpu::default();
    let mut mem = FlatMemory::new(64);
    mem.load(0, &[eop(4, 12)]);
    // AC0 >= AC2 cannot produce a 16-bit quotient.
    cpu.state_mut().set_ac16(0, 5);
    cpu.state_mut().set_ac16(1, 0);
    cpu.state_mut().set_ac16(2, 5);

    step(&mut cpu, &mut mem);
    assert!(cpu.state().carry());
    assert_eq!(cpu.state().ac16(0), 5);
}
