use crate::constants::{CF_BIT, OF_BIT, SF_BIT, ZF_BIT};
use crate::flags::get_bit;
use crate::register::Reg32;
use crate::test::run;

#[test]
fn add_sets_registers_and_clears_flags_on_no_overflow() {
    let engine = run(&["MOV EAX, 10", "MOV EBX, 32", "ADD EAX, EBX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 42);
    assert!(!get_bit(engine.cpu.raw_flags(), CF_BIT));
    assert!(!get_bit(engine.cpu.raw_flags(), OF_BIT));
}

#[test]
fn add_sets_carry_on_unsigned_overflow() {
    let engine = run(&["MOV EAX, 0xFFFFFFFF", "ADD EAX, 1", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0);
    assert!(get_bit(engine.cpu.raw_flags(), CF_BIT));
    assert!(get_bit(engine.cpu.raw_flags(), ZF_BIT));
}

#[test]
fn add_sets_overflow_on_signed_overflow() {
    let engine = run(&["MOV EAX, 0x7FFFFFFF", "ADD EAX, 1", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0x8000_0000);
    assert!(get_bit(engine.cpu.raw_flags(), OF_BIT));
    assert!(get_bit(engine.cpu.raw_flags(), SF_BIT));
}

#[test]
fn sub_sets_carry_as_borrow() {
    let engine = run(&["MOV EAX, 1", "SUB EAX, 2", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0xFFFF_FFFF);
    assert!(get_bit(engine.cpu.raw_flags(), CF_BIT));
    assert!(get_bit(engine.cpu.raw_flags(), SF_BIT));
}

#[test]
fn cmp_does_not_modify_its_destination() {
    let engine = run(&["MOV EAX, 5", "CMP EAX, 5", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 5);
    assert!(get_bit(engine.cpu.raw_flags(), ZF_BIT));
}

#[test]
fn inc_preserves_carry_from_a_prior_instruction() {
    let engine = run(&["MOV EAX, 0xFFFFFFFF", "ADD EAX, 1", "MOV EAX, 1", "INC EAX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 2);
    assert!(get_bit(engine.cpu.raw_flags(), CF_BIT));
}

#[test]
fn neg_sets_carry_unless_operand_is_zero() {
    let zero = run(&["MOV EAX, 0", "NEG EAX", "HLT"]);
    assert!(!get_bit(zero.cpu.raw_flags(), CF_BIT));

    let nonzero = run(&["MOV EAX, 5", "NEG EAX", "HLT"]);
    assert_eq!(nonzero.cpu.reg(Reg32::EAX.index()), 0xFFFF_FFFB);
    assert!(get_bit(nonzero.cpu.raw_flags(), CF_BIT));
}

#[test]
fn eight_bit_alias_writes_only_its_own_byte() {
    let engine = run(&["MOV EAX, 0x1234", "MOV AL, 0xFF", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0x12FF);
}

#[test]
fn high_byte_alias_targets_bits_8_through_15() {
    let engine = run(&["MOV EAX, 0x1234", "MOV AH, 0xFF", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0xFF34);
}
