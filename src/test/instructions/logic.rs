use crate::constants::{CF_BIT, OF_BIT, ZF_BIT};
use crate::flags::get_bit;
use crate::register::Reg32;
use crate::test::run;

#[test]
fn and_clears_carry_and_overflow() {
    let engine = run(&["MOV EAX, 0xFF", "MOV EBX, 0x0F", "AND EAX, EBX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0x0F);
    assert!(!get_bit(engine.cpu.raw_flags(), CF_BIT));
    assert!(!get_bit(engine.cpu.raw_flags(), OF_BIT));
}

#[test]
fn test_sets_zero_flag_without_modifying_destination() {
    let engine = run(&["MOV EAX, 0x0F", "MOV EBX, 0xF0", "TEST EAX, EBX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0x0F);
    assert!(get_bit(engine.cpu.raw_flags(), ZF_BIT));
}

#[test]
fn xor_of_a_register_with_itself_zeroes_it() {
    let engine = run(&["MOV EAX, 0x55", "XOR EAX, EAX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0);
    assert!(get_bit(engine.cpu.raw_flags(), ZF_BIT));
}

#[test]
fn not_leaves_every_flag_untouched() {
    let engine = run(&["MOV EAX, 1", "SUB EAX, 2", "MOV EBX, 0", "NOT EBX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EBX.index()), 0xFFFF_FFFF);
    assert!(get_bit(engine.cpu.raw_flags(), CF_BIT));
}
