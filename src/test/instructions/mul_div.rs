use crate::constants::{CF_BIT, OF_BIT, ZF_BIT};
use crate::flags::get_bit;
use crate::register::Reg32;
use crate::test::run;

#[test]
fn mul_sets_edx_to_the_high_half() {
    let engine = run(&["MOV EAX, 0xFFFFFFFF", "MOV EBX, 2", "MUL EBX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0xFFFF_FFFE);
    assert_eq!(engine.cpu.reg(Reg32::EDX.index()), 1);
    assert!(get_bit(engine.cpu.raw_flags(), CF_BIT));
    assert!(get_bit(engine.cpu.raw_flags(), OF_BIT));
}

#[test]
fn mul_clears_carry_and_overflow_when_high_half_is_zero() {
    let engine = run(&["MOV EAX, 6", "MOV EBX, 7", "MUL EBX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 42);
    assert_eq!(engine.cpu.reg(Reg32::EDX.index()), 0);
    assert!(!get_bit(engine.cpu.raw_flags(), CF_BIT));
}

#[test]
fn imul_three_operand_does_not_touch_edx() {
    let engine = run(&["MOV EDX, 0xDEADBEEF", "IMUL EAX, EDX, 1", "HLT"]);
    // EDX is only read as the `src` operand here, so it keeps its value.
    assert_eq!(engine.cpu.reg(Reg32::EDX.index()), 0xDEADBEEF);
}

#[test]
fn imul_two_operand_truncates_and_flags_signed_overflow() {
    let engine = run(&["MOV EAX, 0x7FFFFFFF", "MOV EBX, 2", "IMUL EAX, EBX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0xFFFF_FFFE);
    assert!(get_bit(engine.cpu.raw_flags(), CF_BIT));
    assert!(get_bit(engine.cpu.raw_flags(), OF_BIT));
}

#[test]
fn div_by_zero_yields_zero_quotient_and_remainder_without_faulting() {
    let engine = run(&["MOV EAX, 10", "MOV EDX, 0", "MOV EBX, 0", "DIV EBX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0);
    assert_eq!(engine.cpu.reg(Reg32::EDX.index()), 0);
}

#[test]
fn div_computes_quotient_and_remainder_across_edx_eax() {
    let engine = run(&["MOV EAX, 17", "MOV EDX, 0", "MOV EBX, 5", "DIV EBX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 3);
    assert_eq!(engine.cpu.reg(Reg32::EDX.index()), 2);
}

#[test]
fn idiv_handles_negative_dividends() {
    let engine = run(&[
        "MOV EAX, 0xFFFFFFF6", // -10
        "MOV EDX, 0xFFFFFFFF", // sign-extended
        "MOV EBX, 3",
        "IDIV EBX",
        "HLT",
    ]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()) as i32, -3);
    assert_eq!(engine.cpu.reg(Reg32::EDX.index()) as i32, -1);
}

#[test]
fn mod_divisor_zero_yields_zero() {
    let engine = run(&["MOV EAX, 9", "MOV EBX, 0", "MOD EAX, EBX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0);
}

#[test]
fn mod_computes_remainder_in_place() {
    let engine = run(&["MOV EAX, 17", "MOV EBX, 5", "MOD EAX, EBX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 2);
    assert!(!get_bit(engine.cpu.raw_flags(), ZF_BIT));
}

#[test]
fn rand_with_explicit_ceiling_stays_below_it() {
    for _ in 0..50 {
        let engine = run(&["RAND EAX, 4", "HLT"]);
        assert!(engine.cpu.reg(Reg32::EAX.index()) < 4);
    }
}

#[test]
fn rand_with_nonpositive_ceiling_is_always_zero() {
    let engine = run(&["MOV EBX, 0", "RAND EAX, EBX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0);
}
