use crate::constants::{CF_BIT, OF_BIT, ZF_BIT};
use crate::flags::get_bit;
use crate::register::Reg32;
use crate::test::run;

#[test]
fn shl_by_one_sets_carry_and_overflow_on_sign_flip() {
    let engine = run(&["MOV EAX, 0x80000000", "SHL EAX, 1", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0);
    assert!(get_bit(engine.cpu.raw_flags(), CF_BIT));
    assert!(get_bit(engine.cpu.raw_flags(), OF_BIT));
    assert!(get_bit(engine.cpu.raw_flags(), ZF_BIT));
}

#[test]
fn shl_by_zero_leaves_flags_untouched() {
    let engine = run(&["MOV EAX, 1", "SUB EAX, 2", "MOV EAX, 5", "SHL EAX, 0", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 5);
    assert!(get_bit(engine.cpu.raw_flags(), CF_BIT));
}

#[test]
fn shr_preserves_zero_and_clears_overflow() {
    let engine = run(&["MOV EAX, 0x80000000", "SAR EAX, 1", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0xC000_0000);
    assert!(!get_bit(engine.cpu.raw_flags(), CF_BIT));
    assert!(!get_bit(engine.cpu.raw_flags(), OF_BIT));
}

#[test]
fn shr_logical_zero_fills_the_top_bit() {
    let engine = run(&["MOV EAX, 0x80000000", "SHR EAX, 1", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0x4000_0000);
    assert!(!get_bit(engine.cpu.raw_flags(), CF_BIT));
}

#[test]
fn shift_count_above_32_still_masks_to_31_but_clears_carry() {
    let engine = run(&["MOV EAX, 1", "SHL EAX, 33", "HLT"]);
    // raw=33, count = 33 & 31 = 1
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 2);
    assert!(!get_bit(engine.cpu.raw_flags(), CF_BIT));
}

#[test]
fn rol_wraps_the_high_bit_into_carry_and_lsb() {
    let engine = run(&["MOV EAX, 0x80000000", "ROL EAX, 1", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 1);
    assert!(get_bit(engine.cpu.raw_flags(), CF_BIT));
}

#[test]
fn ror_wraps_the_low_bit_into_carry_and_msb() {
    let engine = run(&["MOV EAX, 1", "ROR EAX, 1", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0x8000_0000);
    assert!(get_bit(engine.cpu.raw_flags(), CF_BIT));
}

#[test]
fn rotate_in_educational_mode_updates_zero_flag() {
    let engine = run(&["MOV EAX, 0", "ROL EAX, 1", "HLT"]);
    assert!(get_bit(engine.cpu.raw_flags(), ZF_BIT));
}

#[test]
fn rotate_in_strict_mode_leaves_zero_flag_alone() {
    use crate::cpu::{CompatMode, CpuConfig};
    use crate::test::run_with_config;
    let config = CpuConfig {
        mode: CompatMode::StrictX86,
        ..CpuConfig::default()
    };
    let engine = run_with_config(&["MOV EAX, 5", "SUB EAX, 5", "ROL EAX, 1", "HLT"], config);
    // ZF was set to 1 by the SUB; a strict-mode rotate must not disturb it
    // even though the rotate result is nonzero.
    assert!(get_bit(engine.cpu.raw_flags(), ZF_BIT));
}

#[test]
fn rcl_rotates_carry_into_the_low_bit() {
    let engine = run(&[
        "MOV EAX, 0xFFFFFFFF",
        "ADD EAX, 1", // sets CF=1, EAX=0
        "RCL EAX, 1",
        "HLT",
    ]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 1);
}

#[test]
fn rcr_rotates_carry_into_the_high_bit() {
    let engine = run(&[
        "MOV EAX, 0xFFFFFFFF",
        "ADD EAX, 1", // sets CF=1, EAX=0
        "RCR EAX, 1",
        "HLT",
    ]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0x8000_0000);
}

#[test]
fn bsf_finds_the_least_significant_set_bit() {
    let engine = run(&["MOV EAX, 0x28", "BSF EBX, EAX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EBX.index()), 3);
    assert!(!get_bit(engine.cpu.raw_flags(), ZF_BIT));
}

#[test]
fn bsf_of_zero_sets_zero_flag_and_leaves_dest_unchanged() {
    let engine = run(&["MOV EBX, 99", "MOV EAX, 0", "BSF EBX, EAX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EBX.index()), 99);
    assert!(get_bit(engine.cpu.raw_flags(), ZF_BIT));
}

#[test]
fn bsr_finds_the_most_significant_set_bit() {
    let engine = run(&["MOV EAX, 0x28", "BSR EBX, EAX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EBX.index()), 5);
}

#[test]
fn bswap_twice_is_the_identity() {
    let engine = run(&["MOV EAX, 0x12345678", "BSWAP EAX", "BSWAP EAX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0x12345678);
}

#[test]
fn bswap_reverses_byte_order() {
    let engine = run(&["MOV EAX, 0x12345678", "BSWAP EAX", "HLT"]);
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0x78563412);
}
