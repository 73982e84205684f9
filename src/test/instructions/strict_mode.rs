use crate::cpu::{CompatMode, CpuConfig};
use crate::error::RuntimeError;
use crate::test::{run_until_fault_with_config, run_with_config};

fn strict_config() -> CpuConfig {
    CpuConfig {
        mode: CompatMode::StrictX86,
        ..CpuConfig::default()
    }
}

#[test]
fn educational_mode_allows_memory_to_memory_mov() {
    let mut engine = run_with_config(
        &["MOV [100], 7", "MOV [200], [100]", "HLT"],
        CpuConfig::default(),
    );
    assert_eq!(engine.bus.read32(200).unwrap(), 7);
}

#[test]
fn strict_mode_rejects_memory_to_memory_mov() {
    let (mut engine, error) = run_until_fault_with_config(
        &["MOV [100], 7", "MOV [200], [100]", "HLT"],
        strict_config(),
    );
    assert_eq!(error, Some(RuntimeError::StrictViolation));
    // The destination was never written.
    assert_eq!(engine.bus.read32(200).unwrap(), 0);
}

#[test]
fn strict_mode_still_allows_register_to_memory_mov() {
    let mut engine = run_with_config(&["MOV EAX, 9", "MOV [300], EAX", "HLT"], strict_config());
    assert_eq!(engine.bus.read32(300).unwrap(), 9);
}

#[test]
fn mul_div_flags_ignore_zero_sign_in_strict_mode() {
    let engine = run_with_config(&["MOV EAX, 0", "MOV EBX, 5", "MUL EBX", "HLT"], strict_config());
    use crate::constants::{SF_BIT, ZF_BIT};
    use crate::flags::get_bit;
    assert!(!get_bit(engine.cpu.raw_flags(), ZF_BIT));
    assert!(!get_bit(engine.cpu.raw_flags(), SF_BIT));
}
