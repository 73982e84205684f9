//! Instruction dispatch: one big match over [`Mnemonic`], the same shape as
//! the teacher's ALU dispatcher before it was split into R-type/I-type
//! sub-handlers. Each arm resolves its operands, computes a result, folds
//! the result into the flags word through `crate::flags`, and writes it
//! back — handlers never touch individual flag bits directly.

use std::collections::HashMap;

use crate::constants::{CONSOLE_STRING_CAP, CF_BIT, OF_BIT, SF_BIT, ZF_BIT};
use crate::cpu::Cpu;
use crate::error::RuntimeError;
use crate::flags;
use crate::memory::Bus;
use crate::mnemonic::Mnemonic;
use crate::operand::Operand;
use crate::register::Reg32;

pub fn execute(
    cpu: &mut Cpu,
    bus: &mut Bus,
    mnemonic: Mnemonic,
    operands: &[Operand],
    raw_operands: &[String],
    labels: &HashMap<String, usize>,
    pc: usize,
) -> Result<(), RuntimeError> {
    log::trace!("{:04}: {:?} {:?}", pc, mnemonic, raw_operands);
    use Mnemonic::*;
    match mnemonic {
        MOV => {
            if let [dest, src] = operands {
                if dest.is_memory() && src.is_memory() && strict_mode(cpu) {
                    return Err(RuntimeError::StrictViolation);
                }
                mov(cpu, bus, dest, src)?;
            }
            Ok(())
        }
        XCHG => {
            if let [a, b] = operands {
                if a.is_writable() && b.is_writable() {
                    if let Some(width8) = resolve_width(a, b) {
                        if width8 {
                            let va = read8(cpu, bus, a)?;
                            let vb = read8(cpu, bus, b)?;
                            write8(cpu, bus, a, vb)?;
                            write8(cpu, bus, b, va)?;
                        } else {
                            let va = read32(cpu, bus, a)?;
                            let vb = read32(cpu, bus, b)?;
                            write32(cpu, bus, a, vb)?;
                            write32(cpu, bus, b, va)?;
                        }
                    }
                }
            }
            Ok(())
        }
        LEA => {
            if let [dest, src @ Operand::Memory { .. }] = operands {
                if dest.is_writable() {
                    let addr = address_of(cpu, src);
                    write32(cpu, bus, dest, addr)?;
                }
            }
            Ok(())
        }
        MOVZX => {
            if let [dest, src] = operands {
                if dest.is_writable() && !matches!(dest, Operand::Register8 { .. }) {
                    let value = read8(cpu, bus, src)?;
                    write32(cpu, bus, dest, value as u32)?;
                }
            }
            Ok(())
        }
        MOVSX => {
            if let [dest, src] = operands {
                if dest.is_writable() && !matches!(dest, Operand::Register8 { .. }) {
                    let value = read8(cpu, bus, src)? as i8 as i32 as u32;
                    write32(cpu, bus, dest, value)?;
                }
            }
            Ok(())
        }

        ADD => binary_arith(cpu, bus, operands, |a, b| a.wrapping_add(b), flags::add, true),
        SUB => binary_arith(cpu, bus, operands, |a, b| a.wrapping_sub(b), flags::sub, true),
        CMP => binary_arith(cpu, bus, operands, |a, b| a.wrapping_sub(b), flags::sub, false),
        AND => binary_arith(cpu, bus, operands, |a, b| a & b, logical_flags, true),
        OR => binary_arith(cpu, bus, operands, |a, b| a | b, logical_flags, true),
        XOR => binary_arith(cpu, bus, operands, |a, b| a ^ b, logical_flags, true),
        TEST => binary_arith(cpu, bus, operands, |a, b| a & b, logical_flags, false),
        INC => unary_arith(cpu, bus, operands, |a| a.wrapping_add(1), flags::inc),
        DEC => unary_arith(cpu, bus, operands, |a| a.wrapping_sub(1), flags::dec),
        NEG => unary_arith(cpu, bus, operands, |a| 0u32.wrapping_sub(a), flags::neg),
        NOT => {
            if let [dest] = operands {
                if dest.is_writable() {
                    if forced_width(dest) == Some(true) {
                        let v = read8(cpu, bus, dest)?;
                        write8(cpu, bus, dest, !v)?;
                    } else {
                        let v = read32(cpu, bus, dest)?;
                        write32(cpu, bus, dest, !v)?;
                    }
                }
            }
            Ok(())
        }

        MUL => {
            if let [src] = operands {
                if forced_width(src) != Some(true) {
                    let multiplicand = cpu.reg(Reg32::EAX.index());
                    let b = read32(cpu, bus, src)?;
                    let product = u64::from(multiplicand) * u64::from(b);
                    let low = product as u32;
                    let high = (product >> 32) as u32;
                    cpu.set_reg(Reg32::EAX.index(), low);
                    cpu.set_reg(Reg32::EDX.index(), high);
                    cpu.set_flags(flags::multiply(cpu.raw_flags(), high, low, cpu.config.mode));
                }
            }
            Ok(())
        }
        IMUL => {
            match operands {
                [src] if forced_width(src) != Some(true) => {
                    let multiplicand = cpu.reg(Reg32::EAX.index()) as i32 as i64;
                    let b = read32(cpu, bus, src)? as i32 as i64;
                    imul_widening(cpu, multiplicand, b);
                }
                [dest, src] if dest.is_writable() && forced_width(dest) != Some(true) => {
                    let a = read32(cpu, bus, dest)? as i32 as i64;
                    let b = read32(cpu, bus, src)? as i32 as i64;
                    imul_truncating(cpu, bus, dest, a, b)?;
                }
                [dest, src, imm] if dest.is_writable() && forced_width(dest) != Some(true) => {
                    let a = read32(cpu, bus, src)? as i32 as i64;
                    let b = read32(cpu, bus, imm)? as i32 as i64;
                    imul_truncating(cpu, bus, dest, a, b)?;
                }
                _ => {}
            }
            Ok(())
        }
        DIV => {
            if let [src] = operands {
                if forced_width(src) != Some(true) {
                    let divisor = read32(cpu, bus, src)?;
                    let dividend = (u64::from(cpu.reg(Reg32::EDX.index())) << 32)
                        | u64::from(cpu.reg(Reg32::EAX.index()));
                    let (quotient, remainder) = if divisor == 0 {
                        (0, 0)
                    } else {
                        (
                            (dividend / u64::from(divisor)) as u32,
                            (dividend % u64::from(divisor)) as u32,
                        )
                    };
                    cpu.set_reg(Reg32::EAX.index(), quotient);
                    cpu.set_reg(Reg32::EDX.index(), remainder);
                    cpu.set_flags(flags::divide(cpu.raw_flags(), quotient, cpu.config.mode));
                }
            }
            Ok(())
        }
        IDIV => {
            if let [src] = operands {
                if forced_width(src) != Some(true) {
                    let divisor = read32(cpu, bus, src)? as i32;
                    let dividend = ((u64::from(cpu.reg(Reg32::EDX.index())) << 32)
                        | u64::from(cpu.reg(Reg32::EAX.index()))) as i64;
                    let (quotient, remainder) = if divisor == 0 {
                        (0, 0)
                    } else {
                        (
                            (dividend / i64::from(divisor)) as i32,
                            (dividend % i64::from(divisor)) as i32,
                        )
                    };
                    cpu.set_reg(Reg32::EAX.index(), quotient as u32);
                    cpu.set_reg(Reg32::EDX.index(), remainder as u32);
                    cpu.set_flags(flags::divide(cpu.raw_flags(), quotient as u32, cpu.config.mode));
                }
            }
            Ok(())
        }
        MOD => {
            if let [dest, src] = operands {
                if dest.is_writable() && forced_width(dest) != Some(true) {
                    let a = read32(cpu, bus, dest)?;
                    let b = read32(cpu, bus, src)?;
                    let result = if b == 0 { 0 } else { a % b };
                    write32(cpu, bus, dest, result)?;
                    cpu.set_flags(flags::divide(cpu.raw_flags(), result, cpu.config.mode));
                }
            }
            Ok(())
        }

        SHL => shift(cpu, bus, operands, flags::shift_left, |v, c| v.wrapping_shl(c)),
        SHR => shift(cpu, bus, operands, flags::shift_right, |v, c| v.wrapping_shr(c)),
        SAR => shift(cpu, bus, operands, flags::shift_arith, |v, c| {
            ((v as i32) >> (c.min(31))) as u32
        }),
        ROL => rotate(cpu, bus, operands, true),
        ROR => rotate(cpu, bus, operands, false),
        RCL => rotate_through_carry(cpu, bus, operands, true),
        RCR => rotate_through_carry(cpu, bus, operands, false),

        XADD => {
            if let [dest, src] = operands {
                if dest.is_writable() && src.is_writable() {
                    if let Some(width8) = resolve_width(dest, src) {
                        let a = if width8 {
                            read8(cpu, bus, dest)? as u32
                        } else {
                            read32(cpu, bus, dest)?
                        };
                        let b = if width8 {
                            read8(cpu, bus, src)? as u32
                        } else {
                            read32(cpu, bus, src)?
                        };
                        let sum = a.wrapping_add(b);
                        cpu.set_flags(flags::add(cpu.raw_flags(), a, b, sum));
                        if width8 {
                            write8(cpu, bus, src, a as u8)?;
                            write8(cpu, bus, dest, sum as u8)?;
                        } else {
                            write32(cpu, bus, src, a)?;
                            write32(cpu, bus, dest, sum)?;
                        }
                    }
                }
            }
            Ok(())
        }
        BSF => {
            if let [dest, src] = operands {
                if dest.is_writable() {
                    let value = read32(cpu, bus, src)?;
                    if value == 0 {
                        cpu.set_flags(flags::set_bit(cpu.raw_flags(), ZF_BIT, true));
                    } else {
                        cpu.set_flags(flags::set_bit(cpu.raw_flags(), ZF_BIT, false));
                        write32(cpu, bus, dest, value.trailing_zeros())?;
                    }
                }
            }
            Ok(())
        }
        BSR => {
            if let [dest, src] = operands {
                if dest.is_writable() {
                    let value = read32(cpu, bus, src)?;
                    if value == 0 {
                        cpu.set_flags(flags::set_bit(cpu.raw_flags(), ZF_BIT, true));
                    } else {
                        cpu.set_flags(flags::set_bit(cpu.raw_flags(), ZF_BIT, false));
                        write32(cpu, bus, dest, 31 - value.leading_zeros())?;
                    }
                }
            }
            Ok(())
        }
        BSWAP => {
            if let [dest] = operands {
                if dest.is_writable() && forced_width(dest) != Some(true) {
                    let v = read32(cpu, bus, dest)?;
                    write32(cpu, bus, dest, v.swap_bytes())?;
                }
            }
            Ok(())
        }

        NOP => Ok(()),

        JMP => {
            cpu.set_eip(jump_target(raw_operands, labels, pc)?);
            Ok(())
        }
        JE | JNE | JG | JGE | JL | JLE | JS | JNS | JA | JAE | JB | JBE => {
            let taken = predicate(mnemonic, cpu.raw_flags());
            cpu.set_eip(if taken {
                jump_target(raw_operands, labels, pc)?
            } else {
                pc + 1
            });
            Ok(())
        }
        CALL => {
            let destination = jump_target(raw_operands, labels, pc)?;
            push_call(cpu, bus, pc + 1);
            cpu.set_eip(destination);
            Ok(())
        }
        RET => {
            cpu.set_eip(pop_call(cpu, bus).unwrap_or(pc + 1));
            Ok(())
        }
        LOOP | LOOPE | LOOPNE => {
            let ecx = cpu.reg(Reg32::ECX.index()).wrapping_sub(1);
            cpu.set_reg(Reg32::ECX.index(), ecx);
            let zero = flags::get_bit(cpu.raw_flags(), ZF_BIT);
            let branch = match mnemonic {
                LOOP => ecx != 0,
                LOOPE => ecx != 0 && zero,
                LOOPNE => ecx != 0 && !zero,
                _ => unreachable!(),
            };
            cpu.set_eip(if branch {
                jump_target(raw_operands, labels, pc)?
            } else {
                pc + 1
            });
            Ok(())
        }

        CMOVE | CMOVNE | CMOVL | CMOVLE | CMOVG | CMOVGE | CMOVA | CMOVAE | CMOVB | CMOVBE
        | CMOVS | CMOVNS => {
            if let [dest, src] = operands {
                if dest.is_writable() && predicate(mnemonic, cpu.raw_flags()) {
                    if let Some(width8) = resolve_width(dest, src) {
                        if width8 {
                            let v = read8(cpu, bus, src)?;
                            write8(cpu, bus, dest, v)?;
                        } else {
                            let v = read32(cpu, bus, src)?;
                            write32(cpu, bus, dest, v)?;
                        }
                    }
                }
            }
            Ok(())
        }

        PUSH => {
            if let [src] = operands {
                let value = read32(cpu, bus, src)?;
                let esp = cpu.reg(Reg32::ESP.index()).wrapping_sub(4);
                cpu.set_reg(Reg32::ESP.index(), esp);
                bus.write32(esp, value)?;
            }
            Ok(())
        }
        POP => {
            if let [dest] = operands {
                if dest.is_writable() {
                    let esp = cpu.reg(Reg32::ESP.index());
                    let value = bus.read32(esp)?;
                    cpu.set_reg(Reg32::ESP.index(), esp.wrapping_add(4));
                    if matches!(dest, Operand::Register8 { .. }) {
                        write8(cpu, bus, dest, value as u8)?;
                    } else {
                        write32(cpu, bus, dest, value)?;
                    }
                }
            }
            Ok(())
        }

        LAHF => {
            let byte = flags::lahf_byte(cpu.raw_flags());
            cpu.set_reg8(Reg32::EAX.index(), true, byte);
            Ok(())
        }
        SAHF => {
            let ah = cpu.reg8(Reg32::EAX.index(), true);
            cpu.set_flags(flags::sahf_flags(cpu.raw_flags(), ah));
            Ok(())
        }

        LODSB => {
            let esi = cpu.reg(Reg32::ESI.index());
            let value = bus.read32(esi)? as u8;
            cpu.set_reg8(Reg32::EAX.index(), false, value);
            cpu.set_reg(Reg32::ESI.index(), esi.wrapping_add(1));
            Ok(())
        }
        STOSB => {
            let edi = cpu.reg(Reg32::EDI.index());
            let value = cpu.reg8(Reg32::EAX.index(), false);
            bus.write32(edi, value as u32)?;
            cpu.set_reg(Reg32::EDI.index(), edi.wrapping_add(1));
            Ok(())
        }
        MOVSB => {
            let esi = cpu.reg(Reg32::ESI.index());
            let edi = cpu.reg(Reg32::EDI.index());
            let value = bus.read32(esi)? as u8;
            bus.write32(edi, value as u32)?;
            cpu.set_reg(Reg32::ESI.index(), esi.wrapping_add(1));
            cpu.set_reg(Reg32::EDI.index(), edi.wrapping_add(1));
            Ok(())
        }
        SCASB => {
            let edi = cpu.reg(Reg32::EDI.index());
            let a = cpu.reg8(Reg32::EAX.index(), false) as u32;
            let b = bus.read32(edi)? as u8 as u32;
            cpu.set_flags(flags::sub(cpu.raw_flags(), a, b, a.wrapping_sub(b)));
            cpu.set_reg(Reg32::EDI.index(), edi.wrapping_add(1));
            Ok(())
        }
        CMPSB => {
            let esi = cpu.reg(Reg32::ESI.index());
            let edi = cpu.reg(Reg32::EDI.index());
            let a = bus.read32(esi)? as u8 as u32;
            let b = bus.read32(edi)? as u8 as u32;
            cpu.set_flags(flags::sub(cpu.raw_flags(), a, b, a.wrapping_sub(b)));
            cpu.set_reg(Reg32::ESI.index(), esi.wrapping_add(1));
            cpu.set_reg(Reg32::EDI.index(), edi.wrapping_add(1));
            Ok(())
        }

        INT => {
            if let [Operand::Immediate(code)] = operands {
                execute_interrupt(cpu, bus, *code)?;
            }
            Ok(())
        }
        INT3 => {
            cpu.halt();
            Ok(())
        }
        IRET => Ok(()),
        RAND => {
            match operands {
                [dest] if dest.is_writable() => {
                    let value = rand_below(u64::from(u32::MAX));
                    write32(cpu, bus, dest, value)?;
                    cpu.set_flags(flags::logical(cpu.raw_flags(), value));
                }
                [dest, max] if dest.is_writable() => {
                    let ceiling = read32(cpu, bus, max)? as i32;
                    let ceiling = if ceiling <= 0 { 1 } else { ceiling as u64 };
                    let value = rand_below(ceiling);
                    write32(cpu, bus, dest, value)?;
                    cpu.set_flags(flags::logical(cpu.raw_flags(), value));
                }
                _ => {}
            }
            Ok(())
        }
        HLT => {
            cpu.halt();
            Ok(())
        }
    }
}

/// Uniform value in `[0, bound)`, per `RAND`'s ceiling semantics.
fn rand_below(bound: u64) -> u32 {
    if bound == 0 {
        return 0;
    }
    (rand::random::<u64>() % bound) as u32
}

fn strict_mode(cpu: &Cpu) -> bool {
    cpu.config.mode == crate::cpu::CompatMode::StrictX86
}

fn logical_flags(flags: u32, _a: u32, _b: u32, result: u32) -> u32 {
    flags::logical(flags, result)
}

fn forced_width(op: &Operand) -> Option<bool> {
    match op {
        Operand::Register8 { .. } => Some(true),
        Operand::Register(_) => Some(false),
        _ => None,
    }
}

/// `true` means 8-bit. Returns `None` when the two operands disagree on a
/// forced width (`Register` paired with `Register8`) — the caller treats
/// that as the "operand types don't match the mnemonic" silent no-op.
fn resolve_width(a: &Operand, b: &Operand) -> Option<bool> {
    match (forced_width(a), forced_width(b)) {
        (Some(x), Some(y)) if x != y => None,
        (Some(x), _) => Some(x),
        (_, Some(y)) => Some(y),
        (None, None) => Some(false),
    }
}

fn address_of(cpu: &Cpu, op: &Operand) -> u32 {
    match *op {
        Operand::Memory { base, index, offset } => {
            let base_val = base.map(|i| cpu.reg(i)).unwrap_or(0) as i64;
            let index_val = index.map(|i| cpu.reg(i)).unwrap_or(0) as i64;
            (base_val + index_val + offset as i64) as u32
        }
        _ => 0,
    }
}

fn read32(cpu: &Cpu, bus: &mut Bus, op: &Operand) -> Result<u32, RuntimeError> {
    match *op {
        Operand::Register(i) => Ok(cpu.reg(i)),
        Operand::Register8 { index, high } => Ok(cpu.reg8(index, high) as u32),
        Operand::Immediate(v) => Ok(v as u32),
        Operand::Memory { .. } => Ok(bus.read32(address_of(cpu, op))?),
    }
}

fn read8(cpu: &Cpu, bus: &mut Bus, op: &Operand) -> Result<u8, RuntimeError> {
    match *op {
        Operand::Register8 { index, high } => Ok(cpu.reg8(index, high)),
        Operand::Register(i) => Ok(cpu.reg(i) as u8),
        Operand::Immediate(v) => Ok(v as u8),
        Operand::Memory { .. } => Ok(bus.read32(address_of(cpu, op))? as u8),
    }
}

fn write32(cpu: &mut Cpu, bus: &mut Bus, op: &Operand, value: u32) -> Result<(), RuntimeError> {
    match *op {
        Operand::Register(i) => cpu.set_reg(i, value),
        Operand::Register8 { index, high } => cpu.set_reg8(index, high, value as u8),
        Operand::Immediate(_) => {}
        Operand::Memory { .. } => {
            let addr = address_of(cpu, op);
            bus.write32(addr, value)?;
        }
    }
    Ok(())
}

fn write8(cpu: &mut Cpu, bus: &mut Bus, op: &Operand, value: u8) -> Result<(), RuntimeError> {
    match *op {
        Operand::Register8 { index, high } => cpu.set_reg8(index, high, value),
        Operand::Register(i) => cpu.set_reg(i, value as u32),
        Operand::Immediate(_) => {}
        Operand::Memory { .. } => {
            let addr = address_of(cpu, op);
            bus.write32(addr, value as u32)?;
        }
    }
    Ok(())
}

fn mov(cpu: &mut Cpu, bus: &mut Bus, dest: &Operand, src: &Operand) -> Result<(), RuntimeError> {
    if !dest.is_writable() {
        return Ok(());
    }
    let width8 = match resolve_width(dest, src) {
        Some(w) => w,
        None => return Ok(()),
    };
    if width8 {
        let v = read8(cpu, bus, src)?;
        write8(cpu, bus, dest, v)?;
    } else {
        let v = read32(cpu, bus, src)?;
        write32(cpu, bus, dest, v)?;
    }
    Ok(())
}

fn binary_arith(
    cpu: &mut Cpu,
    bus: &mut Bus,
    operands: &[Operand],
    compute: impl Fn(u32, u32) -> u32,
    flag_fn: impl Fn(u32, u32, u32, u32) -> u32,
    store: bool,
) -> Result<(), RuntimeError> {
    if let [dest, src] = operands {
        if !store || dest.is_writable() {
            let width8 = match resolve_width(dest, src) {
                Some(w) => w,
                None => return Ok(()),
            };
            let a = if width8 {
                read8(cpu, bus, dest)? as u32
            } else {
                read32(cpu, bus, dest)?
            };
            let b = if width8 {
                read8(cpu, bus, src)? as u32
            } else {
                read32(cpu, bus, src)?
            };
            let result = compute(a, b);
            cpu.set_flags(flag_fn(cpu.raw_flags(), a, b, result));
            if store {
                if width8 {
                    write8(cpu, bus, dest, result as u8)?;
                } else {
                    write32(cpu, bus, dest, result)?;
                }
            }
        }
    }
    Ok(())
}

fn unary_arith(
    cpu: &mut Cpu,
    bus: &mut Bus,
    operands: &[Operand],
    compute: impl Fn(u32) -> u32,
    flag_fn: impl Fn(u32, u32, u32) -> u32,
) -> Result<(), RuntimeError> {
    if let [dest] = operands {
        if dest.is_writable() {
            let width8 = forced_width(dest).unwrap_or(false);
            let a = if width8 {
                read8(cpu, bus, dest)? as u32
            } else {
                read32(cpu, bus, dest)?
            };
            let result = compute(a);
            cpu.set_flags(flag_fn(cpu.raw_flags(), a, result));
            if width8 {
                write8(cpu, bus, dest, result as u8)?;
            } else {
                write32(cpu, bus, dest, result)?;
            }
        }
    }
    Ok(())
}

fn shift(
    cpu: &mut Cpu,
    bus: &mut Bus,
    operands: &[Operand],
    flag_fn: impl Fn(u32, u32, u32, u32) -> u32,
    compute: impl Fn(u32, u32) -> u32,
) -> Result<(), RuntimeError> {
    if let [dest, count_op] = operands {
        if dest.is_writable() && forced_width(dest) != Some(true) {
            let raw = read32(cpu, bus, count_op)?;
            let original = read32(cpu, bus, dest)?;
            let count = raw & 31;
            let result = if count == 0 { original } else { compute(original, count) };
            cpu.set_flags(flag_fn(cpu.raw_flags(), raw, original, result));
            write32(cpu, bus, dest, result)?;
        }
    }
    Ok(())
}

fn rotate(cpu: &mut Cpu, bus: &mut Bus, operands: &[Operand], left: bool) -> Result<(), RuntimeError> {
    if let [dest, count_op] = operands {
        if dest.is_writable() && forced_width(dest) != Some(true) {
            let raw = read32(cpu, bus, count_op)?;
            let original = read32(cpu, bus, dest)?;
            let count = raw & 31;
            let result = if count == 0 {
                original
            } else if left {
                original.rotate_left(count)
            } else {
                original.rotate_right(count)
            };
            let flags = if left {
                flags::rotate_left(cpu.raw_flags(), raw, result, cpu.config.mode)
            } else {
                flags::rotate_right(cpu.raw_flags(), raw, result, cpu.config.mode)
            };
            cpu.set_flags(flags);
            write32(cpu, bus, dest, result)?;
        }
    }
    Ok(())
}

/// `RCL`/`RCR` perform the bit-by-bit rotate through carry themselves,
/// since each step's outgoing bit depends on the previous step's carry.
fn rotate_through_carry(
    cpu: &mut Cpu,
    bus: &mut Bus,
    operands: &[Operand],
    left: bool,
) -> Result<(), RuntimeError> {
    if let [dest, count_op] = operands {
        if dest.is_writable() && forced_width(dest) != Some(true) {
            let raw = read32(cpu, bus, count_op)?;
            let mut value = read32(cpu, bus, dest)?;
            let mut carry = flags::get_bit(cpu.raw_flags(), CF_BIT);
            let steps = raw & 31;
            for _ in 0..steps {
                if left {
                    let out = value & crate::constants::SIGN_BIT != 0;
                    value = (value << 1) | carry as u32;
                    carry = out;
                } else {
                    let out = value & 1 != 0;
                    value = (value >> 1) | ((carry as u32) << 31);
                    carry = out;
                }
            }
            cpu.set_flags(flags::rotate_through_carry(
                cpu.raw_flags(),
                raw,
                carry,
                value,
                cpu.config.mode,
                left,
            ));
            write32(cpu, bus, dest, value)?;
        }
    }
    Ok(())
}

fn imul_widening(cpu: &mut Cpu, a: i64, b: i64) {
    let product = a * b;
    let low = product as u32;
    let high = (product >> 32) as u32;
    cpu.set_reg(Reg32::EAX.index(), low);
    cpu.set_reg(Reg32::EDX.index(), high);
    let sign_extension_correct = high == if (low as i32) < 0 { 0xFFFF_FFFF } else { 0 };
    cpu.set_flags(flags::multiply_overflow(
        cpu.raw_flags(),
        !sign_extension_correct,
        low,
        cpu.config.mode,
    ));
}

fn imul_truncating(
    cpu: &mut Cpu,
    bus: &mut Bus,
    dest: &Operand,
    a: i64,
    b: i64,
) -> Result<(), RuntimeError> {
    let product = a * b;
    let low = product as u32;
    let overflow = product < i64::from(i32::MIN) || product > i64::from(i32::MAX);
    write32(cpu, bus, dest, low)?;
    cpu.set_flags(flags::multiply_overflow(cpu.raw_flags(), overflow, low, cpu.config.mode));
    Ok(())
}

fn jump_target(
    raw_operands: &[String],
    labels: &HashMap<String, usize>,
    pc: usize,
) -> Result<usize, RuntimeError> {
    match raw_operands {
        [target] => {
            let target = target.trim();
            if let Some(&index) = labels.get(target) {
                Ok(index)
            } else if let Ok(index) = target.parse::<usize>() {
                Ok(index)
            } else {
                Err(RuntimeError::LabelNotFound)
            }
        }
        _ => Ok(pc + 1),
    }
}

fn push_call(cpu: &mut Cpu, bus: &mut Bus, return_index: usize) {
    let esp = cpu.reg(Reg32::ESP.index()).wrapping_sub(4);
    cpu.set_reg(Reg32::ESP.index(), esp);
    let _ = bus.write32(esp, return_index as u32);
    cpu.push_call(return_index);
}

fn pop_call(cpu: &mut Cpu, bus: &mut Bus) -> Option<usize> {
    let target = cpu.pop_call()?;
    let esp = cpu.reg(Reg32::ESP.index());
    let _ = bus.read32(esp);
    cpu.set_reg(Reg32::ESP.index(), esp.wrapping_add(4));
    Some(target)
}

fn predicate(mnemonic: Mnemonic, flags: u32) -> bool {
    use Mnemonic::*;
    let cf = flags::get_bit(flags, CF_BIT);
    let zf = flags::get_bit(flags, ZF_BIT);
    let sf = flags::get_bit(flags, SF_BIT);
    let of = flags::get_bit(flags, OF_BIT);
    match mnemonic {
        JE | CMOVE => zf,
        JNE | CMOVNE => !zf,
        JG | CMOVG => !zf && sf == of,
        JGE | CMOVGE => sf == of,
        JL | CMOVL => sf != of,
        JLE | CMOVLE => zf || sf != of,
        JS | CMOVS => sf,
        JNS | CMOVNS => !sf,
        JA | CMOVA => !cf && !zf,
        JAE | CMOVAE => !cf,
        JB | CMOVB => cf,
        JBE | CMOVBE => cf || zf,
        _ => false,
    }
}

fn execute_interrupt(cpu: &mut Cpu, bus: &mut Bus, code: i64) -> Result<(), RuntimeError> {
    match code {
        0x20 => cpu.halt(),
        0x10 => {
            let function = cpu.reg8(Reg32::EAX.index(), true);
            if function == 0x0E {
                let ch = cpu.reg8(Reg32::EAX.index(), false) as char;
                cpu.console_push(&ch.to_string());
            }
        }
        0x21 => {
            let function = cpu.reg8(Reg32::EAX.index(), true);
            match function {
                0x02 => {
                    let ch = cpu.reg8(Reg32::EDX.index(), false) as char;
                    cpu.console_push(&ch.to_string());
                }
                0x09 => {
                    let mut addr = cpu.reg(Reg32::EDX.index());
                    let mut text = String::new();
                    loop {
                        let byte = bus.read32(addr)? as u8;
                        if byte == b'$' || text.len() >= CONSOLE_STRING_CAP {
                            break;
                        }
                        text.push(byte as char);
                        addr = addr.wrapping_add(1);
                    }
                    cpu.console_push(&text);
                }
                0x4C => cpu.halt(),
                _ => {}
            }
        }
        _ => {}
    }
    Ok(())
}
