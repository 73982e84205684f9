//! Pure flag-update functions. Every instruction handler computes its
//! result first, then asks one of these functions to fold that result into
//! the flags word — the handlers never touch individual flag bits
//! themselves. Keeping the two concerns apart is what let the teacher's ALU
//! dispatcher reuse one flag routine across a whole family of opcodes; it
//! serves the same purpose here across arithmetic, logical, shift, rotate
//! and multiply/divide families.

use crate::constants::{CF_BIT, OF_BIT, SF_BIT, SIGN_BIT, ZF_BIT};
use crate::cpu::CompatMode;

pub fn get_bit(flags: u32, bit: u32) -> bool {
    (flags >> bit) & 1 != 0
}

pub fn set_bit(flags: u32, bit: u32, value: bool) -> u32 {
    if value {
        flags | (1 << bit)
    } else {
        flags & !(1 << bit)
    }
}

fn sign(value: u32) -> bool {
    value & SIGN_BIT != 0
}

fn set_zero_and_sign(flags: u32, result: u32) -> u32 {
    let flags = set_bit(flags, ZF_BIT, result == 0);
    set_bit(flags, SF_BIT, sign(result))
}

/// `ADD`/`XADD` result flags.
pub fn add(flags: u32, a: u32, b: u32, result: u32) -> u32 {
    let carry = u64::from(a) + u64::from(b) >= 1u64 << 32;
    let overflow = (a ^ result) & (b ^ result) & SIGN_BIT != 0;
    let flags = set_zero_and_sign(flags, result);
    let flags = set_bit(flags, CF_BIT, carry);
    set_bit(flags, OF_BIT, overflow)
}

/// `SUB`/`CMP` result flags (`a - b = result`).
pub fn sub(flags: u32, a: u32, b: u32, result: u32) -> u32 {
    let borrow = a < b;
    let overflow = (a ^ b) & (a ^ result) & SIGN_BIT != 0;
    let flags = set_zero_and_sign(flags, result);
    let flags = set_bit(flags, CF_BIT, borrow);
    set_bit(flags, OF_BIT, overflow)
}

/// `INC` leaves CF untouched.
pub fn inc(flags: u32, a: u32, result: u32) -> u32 {
    let overflow = (a ^ result) & (1 ^ result) & SIGN_BIT != 0;
    let flags = set_zero_and_sign(flags, result);
    set_bit(flags, OF_BIT, overflow)
}

/// `DEC` leaves CF untouched.
pub fn dec(flags: u32, a: u32, result: u32) -> u32 {
    let overflow = (a ^ 1) & (a ^ result) & SIGN_BIT != 0;
    let flags = set_zero_and_sign(flags, result);
    set_bit(flags, OF_BIT, overflow)
}

/// `NEG` (`0 - source = result`).
pub fn neg(flags: u32, source: u32, result: u32) -> u32 {
    let carry = source != 0;
    let overflow = source & result & SIGN_BIT != 0;
    let flags = set_zero_and_sign(flags, result);
    let flags = set_bit(flags, CF_BIT, carry);
    set_bit(flags, OF_BIT, overflow)
}

/// `AND`/`OR`/`XOR`/`TEST`: CF and OF always cleared. `NOT` does not call
/// this at all — it leaves every flag alone.
pub fn logical(flags: u32, result: u32) -> u32 {
    let flags = set_zero_and_sign(flags, result);
    let flags = set_bit(flags, CF_BIT, false);
    set_bit(flags, OF_BIT, false)
}

/// `SHL`. `raw` is the unmasked shift count as written in the instruction;
/// `original` is the operand's value before the shift.
pub fn shift_left(flags: u32, raw: u32, original: u32, result: u32) -> u32 {
    let count = raw & 31;
    if count == 0 {
        return flags;
    }
    let carry = raw <= 32 && (original >> (32 - count)) & 1 != 0;
    let flags = set_bit(flags, CF_BIT, carry);
    let overflow = count == 1 && (sign(result) != carry);
    let flags = set_bit(flags, OF_BIT, overflow);
    set_zero_and_sign(flags, result)
}

/// `SHR`.
pub fn shift_right(flags: u32, raw: u32, original: u32, result: u32) -> u32 {
    let count = raw & 31;
    if count == 0 {
        return flags;
    }
    let carry = raw <= 32 && (original >> (count - 1)) & 1 != 0;
    let flags = set_bit(flags, CF_BIT, carry);
    let overflow = count == 1 && sign(original);
    let flags = set_bit(flags, OF_BIT, overflow);
    set_zero_and_sign(flags, result)
}

/// `SAR`. Overflow never occurs, since the sign bit is preserved exactly.
pub fn shift_arith(flags: u32, raw: u32, original: u32, result: u32) -> u32 {
    let count = raw & 31;
    if count == 0 {
        return flags;
    }
    let carry = raw <= 32 && (original >> (count - 1)) & 1 != 0;
    let flags = set_bit(flags, CF_BIT, carry);
    let flags = set_bit(flags, OF_BIT, false);
    set_zero_and_sign(flags, result)
}

/// `ROL`. ZF/SF only move in [`CompatMode::Educational`]; real x86 never
/// touches them for a plain rotate, which is the behavior `StrictX86` keeps.
pub fn rotate_left(flags: u32, raw: u32, result: u32, mode: CompatMode) -> u32 {
    let count = raw & 31;
    if count == 0 {
        return flags;
    }
    let carry = result & 1 != 0;
    let flags = set_bit(flags, CF_BIT, carry);
    let overflow = count == 1 && (sign(result) != carry);
    let flags = set_bit(flags, OF_BIT, overflow);
    apply_zf_sf(flags, result, mode)
}

/// `ROR`.
pub fn rotate_right(flags: u32, raw: u32, result: u32, mode: CompatMode) -> u32 {
    let count = raw & 31;
    if count == 0 {
        return flags;
    }
    let carry = sign(result);
    let flags = set_bit(flags, CF_BIT, carry);
    let bit30 = (result >> 30) & 1 != 0;
    let overflow = count == 1 && (sign(result) != bit30);
    let flags = set_bit(flags, OF_BIT, overflow);
    apply_zf_sf(flags, result, mode)
}

/// `RCL`/`RCR`. The handler performs the bit-by-bit rotate-through-carry
/// itself (each step depends on the previous step's carry out), then hands
/// this function the final carry and result to fold in.
pub fn rotate_through_carry(
    flags: u32,
    raw: u32,
    final_carry: bool,
    result: u32,
    mode: CompatMode,
    left: bool,
) -> u32 {
    let count = raw & 31;
    if count == 0 {
        return flags;
    }
    let flags = set_bit(flags, CF_BIT, final_carry);
    let overflow = count == 1 && {
        let reference = if left {
            final_carry
        } else {
            (result >> 30) & 1 != 0
        };
        sign(result) != reference
    };
    let flags = set_bit(flags, OF_BIT, overflow);
    apply_zf_sf(flags, result, mode)
}

fn apply_zf_sf(flags: u32, result: u32, mode: CompatMode) -> u32 {
    match mode {
        CompatMode::Educational => set_zero_and_sign(flags, result),
        CompatMode::StrictX86 => flags,
    }
}

/// `MUL`/`IMUL`. CF and OF are set together, true iff the high half of the
/// double-width product is significant.
pub fn multiply(flags: u32, high: u32, low: u32, mode: CompatMode) -> u32 {
    let significant = high != 0;
    let flags = set_bit(flags, CF_BIT, significant);
    let flags = set_bit(flags, OF_BIT, significant);
    match mode {
        CompatMode::Educational => set_zero_and_sign(flags, low),
        CompatMode::StrictX86 => {
            let flags = set_bit(flags, ZF_BIT, false);
            set_bit(flags, SF_BIT, false)
        }
    }
}

/// `IMUL`'s 2-/3-operand forms test signed overflow against the actual
/// product, unlike `multiply`'s "is the high half nonzero" test — a
/// negative low result can legitimately carry an all-ones high half.
pub fn multiply_overflow(flags: u32, overflowed: bool, low: u32, mode: CompatMode) -> u32 {
    let flags = set_bit(flags, CF_BIT, overflowed);
    let flags = set_bit(flags, OF_BIT, overflowed);
    match mode {
        CompatMode::Educational => set_zero_and_sign(flags, low),
        CompatMode::StrictX86 => {
            let flags = set_bit(flags, ZF_BIT, false);
            set_bit(flags, SF_BIT, false)
        }
    }
}

/// `DIV`/`IDIV`/`MOD`. CF and OF are always cleared; ZF/SF move only in
/// educational mode, mirroring the `multiply` asymmetry described for
/// strict mode.
pub fn divide(flags: u32, quotient: u32, mode: CompatMode) -> u32 {
    let flags = set_bit(flags, CF_BIT, false);
    let flags = set_bit(flags, OF_BIT, false);
    match mode {
        CompatMode::Educational => set_zero_and_sign(flags, quotient),
        CompatMode::StrictX86 => flags,
    }
}

/// Packs `SF|ZF|0|0|0|1|0|CF` into the byte `LAHF` stores to `AH`, with bit 1
/// forced high like the reserved EFLAGS bit it stands in for.
pub fn lahf_byte(flags: u32) -> u8 {
    let cf = get_bit(flags, CF_BIT) as u8;
    let zf = get_bit(flags, ZF_BIT) as u8;
    let sf = get_bit(flags, SF_BIT) as u8;
    (sf << 7) | (zf << 6) | 0b10 | cf
}

/// `SAHF`: the inverse of [`lahf_byte`], applied to the low byte of flags.
pub fn sahf_flags(flags: u32, ah: u8) -> u32 {
    let flags = set_bit(flags, CF_BIT, ah & 0x01 != 0);
    let flags = set_bit(flags, ZF_BIT, ah & 0x40 != 0);
    set_bit(flags, SF_BIT, ah & 0x80 != 0)
}
