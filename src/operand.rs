//! Parses the operand tokens the assembler hands each instruction. Parsing
//! is pure and doesn't touch CPU state: the same token always parses to the
//! same [`Operand`], which is what lets the loader validate every operand up
//! front instead of discovering a bad literal mid-run.

use crate::error::OperandError;
use crate::register::{parse_register32, parse_register8};

/// A single decoded operand. Label references used as memory expressions
/// (`[some_label]`) are resolved to their address by the assembler before
/// this parser ever sees the token — by the time `parse_operand` runs, a
/// label can only still appear as the bare jump target of a control-flow
/// mnemonic, and those are resolved separately, directly against the
/// program's label table, never through this parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Register(usize),
    Register8 { index: usize, high: bool },
    Immediate(i64),
    Memory {
        base: Option<usize>,
        index: Option<usize>,
        offset: i32,
    },
}

impl Operand {
    pub fn is_register_like(&self) -> bool {
        matches!(self, Operand::Register(_) | Operand::Register8 { .. })
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Operand::Memory { .. })
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, Operand::Immediate(_))
    }
}

pub fn parse_operand(token: &str) -> Result<Operand, OperandError> {
    let token = token.trim();
    if let Some(rest) = token.strip_prefix('[') {
        let inner = rest
            .strip_suffix(']')
            .ok_or_else(|| OperandError::BadOperandSyntax(token.to_string()))?;
        return parse_memory(inner.trim());
    }
    if let Some(reg) = parse_register32(token) {
        return Ok(Operand::Register(reg.index()));
    }
    if let Some((index, high)) = parse_register8(token) {
        return Ok(Operand::Register8 { index, high });
    }
    if let Some(ch) = parse_char_literal(token)? {
        return Ok(Operand::Immediate(ch as i64));
    }
    parse_integer(token).map(Operand::Immediate)
}

fn parse_char_literal(token: &str) -> Result<Option<char>, OperandError> {
    if !(token.starts_with('\'') && token.ends_with('\'') && token.len() >= 2) {
        return Ok(None);
    }
    let body = &token[1..token.len() - 1];
    let mut chars = body.chars();
    let ch = chars
        .next()
        .ok_or_else(|| OperandError::InvalidOperand(token.to_string()))?;
    if chars.next().is_some() {
        return Err(OperandError::InvalidOperand(token.to_string()));
    }
    Ok(Some(ch))
}

/// Parses a decimal/hex/binary integer literal, exactly like an
/// [`Operand::Immediate`] would, without wrapping it in an operand. Shared
/// with `edu86-asm`'s directive handling (`ORG`/`EQU`/`DB`/`DW`/`DD`), which
/// needs the same numeric-literal grammar for values that aren't operands.
pub fn parse_integer_literal(token: &str) -> Result<i64, OperandError> {
    parse_integer(token)
}

/// Parses a `'c'` character literal to its code point, if `token` looks like
/// one at all; `Ok(None)` means "not a character literal", not an error.
/// Shared with `edu86-asm` for the same reason as [`parse_integer_literal`].
pub fn parse_char_literal_value(token: &str) -> Result<Option<char>, OperandError> {
    parse_char_literal(token)
}

fn parse_integer(token: &str) -> Result<i64, OperandError> {
    let (negative, rest) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let magnitude = if let Some(hex) = strip_prefix_ci(rest, "0x") {
        i64::from_str_radix(hex, 16).map_err(|_| OperandError::InvalidHex(token.to_string()))?
    } else if let Some(bin) = strip_prefix_ci(rest, "0b") {
        i64::from_str_radix(bin, 2).map_err(|_| OperandError::InvalidBinary(token.to_string()))?
    } else {
        rest.parse::<i64>()
            .map_err(|_| OperandError::InvalidOperand(token.to_string()))?
    };
    Ok(if negative { -magnitude } else { magnitude })
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Parses the inside of a `[...]` memory expression: a bare register, a bare
/// constant, `REG+k`/`REG-k`, or `REG+REG`.
fn parse_memory(expr: &str) -> Result<Operand, OperandError> {
    if let Some(reg) = parse_register32(expr) {
        return Ok(Operand::Memory {
            base: Some(reg.index()),
            index: None,
            offset: 0,
        });
    }

    if let Some(pos) = expr.find(|c| c == '+' || c == '-') {
        if pos > 0 {
            let (left, rest) = expr.split_at(pos);
            let op = rest.as_bytes()[0] as char;
            let left = left.trim();
            let right = rest[1..].trim();
            if let Some(base) = parse_register32(left) {
                // A third term (`[EBX+ECX+1]`) is a stray token, not a bad
                // literal: the grammar only allows one operator after a
                // base register.
                if right.find(|c: char| c == '+' || c == '-').is_some() {
                    return Err(OperandError::BadOperandSyntax(expr.to_string()));
                }
                if op == '+' {
                    if let Some(index) = parse_register32(right) {
                        return Ok(Operand::Memory {
                            base: Some(base.index()),
                            index: Some(index.index()),
                            offset: 0,
                        });
                    }
                }
                let magnitude = parse_integer(right)?;
                let offset = if op == '-' { -magnitude } else { magnitude };
                return Ok(Operand::Memory {
                    base: Some(base.index()),
                    index: None,
                    offset: offset as i32,
                });
            }
        }
    }

    if expr.chars().any(char::is_whitespace) {
        return Err(OperandError::BadOperandSyntax(expr.to_string()));
    }

    let constant = parse_integer(expr)?;
    Ok(Operand::Memory {
        base: None,
        index: None,
        offset: constant as i32,
    })
}
