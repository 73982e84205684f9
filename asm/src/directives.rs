//! Value resolution and symbol substitution for the `.data` section
//! directives (`ORG`, `EQU`, `DB`/`DW`/`DD`) and for memory operands that
//! reference a data label.

use std::collections::HashMap;

use edu86::operand::{parse_char_literal_value, parse_integer_literal};
use edu86::register::{parse_register32, parse_register8};

use crate::error::AssemblyErrorKind;

/// Resolves one `DB`/`DW`/`DD` list item, or an `ORG`/`EQU` value: a `'c'`
/// character literal's code point, an already-defined symbol, or a plain
/// integer literal, in that order.
pub fn resolve_value(token: &str, symbols: &HashMap<String, i64>) -> Result<i64, AssemblyErrorKind> {
    let token = token.trim();
    match parse_char_literal_value(token) {
        Ok(Some(ch)) => return Ok(ch as i64),
        Ok(None) => {}
        Err(e) => return Err(e.into()),
    }
    if let Some(&value) = symbols.get(token) {
        return Ok(value);
    }
    parse_integer_literal(token).map_err(Into::into)
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_register(token: &str) -> bool {
    parse_register32(token).is_some() || parse_register8(token).is_some()
}

/// Substitutes a known symbol for its numeric value inside an instruction
/// operand token, so the core operand parser — which knows nothing about
/// labels — only ever sees literal addresses. `[some_label]`,
/// `[some_label+4]`, and a bare `some_label` used as an immediate are all
/// recognized; register names are never substituted even when they
/// coincide with a symbol (they can't, duplicate names are rejected, but
/// registers take priority regardless).
pub fn substitute_symbols(token: &str, symbols: &HashMap<String, i64>) -> String {
    let trimmed = token.trim();
    if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return format!("[{}]", substitute_expr(inner.trim(), symbols));
    }
    substitute_expr(trimmed, symbols)
}

fn substitute_expr(expr: &str, symbols: &HashMap<String, i64>) -> String {
    let trimmed = expr.trim();
    if is_identifier(trimmed) && !is_register(trimmed) {
        if let Some(&value) = symbols.get(trimmed) {
            return value.to_string();
        }
        return trimmed.to_string();
    }
    if let Some(pos) = trimmed.find(|c| c == '+' || c == '-') {
        if pos > 0 {
            let (left, rest) = trimmed.split_at(pos);
            let op = &rest[..1];
            let right = rest[1..].trim();
            if is_identifier(right) && !is_register(right) {
                if let Some(&value) = symbols.get(right) {
                    return format!("{}{}{}", left.trim(), op, value);
                }
            }
        }
    }
    trimmed.to_string()
}
