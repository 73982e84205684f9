//! Error types raised while parsing operands, addressing memory-mapped
//! devices, and executing instructions. Assembly-time errors (unknown
//! mnemonic, duplicate label, bad operand syntax) live in the `edu86-asm`
//! crate, which reuses [`OperandError`] as one of its own variants.

use thiserror::Error;

/// Failure to make sense of a single operand token. These surface as
/// assembly-time faults: the loader validates every operand before the
/// program is allowed to run, so the execution engine never has to handle
/// them mid-step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperandError {
    #[error("invalid hexadecimal literal: {0}")]
    InvalidHex(String),
    #[error("invalid binary literal: {0}")]
    InvalidBinary(String),
    #[error("invalid operand: {0}")]
    InvalidOperand(String),
    #[error("malformed operand syntax: {0}")]
    BadOperandSyntax(String),
}

/// Failure to resolve a memory-mapped device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IoError {
    #[error("no readable device register at address {0:#x}")]
    UnknownIoRead(u32),
    #[error("no writable device register at address {0:#x}")]
    UnknownIoWrite(u32),
}

/// A fault raised while a program is running, as opposed to while it is
/// being assembled. Every variant here stops execution and is reported to
/// the driver as an `Exception` stop reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("label not found")]
    LabelNotFound,
    #[error("strict mode forbids memory-to-memory MOV")]
    StrictViolation,
    #[error(transparent)]
    Io(#[from] IoError),
}
