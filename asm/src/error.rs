//! Assembly-time diagnostics. Every variant here is reported with a source
//! line before any instruction runs — the §7 `RuntimeError` family (label
//! lookup, strict-mode violations, device addressing) only ever surfaces
//! later, out of the engine's `step`.

use edu86::OperandError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyErrorKind {
    #[error("unknown mnemonic: {0}")]
    UnknownMnemonic(String),
    #[error("malformed instruction syntax: {0}")]
    BadOperandSyntax(String),
    #[error("duplicate label: {0}")]
    DuplicateLabel(String),
    #[error("invalid hexadecimal literal: {0}")]
    InvalidHex(String),
    #[error("invalid binary literal: {0}")]
    InvalidBinary(String),
    #[error("invalid operand: {0}")]
    InvalidOperand(String),
}

impl From<OperandError> for AssemblyErrorKind {
    fn from(err: OperandError) -> Self {
        match err {
            OperandError::InvalidHex(s) => AssemblyErrorKind::InvalidHex(s),
            OperandError::InvalidBinary(s) => AssemblyErrorKind::InvalidBinary(s),
            OperandError::InvalidOperand(s) => AssemblyErrorKind::InvalidOperand(s),
            OperandError::BadOperandSyntax(s) => AssemblyErrorKind::BadOperandSyntax(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct AssemblyError {
    pub line: u32,
    pub kind: AssemblyErrorKind,
}

impl AssemblyError {
    pub fn new(line: u32, kind: AssemblyErrorKind) -> Self {
        AssemblyError { line, kind }
    }
}

pub type Result<T> = std::result::Result<T, AssemblyError>;
