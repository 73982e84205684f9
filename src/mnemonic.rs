//! The instruction set, as a closed enum parsed from the assembler's
//! mnemonic token. A handful of classic x86 spellings (`JZ`, `LOOPNZ`, the
//! unsuffixed string-op mnemonics) are folded onto one canonical variant
//! before lookup, so the dispatcher only ever has to handle one spelling
//! per instruction — the same trick the register file uses for its 8-bit
//! aliases.

use std::str::FromStr;

use util_derive::EnumFromStr;

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumFromStr)]
#[allow(clippy::upper_case_acronyms)]
pub enum Mnemonic {
    MOV,
    XCHG,
    LEA,
    MOVZX,
    MOVSX,
    ADD,
    SUB,
    INC,
    DEC,
    NEG,
    MUL,
    IMUL,
    DIV,
    IDIV,
    MOD,
    CMP,
    AND,
    OR,
    XOR,
    NOT,
    TEST,
    SHL,
    SHR,
    SAR,
    ROL,
    ROR,
    RCL,
    RCR,
    NOP,
    JMP,
    JE,
    JNE,
    JG,
    JGE,
    JL,
    JLE,
    JS,
    JNS,
    JA,
    JAE,
    JB,
    JBE,
    CALL,
    RET,
    PUSH,
    POP,
    LOOP,
    LOOPE,
    LOOPNE,
    CMOVE,
    CMOVNE,
    CMOVL,
    CMOVLE,
    CMOVG,
    CMOVGE,
    CMOVA,
    CMOVAE,
    CMOVB,
    CMOVBE,
    CMOVS,
    CMOVNS,
    LAHF,
    SAHF,
    XADD,
    BSF,
    BSR,
    BSWAP,
    LODSB,
    STOSB,
    MOVSB,
    SCASB,
    CMPSB,
    INT,
    INT3,
    IRET,
    RAND,
    HLT,
}

fn normalize_alias(name: &str) -> &str {
    match name {
        "JZ" => "JE",
        "JNZ" => "JNE",
        "LOOPZ" => "LOOPE",
        "LOOPNZ" => "LOOPNE",
        "LODS" => "LODSB",
        "STOS" => "STOSB",
        "MOVS" => "MOVSB",
        "SCAS" => "SCASB",
        "CMPS" => "CMPSB",
        other => other,
    }
}

/// Parses a mnemonic token, case-insensitively, resolving aliases first.
pub fn parse_mnemonic(name: &str) -> Option<Mnemonic> {
    let upper = name.to_uppercase();
    Mnemonic::from_str(normalize_alias(&upper)).ok()
}

/// Mnemonics whose handler is fully responsible for `EIP`, in every branch
/// of their behavior (taken or not taken, call-stack empty or not). The
/// engine's step loop only applies its generic "advance by one" rule to
/// everything *not* in this set — `CMOVxx`, despite evaluating a predicate,
/// always advances normally and so is deliberately absent from it.
pub fn is_control_flow(mnemonic: Mnemonic) -> bool {
    use Mnemonic::*;
    matches!(
        mnemonic,
        JMP | JE
            | JNE
            | JG
            | JGE
            | JL
            | JLE
            | JS
            | JNS
            | JA
            | JAE
            | JB
            | JBE
            | CALL
            | RET
            | LOOP
            | LOOPE
            | LOOPNE
    )
}
