//! The in-memory form a loaded program takes: one record per instruction,
//! a label table, and the line-to-instruction map the debug driver uses to
//! honor source-line breakpoints. Building one of these is `edu86-asm`'s
//! job; this crate only needs to run it.

use std::collections::HashMap;

/// One assembled instruction. Operands are kept as the original source
/// text rather than pre-parsed [`crate::operand::Operand`] values, matching
/// how the loader hands them to the dispatcher: non-jump operands are
/// parsed fresh on every execution (parsing is pure and was already
/// validated at load time), while jump targets are looked up directly in
/// the label table and never go through the operand parser at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub line: u32,
    pub mnemonic: String,
    pub operands: Vec<String>,
    pub raw: String,
}

/// A fully assembled program: the flattened instruction list, the label
/// table, a map from source line to instruction index, and the memory
/// image produced by `DB`/`DW`/`DD`/`ORG` directives.
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub labels: HashMap<String, usize>,
    pub line_to_index: HashMap<u32, usize>,
    pub initial_memory: Vec<(u32, u32)>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn instruction_index_for_line(&self, line: u32) -> Option<usize> {
        self.line_to_index.get(&line).copied()
    }
}
