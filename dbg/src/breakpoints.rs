//! Source-line breakpoints, translated once to instruction indices via
//! `Program::instruction_index_for_line` so the hot `continue` loop only
//! ever checks a plain index set.

use std::collections::{HashMap, HashSet};

use edu86::Program;

/// The outcome of asking to set a breakpoint at a source line: whether that
/// line actually landed on an instruction. A label- or comment-only line is
/// reported back `verified: false` and never armed, rather than rejected —
/// editors commonly set breakpoints on blank lines while a file is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakpointRequest {
    pub line: u32,
    pub verified: bool,
}

#[derive(Default)]
pub struct BreakpointTable {
    active: HashSet<usize>,
    by_line: HashMap<u32, usize>,
}

impl BreakpointTable {
    pub fn new() -> Self {
        BreakpointTable::default()
    }

    pub fn set(&mut self, program: &Program, line: u32) -> BreakpointRequest {
        match program.instruction_index_for_line(line) {
            Some(index) => {
                self.active.insert(index);
                self.by_line.insert(line, index);
                BreakpointRequest {
                    line,
                    verified: true,
                }
            }
            None => BreakpointRequest {
                line,
                verified: false,
            },
        }
    }

    pub fn clear(&mut self, line: u32) {
        if let Some(index) = self.by_line.remove(&line) {
            self.active.remove(&index);
        }
    }

    pub fn clear_all(&mut self) {
        self.active.clear();
        self.by_line.clear();
    }

    pub fn contains(&self, index: usize) -> bool {
        self.active.contains(&index)
    }
}
