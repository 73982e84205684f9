//! Source text to an assembled [`edu86::Program`]: comment stripping, label
//! and data-symbol tables, `.text`/`.data`/`ORG`/`EQU`/`DB`/`DW`/`DD`
//! directives, and per-operand validation ahead of time so a bad literal is
//! an assembly-time [`AssemblyError`] with a line number, never a runtime
//! surprise. This crate never executes anything — that's `edu86-dbg`'s job,
//! wrapped around `edu86::Engine::step`.

pub mod error;
mod directives;
mod lex;

use std::collections::{HashMap, HashSet};

use edu86::mnemonic::{self, is_control_flow};
use edu86::operand::parse_operand;
use edu86::program::{Instruction, Program};

pub use error::{AssemblyError, AssemblyErrorKind};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Section {
    Text,
    Data,
}

struct Assembler {
    program: Program,
    /// `EQU` constants and data-label addresses, consulted when an
    /// instruction operand references one by name.
    symbols: HashMap<String, i64>,
    /// Every label/symbol name seen so far, regardless of which table it
    /// lives in, purely to catch duplicates across both namespaces.
    names: HashSet<String>,
    section: Section,
    data_addr: u32,
}

/// Assembles `source` into a [`Program`], or the first [`AssemblyError`]
/// encountered — no instructions are ever partially loaded; the first bad
/// line stops the whole assembly per §7 ("no instructions execute").
pub fn assemble(source: &str) -> error::Result<Program> {
    let mut assembler = Assembler {
        program: Program::new(),
        symbols: HashMap::new(),
        names: HashSet::new(),
        section: Section::Text,
        data_addr: 0,
    };
    for (zero_based, raw_line) in source.lines().enumerate() {
        assembler.process_line(zero_based as u32 + 1, raw_line)?;
    }
    log::debug!(
        "assembled {} instructions, {} labels, {} data writes",
        assembler.program.instructions.len(),
        assembler.program.labels.len(),
        assembler.program.initial_memory.len(),
    );
    Ok(assembler.program)
}

impl Assembler {
    fn process_line(&mut self, line: u32, raw: &str) -> error::Result<()> {
        let trimmed = lex::strip_comment(raw).trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let (label, remainder) = lex::split_label(trimmed);
        if remainder.is_empty() {
            if let Some(name) = label {
                self.define_bare_label(line, name)?;
            }
            return Ok(());
        }

        if let Some((name, value_src)) = lex::split_equ(remainder) {
            let value = directives::resolve_value(value_src, &self.symbols)
                .map_err(|kind| AssemblyError::new(line, kind))?;
            self.define_symbol(line, name, value)?;
            return Ok(());
        }

        let (first, rest) = lex::split_first_token(remainder);
        match first.to_uppercase().as_str() {
            ".TEXT" => {
                self.section = Section::Text;
                return Ok(());
            }
            ".DATA" => {
                self.section = Section::Data;
                return Ok(());
            }
            "ORG" => {
                let value = directives::resolve_value(rest, &self.symbols)
                    .map_err(|kind| AssemblyError::new(line, kind))?;
                self.data_addr = value as u32;
                return Ok(());
            }
            "DB" | "DW" | "DD" => {
                if let Some(name) = label {
                    self.define_symbol(line, name, self.data_addr as i64)?;
                }
                self.assemble_data(line, first, rest)?;
                return Ok(());
            }
            _ => {}
        }

        if let Some(name) = label {
            self.define_instruction_label(line, name)?;
        }
        self.assemble_instruction(line, &first.to_uppercase(), rest, trimmed)
    }

    fn define_bare_label(&mut self, line: u32, name: &str) -> error::Result<()> {
        match self.section {
            Section::Data => self.define_symbol(line, name, self.data_addr as i64),
            Section::Text => self.define_instruction_label(line, name),
        }
    }

    fn define_symbol(&mut self, line: u32, name: &str, value: i64) -> error::Result<()> {
        self.claim_name(line, name)?;
        self.symbols.insert(name.to_string(), value);
        Ok(())
    }

    fn define_instruction_label(&mut self, line: u32, name: &str) -> error::Result<()> {
        self.claim_name(line, name)?;
        self.program
            .labels
            .insert(name.to_string(), self.program.instructions.len());
        Ok(())
    }

    fn claim_name(&mut self, line: u32, name: &str) -> error::Result<()> {
        if !self.names.insert(name.to_string()) {
            return Err(AssemblyError::new(
                line,
                AssemblyErrorKind::DuplicateLabel(name.to_string()),
            ));
        }
        Ok(())
    }

    fn assemble_data(&mut self, line: u32, directive: &str, rest: &str) -> error::Result<()> {
        let step: u32 = match directive {
            "DB" => 1,
            "DW" => 2,
            _ => 4,
        };
        for item in lex::split_top_level_commas(rest) {
            let value = directives::resolve_value(&item, &self.symbols)
                .map_err(|kind| AssemblyError::new(line, kind))?;
            self.program
                .initial_memory
                .push((self.data_addr, value as u32));
            self.data_addr = self.data_addr.wrapping_add(step);
        }
        Ok(())
    }

    fn assemble_instruction(
        &mut self,
        line: u32,
        mnemonic_token: &str,
        operand_src: &str,
        raw: &str,
    ) -> error::Result<()> {
        let parsed = mnemonic::parse_mnemonic(mnemonic_token).ok_or_else(|| {
            AssemblyError::new(
                line,
                AssemblyErrorKind::UnknownMnemonic(mnemonic_token.to_string()),
            )
        })?;

        let raw_operands = lex::split_top_level_commas(operand_src);
        let operands = if is_control_flow(parsed) {
            // Jump targets are resolved against `labels` at runtime inside
            // `Engine::step`, never through the operand parser — a forward
            // reference to a label later in the file is perfectly valid.
            raw_operands
        } else {
            let mut resolved = Vec::with_capacity(raw_operands.len());
            for token in &raw_operands {
                let substituted = directives::substitute_symbols(token, &self.symbols);
                parse_operand(&substituted)
                    .map_err(|e| AssemblyError::new(line, e.into()))?;
                resolved.push(substituted);
            }
            resolved
        };

        let index = self.program.instructions.len();
        self.program.line_to_index.insert(line, index);
        self.program.instructions.push(Instruction {
            line,
            mnemonic: mnemonic_token.to_string(),
            operands,
            raw: raw.to_string(),
        });
        Ok(())
    }
}
