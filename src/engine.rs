//! Ties a [`Program`], a [`Cpu`] and a [`Bus`] together into something that
//! can actually run. `Engine::step` executes exactly one instruction; the
//! `edu86-dbg` driver is what wraps a loop, breakpoints, and cooperative
//! yielding around repeated calls to it.

use crate::cpu::Cpu;
use crate::dispatch;
use crate::error::RuntimeError;
use crate::memory::Bus;
use crate::mnemonic::{self, Mnemonic};
use crate::operand::{self, Operand};
use crate::program::Program;

/// Failure to load a [`Program`]: one of its instructions carries an
/// operand this engine cannot parse. The `edu86-asm` loader validates every
/// operand before a program is considered assembled, so this should only
/// ever surface when a `Program` is built by hand and fed to the engine
/// directly, bypassing the assembler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadError {
    pub line: u32,
    pub source: crate::error::OperandError,
}

/// The outcome of a single [`Engine::step`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// The program is halted, or `EIP` has run off the end of the
    /// instruction list. No instruction executed.
    Idle,
    /// One instruction executed normally.
    Advanced,
    /// One instruction executed and raised a fault.
    Exception(RuntimeError),
}

pub struct Engine {
    pub cpu: Cpu,
    pub bus: Bus,
    program: Program,
    operands: Vec<Vec<Operand>>,
}

impl Engine {
    pub fn new(program: Program, cpu: Cpu, bus: Bus) -> Result<Engine, LoadError> {
        let mut operands = Vec::with_capacity(program.instructions.len());
        for instr in &program.instructions {
            let is_jump_target = mnemonic::parse_mnemonic(&instr.mnemonic)
                .map(mnemonic::is_control_flow)
                .unwrap_or(false);
            if is_jump_target {
                operands.push(Vec::new());
                continue;
            }
            let mut parsed = Vec::with_capacity(instr.operands.len());
            for raw in &instr.operands {
                let op = operand::parse_operand(raw).map_err(|source| LoadError {
                    line: instr.line,
                    source,
                })?;
                parsed.push(op);
            }
            operands.push(parsed);
        }
        let mut engine = Engine {
            cpu,
            bus,
            program,
            operands,
        };
        engine.install_initial_memory();
        Ok(engine)
    }

    fn install_initial_memory(&mut self) {
        let writes = self.program.initial_memory.clone();
        for (addr, value) in writes {
            let _ = self.bus.write32(addr, value);
        }
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.install_initial_memory();
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Executes the instruction at the current `EIP`, per §4.6:
    /// control-flow handlers (the set named in
    /// [`crate::mnemonic::is_control_flow`]) are fully responsible for
    /// `EIP` in every branch of their behavior; everything else advances by
    /// one automatically once the handler returns, unless it already moved
    /// `EIP` itself (as `JMP`'s target label would, if it were ever
    /// mistakenly left out of that set).
    pub fn step(&mut self) -> StepResult {
        if self.cpu.halted() || self.cpu.eip() >= self.program.instructions.len() {
            return StepResult::Idle;
        }
        let index = self.cpu.eip();
        let mnemonic = match mnemonic::parse_mnemonic(&self.program.instructions[index].mnemonic) {
            Some(m) => m,
            None => return StepResult::Idle,
        };
        let control_flow = mnemonic::is_control_flow(mnemonic);
        let raw_operands = self.program.instructions[index].operands.clone();
        let operands = self.operands[index].clone();

        let result = dispatch::execute(
            &mut self.cpu,
            &mut self.bus,
            mnemonic,
            &operands,
            &raw_operands,
            &self.program.labels,
            index,
        );
        match result {
            Ok(()) => {
                if !control_flow && self.cpu.eip() == index {
                    self.cpu.set_eip(index + 1);
                }
                StepResult::Advanced
            }
            Err(e) => StepResult::Exception(e),
        }
    }

    pub fn current_mnemonic(&self) -> Option<Mnemonic> {
        self.program
            .instructions
            .get(self.cpu.eip())
            .and_then(|i| mnemonic::parse_mnemonic(&i.mnemonic))
    }
}
