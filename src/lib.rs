//! `edu86`: an educational 32-bit x86-like CPU simulator engine.
//!
//! This crate owns the architectural state ([`cpu::Cpu`]), the address
//! space ([`memory::Bus`]), operand parsing ([`operand`]), the
//! mnemonic set ([`mnemonic`]) and its dispatcher ([`dispatch`]), and the
//! [`engine::Engine`] that ties them together into something that can run
//! one instruction at a time. Assembling source text into a [`program::Program`]
//! is `edu86-asm`'s job; driving `Engine::step` in a loop with breakpoints
//! and pause/resume is `edu86-dbg`'s.

pub mod constants;
pub mod cpu;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod flags;
pub mod memory;
pub mod mnemonic;
pub mod operand;
pub mod program;
pub mod register;

pub use cpu::{CompatMode, Cpu, CpuConfig};
pub use engine::{Engine, LoadError, StepResult};
pub use error::{IoError, OperandError, RuntimeError};
pub use memory::{Bus, DeviceEvent};
pub use mnemonic::Mnemonic;
pub use operand::Operand;
pub use program::{Instruction, Program};
