//! The architectural state a program can observe and mutate: registers,
//! flags, the instruction pointer, the call-return shadow stack, and the
//! console accumulator fed by `INT 0x21`.

use crate::constants::{
    CONSOLE_STRING_CAP, INITIAL_EIP, INITIAL_ESP, INITIAL_FLAGS, RESERVED_BIT,
};
use crate::register::{Reg32, Registers};

/// Selects between the simulator's own flag conventions and the subset of
/// real x86 behavior it can also emulate. See the handlers in `dispatch` for
/// where the two modes actually diverge: `ROL`/`ROR`/`RCL`/`RCR` touching
/// ZF/SF, `MUL`/`DIV` touching them, and memory-to-memory `MOV`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CompatMode {
    Educational,
    StrictX86,
}

impl Default for CompatMode {
    fn default() -> Self {
        CompatMode::Educational
    }
}

/// Runtime configuration that shapes a [`Cpu`] without being part of its
/// architectural state — the LCD's pixel dimensions, which compatibility
/// mode governs flag quirks, how fast `continue` paces itself, and whether
/// execution should stop before the first instruction.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct CpuConfig {
    pub lcd_width: u16,
    pub lcd_height: u16,
    pub mode: CompatMode,
    /// Percentage of full speed the driver's `continue` loop should target;
    /// `100` means no throttling.
    pub cpu_speed_percent: u8,
    pub stop_on_entry: bool,
    /// Honor the `0xF100` keyboard base named alongside `0x10100` in the
    /// source material, instead of the canonical `0x10100` base.
    pub legacy_keyboard_base: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        CpuConfig {
            lcd_width: 16,
            lcd_height: 16,
            mode: CompatMode::Educational,
            cpu_speed_percent: 100,
            stop_on_entry: false,
            legacy_keyboard_base: false,
        }
    }
}

impl serde::Serialize for CompatMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CompatMode::Educational => serializer.serialize_str("educational"),
            CompatMode::StrictX86 => serializer.serialize_str("strict-x86"),
        }
    }
}

impl<'de> serde::Deserialize<'de> for CompatMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "educational" => Ok(CompatMode::Educational),
            "strict-x86" => Ok(CompatMode::StrictX86),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["educational", "strict-x86"],
            )),
        }
    }
}

/// The processor's architectural state.
#[derive(Clone, Debug)]
pub struct Cpu {
    registers: Registers,
    flags: u32,
    eip: usize,
    halted: bool,
    running: bool,
    call_stack: Vec<usize>,
    console: String,
    pub config: CpuConfig,
}

impl Cpu {
    pub fn new(config: CpuConfig) -> Self {
        let mut cpu = Cpu {
            registers: Registers::new(),
            flags: INITIAL_FLAGS,
            eip: INITIAL_EIP,
            halted: false,
            running: false,
            call_stack: Vec::new(),
            console: String::new(),
            config,
        };
        cpu.reset();
        cpu
    }

    pub fn reset(&mut self) {
        self.registers.reset();
        self.registers.set(Reg32::ESP.index(), INITIAL_ESP);
        self.flags = INITIAL_FLAGS;
        self.eip = INITIAL_EIP;
        self.halted = false;
        self.running = false;
        self.call_stack.clear();
        self.console.clear();
    }

    pub fn reg(&self, index: usize) -> u32 {
        self.registers.get(index)
    }

    pub fn set_reg(&mut self, index: usize, value: u32) {
        self.registers.set(index, value);
    }

    pub fn reg8(&self, index: usize, high: bool) -> u8 {
        self.registers.get8(index, high)
    }

    pub fn set_reg8(&mut self, index: usize, high: bool, value: u8) {
        self.registers.set8(index, high, value);
    }

    /// Flags as the engine stores them internally; bit 1 is not forced here.
    pub fn raw_flags(&self) -> u32 {
        self.flags
    }

    /// Flags as a debugger or `LAHF` should see them: the reserved bit
    /// always reads high.
    pub fn flags(&self) -> u32 {
        self.flags | (1 << RESERVED_BIT)
    }

    pub fn set_flags(&mut self, flags: u32) {
        self.flags = flags;
    }

    pub fn eip(&self) -> usize {
        self.eip
    }

    pub fn set_eip(&mut self, eip: usize) {
        self.eip = eip;
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    /// Set by the driver while a `continue` loop is actively stepping this
    /// CPU; always false once `halted` is true (invariant 3 of §3).
    pub fn running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running && !self.halted;
    }

    pub fn halt(&mut self) {
        self.halted = true;
        self.running = false;
    }

    pub fn push_call(&mut self, return_index: usize) {
        self.call_stack.push(return_index);
    }

    pub fn pop_call(&mut self) -> Option<usize> {
        self.call_stack.pop()
    }

    pub fn call_stack_depth(&self) -> usize {
        self.call_stack.len()
    }

    /// Appends to the console accumulator fed by `INT 0x21`, capping its
    /// length so a program that forgets its `$` terminator cannot grow it
    /// without bound.
    pub fn console_push(&mut self, text: &str) {
        for ch in text.chars() {
            if self.console.len() >= CONSOLE_STRING_CAP {
                break;
            }
            self.console.push(ch);
        }
    }

    pub fn console(&self) -> &str {
        &self.console
    }
}
