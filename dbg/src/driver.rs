//! Wraps a loaded [`Engine`] in the breakpoint/step/continue commands a
//! debug front end issues, plus the cooperative safety-yield that keeps a
//! tight `continue` loop from starving the rest of the host.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use edu86::constants::SAFETY_YIELD_INTERVAL;
use edu86::{Bus, Cpu, CpuConfig, DeviceEvent, Engine, LoadError, Program, RuntimeError, StepResult};

use crate::breakpoints::{BreakpointRequest, BreakpointTable};
use crate::event::{Stopped, StoppedReason};

pub struct Driver {
    engine: Engine,
    breakpoints: BreakpointTable,
    pause: Arc<AtomicBool>,
}

impl Driver {
    pub fn new(program: Program, config: CpuConfig) -> Result<Driver, LoadError> {
        let cpu = Cpu::new(config);
        let bus = Bus::new(&cpu.config);
        let engine = Engine::new(program, cpu, bus)?;
        Ok(Driver {
            engine,
            breakpoints: BreakpointTable::new(),
            pause: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// A clone of the pause flag, for a host to set from another thread (a
    /// UI event loop, a signal handler) while `continue` is running.
    pub fn pause_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.pause)
    }

    pub fn request_pause(&self) {
        self.pause.store(true, Ordering::SeqCst);
    }

    pub fn set_breakpoint(&mut self, line: u32) -> BreakpointRequest {
        self.breakpoints.set(self.engine.program(), line)
    }

    pub fn clear_breakpoint(&mut self, line: u32) {
        self.breakpoints.clear(line);
    }

    pub fn clear_all_breakpoints(&mut self) {
        self.breakpoints.clear_all();
    }

    /// Breakpoints are edits the host queued up; they stay armed across a
    /// reset, only the CPU/memory/EIP state rewinds.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.pause.store(false, Ordering::SeqCst);
    }

    /// The stop a fresh driver reports before anything has run, for
    /// `stop_on_entry` front ends.
    pub fn entry_stop(&self) -> Stopped {
        self.stopped_at(StoppedReason::Entry, None)
    }

    pub fn register(&self, index: usize) -> u32 {
        self.engine.cpu.reg(index)
    }

    pub fn flags(&self) -> u32 {
        self.engine.cpu.flags()
    }

    /// Reads a range of memory cells for a host's inspection view, bypassing
    /// device dispatch so looking at the keyboard range doesn't pop it.
    pub fn memory_range(&self, start: u32, count: u32) -> Vec<u32> {
        (0..count)
            .map(|i| self.engine.bus.peek32(start.wrapping_add(i)))
            .collect()
    }

    pub fn console(&self) -> &str {
        self.engine.cpu.console()
    }

    pub fn drain_device_events(&mut self) -> Vec<DeviceEvent> {
        self.engine.bus.drain_events()
    }

    fn current_line(&self) -> Option<u32> {
        self.engine
            .program()
            .instructions
            .get(self.engine.cpu.eip())
            .map(|i| i.line)
    }

    fn stopped_at(&self, reason: StoppedReason, error: Option<RuntimeError>) -> Stopped {
        Stopped {
            reason,
            eip: self.engine.cpu.eip(),
            line: self.current_line(),
            error,
        }
    }

    /// Executes exactly one instruction. `stepOver` and `stepIn` are the
    /// same command here — this is a flat assembly model with no call
    /// frames to step across — so both map onto this one method.
    pub fn step(&mut self) -> Stopped {
        match self.engine.step() {
            StepResult::Idle => self.stopped_at(StoppedReason::Halt, None),
            StepResult::Advanced => self.stopped_at(StoppedReason::Step, None),
            StepResult::Exception(e) => self.stopped_at(StoppedReason::Exception, Some(e)),
        }
    }

    /// Runs until the call-stack depth drops below its depth at the moment
    /// of the call, or the program halts or faults first. With an empty
    /// call stack this degrades to a single `step`.
    pub fn step_out(&mut self) -> Stopped {
        let target_depth = self.engine.cpu.call_stack_depth();
        if target_depth == 0 {
            return self.step();
        }
        loop {
            match self.engine.step() {
                StepResult::Idle => return self.stopped_at(StoppedReason::Halt, None),
                StepResult::Exception(e) => {
                    return self.stopped_at(StoppedReason::Exception, Some(e))
                }
                StepResult::Advanced => {
                    if self.engine.cpu.call_stack_depth() < target_depth {
                        return self.stopped_at(StoppedReason::Step, None);
                    }
                }
            }
        }
    }

    /// Steps repeatedly until halt, fault, an armed breakpoint, or a pending
    /// pause request. Always executes at least one instruction — a
    /// `continue` issued right after stopping on a breakpoint must make
    /// progress past it rather than re-triggering immediately — and checks
    /// the breakpoint table against the *next* instruction after each step,
    /// so the loop stops before that instruction runs, matching what a
    /// breakpoint means.
    ///
    /// Every `SAFETY_YIELD_INTERVAL` instructions the loop checks the pause
    /// flag; a pause request takes effect at that boundary, never mid-batch.
    pub fn continue_(&mut self) -> Stopped {
        self.engine.cpu.set_running(true);
        let mut since_yield: u32 = 0;
        loop {
            match self.engine.step() {
                StepResult::Idle => {
                    self.engine.cpu.set_running(false);
                    return self.stopped_at(StoppedReason::Halt, None);
                }
                StepResult::Exception(e) => {
                    self.engine.cpu.set_running(false);
                    return self.stopped_at(StoppedReason::Exception, Some(e));
                }
                StepResult::Advanced => {}
            }

            if self.breakpoints.contains(self.engine.cpu.eip()) {
                self.engine.cpu.set_running(false);
                return self.stopped_at(StoppedReason::Breakpoint, None);
            }

            since_yield += 1;
            if since_yield >= SAFETY_YIELD_INTERVAL {
                since_yield = 0;
                log::debug!("continue: safety yield at eip={}", self.engine.cpu.eip());
                if self.pause.swap(false, Ordering::SeqCst) {
                    self.engine.cpu.set_running(false);
                    return self.stopped_at(StoppedReason::Pause, None);
                }
            }
        }
    }
}
