//! What a driver command reports back once it stops stepping.

/// Why a `step`/`step_out`/`continue` call returned control to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoppedReason {
    /// The program is loaded and `stop_on_entry` is set; nothing has run yet.
    Entry,
    /// A single `step`/`step_out` call completed normally.
    Step,
    /// `continue` reached an armed breakpoint before executing it.
    Breakpoint,
    /// The program halted, or ran off the end of its instruction list.
    Halt,
    /// A pending pause request took effect at a safety-yield boundary.
    Pause,
    /// A handler raised a runtime fault; see `Stopped::error`.
    Exception,
}

/// A snapshot of where execution stopped and why, handed back to the host
/// after every driver command.
#[derive(Debug, Clone, PartialEq)]
pub struct Stopped {
    pub reason: StoppedReason,
    /// The instruction index execution is now sitting at — the one that
    /// will run next, not the one that just ran.
    pub eip: usize,
    /// The source line of the instruction at `eip`, if one exists (it won't
    /// once `eip` has run off the end of the program).
    pub line: Option<u32>,
    pub error: Option<edu86::RuntimeError>,
}
