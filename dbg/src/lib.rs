//! `edu86-dbg`: the breakpoint table, stepping commands, and cooperative
//! run loop a debug front end drives. This crate owns none of the
//! instruction semantics — it only decides *when* to call
//! [`edu86::Engine::step`] and reports back where execution stopped and why.

mod breakpoints;
mod driver;
mod event;

pub use breakpoints::{BreakpointRequest, BreakpointTable};
pub use driver::Driver;
pub use event::{Stopped, StoppedReason};
