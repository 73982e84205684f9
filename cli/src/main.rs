//! `edu86`: assembles a source file and runs it to completion (or to the
//! first breakpoint/fault) under the debug driver, printing console output
//! and exiting with a code that distinguishes the failure family.

#[macro_use]
extern crate clap;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Arg;

use edu86::{CompatMode, CpuConfig};
use edu86_dbg::{Driver, StoppedReason};

#[derive(Debug)]
enum Error {
    Io(std::io::Error, PathBuf),
    Assembly(edu86_asm::AssemblyError),
    Load(edu86::LoadError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, path) => write!(f, "reading \"{}\": {}", path.display(), err),
            Error::Assembly(err) => write!(f, "{}", err),
            Error::Load(err) => write!(f, "line {}: {}", err.line, err.source),
        }
    }
}

impl Error {
    /// Distinct per error family, per the CLI's exit-code contract: 0 is
    /// reserved for a clean `Halt`, assembler failures and load failures
    /// each get their own non-zero code rather than sharing one.
    fn exit_code(&self) -> i32 {
        match self {
            Error::Io(..) => 1,
            Error::Assembly(..) => 2,
            Error::Load(..) => 3,
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("PROGRAM")
                .help("Assembly source file to run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("lcd-width")
                .long("lcd-width")
                .takes_value(true)
                .value_name("N")
                .help("LCD width in pixels (default 16)"),
        )
        .arg(
            Arg::with_name("lcd-height")
                .long("lcd-height")
                .takes_value(true)
                .value_name("N")
                .help("LCD height in pixels (default 16)"),
        )
        .arg(
            Arg::with_name("strict")
                .long("strict")
                .help("Use strict x86 flag/MOV semantics instead of the educational defaults"),
        )
        .arg(
            Arg::with_name("speed")
                .long("speed")
                .takes_value(true)
                .value_name("PERCENT")
                .help("CPU speed percentage; paces headless continuous-run mode only (default 100)"),
        )
        .arg(
            Arg::with_name("stop-on-entry")
                .long("stop-on-entry")
                .help("Report stopped(reason=entry) before the first instruction runs"),
        )
        .arg(
            Arg::with_name("log")
                .long("log")
                .help("Raise logging from warn to debug for the assembler and engine"),
        )
        .arg(
            Arg::with_name("break")
                .long("break")
                .takes_value(true)
                .value_name("LINE")
                .multiple(true)
                .number_of_values(1)
                .help("Pre-seed a breakpoint at a source line (repeatable)"),
        )
        .get_matches();

    let log_level = if matches.is_present("log") { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(&matches) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(err.exit_code());
        }
    }
}

fn run(matches: &clap::ArgMatches) -> Result<i32, Error> {
    let program_path = matches.value_of("PROGRAM").expect("PROGRAM is required");
    let path = Path::new(program_path);
    let source = fs::read_to_string(path).map_err(|err| Error::Io(err, path.to_owned()))?;

    let program = edu86_asm::assemble(&source).map_err(Error::Assembly)?;

    let config = CpuConfig {
        lcd_width: value_t!(matches.value_of("lcd-width"), u16).unwrap_or(16),
        lcd_height: value_t!(matches.value_of("lcd-height"), u16).unwrap_or(16),
        mode: if matches.is_present("strict") {
            CompatMode::StrictX86
        } else {
            CompatMode::Educational
        },
        cpu_speed_percent: value_t!(matches.value_of("speed"), u8).unwrap_or(100),
        stop_on_entry: matches.is_present("stop-on-entry"),
        legacy_keyboard_base: false,
    };

    let mut driver = Driver::new(program, config).map_err(Error::Load)?;

    if let Some(lines) = matches.values_of("break") {
        for line in lines {
            match line.parse::<u32>() {
                Ok(line_no) => {
                    let req = driver.set_breakpoint(line_no);
                    if !req.verified {
                        log::warn!("--break {}: no instruction maps to that line", line_no);
                    }
                }
                Err(_) => log::warn!("--break {}: not a line number, ignored", line),
            }
        }
    }

    let mut stopped = if config.stop_on_entry {
        driver.entry_stop()
    } else {
        driver.continue_()
    };

    loop {
        for event in driver.drain_device_events() {
            log::debug!("device event: {:?}", event);
        }
        match stopped.reason {
            StoppedReason::Entry | StoppedReason::Step | StoppedReason::Pause => {
                stopped = driver.continue_();
            }
            StoppedReason::Breakpoint | StoppedReason::Halt | StoppedReason::Exception => break,
        }
    }

    let console = driver.console();
    if !console.is_empty() {
        print!("{}", console);
    }

    match stopped.reason {
        StoppedReason::Breakpoint => {
            eprintln!(
                "stopped: breakpoint at line {:?} (instruction {})",
                stopped.line, stopped.eip
            );
            Ok(0)
        }
        StoppedReason::Exception => {
            if let Some(err) = &stopped.error {
                eprintln!("runtime fault: {}", err);
            }
            Ok(4)
        }
        _ => Ok(0),
    }
}
