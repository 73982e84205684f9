//! Fixed points shared across the engine: register layout, EFLAGS-style bit
//! positions, reset values, and the memory-mapped device address ranges.

/// Number of general-purpose registers (`EAX..EDI`).
pub const REGISTER_COUNT: usize = 8;

pub const CF_BIT: u32 = 0;
/// Always reads as 1, mirroring the reserved bit 1 of the real EFLAGS register.
pub const RESERVED_BIT: u32 = 1;
pub const ZF_BIT: u32 = 6;
pub const SF_BIT: u32 = 7;
pub const OF_BIT: u32 = 11;

pub const SIGN_BIT: u32 = 0x8000_0000;

pub const INITIAL_ESP: u32 = 0xFFFF;
pub const INITIAL_EIP: usize = 0;
pub const INITIAL_FLAGS: u32 = 0x02;

/// Minimum size of the linear address space, in 32-bit cells.
pub const MIN_MEMORY_CELLS: u32 = 1 << 20;

pub const LCD_BASE: u32 = 0xF000;
pub const LCD_END: u32 = 0xFFFF;

pub const KEYBOARD_BASE: u32 = 0x10100;
pub const KEYBOARD_STATUS_OFFSET: u32 = 0;
pub const KEYBOARD_CODE_OFFSET: u32 = 1;
pub const KEYBOARD_STATE_OFFSET: u32 = 2;
pub const KEYBOARD_SPAN: u32 = 3;

/// Legacy keyboard base named alongside `0x10100` in the source material;
/// only honored when `CpuConfig::legacy_keyboard_base` is set.
pub const LEGACY_KEYBOARD_BASE: u32 = 0xF100;

pub const AUDIO_BASE: u32 = 0x10200;
pub const AUDIO_CTRL_OFFSET: u32 = 0;
pub const AUDIO_WAVE_OFFSET: u32 = 1;
pub const AUDIO_FREQ_OFFSET: u32 = 2;
pub const AUDIO_DURATION_OFFSET: u32 = 4;
pub const AUDIO_VOLUME_OFFSET: u32 = 6;
pub const AUDIO_SPAN: u32 = 7;

/// Number of instructions the driver's `continue` loop executes before
/// yielding control back to the host, per §5's cooperative scheduling model.
pub const SAFETY_YIELD_INTERVAL: u32 = 1000;

/// `INT 0x21 AH=0x09` stops copying a `$`-terminated string after this many
/// bytes, so a missing terminator cannot run the console accumulator away.
pub const CONSOLE_STRING_CAP: usize = 4096;
