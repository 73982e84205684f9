//! The address space a running program sees: plain RAM overlaid with the
//! LCD, keyboard and audio device ranges. This generalizes the teacher's
//! non-overlapping "mount a fragment at an address" composite memory into a
//! priority-ordered overlay, because here the device ranges sit inside the
//! same flat space as RAM rather than being assembled from disjoint pieces.

use crate::constants::MIN_MEMORY_CELLS;
use crate::cpu::CpuConfig;
use crate::error::IoError;
use crate::memory::devices::{AudioDevice, DeviceEvent, KeyboardDevice, LcdDevice};

pub struct Bus {
    ram: Vec<u32>,
    lcd: LcdDevice,
    keyboard: KeyboardDevice,
    audio: AudioDevice,
    events: Vec<DeviceEvent>,
}

impl Bus {
    pub fn new(config: &CpuConfig) -> Self {
        Bus {
            ram: vec![0; MIN_MEMORY_CELLS as usize],
            lcd: LcdDevice::new(config.lcd_width, config.lcd_height),
            keyboard: KeyboardDevice::new(config.legacy_keyboard_base),
            audio: AudioDevice::new(),
            events: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        for cell in self.ram.iter_mut() {
            *cell = 0;
        }
        self.lcd.reset();
        self.keyboard.reset();
        self.audio.reset();
        self.events.clear();
    }

    /// Reads are checked against the keyboard and audio ranges, the LCD's
    /// reserved range, and finally plain RAM, in that priority order. The
    /// keyboard is checked first since an operator-enabled legacy base can
    /// overlap the LCD's reserved block; see `CpuConfig::legacy_keyboard_base`.
    pub fn read32(&mut self, addr: u32) -> Result<u32, IoError> {
        if self.keyboard.contains(addr) {
            return self.keyboard.read(addr);
        }
        if LcdDevice::contains(addr) {
            return Ok(self.lcd.read());
        }
        if AudioDevice::contains(addr) {
            return self.audio.read(addr);
        }
        Ok(self.ram_read(addr))
    }

    pub fn write32(&mut self, addr: u32, value: u32) -> Result<(), IoError> {
        if self.keyboard.contains(addr) {
            self.keyboard.write(addr, value);
            return Ok(());
        }
        if LcdDevice::contains(addr) {
            if let Some(offset) = self.lcd.write(addr, value) {
                self.events.push(DeviceEvent::LcdChanged {
                    offset,
                    value: value as u8,
                });
            }
            return Ok(());
        }
        if AudioDevice::contains(addr) {
            if let Some(event) = self.audio.write(addr, value)? {
                self.events.push(event);
            }
            return Ok(());
        }
        self.ram_write(addr, value);
        Ok(())
    }

    /// Reads the underlying RAM cell directly, bypassing device dispatch —
    /// for a debugger's memory-inspection view, which must not trigger a
    /// keyboard pop or any other device read side effect just by being
    /// displayed. LCD/keyboard/audio addresses always read back as whatever
    /// plain RAM holds there, which is always zero, since devices never
    /// write through to the RAM array.
    pub fn peek32(&self, addr: u32) -> u32 {
        self.ram_read(addr)
    }

    fn ram_read(&self, addr: u32) -> u32 {
        self.ram.get(addr as usize).copied().unwrap_or(0)
    }

    fn ram_write(&mut self, addr: u32, value: u32) {
        if let Some(cell) = self.ram.get_mut(addr as usize) {
            *cell = value;
        }
    }

    /// Drains the device events raised since the last call, for a host to
    /// react to (repaint, play a tone) without polling memory.
    pub fn drain_events(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn lcd_pixels(&self) -> &[u8] {
        self.lcd.pixels()
    }

    pub fn lcd_width(&self) -> u16 {
        self.lcd.width()
    }

    pub fn lcd_height(&self) -> u16 {
        self.lcd.height()
    }

    pub fn enqueue_key(&mut self, code: u8, pressed: bool) {
        self.keyboard.enqueue(code, pressed);
    }
}
