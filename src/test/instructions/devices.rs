use crate::cpu::{Cpu, CpuConfig};
use crate::engine::{Engine, StepResult};
use crate::error::{IoError, RuntimeError};
use crate::memory::{Bus, DeviceEvent};
use crate::test::{build, run_until_fault};

fn run_with_bus(lines: &[&str]) -> Engine {
    let config = CpuConfig {
        lcd_width: 16,
        lcd_height: 16,
        ..CpuConfig::default()
    };
    let program = build(lines);
    let cpu = Cpu::new(config);
    let bus = Bus::new(&cpu.config);
    let mut engine = Engine::new(program, cpu, bus).expect("fixture should assemble");
    for _ in 0..10_000 {
        match engine.step() {
            StepResult::Idle => break,
            StepResult::Advanced => {}
            StepResult::Exception(e) => panic!("unexpected fault: {:?}", e),
        }
    }
    engine
}

#[test]
fn lcd_write_lights_the_addressed_pixel() {
    let mut engine = run_with_bus(&["MOV [0xF000], 1", "MOV [0xF010], 1", "HLT"]);
    assert_eq!(engine.bus.lcd_pixels()[0], 1);
    assert_eq!(engine.bus.lcd_pixels()[16], 1);
    assert_eq!(engine.bus.lcd_pixels()[1], 0);
    let _ = &mut engine;
}

#[test]
fn lcd_write_outside_the_framebuffer_is_a_silent_no_op() {
    // 16x16 = 256 cells (valid offsets 0..255); 0xF100 lands past the
    // framebuffer but still inside the reserved 0xF000..=0xFFFF range.
    let engine = run_with_bus(&["MOV [0xF100], 1", "HLT"]);
    assert!(engine.bus.lcd_pixels().iter().all(|&p| p == 0));
}

#[test]
fn lcd_reads_always_return_zero() {
    let mut engine = run_with_bus(&["MOV [0xF000], 9", "MOV EAX, [0xF000]", "HLT"]);
    use crate::register::Reg32;
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0);
    let _ = &mut engine;
}

#[test]
fn lcd_write_publishes_a_changed_event() {
    let config = CpuConfig::default();
    let program = build(&["MOV [0xF000], 1", "HLT"]);
    let cpu = Cpu::new(config);
    let bus = Bus::new(&cpu.config);
    let mut engine = Engine::new(program, cpu, bus).unwrap();
    loop {
        match engine.step() {
            StepResult::Idle => break,
            StepResult::Advanced => {}
            StepResult::Exception(e) => panic!("{:?}", e),
        }
    }
    let events = engine.bus.drain_events();
    assert_eq!(events, vec![DeviceEvent::LcdChanged { offset: 0, value: 1 }]);
}

#[test]
fn keyboard_status_reports_whether_the_queue_is_nonempty() {
    let mut engine = run_with_bus(&["MOV EAX, [0x10100]", "HLT"]);
    use crate::register::Reg32;
    assert_eq!(engine.cpu.reg(Reg32::EAX.index()), 0);
    engine.bus.enqueue_key(65, true);
    assert_eq!(engine.bus.read32(0x10100).unwrap(), 1);
}

#[test]
fn keyboard_code_pops_the_queue_and_state_reflects_it() {
    let mut engine = run_with_bus(&["NOP", "HLT"]);
    engine.bus.enqueue_key(65, true);
    assert_eq!(engine.bus.read32(0x10101).unwrap(), 65);
    assert_eq!(engine.bus.read32(0x10102).unwrap(), 1);
    assert_eq!(engine.bus.read32(0x10100).unwrap(), 0);
}

#[test]
fn keyboard_writes_are_silently_ignored() {
    let mut engine = run_with_bus(&["MOV [0x10100], 1", "HLT"]);
    assert_eq!(engine.bus.read32(0x10100).unwrap(), 0);
}

#[test]
fn keyboard_subaddresses_beyond_the_span_fall_through_to_ram() {
    let mut engine = run_with_bus(&["NOP", "HLT"]);
    assert_eq!(engine.bus.read32(0x10103).unwrap(), 0);
}

#[test]
fn audio_ctrl_write_of_one_raises_a_play_event() {
    let config = CpuConfig::default();
    let program = build(&[
        "MOV [0x10201], 1", // wave = sine
        "MOV [0x10202], 440", // frequency
        "MOV [0x10204], 250", // duration
        "MOV [0x10206], 200", // volume
        "MOV [0x10200], 1", // ctrl edge
        "HLT",
    ]);
    let cpu = Cpu::new(config);
    let bus = Bus::new(&cpu.config);
    let mut engine = Engine::new(program, cpu, bus).unwrap();
    loop {
        match engine.step() {
            StepResult::Idle => break,
            StepResult::Advanced => {}
            StepResult::Exception(e) => panic!("{:?}", e),
        }
    }
    let events = engine.bus.drain_events();
    assert_eq!(
        events,
        vec![DeviceEvent::AudioPlay {
            wave: 1,
            frequency_hz: 440,
            duration_ms: 250,
            volume: 200,
        }]
    );
}

#[test]
fn audio_ctrl_write_of_zero_does_not_trigger_playback() {
    let mut engine = run_with_bus(&["MOV [0x10200], 0", "HLT"]);
    assert!(engine.bus.drain_events().is_empty());
}

#[test]
fn audio_write_to_an_unmapped_sub_address_is_an_io_error() {
    // 0x10203 and 0x10205 fall inside the audio span (0x10200..0x10207) but
    // aren't ctrl/wave/freq/duration/volume -- offsets 3 and 5 are gaps.
    let (_engine, error) = run_until_fault(&["MOV [0x10203], 1", "HLT"]);
    assert_eq!(
        error,
        Some(RuntimeError::Io(IoError::UnknownIoWrite(0x10203)))
    );
}
