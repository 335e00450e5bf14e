use retroscope_core::core::{
    DebugStepMode, EmulationMode, ExecutionCompletionReason, ExecutionContext, FrameRunner,
    MAX_CLOCK_MULTIPLIER, Machine, MachineConfig, MachineController,
};
use retroscope_core::cpu::Cpu;
use retroscope_machines::registry;
use retroscope_machines::{ProgramImage, Simple6510System};

/// Toggle port bit 3 six times with a ~1000 tact delay between toggles,
/// then jam.
const BEEPER_PROGRAM: [u8; 21] = [
    0xA9, 0x2F, // LDA #$2F
    0x85, 0x00, // STA $00      ; bit 3 is an output
    0xA9, 0x00, // LDA #$00
    0xA0, 0x06, // LDY #$06
    0x49, 0x08, // loop: EOR #$08
    0x85, 0x01, // STA $01
    0xA2, 0xC8, // LDX #$C8
    0xCA, //       delay: DEX
    0xD0, 0xFD, // BNE delay
    0x88, //       DEY
    0xD0, 0xF4, // BNE loop
    0x02, //       JAM
];

const BEEPER_GOLDEN: &str = "01111111111000000000011111111110000000000011111111110000000000";

fn beeper_config() -> MachineConfig {
    MachineConfig {
        sample_rate: 10_000,
        ..MachineConfig::default()
    }
}

fn beeper_machine() -> Simple6510System {
    let mut machine = Simple6510System::new(&beeper_config()).unwrap();
    let image = ProgramImage::from_raw(0x1000, BEEPER_PROGRAM.to_vec()).unwrap();
    machine.load_program(&image, None);
    machine
}

#[test]
fn test_beeper_program_until_halt() {
    let mut controller = MachineController::new(Box::new(beeper_machine()));
    assert_eq!(controller.start(), Ok(ExecutionCompletionReason::Halted));
    let cpu = controller.machine().cpu();
    assert_eq!(cpu.pc(), 0x1015);
    assert_eq!(cpu.tacts(), 6075);
}

#[test]
fn test_beeper_golden_samples() {
    let mut machine = beeper_machine();
    machine.reset();
    while !machine.cpu.is_halted() {
        machine.execute_cpu_cycle();
    }
    assert_eq!(machine.beeper_bits(), BEEPER_GOLDEN);
    assert!(!machine.beeper().level());
    assert_eq!(machine.port_ddr(), 0x2F);
    assert_eq!(machine.port_data(), 0x00);
}

#[test]
fn test_reset_clears_port_and_samples() {
    let mut machine = beeper_machine();
    machine.reset();
    for _ in 0..6 {
        machine.execute_cpu_cycle();
    }
    assert!(machine.beeper().level());
    machine.reset();
    assert!(!machine.beeper().level());
    assert!(machine.beeper().samples().is_empty());
    assert_eq!(machine.cpu.pc, 0x1000);
}

#[test]
fn test_port_reads_pull_up_inputs() {
    let mut machine = beeper_machine();
    machine.reset();
    // LDA #$2F; STA $00; LDA #$00; LDY #$06; EOR #$08; STA $01
    for _ in 0..6 {
        machine.execute_cpu_cycle();
    }
    assert_eq!(machine.peek_memory(0x0000), 0x2F);
    assert_eq!(machine.peek_memory(0x0001), 0x08 | 0xD0);
}

#[test]
fn test_start_address_override() {
    let mut machine = Simple6510System::new(&MachineConfig::default()).unwrap();
    let image = ProgramImage::from_raw(0x2000, vec![0xEA, 0xEA, 0x02]).unwrap();
    machine.load_program(&image, Some(0x2001));
    machine.reset();
    assert_eq!(machine.get_cpu_state().pc, 0x2001);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = MachineConfig {
        tacts_in_frame: 0,
        ..MachineConfig::default()
    };
    assert!(Simple6510System::new(&config).is_err());
}

#[test]
fn test_registry_lookup() {
    let entry = registry::find("simple6510").expect("simple6510 is registered");
    let machine = (entry.create)(&MachineConfig::default()).unwrap();
    assert_eq!(machine.name(), "simple6510");
    assert!(registry::all().iter().any(|e| e.name == "simple6510"));
    assert!(registry::find("nonexistent").is_none());
}

#[test]
fn test_beeper_samples_are_kept_per_frame() {
    let config = MachineConfig {
        tacts_in_frame: 1000,
        ..beeper_config()
    };
    let mut machine = Simple6510System::new(&config).unwrap();
    // JMP $1000
    let image = ProgramImage::from_raw(0x1000, vec![0x4C, 0x00, 0x10]).unwrap();
    machine.load_program(&image, None);
    machine.reset();

    let mut runner = FrameRunner::new();
    let mut context = ExecutionContext::new(EmulationMode::UntilHalt, DebugStepMode::NoDebug);
    for _ in 0..50 {
        assert_eq!(
            runner.execute_machine_frame(&mut machine, &mut context),
            ExecutionCompletionReason::FrameCompleted
        );
    }
    // 1000 tacts at 985248 Hz is about 10.1 samples at 10 kHz.
    let samples = machine.beeper().samples().len();
    assert!((10..=12).contains(&samples), "{samples} samples buffered");
}

#[test]
fn test_target_multiplier_is_clamped() {
    let mut machine = Simple6510System::new(&MachineConfig::default()).unwrap();
    machine.set_target_clock_multiplier(300_000);
    assert_eq!(machine.target_clock_multiplier(), MAX_CLOCK_MULTIPLIER);
    machine.set_target_clock_multiplier(0);
    assert_eq!(machine.target_clock_multiplier(), 1);
}
