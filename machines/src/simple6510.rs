//! Flat 64K RAM machine around the 6510, with a one-bit beeper on the
//! processor port.
//!
//! Port bit 3 drives the beeper when it is configured as an output. The level
//! is sampled at the configured sample rate as the CPU charges tacts, which
//! makes the sample stream a direct readout of instruction timing.

use retroscope_core::core::{
    ConfigError, CpuBus, MAX_CLOCK_MULTIPLIER, Machine, MachineConfig, TactClock,
};
use retroscope_core::cpu::m6510::{M6510, PORT_DATA, PORT_DDR};
use retroscope_core::cpu::{Cpu, CpuEvent, CpuStateTrait, M6510State};

use crate::program::ProgramImage;
use crate::registry::MachineEntry;

/// Port bit wired to the beeper.
pub const BEEPER_BIT: u8 = 0x08;

/// Level read back on port pins configured as inputs.
const PORT_INPUT_PULLUPS: u8 = 0xFF;

/// Samples the beeper level at a fixed rate against the CPU clock.
#[derive(Clone, Debug)]
pub struct BeeperSampler {
    sample_rate: u32,
    level: bool,
    next_sample: u64,
    samples: Vec<bool>,
}

impl BeeperSampler {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            level: false,
            next_sample: 0,
            samples: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.level = false;
        self.next_sample = 0;
        self.samples.clear();
    }

    pub fn level(&self) -> bool {
        self.level
    }

    /// Samples taken since the current frame started.
    pub fn samples(&self) -> &[bool] {
        &self.samples
    }

    /// Drop the previous frame's samples. The sample clock keeps running.
    fn start_frame(&mut self) {
        self.samples.clear();
    }

    /// Take every sample due by the current tact. Sample `n` is due once
    /// `tacts / clock_hz >= n / sample_rate`.
    fn on_tact(&mut self, clock: &TactClock) {
        let hz = u64::from(clock.base_clock_frequency()) * u64::from(clock.clock_multiplier());
        let rate = u64::from(self.sample_rate);
        while clock.tacts() * rate >= self.next_sample * hz {
            self.samples.push(self.level);
            self.next_sample += 1;
        }
    }
}

/// Memory map and port of [`Simple6510System`].
pub struct Simple6510Bus {
    ram: Vec<u8>,
    ddr: u8,
    data: u8,
    beeper: BeeperSampler,
}

impl Simple6510Bus {
    fn new(sample_rate: u32) -> Self {
        Self {
            ram: vec![0; 0x10000],
            ddr: 0,
            data: 0,
            beeper: BeeperSampler::new(sample_rate),
        }
    }

    fn reset(&mut self) {
        self.ddr = 0;
        self.data = 0;
        self.beeper.reset();
    }

    fn port_value(&self) -> u8 {
        (self.data & self.ddr) | (PORT_INPUT_PULLUPS & !self.ddr)
    }

    fn update_beeper(&mut self) {
        self.beeper.level = self.data & self.ddr & BEEPER_BIT != 0;
    }
}

impl CpuBus for Simple6510Bus {
    fn read_memory(&mut self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    fn write_memory(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }

    fn read_port(&mut self, address: u16) -> u8 {
        match address {
            PORT_DDR => self.ddr,
            PORT_DATA => self.port_value(),
            _ => self.ram[address as usize],
        }
    }

    fn write_port(&mut self, address: u16, value: u8) {
        match address {
            PORT_DDR => self.ddr = value,
            PORT_DATA => self.data = value,
            _ => self.ram[address as usize] = value,
        }
        self.update_beeper();
    }

    fn on_tact_incremented(&mut self, clock: &TactClock) {
        self.beeper.on_tact(clock);
    }
}

pub struct Simple6510System {
    pub cpu: M6510,
    bus: Simple6510Bus,
    target_clock_multiplier: u32,
    events: Vec<CpuEvent>,
}

impl Simple6510System {
    pub fn new(config: &MachineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            cpu: M6510::with_clock(config.cpu.clone(), config.clock()),
            bus: Simple6510Bus::new(config.sample_rate),
            target_clock_multiplier: config.clock_multiplier,
            events: Vec::new(),
        })
    }

    /// Copy `image` into RAM and point the reset vector at `start`, or at
    /// the load address when `start` is `None`.
    pub fn load_program(&mut self, image: &ProgramImage, start: Option<u16>) {
        image.load_into(self, start);
    }

    pub fn get_cpu_state(&self) -> M6510State {
        self.cpu.snapshot()
    }

    pub fn beeper(&self) -> &BeeperSampler {
        &self.bus.beeper
    }

    /// Beeper samples of the current frame as a string of '0'/'1'.
    pub fn beeper_bits(&self) -> String {
        self.bus
            .beeper
            .samples()
            .iter()
            .map(|&level| if level { '1' } else { '0' })
            .collect()
    }

    pub fn port_ddr(&self) -> u8 {
        self.bus.ddr
    }

    pub fn port_data(&self) -> u8 {
        self.bus.data
    }

    /// CPU events delivered since the last reset.
    pub fn events(&self) -> &[CpuEvent] {
        &self.events
    }
}

impl Machine for Simple6510System {
    fn name(&self) -> &str {
        "simple6510"
    }

    fn cpu(&self) -> &dyn Cpu {
        &self.cpu
    }

    fn cpu_mut(&mut self) -> &mut dyn Cpu {
        &mut self.cpu
    }

    fn execute_cpu_cycle(&mut self) {
        self.cpu.execute_cpu_cycle(&mut self.bus);
    }

    fn on_snooze(&mut self) {
        self.cpu.on_snooze(&mut self.bus);
    }

    fn reset(&mut self) {
        self.bus.reset();
        self.events.clear();
        self.cpu.reset(&mut self.bus);
    }

    fn hard_reset(&mut self) {
        self.bus.reset();
        self.events.clear();
        self.cpu.hard_reset(&mut self.bus);
    }

    fn peek_memory(&self, address: u16) -> u8 {
        match address {
            PORT_DDR if self.cpu.config().processor_port => self.bus.ddr,
            PORT_DATA if self.cpu.config().processor_port => self.bus.port_value(),
            _ => self.bus.ram[address as usize],
        }
    }

    fn poke_memory(&mut self, address: u16, value: u8) {
        self.bus.ram[address as usize] = value;
    }

    fn target_clock_multiplier(&self) -> u32 {
        self.target_clock_multiplier
    }

    fn set_target_clock_multiplier(&mut self, multiplier: u32) {
        self.target_clock_multiplier = multiplier.clamp(1, MAX_CLOCK_MULTIPLIER);
    }

    fn on_init_new_frame(&mut self, _clock_multiplier_changed: bool) {
        self.bus.beeper.start_frame();
    }

    fn on_cpu_event(&mut self, event: CpuEvent) {
        self.events.push(event);
    }
}

fn create_machine(config: &MachineConfig) -> Result<Box<dyn Machine>, ConfigError> {
    Ok(Box::new(Simple6510System::new(config)?))
}

inventory::submit! {
    MachineEntry::new(
        "simple6510",
        "6510 with 64K RAM and a beeper on processor port bit 3",
        create_machine,
    )
}
