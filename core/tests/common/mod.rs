#![allow(dead_code)]

use retroscope_core::core::{CpuBus, Machine, TactClock};
use retroscope_core::cpu::{Cpu, CpuEvent, M6510};
use retroscope_core::cpu::m6510::M6510Config;

/// Minimal bus for testing: flat 64KB read/write memory, the two 6510 port
/// registers, and a stall line that holds for a fixed number of tacts.
pub struct TestBus {
    pub memory: [u8; 0x10000],
    pub port: [u8; 2],
    /// Extra tacts charged by every memory read.
    pub read_delay: u32,
    /// Tacts the bus stays stalled; counts down on every tact.
    pub stall_tacts: u32,
    /// Stall until released by the CPU timeout.
    pub stall_forever: bool,
    pub forced_releases: u32,
    pub tact_callbacks: u64,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            port: [0; 2],
            read_delay: 0,
            stall_tacts: 0,
            stall_forever: false,
            forced_releases: 0,
            tact_callbacks: 0,
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn set_reset_vector(&mut self, addr: u16) {
        self.memory[0xFFFC] = addr as u8;
        self.memory[0xFFFD] = (addr >> 8) as u8;
    }

    pub fn set_irq_vector(&mut self, addr: u16) {
        self.memory[0xFFFE] = addr as u8;
        self.memory[0xFFFF] = (addr >> 8) as u8;
    }

    pub fn set_nmi_vector(&mut self, addr: u16) {
        self.memory[0xFFFA] = addr as u8;
        self.memory[0xFFFB] = (addr >> 8) as u8;
    }
}

impl CpuBus for TestBus {
    fn read_memory(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn write_memory(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
    }

    fn read_port(&mut self, address: u16) -> u8 {
        self.port[(address & 1) as usize]
    }

    fn write_port(&mut self, address: u16, value: u8) {
        self.port[(address & 1) as usize] = value;
    }

    fn delay_memory_read(&mut self, _address: u16, _clock: &TactClock) -> u32 {
        self.read_delay
    }

    fn on_tact_incremented(&mut self, _clock: &TactClock) {
        self.tact_callbacks += 1;
        if self.stall_tacts > 0 {
            self.stall_tacts -= 1;
        }
    }

    fn is_cpu_stalled(&self) -> bool {
        self.stall_forever || self.stall_tacts > 0
    }

    fn force_cpu_release(&mut self) {
        self.stall_forever = false;
        self.stall_tacts = 0;
        self.forced_releases += 1;
    }
}

/// CPU with the program loaded at `origin` and the reset vector pointing at
/// it, already reset.
pub fn cpu_with_program(origin: u16, program: &[u8]) -> (M6510, TestBus) {
    let mut bus = TestBus::new();
    bus.load(origin, program);
    bus.set_reset_vector(origin);
    let mut cpu = M6510::new(M6510Config::default());
    cpu.reset(&mut bus);
    (cpu, bus)
}

/// Execute one instruction and return the tacts it took.
pub fn step(cpu: &mut M6510, bus: &mut TestBus) -> u64 {
    let before = cpu.tacts();
    cpu.execute_cpu_cycle(bus);
    cpu.tacts() - before
}

/// Machine wrapper around [`TestBus`] for frame runner and controller tests.
pub struct TestMachine {
    pub cpu: M6510,
    pub bus: TestBus,
    pub events: Vec<CpuEvent>,
    pub frames_started: u32,
    pub multiplier_changes: u32,
    pub target_multiplier: u32,
    pub stopped: bool,
}

impl TestMachine {
    /// Program at `origin`, reset vector pointing at it, short frames.
    pub fn new(origin: u16, program: &[u8], tacts_in_frame: u32) -> Self {
        let mut bus = TestBus::new();
        bus.load(origin, program);
        bus.set_reset_vector(origin);
        let clock = TactClock::new(tacts_in_frame, 1_000_000);
        let mut cpu = M6510::with_clock(M6510Config::default(), clock);
        cpu.reset(&mut bus);
        Self {
            cpu,
            bus,
            events: Vec::new(),
            frames_started: 0,
            multiplier_changes: 0,
            target_multiplier: 1,
            stopped: false,
        }
    }
}

impl Machine for TestMachine {
    fn name(&self) -> &str {
        "test"
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
        self.cpu.reset(&mut self.bus);
    }

    fn hard_reset(&mut self) {
        self.cpu.hard_reset(&mut self.bus);
    }

    fn peek_memory(&self, address: u16) -> u8 {
        self.bus.memory[address as usize]
    }

    fn poke_memory(&mut self, address: u16, value: u8) {
        self.bus.memory[address as usize] = value;
    }

    fn target_clock_multiplier(&self) -> u32 {
        self.target_multiplier
    }

    fn set_target_clock_multiplier(&mut self, multiplier: u32) {
        self.target_multiplier = multiplier;
    }

    fn on_init_new_frame(&mut self, clock_multiplier_changed: bool) {
        self.frames_started += 1;
        if clock_multiplier_changed {
            self.multiplier_changes += 1;
        }
    }

    fn on_cpu_event(&mut self, event: CpuEvent) {
        self.events.push(event);
    }

    fn on_stop(&mut self) {
        self.stopped = true;
    }
}
