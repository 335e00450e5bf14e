mod addressing;
mod alu;
mod branch;
mod load_store;
mod shift;
mod stack;
mod table;
mod undocumented;

pub(crate) use addressing::{Access, Mode};
pub use table::{OPERATIONS, Operation, mnemonic};

use log::{debug, warn};

use crate::core::bus::{CpuBus, InterruptState};
use crate::core::clock::TactClock;
use crate::cpu::{
    BusTelemetry, Cpu, CpuEvent,
    state::{CpuStateTrait, M6510State},
    telemetry::DEFAULT_TELEMETRY_DEPTH,
};
use crate::debug::StepOutStack;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Stack page base.
pub const STACK_PAGE: u16 = 0x0100;

/// On-chip port registers: data direction at $0000, data at $0001.
pub const PORT_DDR: u16 = 0x0000;
pub const PORT_DATA: u16 = 0x0001;

/// Tacts a snoozed CPU burns per `on_snooze` call (one NOP).
const SNOOZE_TACTS: u32 = 2;

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum StatusFlag {
    C = 0x01, // Carry
    Z = 0x02, // Zero
    I = 0x04, // Interrupt Disable
    D = 0x08, // Decimal
    B = 0x10, // Break
    U = 0x20, // Unused (always 1)
    V = 0x40, // Overflow
    N = 0x80, // Negative
}

/// Tunables of a 6510 instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct M6510Config {
    /// Tacts to wait for a stalled bus before taking it back.
    pub stall_timeout_tacts: u32,
    /// Route $0000/$0001 to the port accessors instead of memory. Off gives a
    /// plain NMOS 6502.
    pub processor_port: bool,
    /// Accesses of each kind kept in the per-instruction telemetry.
    pub telemetry_depth: usize,
}

impl Default for M6510Config {
    fn default() -> Self {
        Self {
            stall_timeout_tacts: 1000,
            processor_port: true,
            telemetry_depth: DEFAULT_TELEMETRY_DEPTH,
        }
    }
}

impl M6510Config {
    /// NMOS 6502 behaviour: no on-chip port.
    pub fn plain_6502() -> Self {
        Self {
            processor_port: false,
            ..Self::default()
        }
    }
}

/// MOS 6510: NMOS 6502 core with the on-chip I/O port.
///
/// Each call to [`Cpu::execute_cpu_cycle`] runs a pending interrupt sequence
/// or one whole instruction. Handlers charge tacts through the bus-cycle
/// primitives below, so contention and dummy cycles fall out of the access
/// pattern rather than a cycle table.
pub struct M6510 {
    // Registers
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    p: u8,

    // Internal state
    pub(crate) opcode: u8,
    clock: TactClock,
    config: M6510Config,
    nmi_requested: bool,
    irq_requested: bool,
    jammed: bool,
    stalled: bool,
    snoozed: bool,
    telemetry: BusTelemetry,
    pub(crate) step_out: StepOutStack,
    events: Vec<CpuEvent>,

    tacts_at_last_start: u64,
}

impl M6510 {
    pub fn new(config: M6510Config) -> Self {
        Self::with_clock(config, TactClock::default())
    }

    pub fn with_clock(config: M6510Config, clock: TactClock) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            p: 0x34,
            opcode: 0,
            clock,
            telemetry: BusTelemetry::new(config.telemetry_depth),
            config,
            nmi_requested: false,
            irq_requested: false,
            jammed: false,
            stalled: false,
            snoozed: false,
            step_out: StepOutStack::default(),
            events: Vec::new(),
            tacts_at_last_start: 0,
        }
    }

    pub fn config(&self) -> &M6510Config {
        &self.config
    }

    // ---- Status register ----

    /// Status register. U always reads as set.
    #[inline]
    pub fn p(&self) -> u8 {
        self.p
    }

    #[inline]
    pub fn set_p(&mut self, value: u8) {
        self.p = value | StatusFlag::U as u8;
    }

    #[inline]
    pub(crate) fn set_flag(&mut self, flag: StatusFlag, set: bool) {
        if set {
            self.p |= flag as u8;
        } else {
            self.p &= !(flag as u8);
        }
    }

    #[inline]
    pub fn flag(&self, flag: StatusFlag) -> bool {
        self.p & flag as u8 != 0
    }

    pub fn is_carry_set(&self) -> bool {
        self.flag(StatusFlag::C)
    }

    pub fn is_zero_set(&self) -> bool {
        self.flag(StatusFlag::Z)
    }

    pub fn is_interrupt_disabled(&self) -> bool {
        self.flag(StatusFlag::I)
    }

    pub fn is_decimal_set(&self) -> bool {
        self.flag(StatusFlag::D)
    }

    pub fn is_break_set(&self) -> bool {
        self.flag(StatusFlag::B)
    }

    pub fn is_overflow_set(&self) -> bool {
        self.flag(StatusFlag::V)
    }

    pub fn is_negative_set(&self) -> bool {
        self.flag(StatusFlag::N)
    }

    // ---- Interrupt lines, stall and snooze ----

    pub fn request_nmi(&mut self) {
        self.nmi_requested = true;
    }

    pub fn request_irq(&mut self) {
        self.irq_requested = true;
    }

    pub fn clear_irq(&mut self) {
        self.irq_requested = false;
    }

    pub fn is_nmi_requested(&self) -> bool {
        self.nmi_requested
    }

    pub fn is_irq_requested(&self) -> bool {
        self.irq_requested
    }

    pub fn is_jammed(&self) -> bool {
        self.jammed
    }

    /// Suspend bus access until [`M6510::release_cpu`].
    pub fn stall_cpu(&mut self) {
        self.stalled = true;
    }

    pub fn release_cpu(&mut self) {
        self.stalled = false;
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub fn snooze(&mut self) {
        self.snoozed = true;
    }

    pub fn awake(&mut self) {
        self.snoozed = false;
    }

    // ---- Bus cycle primitives ----

    /// Charge `n` tacts, notifying the bus after each one.
    fn tick(&mut self, bus: &mut dyn CpuBus, n: u32) {
        for _ in 0..n {
            self.clock.increment_tacts(1);
            bus.on_tact_incremented(&self.clock);
        }
    }

    /// Spin while the bus is taken, giving up after the configured timeout.
    fn wait_for_cpu_release(&mut self, bus: &mut dyn CpuBus) {
        let mut waited = 0u32;
        while self.stalled || bus.is_cpu_stalled() {
            if waited >= self.config.stall_timeout_tacts {
                warn!(
                    "CPU stalled for {waited} tacts at tact {}, forcing release",
                    self.clock.tacts()
                );
                self.stalled = false;
                bus.force_cpu_release();
                self.events.push(CpuEvent::StallTimeout {
                    waited_tacts: waited,
                    at_tact: self.clock.tacts(),
                });
                return;
            }
            self.tick(bus, 1);
            waited += 1;
        }
    }

    #[inline]
    fn is_port_address(&self, address: u16) -> bool {
        self.config.processor_port && address <= PORT_DATA
    }

    /// One read cycle.
    pub(crate) fn read(&mut self, bus: &mut dyn CpuBus, address: u16) -> u8 {
        self.wait_for_cpu_release(bus);
        if self.is_port_address(address) {
            let delay = bus.delay_port_read(address, &self.clock);
            self.tick(bus, delay + 1);
            let value = bus.read_port(address);
            self.telemetry.record_port_read(address, value);
            value
        } else {
            let delay = bus.delay_memory_read(address, &self.clock);
            self.tick(bus, delay + 1);
            let value = bus.read_memory(address);
            self.telemetry.record_memory_read(address, value);
            value
        }
    }

    /// One write cycle.
    pub(crate) fn write(&mut self, bus: &mut dyn CpuBus, address: u16, value: u8) {
        self.wait_for_cpu_release(bus);
        if self.is_port_address(address) {
            let delay = bus.delay_port_write(address, &self.clock);
            self.tick(bus, delay + 1);
            bus.write_port(address, value);
            self.telemetry.record_port_write(address, value);
        } else {
            let delay = bus.delay_memory_write(address, &self.clock);
            self.tick(bus, delay + 1);
            bus.write_memory(address, value);
            self.telemetry.record_memory_write(address, value);
        }
    }

    /// A cycle whose data the CPU throws away (dummy read).
    pub(crate) fn idle(&mut self, bus: &mut dyn CpuBus, address: u16) {
        self.wait_for_cpu_release(bus);
        let delay = bus.delay_address_bus_access(address, &self.clock);
        self.tick(bus, delay + 1);
    }

    /// Read the byte at PC and advance PC.
    #[inline]
    pub(crate) fn fetch(&mut self, bus: &mut dyn CpuBus) -> u8 {
        let value = self.read(bus, self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    // ---- Interrupt sequence ----

    /// NMI/IRQ entry: 7 tacts. Pushes PC and P (B clear, U set), sets I.
    fn service_interrupt(&mut self, bus: &mut dyn CpuBus, vector: u16) {
        self.idle(bus, self.pc);
        self.idle(bus, self.pc);
        self.push(bus, (self.pc >> 8) as u8);
        self.push(bus, self.pc as u8);
        let pushed = (self.p & !(StatusFlag::B as u8)) | StatusFlag::U as u8;
        self.push(bus, pushed);
        self.set_flag(StatusFlag::I, true);
        self.step_out.push(self.pc);
        let lo = self.read(bus, vector);
        let hi = self.read(bus, vector.wrapping_add(1));
        self.pc = u16::from_le_bytes([lo, hi]);
    }

    // ---- Jam ----

    /// JAM (0x02, 0x12, ... 0xF2) - locks the CPU until reset.
    pub(crate) fn op_jam(&mut self, _bus: &mut dyn CpuBus) {
        let address = self.pc.wrapping_sub(1);
        debug!("JAM opcode ${:02X} at ${address:04X}", self.opcode);
        self.jammed = true;
        self.events.push(CpuEvent::Jammed {
            opcode: self.opcode,
            address,
        });
    }

    fn reset_registers(&mut self, bus: &mut dyn CpuBus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.p = 0x34;
        self.opcode = 0;
        let lo = bus.read_memory(RESET_VECTOR);
        let hi = bus.read_memory(RESET_VECTOR.wrapping_add(1));
        self.pc = u16::from_le_bytes([lo, hi]);
        self.jammed = false;
        self.stalled = false;
        self.snoozed = false;
        self.telemetry.clear();
        self.clock.reset();
        self.tacts_at_last_start = 0;
    }
}

impl Default for M6510 {
    fn default() -> Self {
        Self::new(M6510Config::default())
    }
}

impl Cpu for M6510 {
    fn execute_cpu_cycle(&mut self, bus: &mut dyn CpuBus) {
        self.telemetry.clear();
        if self.jammed {
            return;
        }
        if self.nmi_requested {
            self.nmi_requested = false;
            self.service_interrupt(bus, NMI_VECTOR);
            return;
        }
        if self.irq_requested && !self.is_interrupt_disabled() {
            self.irq_requested = false;
            self.service_interrupt(bus, IRQ_VECTOR);
            return;
        }
        self.opcode = self.fetch(bus);
        OPERATIONS[self.opcode as usize](self, bus);
    }

    fn reset(&mut self, bus: &mut dyn CpuBus) {
        self.nmi_requested = false;
        self.irq_requested = false;
        self.reset_registers(bus);
    }

    fn hard_reset(&mut self, bus: &mut dyn CpuBus) {
        self.reset(bus);
        self.step_out.clear();
        self.events.clear();
    }

    fn signal_interrupt(&mut self, int: InterruptState) {
        if int.nmi {
            self.nmi_requested = true;
        }
        if int.irq {
            self.irq_requested = true;
        }
    }

    fn is_sleeping(&self) -> bool {
        self.snoozed
    }

    fn on_snooze(&mut self, bus: &mut dyn CpuBus) {
        for _ in 0..SNOOZE_TACTS {
            self.idle(bus, self.pc);
        }
    }

    fn is_halted(&self) -> bool {
        self.jammed
    }

    fn pc(&self) -> u16 {
        self.pc
    }

    fn opcode(&self) -> u8 {
        self.opcode
    }

    fn clock(&self) -> &TactClock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut TactClock {
        &mut self.clock
    }

    fn telemetry(&self) -> &BusTelemetry {
        &self.telemetry
    }

    fn step_out_stack(&self) -> &StepOutStack {
        &self.step_out
    }

    fn step_out_stack_mut(&mut self) -> &mut StepOutStack {
        &mut self.step_out
    }

    fn call_instruction_length(&self, opcode: u8) -> u16 {
        match opcode {
            0x20 => 3, // JSR abs
            0x00 => 2, // BRK + padding byte
            _ => 0,
        }
    }

    fn take_events(&mut self) -> Vec<CpuEvent> {
        std::mem::take(&mut self.events)
    }

    fn tacts_at_last_start(&self) -> u64 {
        self.tacts_at_last_start
    }

    fn set_tacts_at_last_start(&mut self, tacts: u64) {
        self.tacts_at_last_start = tacts;
    }
}

impl CpuStateTrait for M6510 {
    type Snapshot = M6510State;

    fn snapshot(&self) -> M6510State {
        M6510State {
            a: self.a,
            x: self.x,
            y: self.y,
            pc: self.pc,
            sp: self.sp,
            p: self.p,
            opcode: self.opcode,
            tacts: self.clock.tacts(),
            frames: self.clock.frames(),
            jammed: self.jammed,
        }
    }
}
