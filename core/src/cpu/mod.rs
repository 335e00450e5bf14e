use crate::core::bus::{CpuBus, InterruptState};
use crate::core::clock::TactClock;
use crate::debug::StepOutStack;

/// Generic CPU interface
///
/// Object safe so a machine can hand its CPU to the frame driver as
/// `&dyn Cpu`. Register snapshots live on [`CpuStateTrait`].
pub trait Cpu {
    /// Run one unit of work: service a pending interrupt or execute one
    /// complete instruction, charging every tact through `bus`.
    fn execute_cpu_cycle(&mut self, bus: &mut dyn CpuBus);

    /// Soft reset: registers, flags and tact counters. Frame length and base
    /// clock frequency are kept.
    fn reset(&mut self, bus: &mut dyn CpuBus);

    /// Power-on reset: a soft reset that also drops pending interrupts and
    /// debugger bookkeeping.
    fn hard_reset(&mut self, bus: &mut dyn CpuBus);

    /// Raise interrupt lines. Requests latch until serviced.
    fn signal_interrupt(&mut self, int: InterruptState);

    /// Query if the CPU is snoozed (low-power wait)
    fn is_sleeping(&self) -> bool;

    /// Advance time while snoozed without fetching instructions.
    fn on_snooze(&mut self, bus: &mut dyn CpuBus);

    /// True once the CPU can make no progress until reset (6510 JAM).
    fn is_halted(&self) -> bool;

    /// True between the cycles of a partially executed instruction. Cores that
    /// execute whole instructions per call always return false.
    fn instruction_in_progress(&self) -> bool {
        false
    }

    fn pc(&self) -> u16;

    /// Last fetched opcode byte.
    fn opcode(&self) -> u8;

    fn clock(&self) -> &TactClock;
    fn clock_mut(&mut self) -> &mut TactClock;

    /// Bus accesses made by the last instruction.
    fn telemetry(&self) -> &BusTelemetry;

    fn step_out_stack(&self) -> &StepOutStack;
    fn step_out_stack_mut(&mut self) -> &mut StepOutStack;

    /// Length of the call-like instruction starting with `opcode`, or 0 when
    /// it does not return to the following instruction.
    fn call_instruction_length(&self, opcode: u8) -> u16;

    /// Drain diagnostic events raised since the last call.
    fn take_events(&mut self) -> Vec<CpuEvent>;

    /// Tact count when the controller last started a run.
    fn tacts_at_last_start(&self) -> u64;
    fn set_tacts_at_last_start(&mut self, tacts: u64);

    /// Snapshot the innermost pending return address as the step-out target.
    fn mark_step_out_address(&mut self) {
        let stack = self.step_out_stack_mut();
        stack.step_out_address = stack.peek();
    }

    #[inline]
    fn tacts(&self) -> u64 {
        self.clock().tacts()
    }
}

/// Out-of-band conditions the core recovers from and reports to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CpuEvent {
    /// The bus stayed stalled past the configured limit and was taken back.
    StallTimeout { waited_tacts: u32, at_tact: u64 },
    /// A JAM opcode locked up the CPU.
    Jammed { opcode: u8, address: u16 },
}

// Re-export state types
pub mod state;
pub use state::{CpuStateTrait, M6510State};

pub mod telemetry;
pub use telemetry::{BusAccess, BusTelemetry};

pub mod m6510;
pub use m6510::M6510;
