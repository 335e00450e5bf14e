use crate::cpu::{Cpu, CpuEvent};

/// Machine-agnostic interface the frame driver and controller run against.
///
/// Each machine owns its CPU and its bus (memory map, ports, peripherals)
/// and splits the borrow between them in [`Machine::execute_cpu_cycle`].
/// The driver never touches the bus directly; everything it needs about
/// memory goes through side-effect free peeks.
pub trait Machine: Send {
    /// Short identifier, e.g. "simple6510".
    fn name(&self) -> &str;

    fn cpu(&self) -> &dyn Cpu;
    fn cpu_mut(&mut self) -> &mut dyn Cpu;

    /// Run one CPU step against the machine's bus.
    fn execute_cpu_cycle(&mut self);

    /// Let a snoozed CPU burn time against the machine's bus.
    fn on_snooze(&mut self);

    /// Soft reset of CPU and peripherals.
    fn reset(&mut self);

    /// Power-on reset. Defaults to a soft reset.
    fn hard_reset(&mut self) {
        self.reset();
    }

    /// Read memory without side effects or tacts (debugger view).
    fn peek_memory(&self, address: u16) -> u8;

    /// Write memory without side effects or tacts (program loading).
    fn poke_memory(&mut self, address: u16, value: u8);

    /// Copy `data` into memory starting at `address`, wrapping at $FFFF.
    fn load_memory(&mut self, address: u16, data: &[u8]) {
        for (offset, &byte) in data.iter().enumerate() {
            self.poke_memory(address.wrapping_add(offset as u16), byte);
        }
    }

    /// Bank/partition currently mapped at `address`, for machines that have
    /// banked memory.
    fn get_partition(&self, _address: u16) -> Option<u16> {
        None
    }

    /// Clock multiplier to switch to at the next frame boundary.
    fn target_clock_multiplier(&self) -> u32 {
        self.cpu().clock().clock_multiplier()
    }

    fn set_target_clock_multiplier(&mut self, _multiplier: u32) {}

    fn allow_cpu_clock_change(&self) -> bool {
        true
    }

    /// Called at the start of every frame.
    fn on_init_new_frame(&mut self, _clock_multiplier_changed: bool) {}

    fn before_instruction_executed(&mut self) {}

    fn after_instruction_executed(&mut self) {}

    /// Consume diagnostic events raised by the CPU during the last step.
    fn on_cpu_event(&mut self, _event: CpuEvent) {}

    /// Length of the call instruction at PC, 0 if it is not a call.
    fn call_instruction_length(&self) -> u16 {
        let cpu = self.cpu();
        cpu.call_instruction_length(self.peek_memory(cpu.pc()))
    }

    /// Called when the controller stops the machine.
    fn on_stop(&mut self) {}
}
