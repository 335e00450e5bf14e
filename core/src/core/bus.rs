use super::clock::TactClock;

/// Value returned by an unmapped read.
pub const FLOATING_BUS: u8 = 0xFF;

/// Memory and I/O bus seen by a CPU core.
///
/// Every bus cycle is split into a delay hook and a data transfer. The CPU
/// first charges the extra wait tacts returned by the delay hook, then one
/// base tact, then performs the transfer. Each charged tact is reported
/// through [`CpuBus::on_tact_incremented`].
///
/// Machines implement this trait on whatever owns their memory map. All
/// methods have defaults so a machine only overrides what it models.
pub trait CpuBus {
    fn read_memory(&mut self, _address: u16) -> u8 {
        FLOATING_BUS
    }

    fn write_memory(&mut self, _address: u16, _value: u8) {}

    /// Read from I/O port address space (the 6510 on-chip port, Z80 `IN`).
    fn read_port(&mut self, _address: u16) -> u8 {
        FLOATING_BUS
    }

    /// Write to I/O port address space.
    fn write_port(&mut self, _address: u16, _value: u8) {}

    /// Extra wait tacts before a memory read (contention).
    fn delay_memory_read(&mut self, _address: u16, _clock: &TactClock) -> u32 {
        0
    }

    /// Extra wait tacts before a memory write.
    fn delay_memory_write(&mut self, _address: u16, _clock: &TactClock) -> u32 {
        0
    }

    /// Extra wait tacts before a port read.
    fn delay_port_read(&mut self, _address: u16, _clock: &TactClock) -> u32 {
        0
    }

    /// Extra wait tacts before a port write.
    fn delay_port_write(&mut self, _address: u16, _clock: &TactClock) -> u32 {
        0
    }

    /// Extra wait tacts for a cycle that drives the address bus without
    /// transferring data the CPU uses (6502 dummy reads, Z80 refresh).
    fn delay_address_bus_access(&mut self, _address: u16, _clock: &TactClock) -> u32 {
        0
    }

    /// Called after every single tact, once the frame bookkeeping is done.
    fn on_tact_incremented(&mut self, _clock: &TactClock) {}

    /// Bus arbitration: true while another master owns the bus (VIC badlines,
    /// DMA). Polled before every bus cycle.
    fn is_cpu_stalled(&self) -> bool {
        false
    }

    /// Called when the CPU gives up waiting for the bus and takes it back.
    fn force_cpu_release(&mut self) {}
}

/// Interrupt lines a machine raises on a CPU.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptState {
    pub nmi: bool,
    pub irq: bool,
}
