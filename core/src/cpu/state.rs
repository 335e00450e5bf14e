//! CPU state snapshot types and traits

/// Trait for CPU types that can provide state snapshots
pub trait CpuStateTrait {
    type Snapshot;
    fn snapshot(&self) -> Self::Snapshot;
}

/// M6510 CPU state snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct M6510State {
    pub a: u8,       // Accumulator
    pub x: u8,       // X index register
    pub y: u8,       // Y index register
    pub pc: u16,     // Program counter
    pub sp: u8,      // Stack pointer (page 1 offset)
    pub p: u8,       // Status register (U always set)
    pub opcode: u8,  // Last fetched opcode
    pub tacts: u64,  // Tacts since reset
    pub frames: u64, // Completed frames
    pub jammed: bool,
}
