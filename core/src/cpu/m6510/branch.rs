use super::addressing::page_crossed;
use super::{M6510, StatusFlag};
use crate::core::bus::CpuBus;

impl M6510 {
    // ---- Branch helper ----

    /// Generic conditional branch. Timing:
    /// - Not taken: 2 cycles
    /// - Taken, same page: 3 cycles
    /// - Taken, page cross: 4 cycles
    ///
    /// The page test compares the PC after the operand with the target, so
    /// it holds under any banking scheme.
    fn branch(&mut self, bus: &mut dyn CpuBus, condition: bool) {
        let offset = self.fetch(bus) as i8;
        if !condition {
            return;
        }
        self.idle(bus, self.pc);
        let target = self.pc.wrapping_add(offset as u16);
        if page_crossed(self.pc, target) {
            self.idle(bus, (self.pc & 0xFF00) | (target & 0x00FF));
        }
        self.pc = target;
    }

    // ---- Branch instructions ----

    /// BPL (0x10) - Branch if Plus (N=0)
    pub(crate) fn bpl(&mut self, bus: &mut dyn CpuBus) {
        let condition = !self.flag(StatusFlag::N);
        self.branch(bus, condition);
    }

    /// BMI (0x30) - Branch if Minus (N=1)
    pub(crate) fn bmi(&mut self, bus: &mut dyn CpuBus) {
        let condition = self.flag(StatusFlag::N);
        self.branch(bus, condition);
    }

    /// BVC (0x50) - Branch if Overflow Clear (V=0)
    pub(crate) fn bvc(&mut self, bus: &mut dyn CpuBus) {
        let condition = !self.flag(StatusFlag::V);
        self.branch(bus, condition);
    }

    /// BVS (0x70) - Branch if Overflow Set (V=1)
    pub(crate) fn bvs(&mut self, bus: &mut dyn CpuBus) {
        let condition = self.flag(StatusFlag::V);
        self.branch(bus, condition);
    }

    /// BCC (0x90) - Branch if Carry Clear (C=0)
    pub(crate) fn bcc(&mut self, bus: &mut dyn CpuBus) {
        let condition = !self.flag(StatusFlag::C);
        self.branch(bus, condition);
    }

    /// BCS (0xB0) - Branch if Carry Set (C=1)
    pub(crate) fn bcs(&mut self, bus: &mut dyn CpuBus) {
        let condition = self.flag(StatusFlag::C);
        self.branch(bus, condition);
    }

    /// BNE (0xD0) - Branch if Not Equal (Z=0)
    pub(crate) fn bne(&mut self, bus: &mut dyn CpuBus) {
        let condition = !self.flag(StatusFlag::Z);
        self.branch(bus, condition);
    }

    /// BEQ (0xF0) - Branch if Equal (Z=1)
    pub(crate) fn beq(&mut self, bus: &mut dyn CpuBus) {
        let condition = self.flag(StatusFlag::Z);
        self.branch(bus, condition);
    }
}
