use super::{Access, M6510, Mode, StatusFlag};
use crate::core::bus::CpuBus;

impl M6510 {
    // ---- Loads ----

    pub(crate) fn lda(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.a = self.operand(bus, mode);
        self.set_nz(self.a);
    }

    pub(crate) fn ldx(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.x = self.operand(bus, mode);
        self.set_nz(self.x);
    }

    pub(crate) fn ldy(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.y = self.operand(bus, mode);
        self.set_nz(self.y);
    }

    // ---- Stores ----

    pub(crate) fn store(&mut self, bus: &mut dyn CpuBus, mode: Mode, value: u8) {
        let address = self.operand_address(bus, mode, Access::Write);
        self.write(bus, address, value);
    }

    pub(crate) fn sta(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.store(bus, mode, self.a);
    }

    pub(crate) fn stx(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.store(bus, mode, self.x);
    }

    pub(crate) fn sty(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.store(bus, mode, self.y);
    }

    // ---- Transfers (2 cycles) ----

    pub(crate) fn tax(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.x = self.a;
        self.set_nz(self.x);
    }

    pub(crate) fn tay(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.y = self.a;
        self.set_nz(self.y);
    }

    pub(crate) fn txa(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.a = self.x;
        self.set_nz(self.a);
    }

    pub(crate) fn tya(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.a = self.y;
        self.set_nz(self.a);
    }

    pub(crate) fn tsx(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.x = self.sp;
        self.set_nz(self.x);
    }

    /// TXS - no flags affected.
    pub(crate) fn txs(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.sp = self.x;
    }

    // ---- Flag instructions (2 cycles) ----

    fn set_status(&mut self, bus: &mut dyn CpuBus, flag: StatusFlag, set: bool) {
        self.idle(bus, self.pc);
        self.set_flag(flag, set);
    }

    pub(crate) fn clc(&mut self, bus: &mut dyn CpuBus) {
        self.set_status(bus, StatusFlag::C, false);
    }

    pub(crate) fn sec(&mut self, bus: &mut dyn CpuBus) {
        self.set_status(bus, StatusFlag::C, true);
    }

    pub(crate) fn cli(&mut self, bus: &mut dyn CpuBus) {
        self.set_status(bus, StatusFlag::I, false);
    }

    pub(crate) fn sei(&mut self, bus: &mut dyn CpuBus) {
        self.set_status(bus, StatusFlag::I, true);
    }

    pub(crate) fn cld(&mut self, bus: &mut dyn CpuBus) {
        self.set_status(bus, StatusFlag::D, false);
    }

    pub(crate) fn sed(&mut self, bus: &mut dyn CpuBus) {
        self.set_status(bus, StatusFlag::D, true);
    }

    pub(crate) fn clv(&mut self, bus: &mut dyn CpuBus) {
        self.set_status(bus, StatusFlag::V, false);
    }

    // ---- NOPs ----

    /// NOP (0xEA and the undocumented implied copies)
    pub(crate) fn nop(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
    }

    /// Undocumented NOPs with an operand: the operand is read and dropped.
    pub(crate) fn nop_read(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.operand(bus, mode);
    }
}
