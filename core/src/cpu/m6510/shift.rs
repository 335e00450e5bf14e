use super::{Access, M6510, Mode, StatusFlag};
use crate::core::bus::CpuBus;

impl M6510 {
    // ---- Read-modify-write helper ----

    /// Read, write back unchanged (NMOS double write), then write `op`'s
    /// result. Returns the new value.
    pub(crate) fn modify(
        &mut self,
        bus: &mut dyn CpuBus,
        mode: Mode,
        op: fn(&mut Self, u8) -> u8,
    ) -> u8 {
        let address = self.operand_address(bus, mode, Access::Write);
        let value = self.read(bus, address);
        self.write(bus, address, value);
        let result = op(self, value);
        self.write(bus, address, result);
        result
    }

    // ---- Value helpers ----

    pub(crate) fn asl_value(&mut self, value: u8) -> u8 {
        let result = value << 1;
        self.set_flag(StatusFlag::C, value & 0x80 != 0);
        self.set_nz(result);
        result
    }

    pub(crate) fn lsr_value(&mut self, value: u8) -> u8 {
        let result = value >> 1;
        self.set_flag(StatusFlag::C, value & 0x01 != 0);
        self.set_nz(result);
        result
    }

    pub(crate) fn rol_value(&mut self, value: u8) -> u8 {
        let result = (value << 1) | self.carry_in();
        self.set_flag(StatusFlag::C, value & 0x80 != 0);
        self.set_nz(result);
        result
    }

    pub(crate) fn ror_value(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | (self.carry_in() << 7);
        self.set_flag(StatusFlag::C, value & 0x01 != 0);
        self.set_nz(result);
        result
    }

    pub(crate) fn inc_value(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_nz(result);
        result
    }

    pub(crate) fn dec_value(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_nz(result);
        result
    }

    // ---- Accumulator forms (2 cycles) ----

    pub(crate) fn asl_a(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.a = self.asl_value(self.a);
    }

    pub(crate) fn lsr_a(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.a = self.lsr_value(self.a);
    }

    pub(crate) fn rol_a(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.a = self.rol_value(self.a);
    }

    pub(crate) fn ror_a(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.a = self.ror_value(self.a);
    }

    // ---- Memory forms ----

    pub(crate) fn asl(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.modify(bus, mode, Self::asl_value);
    }

    pub(crate) fn lsr(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.modify(bus, mode, Self::lsr_value);
    }

    pub(crate) fn rol(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.modify(bus, mode, Self::rol_value);
    }

    pub(crate) fn ror(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.modify(bus, mode, Self::ror_value);
    }

    pub(crate) fn inc(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.modify(bus, mode, Self::inc_value);
    }

    pub(crate) fn dec(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.modify(bus, mode, Self::dec_value);
    }

    // ---- Register increments (2 cycles) ----

    pub(crate) fn inx(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.x = self.inc_value(self.x);
    }

    pub(crate) fn iny(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.y = self.inc_value(self.y);
    }

    pub(crate) fn dex(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.x = self.dec_value(self.x);
    }

    pub(crate) fn dey(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.y = self.dec_value(self.y);
    }
}
