use super::{IRQ_VECTOR, M6510, STACK_PAGE, StatusFlag};
use crate::core::bus::CpuBus;

impl M6510 {
    // ---- Stack helpers ----

    pub(crate) fn push(&mut self, bus: &mut dyn CpuBus, value: u8) {
        self.write(bus, STACK_PAGE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pull(&mut self, bus: &mut dyn CpuBus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.read(bus, STACK_PAGE | self.sp as u16)
    }

    /// Dummy read of the current stack slot before a pull.
    fn stack_idle(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, STACK_PAGE | self.sp as u16);
    }

    // ---- Push/pull ----

    /// PHA (0x48) - 3 cycles
    pub(crate) fn pha(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.push(bus, self.a);
    }

    /// PHP (0x08) - 3 cycles. Pushes P with B and U set.
    pub(crate) fn php(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        let pushed = self.p() | StatusFlag::B as u8 | StatusFlag::U as u8;
        self.push(bus, pushed);
    }

    /// PLA (0x68) - 4 cycles
    pub(crate) fn pla(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.stack_idle(bus);
        self.a = self.pull(bus);
        self.set_nz(self.a);
    }

    /// PLP (0x28) - 4 cycles. B is always clear, U is always set.
    pub(crate) fn plp(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.stack_idle(bus);
        let pulled = self.pull(bus);
        self.set_p(pulled & !(StatusFlag::B as u8));
    }

    // ---- Subroutines and interrupts ----

    /// JSR (0x20) - 6 cycles. Pushes the address of its last byte.
    pub(crate) fn jsr(&mut self, bus: &mut dyn CpuBus) {
        let lo = self.fetch(bus);
        self.stack_idle(bus);
        self.push(bus, (self.pc >> 8) as u8);
        self.push(bus, self.pc as u8);
        let hi = self.read(bus, self.pc);
        self.step_out.push(self.pc.wrapping_add(1));
        self.pc = u16::from_le_bytes([lo, hi]);
    }

    /// RTS (0x60) - 6 cycles
    pub(crate) fn rts(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.stack_idle(bus);
        let lo = self.pull(bus);
        let hi = self.pull(bus);
        self.pc = u16::from_le_bytes([lo, hi]);
        self.idle(bus, self.pc);
        self.pc = self.pc.wrapping_add(1);
        self.step_out.ret_executed = true;
    }

    /// RTI (0x40) - 6 cycles
    pub(crate) fn rti(&mut self, bus: &mut dyn CpuBus) {
        self.idle(bus, self.pc);
        self.stack_idle(bus);
        let pulled = self.pull(bus);
        self.set_p(pulled & !(StatusFlag::B as u8));
        let lo = self.pull(bus);
        let hi = self.pull(bus);
        self.pc = u16::from_le_bytes([lo, hi]);
        self.step_out.ret_executed = true;
    }

    /// BRK (0x00) - 7 cycles. Skips a padding byte, pushes P with B set.
    pub(crate) fn brk(&mut self, bus: &mut dyn CpuBus) {
        self.fetch(bus);
        self.push(bus, (self.pc >> 8) as u8);
        self.push(bus, self.pc as u8);
        let pushed = self.p() | StatusFlag::B as u8 | StatusFlag::U as u8;
        self.push(bus, pushed);
        self.set_flag(StatusFlag::I, true);
        self.step_out.push(self.pc);
        let lo = self.read(bus, IRQ_VECTOR);
        let hi = self.read(bus, IRQ_VECTOR.wrapping_add(1));
        self.pc = u16::from_le_bytes([lo, hi]);
    }

    // ---- Jumps ----

    /// JMP abs (0x4C) - 3 cycles
    pub(crate) fn jmp_abs(&mut self, bus: &mut dyn CpuBus) {
        self.pc = self.fetch_word(bus);
    }

    /// JMP (ind) (0x6C) - 5 cycles. The pointer's high byte does not carry
    /// into the next page.
    pub(crate) fn jmp_ind(&mut self, bus: &mut dyn CpuBus) {
        let ptr = self.fetch_word(bus);
        let lo = self.read(bus, ptr);
        let hi = self.read(bus, (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF));
        self.pc = u16::from_le_bytes([lo, hi]);
    }
}
