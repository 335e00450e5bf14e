use super::{M6510, Mode, StatusFlag};
use crate::core::bus::CpuBus;

impl M6510 {
    // ---- Flag helpers ----

    /// Set N, Z flags from result (for loads, transfers, logical ops).
    #[inline]
    pub(crate) fn set_nz(&mut self, result: u8) {
        self.set_flag(StatusFlag::N, result & 0x80 != 0);
        self.set_flag(StatusFlag::Z, result == 0);
    }

    #[inline]
    pub(crate) fn carry_in(&self) -> u8 {
        self.p() & StatusFlag::C as u8
    }

    // ---- ALU operation helpers ----

    /// Perform ADC (Add with Carry). Sets N, Z, C, V. Handles BCD mode.
    /// BCD: N,V from intermediate; Z from binary; C from BCD.
    pub(crate) fn perform_adc(&mut self, operand: u8) {
        let a = self.a;
        let c = self.carry_in();

        if self.is_decimal_set() {
            let mut al = (a & 0x0F) as u16 + (operand & 0x0F) as u16 + c as u16;
            if al >= 0x0A {
                al = ((al + 0x06) & 0x0F) + 0x10;
            }
            let mut sum = (a as u16 & 0xF0) + (operand as u16 & 0xF0) + al;

            // N, V before the high nibble correction
            self.set_flag(StatusFlag::N, sum & 0x80 != 0);
            self.set_flag(
                StatusFlag::V,
                (!(a as u16 ^ operand as u16) & (a as u16 ^ sum)) & 0x80 != 0,
            );

            if sum >= 0xA0 {
                sum += 0x60;
            }
            self.set_flag(StatusFlag::C, sum >= 0x100);

            // Z from binary result (NMOS quirk)
            let binary = a as u16 + operand as u16 + c as u16;
            self.set_flag(StatusFlag::Z, (binary & 0xFF) == 0);

            self.a = sum as u8;
        } else {
            let sum = a as u16 + operand as u16 + c as u16;
            let result = sum as u8;
            self.set_flag(StatusFlag::C, sum > 0xFF);
            self.set_flag(StatusFlag::V, ((!(a ^ operand)) & (a ^ result)) & 0x80 != 0);
            self.a = result;
            self.set_nz(result);
        }
    }

    /// Perform SBC (Subtract with Borrow). Sets N, Z, C, V. Handles BCD mode.
    /// BCD: all flags from the binary result; only A gets the correction.
    pub(crate) fn perform_sbc(&mut self, operand: u8) {
        let a = self.a;
        let c = self.carry_in();

        let diff = a as u16 + (operand ^ 0xFF) as u16 + c as u16;
        let result = diff as u8;

        self.set_flag(StatusFlag::C, diff > 0xFF);
        self.set_flag(StatusFlag::V, ((a ^ operand) & (a ^ result)) & 0x80 != 0);
        self.set_nz(result);

        if self.is_decimal_set() {
            let borrow = 1 - c;
            let mut lo = (a & 0x0F) as i16 - (operand & 0x0F) as i16 - borrow as i16;
            let lo_borrow = lo < 0;
            if lo < 0 {
                lo -= 6;
            }
            let mut hi = (a >> 4) as i16 - (operand >> 4) as i16 - i16::from(lo_borrow);
            if hi < 0 {
                hi -= 6;
            }
            self.a = ((hi as u8 & 0x0F) << 4) | (lo as u8 & 0x0F);
        } else {
            self.a = result;
        }
    }

    /// Perform compare (CMP/CPX/CPY). Sets N, Z, C.
    #[inline]
    pub(crate) fn perform_compare(&mut self, register: u8, operand: u8) {
        let result = register.wrapping_sub(operand);
        self.set_flag(StatusFlag::C, register >= operand);
        self.set_nz(result);
    }

    // ---- Instructions ----

    /// ORA - A = A | M
    pub(crate) fn ora(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        self.a |= operand;
        self.set_nz(self.a);
    }

    /// AND - A = A & M
    pub(crate) fn and(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        self.a &= operand;
        self.set_nz(self.a);
    }

    /// EOR - A = A ^ M
    pub(crate) fn eor(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        self.a ^= operand;
        self.set_nz(self.a);
    }

    pub(crate) fn adc(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        self.perform_adc(operand);
    }

    /// SBC, including the undocumented 0xEB copy.
    pub(crate) fn sbc(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        self.perform_sbc(operand);
    }

    pub(crate) fn cmp(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        self.perform_compare(self.a, operand);
    }

    pub(crate) fn cpx(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        self.perform_compare(self.x, operand);
    }

    pub(crate) fn cpy(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        self.perform_compare(self.y, operand);
    }

    /// BIT - N = M7, V = M6, Z = (A & M) == 0. A is not modified.
    pub(crate) fn bit(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        self.set_flag(StatusFlag::N, operand & 0x80 != 0);
        self.set_flag(StatusFlag::V, operand & 0x40 != 0);
        self.set_flag(StatusFlag::Z, self.a & operand == 0);
    }
}
