//! Undocumented NMOS opcodes.
//!
//! The combined read-modify-write ops run their first step (shift, rotate,
//! increment, decrement) on memory, then feed that result to the second
//! step. Visible flags are the second step's, except where the second step
//! leaves a flag alone (SLO/RLA/SRE keep the shift's carry).

use super::addressing::page_crossed;
use super::{Access, M6510, Mode, StatusFlag};
use crate::core::bus::CpuBus;

/// Constant the unstable ANE/LXA opcodes OR into A.
const UNSTABLE_MAGIC: u8 = 0xEE;

impl M6510 {
    // ---- Combined read-modify-write ----

    /// SLO - ASL memory, then ORA
    pub(crate) fn slo(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let shifted = self.modify(bus, mode, Self::asl_value);
        self.a |= shifted;
        self.set_nz(self.a);
    }

    /// RLA - ROL memory, then AND
    pub(crate) fn rla(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let rotated = self.modify(bus, mode, Self::rol_value);
        self.a &= rotated;
        self.set_nz(self.a);
    }

    /// SRE - LSR memory, then EOR
    pub(crate) fn sre(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let shifted = self.modify(bus, mode, Self::lsr_value);
        self.a ^= shifted;
        self.set_nz(self.a);
    }

    /// RRA - ROR memory, then ADC with the carry the rotate produced
    pub(crate) fn rra(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let rotated = self.modify(bus, mode, Self::ror_value);
        self.perform_adc(rotated);
    }

    /// DCP - DEC memory, then CMP
    pub(crate) fn dcp(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let decremented = self.modify(bus, mode, Self::dec_value);
        self.perform_compare(self.a, decremented);
    }

    /// ISC - INC memory, then SBC
    pub(crate) fn isc(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let incremented = self.modify(bus, mode, Self::inc_value);
        self.perform_sbc(incremented);
    }

    // ---- Loads and stores ----

    /// SAX - store A & X, no flags
    pub(crate) fn sax(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.store(bus, mode, self.a & self.x);
    }

    /// LAX - load A and X
    pub(crate) fn lax(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let value = self.operand(bus, mode);
        self.a = value;
        self.x = value;
        self.set_nz(value);
    }

    /// LAS - A, X, SP = M & SP
    pub(crate) fn las(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let value = self.operand(bus, mode) & self.sp;
        self.a = value;
        self.x = value;
        self.sp = value;
        self.set_nz(value);
    }

    /// Shared body of SHA/SHX/SHY/TAS: store `value & (H + 1)` where H is
    /// the base high byte. On a page cross the stored byte also replaces the
    /// high byte of the target address.
    fn store_high_and(&mut self, bus: &mut dyn CpuBus, mode: Mode, value: u8) {
        let index = if mode == Mode::AbsX { self.x } else { self.y };
        let base = self.unindexed_base(bus, mode);
        let mut address = self.index(bus, base, index, Access::Write);
        let stored = value & ((base >> 8) as u8).wrapping_add(1);
        if page_crossed(base, address) {
            address = ((stored as u16) << 8) | (address & 0x00FF);
        }
        self.write(bus, address, stored);
    }

    /// SHA (AHX) - store A & X & (H + 1)
    pub(crate) fn sha(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.store_high_and(bus, mode, self.a & self.x);
    }

    /// SHX - store X & (H + 1)
    pub(crate) fn shx(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.store_high_and(bus, mode, self.x);
    }

    /// SHY - store Y & (H + 1)
    pub(crate) fn shy(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.store_high_and(bus, mode, self.y);
    }

    /// TAS - SP = A & X, then store SP & (H + 1)
    pub(crate) fn tas(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        self.sp = self.a & self.x;
        self.store_high_and(bus, mode, self.sp);
    }

    // ---- Immediate logic ----

    /// ANC - AND, then C = N
    pub(crate) fn anc(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        self.a &= operand;
        self.set_nz(self.a);
        self.set_flag(StatusFlag::C, self.a & 0x80 != 0);
    }

    /// ALR (ASR) - AND, then LSR A
    pub(crate) fn alr(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        self.a = self.lsr_value(self.a & operand);
    }

    /// ARR - AND, then ROR A with adder-derived C and V. Decimal mode adds
    /// the nibble corrections of the NMOS adder.
    pub(crate) fn arr(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        let and = self.a & operand;
        let mut result = (and >> 1) | (self.carry_in() << 7);

        if self.is_decimal_set() {
            self.set_nz(result);
            self.set_flag(StatusFlag::V, (and ^ result) & 0x40 != 0);
            if (and & 0x0F) + (and & 0x01) > 0x05 {
                result = (result & 0xF0) | (result.wrapping_add(0x06) & 0x0F);
            }
            let carry = (and as u16 & 0xF0) + (and as u16 & 0x10) > 0x50;
            if carry {
                result = result.wrapping_add(0x60);
            }
            self.set_flag(StatusFlag::C, carry);
        } else {
            self.set_nz(result);
            self.set_flag(StatusFlag::C, result & 0x40 != 0);
            self.set_flag(StatusFlag::V, ((result >> 6) ^ (result >> 5)) & 0x01 != 0);
        }
        self.a = result;
    }

    /// ANE (XAA) - A = (A | magic) & X & M
    pub(crate) fn ane(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        self.a = (self.a | UNSTABLE_MAGIC) & self.x & operand;
        self.set_nz(self.a);
    }

    /// LXA - A = X = (A | magic) & M
    pub(crate) fn lxa(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        let value = (self.a | UNSTABLE_MAGIC) & operand;
        self.a = value;
        self.x = value;
        self.set_nz(value);
    }

    /// SBX (AXS) - X = (A & X) - M without borrow; C as in CMP
    pub(crate) fn sbx(&mut self, bus: &mut dyn CpuBus, mode: Mode) {
        let operand = self.operand(bus, mode);
        let and = self.a & self.x;
        self.set_flag(StatusFlag::C, and >= operand);
        self.x = and.wrapping_sub(operand);
        self.set_nz(self.x);
    }
}
