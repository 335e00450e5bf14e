use super::M6510;
use crate::core::bus::CpuBus;

/// Operand addressing modes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Imm,
    Zp,
    ZpX,
    ZpY,
    Abs,
    AbsX,
    AbsY,
    IndX, // (zp,X)
    IndY, // (zp),Y
}

/// How an indexed access pays for the address fix-up cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Access {
    /// Extra cycle only when indexing crosses a page.
    Read,
    /// Extra cycle always (stores and read-modify-write).
    Write,
}

impl M6510 {
    // ---- Effective address helpers ----

    /// Resolve the effective address of `mode`, running the operand fetch
    /// and pointer cycles. Immediate resolves to PC (and consumes the byte).
    pub(crate) fn operand_address(&mut self, bus: &mut dyn CpuBus, mode: Mode, access: Access) -> u16 {
        match mode {
            Mode::Imm => {
                let address = self.pc;
                self.pc = self.pc.wrapping_add(1);
                address
            }
            Mode::Zp => self.fetch(bus) as u16,
            Mode::ZpX => self.zero_page_indexed(bus, self.x),
            Mode::ZpY => self.zero_page_indexed(bus, self.y),
            Mode::Abs => self.fetch_word(bus),
            Mode::AbsX => {
                let base = self.fetch_word(bus);
                self.index(bus, base, self.x, access)
            }
            Mode::AbsY => {
                let base = self.fetch_word(bus);
                self.index(bus, base, self.y, access)
            }
            Mode::IndX => {
                let ptr = self.fetch(bus);
                self.idle(bus, ptr as u16);
                self.read_zero_page_word(bus, ptr.wrapping_add(self.x))
            }
            Mode::IndY => {
                let ptr = self.fetch(bus);
                let base = self.read_zero_page_word(bus, ptr);
                self.index(bus, base, self.y, access)
            }
        }
    }

    /// Read the operand byte of a read instruction.
    pub(crate) fn operand(&mut self, bus: &mut dyn CpuBus, mode: Mode) -> u8 {
        let address = self.operand_address(bus, mode, Access::Read);
        self.read(bus, address)
    }

    /// Two operand bytes at PC, little-endian.
    pub(crate) fn fetch_word(&mut self, bus: &mut dyn CpuBus) -> u16 {
        let lo = self.fetch(bus);
        let hi = self.fetch(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Pointer read that wraps within page zero.
    fn read_zero_page_word(&mut self, bus: &mut dyn CpuBus, ptr: u8) -> u16 {
        let lo = self.read(bus, ptr as u16);
        let hi = self.read(bus, ptr.wrapping_add(1) as u16);
        u16::from_le_bytes([lo, hi])
    }

    fn zero_page_indexed(&mut self, bus: &mut dyn CpuBus, index: u8) -> u16 {
        let base = self.fetch(bus);
        self.idle(bus, base as u16);
        base.wrapping_add(index) as u16
    }

    /// Add an index to a 16-bit base. The fix-up cycle drives the address
    /// with the un-carried high byte.
    pub(crate) fn index(&mut self, bus: &mut dyn CpuBus, base: u16, index: u8, access: Access) -> u16 {
        let address = base.wrapping_add(index as u16);
        if access == Access::Write || page_crossed(base, address) {
            self.idle(bus, (base & 0xFF00) | (address & 0x00FF));
        }
        address
    }

    /// Base address of an indexed mode before the index is added, used by
    /// the unstable SHA/SHX/SHY/TAS stores.
    pub(crate) fn unindexed_base(&mut self, bus: &mut dyn CpuBus, mode: Mode) -> u16 {
        match mode {
            Mode::IndY => {
                let ptr = self.fetch(bus);
                self.read_zero_page_word(bus, ptr)
            }
            _ => self.fetch_word(bus),
        }
    }
}

#[inline]
pub(crate) fn page_crossed(from: u16, to: u16) -> bool {
    (from ^ to) & 0xFF00 != 0
}
