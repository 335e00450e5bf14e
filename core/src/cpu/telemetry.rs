//! Last-access history kept for the debugger.

/// One completed data transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusAccess {
    pub address: u16,
    pub value: u8,
}

/// Default number of accesses kept per kind; no 6510 instruction makes more.
pub const DEFAULT_TELEMETRY_DEPTH: usize = 8;

/// Bounded record of the bus accesses made since the last instruction
/// boundary.
#[derive(Clone, Debug, Default)]
pub struct BusTelemetry {
    depth: usize,
    memory_reads: Vec<BusAccess>,
    memory_writes: Vec<BusAccess>,
    port_reads: Vec<BusAccess>,
    port_writes: Vec<BusAccess>,
}

impl BusTelemetry {
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            depth,
            memory_reads: Vec::with_capacity(depth),
            memory_writes: Vec::with_capacity(depth),
            port_reads: Vec::with_capacity(depth),
            port_writes: Vec::with_capacity(depth),
        }
    }

    pub fn clear(&mut self) {
        self.memory_reads.clear();
        self.memory_writes.clear();
        self.port_reads.clear();
        self.port_writes.clear();
    }

    pub(crate) fn record_memory_read(&mut self, address: u16, value: u8) {
        push_bounded(&mut self.memory_reads, self.depth, BusAccess { address, value });
    }

    pub(crate) fn record_memory_write(&mut self, address: u16, value: u8) {
        push_bounded(&mut self.memory_writes, self.depth, BusAccess { address, value });
    }

    pub(crate) fn record_port_read(&mut self, address: u16, value: u8) {
        push_bounded(&mut self.port_reads, self.depth, BusAccess { address, value });
    }

    pub(crate) fn record_port_write(&mut self, address: u16, value: u8) {
        push_bounded(&mut self.port_writes, self.depth, BusAccess { address, value });
    }

    pub fn memory_reads(&self) -> &[BusAccess] {
        &self.memory_reads
    }

    pub fn memory_writes(&self) -> &[BusAccess] {
        &self.memory_writes
    }

    pub fn port_reads(&self) -> &[BusAccess] {
        &self.port_reads
    }

    pub fn port_writes(&self) -> &[BusAccess] {
        &self.port_writes
    }

    pub fn last_memory_read(&self) -> Option<BusAccess> {
        self.memory_reads.last().copied()
    }

    pub fn last_memory_write(&self) -> Option<BusAccess> {
        self.memory_writes.last().copied()
    }

    pub fn last_port_read(&self) -> Option<BusAccess> {
        self.port_reads.last().copied()
    }

    pub fn last_port_write(&self) -> Option<BusAccess> {
        self.port_writes.last().copied()
    }
}

// Oldest entry goes first once the list is full.
fn push_bounded(list: &mut Vec<BusAccess>, depth: usize, access: BusAccess) {
    if list.len() == depth {
        list.remove(0);
    }
    list.push(access);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_latest_entries() {
        let mut t = BusTelemetry::new(2);
        t.record_memory_read(1, 10);
        t.record_memory_read(2, 20);
        t.record_memory_read(3, 30);
        assert_eq!(
            t.memory_reads(),
            &[
                BusAccess { address: 2, value: 20 },
                BusAccess { address: 3, value: 30 }
            ]
        );
        assert_eq!(t.last_memory_read(), Some(BusAccess { address: 3, value: 30 }));
    }

    #[test]
    fn clear_empties_every_list() {
        let mut t = BusTelemetry::new(4);
        t.record_memory_write(1, 1);
        t.record_port_read(0, 2);
        t.record_port_write(1, 3);
        t.clear();
        assert!(t.memory_writes().is_empty());
        assert!(t.last_port_read().is_none());
        assert!(t.last_port_write().is_none());
    }
}
