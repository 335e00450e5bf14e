/// What a breakpoint watches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BreakpointKind {
    Exec,
    MemoryRead,
    MemoryWrite,
    IoRead,
    IoWrite,
}

/// Identity of a breakpoint: one per kind, address and partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BreakpointKey {
    pub kind: BreakpointKind,
    pub address: u16,
    pub partition: Option<u16>,
}

/// A breakpoint definition as the debugger front end describes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakpointInfo {
    pub kind: BreakpointKind,
    pub address: u16,
    /// Bank/partition the address must resolve to; `None` matches any.
    pub partition: Option<u16>,
    /// Port breakpoints match when `port & mask == address`.
    pub mask: Option<u16>,
    /// Fire on every N-th matching hit instead of every hit.
    pub hit_count: Option<u32>,
    /// Fire only when the transferred byte equals this value.
    pub value: Option<u8>,
    pub disabled: bool,
}

impl BreakpointInfo {
    pub fn new(kind: BreakpointKind, address: u16) -> Self {
        Self {
            kind,
            address,
            partition: None,
            mask: None,
            hit_count: None,
            value: None,
            disabled: false,
        }
    }

    pub fn exec(address: u16) -> Self {
        Self::new(BreakpointKind::Exec, address)
    }

    pub fn memory_read(address: u16) -> Self {
        Self::new(BreakpointKind::MemoryRead, address)
    }

    pub fn memory_write(address: u16) -> Self {
        Self::new(BreakpointKind::MemoryWrite, address)
    }

    pub fn io_read(port: u16) -> Self {
        Self::new(BreakpointKind::IoRead, port)
    }

    pub fn io_write(port: u16) -> Self {
        Self::new(BreakpointKind::IoWrite, port)
    }

    pub fn with_partition(mut self, partition: u16) -> Self {
        self.partition = Some(partition);
        self
    }

    pub fn with_mask(mut self, mask: u16) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_hit_count(mut self, hits: u32) -> Self {
        self.hit_count = Some(hits);
        self
    }

    pub fn with_value(mut self, value: u8) -> Self {
        self.value = Some(value);
        self
    }

    pub fn key(&self) -> BreakpointKey {
        BreakpointKey {
            kind: self.kind,
            address: self.address,
            partition: self.partition,
        }
    }

    pub(crate) fn matches_port(&self, port: u16) -> bool {
        port & self.mask.unwrap_or(0xFFFF) == self.address
    }
}
