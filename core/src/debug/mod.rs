//! Breakpoints and stepping state.
//!
//! [`DebugSupport`] owns the breakpoint set and the bookkeeping the frame
//! driver needs between runs (last stop, step-over target, startup stop).
//! Nothing here can fail: a breakpoint that never matches is inert.

mod breakpoint;
mod step_out;

pub use breakpoint::{BreakpointInfo, BreakpointKey, BreakpointKind};
pub use step_out::{MAX_STEP_OUT_DEPTH, StepOutStack};

use std::collections::BTreeMap;

use log::trace;

use crate::cpu::BusAccess;

#[derive(Clone, Debug)]
struct Breakpoint {
    info: BreakpointInfo,
    hits: u32,
}

impl Breakpoint {
    /// Count a matching hit; true when this hit should stop execution.
    fn hit(&mut self) -> bool {
        match self.info.hit_count {
            Some(target) if target > 1 => {
                self.hits += 1;
                if self.hits >= target {
                    self.hits = 0;
                    true
                } else {
                    false
                }
            }
            _ => true,
        }
    }

    fn partition_matches(&self, address: u16, resolver: &dyn Fn(u16) -> Option<u16>) -> bool {
        match self.info.partition {
            None => true,
            Some(partition) => resolver(address) == Some(partition),
        }
    }

    fn value_matches(&self, value: u8) -> bool {
        self.info.value.is_none_or(|expected| expected == value)
    }
}

/// Breakpoint set plus the stop bookkeeping of the frame driver.
#[derive(Clone, Debug, Default)]
pub struct DebugSupport {
    breakpoints: BTreeMap<BreakpointKey, Breakpoint>,
    /// PC of the last execution breakpoint the driver stopped at.
    pub last_breakpoint: Option<u16>,
    /// Temporary stop address used by step-over.
    pub imminent_breakpoint: Option<u16>,
    /// PC of the last run that stopped before executing anything. The repeat
    /// stop is suppressed through `last_breakpoint`.
    pub last_startup_breakpoint: Option<u16>,
}

impl DebugSupport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_breakpoints(breakpoints: impl IntoIterator<Item = BreakpointInfo>) -> Self {
        let mut support = Self::new();
        for bp in breakpoints {
            support.add_breakpoint(bp);
        }
        support
    }

    /// All definitions, ordered by kind then address.
    pub fn breakpoints(&self) -> Vec<&BreakpointInfo> {
        self.breakpoints.values().map(|bp| &bp.info).collect()
    }

    /// Add or replace a breakpoint. Returns true if it was new.
    pub fn add_breakpoint(&mut self, info: BreakpointInfo) -> bool {
        self.breakpoints
            .insert(info.key(), Breakpoint { info, hits: 0 })
            .is_none()
    }

    /// Returns true if the breakpoint existed.
    pub fn remove_breakpoint(&mut self, key: &BreakpointKey) -> bool {
        self.breakpoints.remove(key).is_some()
    }

    /// Returns false if there is no such breakpoint.
    pub fn enable_breakpoint(&mut self, key: &BreakpointKey, enabled: bool) -> bool {
        match self.breakpoints.get_mut(key) {
            Some(bp) => {
                bp.info.disabled = !enabled;
                bp.hits = 0;
                true
            }
            None => false,
        }
    }

    pub fn erase_all_breakpoints(&mut self) {
        self.breakpoints.clear();
    }

    /// Hits counted so far toward a breakpoint's hit count.
    pub fn current_hits(&self, key: &BreakpointKey) -> Option<u32> {
        self.breakpoints.get(key).map(|bp| bp.hits)
    }

    fn at_address(
        &mut self,
        kind: BreakpointKind,
        address: u16,
    ) -> impl Iterator<Item = &mut Breakpoint> {
        let from = BreakpointKey {
            kind,
            address,
            partition: None,
        };
        let to = BreakpointKey {
            kind,
            address,
            partition: Some(u16::MAX),
        };
        self.breakpoints
            .range_mut(from..=to)
            .map(|(_, bp)| bp)
            .filter(|bp| !bp.info.disabled)
    }

    /// Execution breakpoint check for `address`; counts a hit on every
    /// matching breakpoint.
    pub fn should_stop_at(
        &mut self,
        address: u16,
        resolver: &dyn Fn(u16) -> Option<u16>,
    ) -> bool {
        let mut stop = false;
        for bp in self.at_address(BreakpointKind::Exec, address) {
            if bp.partition_matches(address, resolver) && bp.hit() {
                stop = true;
            }
        }
        if stop {
            trace!("execution breakpoint at ${address:04X}");
        }
        stop
    }

    /// True if an enabled execution breakpoint without a hit count sits at
    /// `address`. Counts nothing.
    pub fn has_exec_breakpoint(
        &self,
        address: u16,
        resolver: &dyn Fn(u16) -> Option<u16>,
    ) -> bool {
        self.breakpoints.values().any(|bp| {
            bp.info.kind == BreakpointKind::Exec
                && bp.info.address == address
                && !bp.info.disabled
                && bp.info.hit_count.is_none_or(|n| n <= 1)
                && bp.partition_matches(address, resolver)
        })
    }

    fn check_memory(
        &mut self,
        kind: BreakpointKind,
        accesses: &[BusAccess],
        resolver: &dyn Fn(u16) -> Option<u16>,
    ) -> bool {
        let mut stop = false;
        for access in accesses {
            for bp in self.at_address(kind, access.address) {
                if bp.partition_matches(access.address, resolver)
                    && bp.value_matches(access.value)
                    && bp.hit()
                {
                    trace!("{kind:?} breakpoint at ${:04X}", access.address);
                    stop = true;
                }
            }
        }
        stop
    }

    pub fn has_memory_read(
        &mut self,
        accesses: &[BusAccess],
        resolver: &dyn Fn(u16) -> Option<u16>,
    ) -> bool {
        self.check_memory(BreakpointKind::MemoryRead, accesses, resolver)
    }

    pub fn has_memory_write(
        &mut self,
        accesses: &[BusAccess],
        resolver: &dyn Fn(u16) -> Option<u16>,
    ) -> bool {
        self.check_memory(BreakpointKind::MemoryWrite, accesses, resolver)
    }

    fn check_io(&mut self, kind: BreakpointKind, access: Option<BusAccess>) -> bool {
        let Some(access) = access else {
            return false;
        };
        let mut stop = false;
        for bp in self.breakpoints.values_mut() {
            if bp.info.kind == kind
                && !bp.info.disabled
                && bp.info.matches_port(access.address)
                && bp.value_matches(access.value)
                && bp.hit()
            {
                trace!("{kind:?} breakpoint on port ${:04X}", access.address);
                stop = true;
            }
        }
        stop
    }

    pub fn has_io_read(&mut self, access: Option<BusAccess>) -> bool {
        self.check_io(BreakpointKind::IoRead, access)
    }

    pub fn has_io_write(&mut self, access: Option<BusAccess>) -> bool {
        self.check_io(BreakpointKind::IoWrite, access)
    }

    /// Forget per-run stop state (used when a machine stops).
    pub fn reset_run_state(&mut self) {
        self.last_breakpoint = None;
        self.imminent_breakpoint = None;
        self.last_startup_breakpoint = None;
    }
}
