/// Deepest call nesting tracked; older entries are dropped.
pub const MAX_STEP_OUT_DEPTH: usize = 256;

/// Shadow stack of return addresses, kept only for stepping decisions.
///
/// The CPU pushes on calls and interrupts and sets `ret_executed` on
/// returns; the frame driver pops once the instruction has completed.
#[derive(Clone, Debug, Default)]
pub struct StepOutStack {
    entries: Vec<u16>,
    /// Set by RTS/RTI, cleared by the frame driver.
    pub ret_executed: bool,
    /// Return address step-out stops at.
    pub step_out_address: Option<u16>,
}

impl StepOutStack {
    pub fn push(&mut self, return_address: u16) {
        if self.entries.len() == MAX_STEP_OUT_DEPTH {
            self.entries.remove(0);
        }
        self.entries.push(return_address);
    }

    pub fn pop(&mut self) -> Option<u16> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<u16> {
        self.entries.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.ret_executed = false;
        self.step_out_address = None;
    }
}
