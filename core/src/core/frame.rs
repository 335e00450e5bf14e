//! Machine frame driver.
//!
//! [`FrameRunner::execute_machine_frame`] runs whole instructions until the
//! current frame ends or something stops it earlier: a breakpoint or step
//! target, the termination point, a halted CPU, or a cancel request.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::clock::MAX_CLOCK_MULTIPLIER;
use super::machine::Machine;
use crate::debug::DebugSupport;

/// How far a run is meant to go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmulationMode {
    /// Run frames, honouring breakpoints and the step mode.
    #[default]
    Debugger,
    /// Run frames until the CPU halts.
    UntilHalt,
    /// Run a single frame.
    UntilFrameEnds,
    /// Run until PC reaches the termination point.
    UntilExecutionPoint,
}

/// Stepping policy applied while debugging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebugStepMode {
    #[default]
    NoDebug,
    StopAtBreakpoint,
    StepInto,
    StepOver,
    StepOut,
}

/// Why the frame driver returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionCompletionReason {
    TerminationPointReached,
    BreakpointReached,
    Halted,
    FrameCompleted,
    Cancelled,
}

/// Run policy and debugger state shared between the controller and the
/// frame driver.
#[derive(Debug)]
pub struct ExecutionContext {
    pub emulation_mode: EmulationMode,
    pub debug_step_mode: DebugStepMode,
    pub termination_partition: Option<u16>,
    pub termination_point: Option<u16>,
    pub debug_support: Option<DebugSupport>,
    pub last_completion_reason: Option<ExecutionCompletionReason>,
    cancel: Arc<AtomicBool>,
}

impl ExecutionContext {
    pub fn new(emulation_mode: EmulationMode, debug_step_mode: DebugStepMode) -> Self {
        Self {
            emulation_mode,
            debug_step_mode,
            termination_partition: None,
            termination_point: None,
            debug_support: None,
            last_completion_reason: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_debug_support(mut self, support: DebugSupport) -> Self {
        self.debug_support = Some(support);
        self
    }

    pub fn with_termination_point(mut self, partition: Option<u16>, address: u16) -> Self {
        self.termination_partition = partition;
        self.termination_point = Some(address);
        self
    }

    /// Flag other threads set to stop the driver between instructions.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn clear_cancel(&self) {
        self.cancel.store(false, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(EmulationMode::default(), DebugStepMode::default())
    }
}

/// Frame boundary bookkeeping carried between calls.
#[derive(Debug)]
pub struct FrameRunner {
    frame_completed: bool,
    frame_overflow: u64,
    next_frame_start_tact: u64,
}

impl Default for FrameRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRunner {
    pub fn new() -> Self {
        Self {
            frame_completed: true,
            frame_overflow: 0,
            next_frame_start_tact: 0,
        }
    }

    /// Forget frame progress; the next call starts a fresh frame.
    pub fn reset(&mut self) {
        self.frame_completed = true;
        self.frame_overflow = 0;
        self.next_frame_start_tact = 0;
    }

    /// True once the last frame ran to its end.
    pub fn frame_completed(&self) -> bool {
        self.frame_completed
    }

    /// Tact at which the current frame ends.
    pub fn next_frame_start_tact(&self) -> u64 {
        self.next_frame_start_tact
    }

    /// Run the machine until the frame ends or the context stops it.
    pub fn execute_machine_frame(
        &mut self,
        machine: &mut dyn Machine,
        context: &mut ExecutionContext,
    ) -> ExecutionCompletionReason {
        context.last_completion_reason = None;
        let reason = self.run_loop(machine, context);
        context.last_completion_reason = Some(reason);
        reason
    }

    fn run_loop(
        &mut self,
        machine: &mut dyn Machine,
        context: &mut ExecutionContext,
    ) -> ExecutionCompletionReason {
        let debugging = context.debug_step_mode != DebugStepMode::NoDebug;
        let mut instructions_executed = 0u64;

        // Runs on every start so step-over arms its target when resuming
        // from a breakpoint.
        if debugging {
            let pc = machine.cpu().pc();
            let stop = check_breakpoints(machine, context, 0);
            if let Some(support) = context.debug_support.as_mut() {
                support.last_startup_breakpoint = stop.then_some(pc);
            }
            if stop {
                return ExecutionCompletionReason::BreakpointReached;
            }
        }

        loop {
            if self.frame_completed {
                self.start_new_frame(machine);
            }

            machine.before_instruction_executed();

            loop {
                if machine.cpu().is_sleeping() {
                    machine.on_snooze();
                } else {
                    machine.execute_cpu_cycle();
                }
                instructions_executed += 1;
                if !machine.cpu().instruction_in_progress() {
                    break;
                }
            }

            let stack = machine.cpu_mut().step_out_stack_mut();
            if stack.ret_executed {
                stack.ret_executed = false;
                stack.pop();
            }

            for event in machine.cpu_mut().take_events() {
                machine.on_cpu_event(event);
            }

            machine.after_instruction_executed();

            if debugging && check_access_breakpoints(machine, context) {
                return ExecutionCompletionReason::BreakpointReached;
            }

            if reached_termination_point(machine, context) {
                return ExecutionCompletionReason::TerminationPointReached;
            }

            if debugging && check_breakpoints(machine, context, instructions_executed) {
                return ExecutionCompletionReason::BreakpointReached;
            }

            if machine.cpu().is_halted() {
                return ExecutionCompletionReason::Halted;
            }

            let tacts = machine.cpu().tacts();
            self.frame_completed = tacts >= self.next_frame_start_tact;
            if self.frame_completed {
                self.frame_overflow = tacts - self.next_frame_start_tact;
            }

            if context.is_cancelled() {
                return ExecutionCompletionReason::Cancelled;
            }

            if self.frame_completed {
                return ExecutionCompletionReason::FrameCompleted;
            }
        }
    }

    fn start_new_frame(&mut self, machine: &mut dyn Machine) {
        let tacts = machine.cpu().tacts();
        let current_frame_start = tacts.saturating_sub(self.frame_overflow);

        let mut clock_multiplier_changed = false;
        let target = machine
            .target_clock_multiplier()
            .clamp(1, MAX_CLOCK_MULTIPLIER);
        if machine.allow_cpu_clock_change() && machine.cpu().clock().clock_multiplier() != target {
            machine.cpu_mut().clock_mut().set_clock_multiplier(target);
            clock_multiplier_changed = true;
        }

        machine.on_init_new_frame(clock_multiplier_changed);
        self.frame_completed = false;

        let clock = machine.cpu().clock();
        self.next_frame_start_tact = current_frame_start
            + u64::from(clock.tacts_in_frame()) * u64::from(clock.clock_multiplier());
    }
}

fn check_access_breakpoints(machine: &dyn Machine, context: &mut ExecutionContext) -> bool {
    let Some(support) = context.debug_support.as_mut() else {
        return false;
    };
    let telemetry = machine.cpu().telemetry();
    let resolver = |address: u16| machine.get_partition(address);
    support.has_memory_read(telemetry.memory_reads(), &resolver)
        || support.has_memory_write(telemetry.memory_writes(), &resolver)
        || support.has_io_read(telemetry.last_port_read())
        || support.has_io_write(telemetry.last_port_write())
}

fn reached_termination_point(machine: &dyn Machine, context: &ExecutionContext) -> bool {
    if context.emulation_mode != EmulationMode::UntilExecutionPoint {
        return false;
    }
    let pc = machine.cpu().pc();
    context.termination_point == Some(pc)
        && (context.termination_partition.is_none()
            || machine.get_partition(pc) == context.termination_partition)
}

/// Execution breakpoint and stepping decision. Called once before the run
/// starts (`instructions_executed == 0`) and after every instruction.
fn check_breakpoints(
    machine: &dyn Machine,
    context: &mut ExecutionContext,
    instructions_executed: u64,
) -> bool {
    let step_mode = context.debug_step_mode;
    let Some(support) = context.debug_support.as_mut() else {
        return false;
    };
    let pc = machine.cpu().pc();

    if step_mode == DebugStepMode::StepInto {
        let stop = instructions_executed > 0;
        if stop {
            support.imminent_breakpoint = None;
        }
        return stop;
    }

    // Before the first instruction hits are not counted, and the breakpoint
    // the last run stopped at does not stop this one again.
    let exec_hit = if instructions_executed == 0 {
        support.last_breakpoint != Some(pc)
            && support.has_exec_breakpoint(pc, &|a| machine.get_partition(a))
    } else {
        support.should_stop_at(pc, &|a| machine.get_partition(a))
    };
    if exec_hit {
        support.last_breakpoint = Some(pc);
        support.imminent_breakpoint = None;
        return true;
    }

    match step_mode {
        DebugStepMode::StepOver => match support.imminent_breakpoint {
            Some(imminent) => {
                if imminent == pc {
                    support.imminent_breakpoint = None;
                    return true;
                }
                false
            }
            None => {
                if instructions_executed > 0 {
                    return true;
                }
                let length = machine.call_instruction_length();
                if length > 0 {
                    support.imminent_breakpoint = Some(pc.wrapping_add(length));
                }
                false
            }
        },
        DebugStepMode::StepOut => {
            if instructions_executed > 0
                && machine.cpu().step_out_stack().step_out_address == Some(pc)
            {
                support.imminent_breakpoint = None;
                return true;
            }
            false
        }
        _ => false,
    }
}
