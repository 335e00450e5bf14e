//! Machine lifecycle: start, pause, stop, stepping, and a worker thread that
//! owns a controller and takes commands over a channel.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info};

use super::frame::{
    DebugStepMode, EmulationMode, ExecutionCompletionReason, ExecutionContext, FrameRunner,
};
use super::machine::Machine;
use crate::debug::{BreakpointInfo, BreakpointKey, DebugSupport};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MachineControllerState {
    #[default]
    None,
    Running,
    Pausing,
    Paused,
    Stopping,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    AlreadyRunning,
    NotRunning,
    /// The worker thread has exited and no longer takes commands.
    WorkerGone,
    WorkerPanicked,
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::AlreadyRunning => write!(f, "machine is already running"),
            ControllerError::NotRunning => write!(f, "machine is not running"),
            ControllerError::WorkerGone => write!(f, "machine worker has exited"),
            ControllerError::WorkerPanicked => write!(f, "machine worker panicked"),
        }
    }
}

impl std::error::Error for ControllerError {}

/// Timing of the frames run since the machine last started.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    pub frame_count: u64,
    pub last_cpu_frame_time: Duration,
    pub avg_cpu_frame_time: Duration,
}

impl FrameStats {
    fn record(&mut self, elapsed: Duration) {
        self.frame_count += 1;
        self.last_cpu_frame_time = elapsed;
        let n = self.frame_count as u32;
        self.avg_cpu_frame_time = if n <= 1 {
            elapsed
        } else {
            (self.avg_cpu_frame_time * (n - 1) + elapsed) / n
        };
    }
}

/// What a run is asked to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunRequest {
    pub emulation_mode: EmulationMode,
    pub debug_step_mode: DebugStepMode,
    pub termination: Option<(Option<u16>, u16)>,
}

impl RunRequest {
    pub fn new(emulation_mode: EmulationMode, debug_step_mode: DebugStepMode) -> Self {
        Self {
            emulation_mode,
            debug_step_mode,
            termination: None,
        }
    }
}

/// Drives one machine through the frame runner.
pub struct MachineController {
    machine: Box<dyn Machine>,
    runner: FrameRunner,
    context: ExecutionContext,
    state: MachineControllerState,
    frame_stats: FrameStats,
    frame_limit: Option<u64>,
    frames_this_run: u64,
    real_time: bool,
    is_debugging: bool,
}

impl MachineController {
    pub fn new(machine: Box<dyn Machine>) -> Self {
        let context = ExecutionContext::default().with_debug_support(DebugSupport::new());
        Self {
            machine,
            runner: FrameRunner::new(),
            context,
            state: MachineControllerState::None,
            frame_stats: FrameStats::default(),
            frame_limit: None,
            frames_this_run: 0,
            real_time: false,
            is_debugging: false,
        }
    }

    pub fn machine(&self) -> &dyn Machine {
        self.machine.as_ref()
    }

    pub fn machine_mut(&mut self) -> &mut dyn Machine {
        self.machine.as_mut()
    }

    pub fn into_machine(self) -> Box<dyn Machine> {
        self.machine
    }

    pub fn state(&self) -> MachineControllerState {
        self.state
    }

    pub fn frame_stats(&self) -> &FrameStats {
        &self.frame_stats
    }

    pub fn is_debugging(&self) -> bool {
        self.is_debugging
    }

    pub fn last_completion_reason(&self) -> Option<ExecutionCompletionReason> {
        self.context.last_completion_reason
    }

    /// Stop a run after this many frames. `None` runs until something else
    /// stops it.
    pub fn set_frame_limit(&mut self, limit: Option<u64>) {
        self.frame_limit = limit;
    }

    /// Sleep between frames so the machine runs at its nominal speed.
    pub fn set_real_time(&mut self, real_time: bool) {
        self.real_time = real_time;
    }

    pub fn debug_support(&self) -> Option<&DebugSupport> {
        self.context.debug_support.as_ref()
    }

    pub fn debug_support_mut(&mut self) -> &mut DebugSupport {
        self.context
            .debug_support
            .get_or_insert_with(DebugSupport::new)
    }

    pub fn add_breakpoint(&mut self, info: BreakpointInfo) -> bool {
        self.debug_support_mut().add_breakpoint(info)
    }

    pub fn remove_breakpoint(&mut self, key: &BreakpointKey) -> bool {
        self.debug_support_mut().remove_breakpoint(key)
    }

    /// Flag that interrupts the current frame from another thread.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        self.context.cancel_token()
    }

    pub fn cancel_run(&self) {
        self.context.request_cancel();
    }

    fn set_state(&mut self, state: MachineControllerState) {
        if self.state != state {
            debug!("{}: {:?} -> {:?}", self.machine.name(), self.state, state);
            self.state = state;
        }
    }

    /// Prepare a run without executing anything.
    pub fn begin_run(&mut self, request: RunRequest) -> Result<(), ControllerError> {
        if self.state == MachineControllerState::Running {
            return Err(ControllerError::AlreadyRunning);
        }
        if matches!(
            self.state,
            MachineControllerState::None | MachineControllerState::Stopped
        ) {
            self.machine.reset();
            self.runner.reset();
            self.frame_stats = FrameStats::default();
            if let Some(support) = self.context.debug_support.as_mut() {
                support.reset_run_state();
            }
        }

        self.context.emulation_mode = request.emulation_mode;
        self.context.debug_step_mode = request.debug_step_mode;
        match request.termination {
            Some((partition, address)) => {
                self.context.termination_partition = partition;
                self.context.termination_point = Some(address);
            }
            None => {
                self.context.termination_partition = None;
                self.context.termination_point = None;
            }
        }
        self.context.clear_cancel();
        self.is_debugging = request.debug_step_mode != DebugStepMode::NoDebug;
        let tacts = self.machine.cpu().tacts();
        self.machine.cpu_mut().set_tacts_at_last_start(tacts);
        self.frames_this_run = 0;
        self.set_state(MachineControllerState::Running);
        Ok(())
    }

    /// Run one machine frame of the current run. Returns the reason the run
    /// ended, or `None` while it should continue.
    pub fn run_frame(&mut self) -> Option<ExecutionCompletionReason> {
        if self.state != MachineControllerState::Running {
            return self.context.last_completion_reason;
        }

        let started = Instant::now();
        let reason = self
            .runner
            .execute_machine_frame(self.machine.as_mut(), &mut self.context);

        if reason != ExecutionCompletionReason::FrameCompleted {
            self.set_state(MachineControllerState::Paused);
            return Some(reason);
        }

        self.frame_stats.record(started.elapsed());
        self.frames_this_run += 1;

        if self.context.emulation_mode == EmulationMode::UntilFrameEnds
            || self.frame_limit.is_some_and(|limit| self.frames_this_run >= limit)
        {
            self.set_state(MachineControllerState::Paused);
            return Some(reason);
        }

        if self.real_time {
            self.pace(started);
        }
        None
    }

    fn pace(&self, started: Instant) {
        let clock = self.machine.cpu().clock();
        let hz = u64::from(clock.base_clock_frequency()) * u64::from(clock.clock_multiplier());
        if hz == 0 {
            return;
        }
        let frame_tacts = u64::from(clock.tacts_in_frame()) * u64::from(clock.clock_multiplier());
        let frame_time = Duration::from_nanos(frame_tacts * 1_000_000_000 / hz);
        if let Some(remaining) = frame_time.checked_sub(started.elapsed()) {
            thread::sleep(remaining);
        }
    }

    /// Run frames until the current run ends.
    pub fn run_to_completion(&mut self) -> ExecutionCompletionReason {
        loop {
            if let Some(reason) = self.run_frame() {
                return reason;
            }
        }
    }

    fn run(&mut self, request: RunRequest) -> Result<ExecutionCompletionReason, ControllerError> {
        self.begin_run(request)?;
        Ok(self.run_to_completion())
    }

    /// Run without debugging until the CPU halts or the run is cut short.
    pub fn start(&mut self) -> Result<ExecutionCompletionReason, ControllerError> {
        self.run(RunRequest::new(
            EmulationMode::UntilHalt,
            DebugStepMode::NoDebug,
        ))
    }

    /// Run, stopping at breakpoints.
    pub fn start_debug(&mut self) -> Result<ExecutionCompletionReason, ControllerError> {
        self.run(RunRequest::new(
            EmulationMode::Debugger,
            DebugStepMode::StopAtBreakpoint,
        ))
    }

    /// Run a single frame.
    pub fn run_single_frame(&mut self) -> Result<ExecutionCompletionReason, ControllerError> {
        self.run(RunRequest::new(
            EmulationMode::UntilFrameEnds,
            DebugStepMode::NoDebug,
        ))
    }

    /// Run until PC reaches `address` (in `partition`, if given).
    pub fn run_to(
        &mut self,
        partition: Option<u16>,
        address: u16,
    ) -> Result<ExecutionCompletionReason, ControllerError> {
        let mut request = RunRequest::new(
            EmulationMode::UntilExecutionPoint,
            DebugStepMode::StopAtBreakpoint,
        );
        request.termination = Some((partition, address));
        self.run(request)
    }

    pub fn step_into(&mut self) -> Result<ExecutionCompletionReason, ControllerError> {
        self.run(RunRequest::new(
            EmulationMode::Debugger,
            DebugStepMode::StepInto,
        ))
    }

    pub fn step_over(&mut self) -> Result<ExecutionCompletionReason, ControllerError> {
        self.debug_support_mut().imminent_breakpoint = None;
        self.run(RunRequest::new(
            EmulationMode::Debugger,
            DebugStepMode::StepOver,
        ))
    }

    pub fn step_out(&mut self) -> Result<ExecutionCompletionReason, ControllerError> {
        self.machine.cpu_mut().mark_step_out_address();
        self.run(RunRequest::new(
            EmulationMode::Debugger,
            DebugStepMode::StepOut,
        ))
    }

    pub fn pause(&mut self) -> Result<(), ControllerError> {
        if self.state != MachineControllerState::Running {
            return Err(ControllerError::NotRunning);
        }
        self.set_state(MachineControllerState::Pausing);
        self.set_state(MachineControllerState::Paused);
        Ok(())
    }

    pub fn stop(&mut self) {
        if matches!(
            self.state,
            MachineControllerState::None | MachineControllerState::Stopped
        ) {
            return;
        }
        self.set_state(MachineControllerState::Stopping);
        self.machine.on_stop();
        if let Some(support) = self.context.debug_support.as_mut() {
            support.reset_run_state();
        }
        self.is_debugging = false;
        self.set_state(MachineControllerState::Stopped);
        info!(
            "{} stopped after {} frames",
            self.machine.name(),
            self.frame_stats.frame_count
        );
    }

    /// Stop, power-cycle and start again.
    pub fn restart(&mut self) -> Result<ExecutionCompletionReason, ControllerError> {
        self.stop();
        self.machine.hard_reset();
        self.runner.reset();
        self.start()
    }
}

/// Commands accepted by [`MachineWorker`].
#[derive(Clone, Debug)]
pub enum ControllerCommand {
    Start,
    StartDebug,
    Pause,
    Stop,
    Restart,
    StepInto,
    StepOver,
    StepOut,
    RunTo { partition: Option<u16>, address: u16 },
    AddBreakpoint(BreakpointInfo),
    RemoveBreakpoint(BreakpointKey),
    /// Report CPU position as [`ControllerEvent::Position`].
    Query,
    Shutdown,
}

/// Notifications sent back by [`MachineWorker`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControllerEvent {
    StateChanged {
        old: MachineControllerState,
        new: MachineControllerState,
    },
    RunCompleted {
        reason: ExecutionCompletionReason,
        pc: u16,
    },
    Position {
        pc: u16,
        tacts: u64,
        frames: u64,
    },
    Error(ControllerError),
}

/// A controller running on its own thread.
///
/// Frames run back to back while the machine is running; commands are
/// picked up between frames. [`MachineWorker::cancel_run`] cuts a long
/// frame short between instructions.
pub struct MachineWorker {
    commands: Sender<ControllerCommand>,
    events: Receiver<ControllerEvent>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<MachineController>>,
}

impl MachineWorker {
    pub fn spawn(controller: MachineController) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = controller.cancel_token();
        let handle = thread::spawn(move || worker_loop(controller, command_rx, event_tx));
        Self {
            commands: command_tx,
            events: event_rx,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn send(&self, command: ControllerCommand) -> Result<(), ControllerError> {
        self.commands
            .send(command)
            .map_err(|_| ControllerError::WorkerGone)
    }

    pub fn events(&self) -> &Receiver<ControllerEvent> {
        &self.events
    }

    pub fn cancel_run(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Stop the worker and take the controller back.
    pub fn shutdown(mut self) -> Result<MachineController, ControllerError> {
        self.cancel_run();
        // The worker may already have exited; joining reports that.
        let _ = self.commands.send(ControllerCommand::Shutdown);
        let handle = self.handle.take().ok_or(ControllerError::WorkerGone)?;
        handle.join().map_err(|_| ControllerError::WorkerPanicked)
    }
}

impl Drop for MachineWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel.store(true, Ordering::Release);
            let _ = self.commands.send(ControllerCommand::Shutdown);
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    mut controller: MachineController,
    commands: Receiver<ControllerCommand>,
    events: Sender<ControllerEvent>,
) -> MachineController {
    loop {
        let command = if controller.state() == MachineControllerState::Running {
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => break,
            }
        } else {
            match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        };

        if let Some(command) = command {
            if matches!(command, ControllerCommand::Shutdown) {
                controller.stop();
                break;
            }
            let old = controller.state();
            let result = apply_command(&mut controller, command, &events);
            if let Err(err) = result {
                let _ = events.send(ControllerEvent::Error(err));
            }
            notify_state(&controller, old, &events);
        }

        if controller.state() == MachineControllerState::Running {
            if let Some(reason) = controller.run_frame() {
                let _ = events.send(ControllerEvent::RunCompleted {
                    reason,
                    pc: controller.machine().cpu().pc(),
                });
                notify_state(&controller, MachineControllerState::Running, &events);
            }
        }
    }
    controller
}

fn notify_state(
    controller: &MachineController,
    old: MachineControllerState,
    events: &Sender<ControllerEvent>,
) {
    let new = controller.state();
    if old != new {
        let _ = events.send(ControllerEvent::StateChanged { old, new });
    }
}

fn apply_command(
    controller: &mut MachineController,
    command: ControllerCommand,
    events: &Sender<ControllerEvent>,
) -> Result<(), ControllerError> {
    match command {
        ControllerCommand::Start => controller.begin_run(RunRequest::new(
            EmulationMode::UntilHalt,
            DebugStepMode::NoDebug,
        )),
        ControllerCommand::StartDebug => controller.begin_run(RunRequest::new(
            EmulationMode::Debugger,
            DebugStepMode::StopAtBreakpoint,
        )),
        ControllerCommand::Pause => controller.pause(),
        ControllerCommand::Stop => {
            controller.stop();
            Ok(())
        }
        ControllerCommand::Restart => {
            controller.stop();
            controller.machine_mut().hard_reset();
            controller.runner.reset();
            controller.begin_run(RunRequest::new(
                EmulationMode::UntilHalt,
                DebugStepMode::NoDebug,
            ))
        }
        ControllerCommand::StepInto => controller.begin_run(RunRequest::new(
            EmulationMode::Debugger,
            DebugStepMode::StepInto,
        )),
        ControllerCommand::StepOver => {
            controller.debug_support_mut().imminent_breakpoint = None;
            controller.begin_run(RunRequest::new(
                EmulationMode::Debugger,
                DebugStepMode::StepOver,
            ))
        }
        ControllerCommand::StepOut => {
            controller.machine_mut().cpu_mut().mark_step_out_address();
            controller.begin_run(RunRequest::new(
                EmulationMode::Debugger,
                DebugStepMode::StepOut,
            ))
        }
        ControllerCommand::RunTo { partition, address } => {
            let mut request = RunRequest::new(
                EmulationMode::UntilExecutionPoint,
                DebugStepMode::StopAtBreakpoint,
            );
            request.termination = Some((partition, address));
            controller.begin_run(request)
        }
        ControllerCommand::AddBreakpoint(info) => {
            controller.add_breakpoint(info);
            Ok(())
        }
        ControllerCommand::RemoveBreakpoint(key) => {
            controller.remove_breakpoint(&key);
            Ok(())
        }
        ControllerCommand::Query => {
            let cpu = controller.machine().cpu();
            let _ = events.send(ControllerEvent::Position {
                pc: cpu.pc(),
                tacts: cpu.tacts(),
                frames: cpu.clock().frames(),
            });
            Ok(())
        }
        ControllerCommand::Shutdown => Ok(()),
    }
}
