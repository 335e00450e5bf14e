pub mod bus;
pub mod clock;
pub mod config;
pub mod controller;
pub mod frame;
pub mod machine;

pub use bus::{CpuBus, InterruptState};
pub use clock::{MAX_CLOCK_MULTIPLIER, MAX_TACTS_IN_FRAME, TactClock};
pub use config::{ConfigError, MachineConfig};
pub use controller::{
    ControllerCommand, ControllerError, ControllerEvent, FrameStats, MachineController,
    MachineControllerState, MachineWorker, RunRequest,
};
pub use frame::{
    DebugStepMode, EmulationMode, ExecutionCompletionReason, ExecutionContext, FrameRunner,
};
pub use machine::Machine;
