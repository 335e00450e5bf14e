pub mod core;
pub mod cpu;
pub mod debug;

pub mod prelude {
    pub use crate::core::{
        CpuBus, DebugStepMode, EmulationMode, ExecutionCompletionReason, ExecutionContext,
        FrameRunner, InterruptState, Machine, MachineConfig, MachineController,
        MachineControllerState, TactClock,
    };
    pub use crate::cpu::{Cpu, CpuEvent, CpuStateTrait, M6510};
    pub use crate::debug::{BreakpointInfo, DebugSupport};
}
