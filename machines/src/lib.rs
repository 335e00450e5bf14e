pub mod program;
pub mod registry;
pub mod simple6510;

pub use program::{ProgramImage, ProgramLoadError};
pub use simple6510::Simple6510System;
