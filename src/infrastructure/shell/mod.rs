//! Shell integration: command execution and output formatting

pub mod command_executor;
pub mod prettier;

pub use command_executor::*;
pub use prettier::*;
