//! Infrastructure layer - concrete implementations of domain ports

pub mod compiler;
pub mod openapi;
pub mod output;
pub mod shell;

pub use shell::*;
