//! Generation domain module - the OpenAPI to TypeScript pipeline
//!
//! Normalizes references, collects definitions and breaks their
//! self-cycles, resolves every operation through the resolver table and
//! assembles the output file set. Everything here is pure; I/O lives behind
//! the ports in [`traits`].

pub mod definitions;
pub mod errors;
pub mod orchestrator;
pub mod output;
pub mod refs;
pub mod resolver;
pub mod schema;
pub mod traits;
pub mod types;
pub mod utils;

pub use errors::*;
pub use orchestrator::*;
pub use traits::*;
pub use types::*;
