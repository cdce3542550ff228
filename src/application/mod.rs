//! Application layer - runs the generate use case against the infrastructure ports

pub mod errors;
pub mod generate_request;
pub mod traits;

pub use errors::*;
pub use generate_request::*;
pub use traits::*;
