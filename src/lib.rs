//! Generate typed TypeScript request functions and declarations from
//! OpenAPI v3 and Swagger 2.0 documents.
#![deny(unsafe_code)]

pub mod application;
pub mod config;
pub mod generation;
pub mod infrastructure;
