//! Schema compiler implementations

pub mod typescript;

pub use typescript::TypeScriptCompiler;
