//! Source loading: text to `Program`.

pub mod loader;
pub mod program;

pub use loader::SourceLoader;
pub use program::Program;
