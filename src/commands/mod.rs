//! CLI command implementations.

pub mod extract;
pub mod grab;

pub use extract::{ExtractArgs, ExtractCommand};
pub use grab::GrabCommand;
