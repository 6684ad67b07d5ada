pub use crate::errors::{ErrorKind, HarnessError};

pub mod ast;
pub mod cli;
pub mod errors;
pub mod reducer;
pub mod registry;
pub mod syntax;
pub mod test;
