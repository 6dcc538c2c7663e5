//! Commands: definitions, registration and resolution.
//!
//! Parsing of a command's own tokens is left to [`crate::parser`]; this
//! module only decides which command an invocation refers to.

pub mod definitions;
pub mod parameters;
pub mod registry;
pub mod router;

pub use definitions::{Command, CommandDef, CommandName};
pub use parameters::ParameterSpec;
pub use registry::CommandRegistry;
pub use router::{resolve, suggest, RouteMatch};
