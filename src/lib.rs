//! Argot - command-line argument parsing and command dispatch.
//!
//! Flags are declared once into an immutable schema, tokens are parsed in a
//! single pass into a [`parser::ParsedResult`], and commands are resolved by
//! longest name prefix and run through an async interceptor chain.

pub mod app;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod flags;
pub mod interceptors;
pub mod logging;
pub mod parser;

pub use app::{App, AppBuilder};
pub use context::Context;
pub use error::{ArgotError, Result};
