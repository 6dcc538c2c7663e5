//! The per-invocation context handed through the interceptor chain.

use crate::commands::Command;
use crate::parser::ParsedResult;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Everything known about one invocation.
///
/// A running chain starts with only `tokens` set; the parse step fills in
/// the rest before the `normal` tier. Interceptors may read and rewrite any
/// of it before the handler runs.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// The raw command-line tokens.
    pub tokens: Vec<String>,
    /// Whether a command was resolved.
    pub resolved: bool,
    #[serde(skip)]
    pub command: Option<Arc<Command>>,
    /// The spelling the command was invoked as; empty for the root command.
    pub called_as: Option<String>,
    /// Bound positional parameters by key.
    pub parameters: Map<String, Value>,
    /// Typed flag values by key.
    pub flags: Map<String, Value>,
    pub raw: ParsedResult,
    /// Declarations of required parameters that were not given.
    pub missing_parameters: Vec<String>,
    pub exit_code: i32,
}

impl Context {
    /// Reads a flag as a boolean; absent or non-boolean values are `false`.
    pub fn flag_enabled(&self, key: &str) -> bool {
        self.flags.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn flag_str(&self, key: &str) -> Option<&str> {
        self.flags.get(key).and_then(Value::as_str)
    }

    pub fn parameter_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }
}
