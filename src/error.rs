//! Error types for Argot.
//!
//! Defines the main error enum used throughout the crate. Variants are grouped
//! by the phase that raises them: schema validation at build time, command
//! resolution, value conversion while parsing, and dispatch-time checks.

use thiserror::Error;

/// Main error type for Argot operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgotError {
    /// Invalid flag, parameter or command definitions (raised at build time).
    #[error("Schema error: {0}")]
    Schema(String),

    /// The token list was empty and no root command is registered.
    #[error("No command given")]
    NoCommandGiven,

    /// Tokens were given but none of their prefixes names a command.
    #[error("Command \"{name}\" not found{}", suggestion_suffix(.suggestion))]
    CommandNotFound {
        /// The first positional token, which named no command.
        name: String,
        /// A registered command name close to `name`, if any.
        suggestion: Option<String>,
    },

    /// Required flags had no value when the handler was about to run.
    #[error("Missing required flag(s): {}", .0.join(", "))]
    MissingRequiredFlags(Vec<String>),

    /// A required positional parameter had no value.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// A raw string failed a flag or parameter converter.
    #[error("Invalid value {value:?} for {target}: {message}")]
    ValueConversion {
        /// Canonical flag key or parameter name.
        target: String,
        /// The raw string that failed.
        value: String,
        /// Converter-supplied reason.
        message: String,
    },

    /// Unknown flags were rejected by strict mode.
    #[error("Unknown flag(s): {}", .0.join(", "))]
    UnknownFlags(Vec<String>),

    /// Configuration errors (unreadable schema file, bad TOML, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(". Did you mean \"{s}\"?"),
        None => String::new(),
    }
}

impl ArgotError {
    /// Creates a schema error with the given message.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Creates a value conversion error.
    pub fn conversion(
        target: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ValueConversion {
            target: target.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Schema(_) => "Schema Error",
            Self::NoCommandGiven | Self::CommandNotFound { .. } => "Resolution Error",
            Self::MissingRequiredFlags(_) | Self::MissingParameter(_) => "Required Argument Error",
            Self::ValueConversion { .. } => "Value Conversion Error",
            Self::UnknownFlags(_) => "Unknown Flag Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using ArgotError.
pub type Result<T> = std::result::Result<T, ArgotError>;
