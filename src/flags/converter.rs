//! Value converters for flags and parameters.
//!
//! A converter turns one raw string token into a typed [`Value`]. Failures are
//! reported as a plain message; the caller attaches the flag or parameter name
//! when it raises [`crate::error::ArgotError::ValueConversion`].

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type ConvertFn = dyn Fn(&str) -> std::result::Result<Value, String> + Send + Sync;

/// A named, shareable string-to-value conversion.
#[derive(Clone)]
pub struct Converter {
    name: &'static str,
    func: Arc<ConvertFn>,
}

impl Converter {
    /// Wraps a custom conversion function.
    pub fn custom<F>(name: &'static str, func: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name,
            func: Arc::new(func),
        }
    }

    /// Keeps the raw string as is.
    pub fn string() -> Self {
        Self::custom("string", |raw| Ok(Value::String(raw.to_string())))
    }

    /// Parses a signed 64-bit integer. The empty string is rejected.
    pub fn integer() -> Self {
        Self::custom("integer", |raw| {
            raw.trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| "expected an integer".to_string())
        })
    }

    /// Parses a finite floating point number. The empty string is rejected.
    pub fn number() -> Self {
        Self::custom("number", |raw| {
            let parsed = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| "expected a number".to_string())?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| "expected a finite number".to_string())
        })
    }

    /// Accepts `true`/`false`, `yes`/`no`, `on`/`off` and `1`/`0`.
    pub fn boolean() -> Self {
        Self::custom("boolean", |raw| match raw.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err("expected true or false".to_string()),
        })
    }

    /// Accepts only one of the listed strings.
    pub fn choice<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        Self::custom("choice", move |raw| {
            if choices.iter().any(|c| c == raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(format!("expected one of: {}", choices.join(", ")))
            }
        })
    }

    /// Accepts strings that match `pattern` in full.
    pub fn pattern(pattern: &str) -> std::result::Result<Self, regex::Error> {
        let anchored = Regex::new(&format!("^(?:{pattern})$"))?;
        let shown = pattern.to_string();
        Ok(Self::custom("pattern", move |raw| {
            if anchored.is_match(raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(format!("does not match pattern {shown}"))
            }
        }))
    }

    /// Returns the converter's display name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Converts a raw string.
    pub fn convert(&self, raw: &str) -> std::result::Result<Value, String> {
        (self.func)(raw)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Converter({})", self.name)
    }
}
