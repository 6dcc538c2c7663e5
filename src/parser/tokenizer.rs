//! Token classification for raw command-line arguments.
//!
//! Each raw argument is classified on its own as:
//! - the `--` separator
//! - a long flag (`--name`, `--name=value`, `--name:value`)
//! - a bundle of short flags (`-abc`, `-oVALUE`)
//! - a positional parameter (everything else, including `-`, `---` and `-5`)

use crate::flags::FlagSchema;

/// A classified raw argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// The bare `--` separator.
    DoubleDash,
    /// A long flag, with the inline value if one was attached.
    LongFlag {
        name: &'a str,
        value: Option<&'a str>,
    },
    /// Short flag characters following a single dash.
    ShortFlags(&'a str),
    /// A positional parameter.
    Parameter(&'a str),
}

impl<'a> Token<'a> {
    /// Returns the parameter text if this is a parameter.
    pub fn as_parameter(&self) -> Option<&'a str> {
        match self {
            Token::Parameter(s) => Some(s),
            _ => None,
        }
    }
}

/// Classifies one raw argument.
///
/// A leading digit after a single dash only starts a short-flag bundle when
/// that digit is a declared single-character alias in `schema`; otherwise the
/// token is a parameter so that negative numbers pass through as values.
pub fn classify<'a>(raw: &'a str, schema: &FlagSchema) -> Token<'a> {
    if raw == "--" {
        return Token::DoubleDash;
    }

    if let Some(body) = raw.strip_prefix("--") {
        return match body.chars().next() {
            Some(c) if c.is_alphabetic() => {
                let (name, value) = split_inline_value(body);
                Token::LongFlag { name, value }
            }
            _ => Token::Parameter(raw),
        };
    }

    if let Some(body) = raw.strip_prefix('-') {
        return match body.chars().next() {
            Some(c) if c.is_alphabetic() => Token::ShortFlags(body),
            Some(c) if c.is_ascii_digit() && schema.resolve_short(c).is_some() => {
                Token::ShortFlags(body)
            }
            _ => Token::Parameter(raw),
        };
    }

    Token::Parameter(raw)
}

/// Splits `name=value` or `name:value` at the first separator.
fn split_inline_value(body: &str) -> (&str, Option<&str>) {
    match body.find(['=', ':']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    }
}
