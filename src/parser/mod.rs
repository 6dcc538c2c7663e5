//! The parse engine.
//!
//! Walks raw tokens once, left to right, with a single token of lookahead to
//! decide whether a flag takes the next token as its value. Produces a
//! [`ParsedResult`]; required flags are only reported, never enforced here.

pub mod ignore;
pub mod tokenizer;

pub use ignore::{Classification, IgnorePolicy};
pub use tokenizer::{classify, Token};

use crate::error::Result;
use crate::flags::{coerce, FlagSchema, FlagSpec, FlagType};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// The structured outcome of one parse call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedResult {
    /// Positional parameters in order.
    pub parameters: Vec<String>,
    /// Every token after the first bare `--`.
    pub double_dash: Vec<String>,
    /// Typed flag values by canonical key.
    pub flags: Map<String, Value>,
    /// Unresolved flags by raw name; each occurrence is a string or `true`.
    pub unknown: BTreeMap<String, Vec<Value>>,
    /// The raw tokens that made up unknown flags, in order.
    pub unknown_raw: Vec<String>,
    /// Tokens the ignore policy excluded, in order.
    pub ignored: Vec<String>,
    /// Required flags that received no value.
    pub missing_required_flags: Vec<String>,
}

/// Parses `tokens` against `schema` without an ignore policy.
pub fn parse<S: AsRef<str>>(tokens: &[S], schema: &FlagSchema) -> Result<ParsedResult> {
    parse_with(tokens, schema, &mut ignore::Never)
}

/// Parses `tokens` against `schema`, consulting `policy` for every token.
pub fn parse_with<S: AsRef<str>>(
    tokens: &[S],
    schema: &FlagSchema,
    policy: &mut dyn IgnorePolicy,
) -> Result<ParsedResult> {
    run_engine(tokens, schema, policy, true).map(|(result, _)| result)
}

/// Finds the positional tokens of `tokens` and the index of each.
///
/// Unknown flags never take the following token as their value here, so a
/// flag the schema does not know cannot hide a command name behind it.
pub(crate) fn scan<S: AsRef<str>>(
    tokens: &[S],
    schema: &FlagSchema,
) -> Result<(ParsedResult, Vec<usize>)> {
    run_engine(tokens, schema, &mut ignore::Never, false)
}

fn run_engine<S: AsRef<str>>(
    tokens: &[S],
    schema: &FlagSchema,
    policy: &mut dyn IgnorePolicy,
    unknown_lookahead: bool,
) -> Result<(ParsedResult, Vec<usize>)> {
    let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
    let mut engine = Engine {
        schema,
        tokens: &tokens,
        unknown_lookahead,
        result: ParsedResult::default(),
        positions: Vec::new(),
    };
    engine.run(policy)?;
    engine.fill_defaults();

    debug!(
        parameters = engine.result.parameters.len(),
        flags = engine.result.flags.len(),
        unknown = engine.result.unknown.len(),
        ignored = engine.result.ignored.len(),
        "parsed tokens"
    );

    Ok((engine.result, engine.positions))
}

struct Engine<'s, 't> {
    schema: &'s FlagSchema,
    tokens: &'t [&'t str],
    /// Whether an unknown flag without an inline value takes the next parameter.
    unknown_lookahead: bool,
    result: ParsedResult,
    positions: Vec<usize>,
}

impl<'s, 't> Engine<'s, 't> {
    fn run(&mut self, policy: &mut dyn IgnorePolicy) -> Result<()> {
        let mut index = 0;

        while index < self.tokens.len() {
            let raw = self.tokens[index];
            let token = classify(raw, self.schema);
            let class = self.classification(&token);
            trace!(token = raw, ?class, "classified token");

            if policy.ignore(class, raw) {
                self.result.ignored.push(raw.to_string());
                index += 1;
                continue;
            }

            match token {
                Token::DoubleDash => {
                    self.result.double_dash = self.tokens[index + 1..]
                        .iter()
                        .map(|s| s.to_string())
                        .collect();
                    break;
                }
                Token::Parameter(value) => {
                    self.result.parameters.push(value.to_string());
                    self.positions.push(index);
                }
                Token::LongFlag { name, value } => {
                    index = self.long_flag(index, raw, name, value)?;
                }
                Token::ShortFlags(bundle) => {
                    index = self.short_flags(index, bundle)?;
                }
            }

            index += 1;
        }

        Ok(())
    }

    fn classification(&self, token: &Token<'_>) -> Classification {
        let known = match token {
            Token::DoubleDash => return Classification::DoubleDash,
            Token::Parameter(_) => return Classification::Parameter,
            Token::LongFlag { name, .. } => self.schema.resolve(name).is_some(),
            Token::ShortFlags(bundle) => bundle
                .chars()
                .next()
                .is_some_and(|c| self.schema.resolve_short(c).is_some()),
        };
        if known {
            Classification::KnownFlag
        } else {
            Classification::UnknownFlag
        }
    }

    /// Returns the following token if it can serve as a value.
    fn lookahead(&self, index: usize) -> Option<&'t str> {
        let next = *self.tokens.get(index + 1)?;
        classify(next, self.schema).as_parameter()
    }

    /// Handles `--name[=value]`; returns the index of the last consumed token.
    fn long_flag(
        &mut self,
        index: usize,
        raw: &str,
        name: &str,
        inline: Option<&str>,
    ) -> Result<usize> {
        let schema = self.schema;
        let Some(resolved) = schema.resolve(name) else {
            return Ok(self.unknown(index, raw, name, inline));
        };
        let spec = resolved.spec;

        if matches!(spec.flag_type(), FlagType::Object)
            && resolved.path.is_empty()
            && spec.setter().is_none()
        {
            self.record_unknown(raw, name, inline);
            return Ok(index);
        }

        let mut consumed = index;
        let value = match inline {
            Some(v) => Some(v),
            None if spec.flag_type().takes_value() => match self.lookahead(index) {
                Some(next) => {
                    consumed += 1;
                    Some(next)
                }
                None => None,
            },
            None => None,
        };

        coerce::apply(
            &mut self.result.flags,
            spec,
            &resolved.path,
            resolved.negated,
            value,
        )?;
        Ok(consumed)
    }

    /// Expands `-abc`; returns the index of the last consumed token.
    fn short_flags(&mut self, index: usize, bundle: &str) -> Result<usize> {
        let schema = self.schema;
        for (pos, c) in bundle.char_indices() {
            let rest = &bundle[pos + c.len_utf8()..];
            let inline = rest.strip_prefix('=');

            let Some(spec) = schema.resolve_short(c) else {
                let name = c.to_string();
                let raw = format!("-{c}");
                if rest.is_empty() {
                    return Ok(self.unknown(index, &raw, &name, None));
                }
                self.record_unknown(&raw, &name, inline);
                if inline.is_some() {
                    return Ok(index);
                }
                continue;
            };

            if spec.flag_type().takes_value() {
                if !rest.is_empty() {
                    self.apply(spec, Some(inline.unwrap_or(rest)))?;
                    return Ok(index);
                }
                return match self.lookahead(index) {
                    Some(next) => {
                        self.apply(spec, Some(next))?;
                        Ok(index + 1)
                    }
                    None => {
                        self.apply(spec, None)?;
                        Ok(index)
                    }
                };
            }

            if matches!(spec.flag_type(), FlagType::Object) && spec.setter().is_none() {
                self.record_unknown(&format!("-{c}"), &c.to_string(), inline);
            } else {
                self.apply(spec, inline)?;
            }
            if inline.is_some() {
                return Ok(index);
            }
        }

        Ok(index)
    }

    fn apply(&mut self, spec: &FlagSpec, value: Option<&str>) -> Result<()> {
        coerce::apply(&mut self.result.flags, spec, &[], false, value)
    }

    /// Records an unknown flag. Without an inline value the next parameter
    /// token is taken as its value. Returns the index of the last consumed token.
    fn unknown(&mut self, index: usize, raw: &str, name: &str, inline: Option<&str>) -> usize {
        if inline.is_some() || !self.unknown_lookahead {
            self.record_unknown(raw, name, inline);
            return index;
        }
        match self.lookahead(index) {
            Some(next) => {
                self.record_unknown(raw, name, Some(next));
                self.result.unknown_raw.push(next.to_string());
                index + 1
            }
            None => {
                self.record_unknown(raw, name, None);
                index
            }
        }
    }

    /// Records an unknown flag occurrence without looking ahead.
    fn record_unknown(&mut self, raw: &str, name: &str, value: Option<&str>) {
        warn!(flag = name, "unknown flag");
        self.result.unknown_raw.push(raw.to_string());
        let value = value.map_or(Value::Bool(true), |v| Value::String(v.to_string()));
        self.result
            .unknown
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    /// Back-fills defaults and collects missing required flags.
    fn fill_defaults(&mut self) {
        for spec in self.schema.specs() {
            let key = spec.key();

            if let Some(observed) = self.result.flags.get_mut(key) {
                if let (Some(merge), Some(default)) = (spec.merge_fn(), spec.default()) {
                    if let Value::Object(map) = &mut *observed {
                        let parsed = std::mem::take(map);
                        *observed = merge(default.resolve(), parsed);
                    }
                }
                continue;
            }

            if spec.default().is_none() && spec.is_required() {
                self.result.missing_required_flags.push(key.to_string());
                continue;
            }

            if let Some(value) = spec.fallback() {
                self.result.flags.insert(key.to_string(), value);
            }
        }
    }
}
