//! Type coercion of raw flag values into the flag accumulator.

use super::{Element, FlagSpec, FlagType};
use crate::error::{ArgotError, Result};
use serde_json::{Map, Value};

/// Writes one occurrence of a flag into `flags`.
///
/// `raw` is the value as written on the command line: `None` when the flag
/// appeared without a value. Scalar types read a missing value as the empty
/// string and leave any failure to their converter.
pub fn apply(
    flags: &mut Map<String, Value>,
    spec: &FlagSpec,
    path: &[String],
    negated: bool,
    raw: Option<&str>,
) -> Result<()> {
    let key = spec.key();

    match spec.flag_type() {
        FlagType::Boolean => {
            let value = raw.map_or(true, |v| v != "false");
            flags.insert(key.to_string(), Value::Bool(value != negated));
        }
        FlagType::Array(Element::Boolean) => {
            let count = flags.get(key).and_then(Value::as_u64).unwrap_or(0);
            flags.insert(key.to_string(), Value::from(count + 1));
        }
        FlagType::Array(Element::Scalar(conv)) => {
            let raw = raw.unwrap_or("");
            let value = conv
                .convert(raw)
                .map_err(|message| ArgotError::conversion(key, raw, message))?;
            let entry = flags
                .entry(key.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            match entry {
                Value::Array(items) => items.push(value),
                other => *other = Value::Array(vec![value]),
            }
        }
        FlagType::Scalar(conv) => {
            let raw = raw.unwrap_or("");
            let value = conv
                .convert(raw)
                .map_err(|message| ArgotError::conversion(key, raw, message))?;
            flags.insert(key.to_string(), value);
        }
        FlagType::Object => {
            let entry = flags
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(object) = entry else {
                return Err(ArgotError::internal("object flag accumulator is not an object"));
            };

            match spec.setter() {
                Some(setter) => {
                    let raw = raw.unwrap_or("");
                    setter(object, path, raw)
                        .map_err(|message| ArgotError::conversion(key, raw, message))?;
                }
                None => write_path(object, path, object_value(raw)).map_err(|message| {
                    ArgotError::conversion(key, raw.unwrap_or(""), message)
                })?,
            }
        }
    }

    Ok(())
}

/// Default coercion for object leaves.
fn object_value(raw: Option<&str>) -> Value {
    match raw {
        None | Some("") => Value::Bool(true),
        Some("false") => Value::Bool(false),
        Some(s) => Value::String(s.to_string()),
    }
}

/// Writes `value` at `path`, creating intermediate objects. A second write to
/// the same leaf turns it into an array of every written value. A parent
/// segment that already holds a value is an error.
fn write_path(
    object: &mut Map<String, Value>,
    path: &[String],
    value: Value,
) -> std::result::Result<(), String> {
    let Some((leaf, parents)) = path.split_last() else {
        return Ok(());
    };

    let mut current = object;
    for (depth, segment) in parents.iter().enumerate() {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match slot {
            Value::Object(map) => map,
            _ => {
                return Err(format!(
                    "{} already holds a value",
                    parents[..=depth].join(".")
                ))
            }
        };
    }

    match current.get_mut(leaf) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, value]);
        }
        None => {
            current.insert(leaf.clone(), value);
        }
    }
    Ok(())
}
