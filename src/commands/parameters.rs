//! Positional parameter declarations and binding.
//!
//! Declarations are token-shaped: `<name>` is required, `[name]` optional,
//! and a trailing `...` (`<files...>`, `[rest...]`) collects the remainder.

use crate::error::{ArgotError, Result};
use crate::flags::Converter;
use heck::ToLowerCamelCase;
use serde_json::{Map, Value};

/// One declared positional parameter.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    declaration: String,
    key: String,
    required: bool,
    variadic: bool,
    converter: Option<Converter>,
}

impl ParameterSpec {
    /// Parses a declaration such as `<input>`, `[output]` or `[files...]`.
    pub fn parse(declaration: &str) -> Result<Self> {
        let trimmed = declaration.trim();
        let (inner, required) = if let Some(inner) =
            trimmed.strip_prefix('<').and_then(|s| s.strip_suffix('>'))
        {
            (inner, true)
        } else if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            (inner, false)
        } else {
            return Err(ArgotError::schema(format!(
                "parameter \"{declaration}\" must be written as <name> or [name]"
            )));
        };

        let (name, variadic) = match inner.strip_suffix("...") {
            Some(name) => (name, true),
            None => (inner, false),
        };

        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ArgotError::schema(format!(
                "parameter \"{declaration}\" has an invalid name"
            )));
        }

        Ok(Self {
            declaration: trimmed.to_string(),
            key: name.to_lower_camel_case(),
            required,
            variadic,
            converter: None,
        })
    }

    /// Attaches a converter applied to each bound value.
    pub fn with_converter(self, converter: Converter) -> Self {
        Self {
            converter: Some(converter),
            ..self
        }
    }

    /// The declaration as written.
    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    /// Key under which the bound value is stored.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    fn convert(&self, raw: &str) -> Result<Value> {
        match &self.converter {
            Some(conv) => conv
                .convert(raw)
                .map_err(|message| ArgotError::conversion(&self.key, raw, message)),
            None => Ok(Value::String(raw.to_string())),
        }
    }
}

/// Checks ordering rules: no required after optional, variadic only last,
/// unique keys.
pub fn validate(specs: &[ParameterSpec]) -> Result<()> {
    let mut seen_optional = false;

    for (i, spec) in specs.iter().enumerate() {
        if spec.variadic && i + 1 != specs.len() {
            return Err(ArgotError::schema(format!(
                "variadic parameter {} must be the last parameter",
                spec.declaration
            )));
        }
        if spec.required && seen_optional {
            return Err(ArgotError::schema(format!(
                "required parameter {} cannot follow an optional parameter",
                spec.declaration
            )));
        }
        if !spec.required {
            seen_optional = true;
        }
        if specs[..i].iter().any(|other| other.key == spec.key) {
            return Err(ArgotError::schema(format!(
                "parameter {} is declared twice",
                spec.declaration
            )));
        }
    }

    Ok(())
}

/// Binds raw positional values to declarations.
///
/// Returns the typed values and the declarations of missing required
/// parameters. Values beyond the declarations are left unbound.
pub fn bind(specs: &[ParameterSpec], values: &[String]) -> Result<(Map<String, Value>, Vec<String>)> {
    let mut bound = Map::new();
    let mut missing = Vec::new();

    for (i, spec) in specs.iter().enumerate() {
        if spec.variadic {
            let rest = values.get(i..).unwrap_or_default();
            if rest.is_empty() && spec.required {
                missing.push(spec.declaration.clone());
            }
            let items = rest
                .iter()
                .map(|raw| spec.convert(raw))
                .collect::<Result<Vec<_>>>()?;
            bound.insert(spec.key.clone(), Value::Array(items));
            continue;
        }

        match values.get(i) {
            Some(raw) => {
                bound.insert(spec.key.clone(), spec.convert(raw)?);
            }
            None if spec.required => missing.push(spec.declaration.clone()),
            None => {}
        }
    }

    Ok((bound, missing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn specs(decls: &[&str]) -> Vec<ParameterSpec> {
        decls.iter().map(|d| ParameterSpec::parse(d).unwrap()).collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_declarations() {
        let p = ParameterSpec::parse("<input-file>").unwrap();
        assert_eq!(p.key(), "inputFile");
        assert!(p.is_required());
        assert!(!p.is_variadic());

        let p = ParameterSpec::parse("[files...]").unwrap();
        assert_eq!(p.key(), "files");
        assert!(!p.is_required());
        assert!(p.is_variadic());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for decl in ["input", "<input", "[]", "<a b>", "<...>"] {
            assert!(ParameterSpec::parse(decl).is_err(), "{decl:?}");
        }
    }

    #[test]
    fn test_validate_ordering() {
        assert!(validate(&specs(&["<a>", "[b]", "[c...]"])).is_ok());
        assert!(validate(&specs(&["[a]", "<b>"])).is_err());
        assert!(validate(&specs(&["<a...>", "<b>"])).is_err());
        assert!(validate(&specs(&["<a>", "[a]"])).is_err());
    }

    #[test]
    fn test_bind_values() {
        let (bound, missing) = bind(
            &specs(&["<src>", "[dest]", "[rest...]"]),
            &strings(&["a", "b", "c", "d"]),
        )
        .unwrap();
        assert_eq!(
            Value::Object(bound),
            json!({ "src": "a", "dest": "b", "rest": ["c", "d"] })
        );
        assert!(missing.is_empty());
    }

    #[test]
    fn test_bind_reports_missing() {
        let (bound, missing) =
            bind(&specs(&["<src>", "<dest>", "[rest...]"]), &strings(&["a"])).unwrap();
        assert_eq!(Value::Object(bound), json!({ "src": "a", "rest": [] }));
        assert_eq!(missing, vec!["<dest>"]);
    }

    #[test]
    fn test_bind_converts() {
        let spec = vec![ParameterSpec::parse("<count>")
            .unwrap()
            .with_converter(Converter::integer())];
        let (bound, _) = bind(&spec, &strings(&["12"])).unwrap();
        assert_eq!(bound["count"], json!(12));

        let err = bind(&spec, &strings(&["twelve"])).unwrap_err();
        assert_eq!(
            err,
            ArgotError::conversion("count", "twelve", "expected an integer")
        );
    }
}
