//! Alias table and flag name resolution.
//!
//! Every raw spelling of a flag (its declared name, the lowerCamelCase form of
//! that name, and each alias) maps to exactly one spec. Resolution tries the
//! exact spelling, then the camelCase form, and finally strips a negation
//! prefix for negatable booleans.

use super::{FlagSpec, FlagType};
use crate::error::{ArgotError, Result};
use heck::ToLowerCamelCase;
use std::collections::HashMap;

/// Maps raw spellings to indices into a spec list.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    spellings: HashMap<String, usize>,
}

/// A successfully resolved flag name.
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    pub spec: &'a FlagSpec,
    /// Dot-path segments after the flag name (object flags only).
    pub path: Vec<String>,
    /// Set when the name was matched through a `no-` prefix.
    pub negated: bool,
}

impl AliasTable {
    /// Builds the table, rejecting spellings claimed by two different flags.
    pub fn build(specs: &[FlagSpec]) -> Result<Self> {
        let mut table = Self::default();

        for (index, spec) in specs.iter().enumerate() {
            table.claim(spec.key(), index, specs)?;
            if spec.key().chars().count() > 1 {
                table.claim(&spec.key().to_lower_camel_case(), index, specs)?;
            }
            for alias in spec.aliases() {
                table.claim(alias, index, specs)?;
            }
        }

        Ok(table)
    }

    fn claim(&mut self, spelling: &str, index: usize, specs: &[FlagSpec]) -> Result<()> {
        match self.spellings.get(spelling) {
            Some(&owner) if owner != index => Err(ArgotError::schema(format!(
                "\"{spelling}\" is claimed by both flag \"{}\" and flag \"{}\"",
                specs[owner].key(),
                specs[index].key()
            ))),
            Some(_) => Ok(()),
            None => {
                self.spellings.insert(spelling.to_string(), index);
                Ok(())
            }
        }
    }

    /// Looks up a spelling exactly as written.
    pub fn lookup_exact(&self, spelling: &str) -> Option<usize> {
        self.spellings.get(spelling).copied()
    }

    /// Looks up a spelling, falling back to its lowerCamelCase form.
    pub fn lookup(&self, spelling: &str) -> Option<usize> {
        if let Some(index) = self.lookup_exact(spelling) {
            return Some(index);
        }
        if spelling.chars().count() > 1 {
            return self.lookup_exact(&spelling.to_lower_camel_case());
        }
        None
    }

    /// Resolves a raw flag name such as `dry-run`, `define.env.HOME` or `no-color`.
    pub fn resolve<'a>(&self, raw: &str, specs: &'a [FlagSpec]) -> Option<Resolved<'a>> {
        let (name, path) = match raw.split_once('.') {
            Some((name, rest)) => {
                let path: Vec<String> = rest.split('.').map(str::to_string).collect();
                if path.iter().any(String::is_empty) {
                    return None;
                }
                (name, path)
            }
            None => (raw, Vec::new()),
        };

        if let Some(index) = self.lookup(name) {
            let spec = &specs[index];
            if !path.is_empty() && !matches!(spec.flag_type(), FlagType::Object) {
                return None;
            }
            return Some(Resolved {
                spec,
                path,
                negated: false,
            });
        }

        if !path.is_empty() {
            return None;
        }

        let target = strip_negation(name)?;
        let spec = &specs[self.lookup(target)?];
        if !spec.is_negatable() {
            return None;
        }
        Some(Resolved {
            spec,
            path,
            negated: true,
        })
    }
}

/// Strips `no-` or a fused `noX` prefix.
fn strip_negation(name: &str) -> Option<&str> {
    if let Some(rest) = name.strip_prefix("no-") {
        return (!rest.is_empty()).then_some(rest);
    }
    let rest = name.strip_prefix("no")?;
    rest.chars()
        .next()
        .filter(|c| c.is_uppercase())
        .map(|_| rest)
}
