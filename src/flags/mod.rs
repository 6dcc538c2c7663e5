//! Flag definitions and schemas.
//!
//! Flags are declared with a loose [`FlagConfig`] (a bare type descriptor or a
//! full [`FlagOptions`] value) and normalized exactly once into a [`FlagSpec`].
//! A set of specs plus its [`AliasTable`] forms a [`FlagSchema`], which is the
//! only thing the parser ever looks at.

pub mod alias;
pub mod coerce;
pub mod converter;

pub use alias::{AliasTable, Resolved};
pub use converter::Converter;

use crate::error::{ArgotError, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Characters that may not appear in a flag name or alias.
const RESERVED_CHARS: &[char] = &['.', ':', '='];

/// Raw type descriptor as written by the caller.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// A value-less switch.
    Boolean,
    /// A single value converted by the given converter.
    Converter(Converter),
    /// A repeatable flag; must hold exactly one element type.
    List(Vec<TypeDescriptor>),
    /// A dot-path object flag (`--define.key=value`).
    Object,
}

impl TypeDescriptor {
    /// Shorthand for a repeatable flag of one element type.
    pub fn list(element: impl Into<TypeDescriptor>) -> Self {
        Self::List(vec![element.into()])
    }
}

impl From<Converter> for TypeDescriptor {
    fn from(conv: Converter) -> Self {
        Self::Converter(conv)
    }
}

/// Per-occurrence writer for object flags.
pub type ObjectSetter =
    Arc<dyn Fn(&mut Map<String, Value>, &[String], &str) -> std::result::Result<(), String> + Send + Sync>;

/// Combines an object flag's default with the observed object.
pub type ObjectMerge = Arc<dyn Fn(Value, Map<String, Value>) -> Value + Send + Sync>;

/// Default value of a flag: a literal or a thunk evaluated at parse time.
#[derive(Clone)]
pub enum FlagDefault {
    /// A literal value.
    Value(Value),
    /// A zero-argument function evaluated lazily when the default is needed.
    Thunk(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl FlagDefault {
    /// Produces the default value.
    pub fn resolve(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Thunk(f) => f(),
        }
    }
}

impl fmt::Debug for FlagDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "Value({v})"),
            Self::Thunk(_) => write!(f, "Thunk"),
        }
    }
}

/// Full flag options.
#[derive(Clone)]
pub struct FlagOptions {
    kind: TypeDescriptor,
    aliases: Vec<String>,
    default: Option<FlagDefault>,
    required: bool,
    negatable: Option<bool>,
    description: String,
    setter: Option<ObjectSetter>,
    merge: Option<ObjectMerge>,
}

impl FlagOptions {
    /// Creates options for a flag of the given type.
    pub fn new(kind: impl Into<TypeDescriptor>) -> Self {
        Self {
            kind: kind.into(),
            aliases: Vec::new(),
            default: None,
            required: false,
            negatable: None,
            description: String::new(),
            setter: None,
            merge: None,
        }
    }

    /// Adds an alias (a single character becomes a short flag).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Sets a literal default.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FlagDefault::Value(value.into()));
        self
    }

    /// Sets a default computed when the flag is absent.
    pub fn default_with<F>(mut self, thunk: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(FlagDefault::Thunk(Arc::new(thunk)));
        self
    }

    /// Marks the flag as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Enables or disables the `--no-` form of a boolean flag.
    pub fn negatable(mut self, negatable: bool) -> Self {
        self.negatable = Some(negatable);
        self
    }

    /// Sets the description shown by help renderers.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replaces the default dot-path write of an object flag.
    pub fn setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut Map<String, Value>, &[String], &str) -> std::result::Result<(), String>
            + Send
            + Sync
            + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Merges an object flag's default with what was parsed.
    pub fn merge<F>(mut self, merge: F) -> Self
    where
        F: Fn(Value, Map<String, Value>) -> Value + Send + Sync + 'static,
    {
        self.merge = Some(Arc::new(merge));
        self
    }
}

/// A flag as declared: bare type or full options.
#[derive(Clone)]
pub enum FlagConfig {
    /// Type only, every option at its default.
    Bare(TypeDescriptor),
    /// Type plus options.
    Options(FlagOptions),
}

impl From<TypeDescriptor> for FlagConfig {
    fn from(kind: TypeDescriptor) -> Self {
        Self::Bare(kind)
    }
}

impl From<Converter> for FlagConfig {
    fn from(conv: Converter) -> Self {
        Self::Bare(TypeDescriptor::Converter(conv))
    }
}

impl From<FlagOptions> for FlagConfig {
    fn from(options: FlagOptions) -> Self {
        Self::Options(options)
    }
}

/// Element type of a repeatable flag.
#[derive(Debug, Clone)]
pub enum Element {
    /// Counted occurrences (`-vvv` is 3).
    Boolean,
    /// Converted values collected in order.
    Scalar(Converter),
}

/// Normalized flag type.
#[derive(Debug, Clone)]
pub enum FlagType {
    Boolean,
    Scalar(Converter),
    Array(Element),
    Object,
}

impl FlagType {
    /// Returns true if the flag takes its value from the following token.
    pub fn takes_value(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Array(Element::Scalar(_)))
    }

    /// Returns true for plain booleans (the only negatable type).
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }

    fn implicit_default(&self) -> Option<Value> {
        match self {
            Self::Boolean => Some(Value::Bool(false)),
            Self::Array(Element::Boolean) => Some(Value::from(0)),
            Self::Array(Element::Scalar(_)) => Some(Value::Array(Vec::new())),
            Self::Object => Some(Value::Object(Map::new())),
            Self::Scalar(_) => None,
        }
    }
}

/// A normalized, immutable flag definition.
#[derive(Clone)]
pub struct FlagSpec {
    key: String,
    flag_type: FlagType,
    aliases: Vec<String>,
    default: Option<FlagDefault>,
    required: bool,
    negatable: bool,
    description: String,
    setter: Option<ObjectSetter>,
    merge: Option<ObjectMerge>,
}

impl fmt::Debug for FlagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSpec")
            .field("key", &self.key)
            .field("flag_type", &self.flag_type)
            .field("aliases", &self.aliases)
            .field("default", &self.default)
            .field("required", &self.required)
            .field("negatable", &self.negatable)
            .finish_non_exhaustive()
    }
}

impl FlagSpec {
    /// Normalizes a declared flag, validating its name and options.
    pub fn normalize(name: &str, config: FlagConfig) -> Result<Self> {
        validate_name(name, "flag")?;

        let options = match config {
            FlagConfig::Bare(kind) => FlagOptions::new(kind),
            FlagConfig::Options(options) => options,
        };

        let flag_type = normalize_type(name, options.kind)?;

        let mut aliases: Vec<String> = Vec::new();
        for alias in options.aliases {
            validate_name(&alias, "alias")?;
            if alias == name || aliases.contains(&alias) {
                continue;
            }
            aliases.push(alias);
        }

        if options.required && options.default.is_some() {
            return Err(ArgotError::schema(format!(
                "flag \"{name}\" cannot be both required and have a default"
            )));
        }

        if options.negatable.is_some() && !flag_type.is_boolean() {
            return Err(ArgotError::schema(format!(
                "flag \"{name}\" is not a boolean and cannot be negatable"
            )));
        }

        if (options.setter.is_some() || options.merge.is_some())
            && !matches!(flag_type, FlagType::Object)
        {
            return Err(ArgotError::schema(format!(
                "flag \"{name}\" is not an object flag and cannot have a setter or merge"
            )));
        }

        Ok(Self {
            key: name.to_string(),
            flag_type,
            aliases,
            default: options.default,
            required: options.required,
            negatable: options.negatable.unwrap_or(true),
            description: options.description,
            setter: options.setter,
            merge: options.merge,
        })
    }

    /// Canonical key under which parsed values are stored.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn flag_type(&self) -> &FlagType {
        &self.flag_type
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn default(&self) -> Option<&FlagDefault> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns true if `--no-<name>` may switch this flag off.
    pub fn is_negatable(&self) -> bool {
        self.flag_type.is_boolean() && self.negatable
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn setter(&self) -> Option<&ObjectSetter> {
        self.setter.as_ref()
    }

    pub(crate) fn merge_fn(&self) -> Option<&ObjectMerge> {
        self.merge.as_ref()
    }

    /// Value used when the flag was not given and is not required.
    pub(crate) fn fallback(&self) -> Option<Value> {
        match &self.default {
            Some(default) => Some(default.resolve()),
            None => self.flag_type.implicit_default(),
        }
    }
}

fn normalize_type(name: &str, kind: TypeDescriptor) -> Result<FlagType> {
    match kind {
        TypeDescriptor::Boolean => Ok(FlagType::Boolean),
        TypeDescriptor::Converter(conv) => Ok(FlagType::Scalar(conv)),
        TypeDescriptor::Object => Ok(FlagType::Object),
        TypeDescriptor::List(mut elements) => {
            if elements.len() != 1 {
                return Err(ArgotError::schema(format!(
                    "flag \"{name}\" is an array with {} element types; exactly one is required",
                    elements.len()
                )));
            }
            match elements.remove(0) {
                TypeDescriptor::Boolean => Ok(FlagType::Array(Element::Boolean)),
                TypeDescriptor::Converter(conv) => Ok(FlagType::Array(Element::Scalar(conv))),
                _ => Err(ArgotError::schema(format!(
                    "flag \"{name}\" has an array element that is not a boolean or converter"
                ))),
            }
        }
    }
}

/// Checks a flag name or alias for reserved characters.
pub(crate) fn validate_name(name: &str, what: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ArgotError::schema(format!("{what} name cannot be empty")));
    }
    if name.starts_with('-') {
        return Err(ArgotError::schema(format!(
            "{what} \"{name}\" must be declared without leading dashes"
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_whitespace() || RESERVED_CHARS.contains(c))
    {
        return Err(ArgotError::schema(format!(
            "{what} \"{name}\" contains the reserved character {c:?}"
        )));
    }
    Ok(())
}

/// An immutable set of flag specs with its alias table.
#[derive(Debug, Clone, Default)]
pub struct FlagSchema {
    specs: Vec<FlagSpec>,
    table: AliasTable,
}

impl FlagSchema {
    /// Normalizes and indexes a list of declared flags.
    pub fn build<I, S>(flags: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, FlagConfig)>,
        S: AsRef<str>,
    {
        let specs = flags
            .into_iter()
            .map(|(name, config)| FlagSpec::normalize(name.as_ref(), config))
            .collect::<Result<Vec<_>>>()?;
        Self::from_specs(specs)
    }

    /// Indexes already normalized specs.
    pub fn from_specs(specs: Vec<FlagSpec>) -> Result<Self> {
        let table = AliasTable::build(&specs)?;
        Ok(Self { specs, table })
    }

    /// Combines two schemas; any spelling claimed by both is a schema error.
    pub fn extend(&self, other: &FlagSchema) -> Result<Self> {
        let specs = self.specs.iter().chain(other.specs.iter()).cloned().collect();
        Self::from_specs(specs)
    }

    pub fn specs(&self) -> &[FlagSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Looks up a spec by canonical key.
    pub fn get(&self, key: &str) -> Option<&FlagSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    /// Resolves a raw flag name (without dashes).
    pub fn resolve(&self, raw: &str) -> Option<Resolved<'_>> {
        self.table.resolve(raw, &self.specs)
    }

    /// Resolves a single short-flag character.
    pub fn resolve_short(&self, c: char) -> Option<&FlagSpec> {
        self.table.lookup_exact(&c.to_string()).map(|i| &self.specs[i])
    }
}
