//! Declarative CLI schemas.
//!
//! An application can be described in a TOML file instead of code:
//!
//! ```toml
//! [cli]
//! name = "tool"
//! version = "1.0.0"
//! strict = true
//!
//! [flags.verbose]
//! type = "boolean"
//! multiple = true
//! aliases = ["v"]
//!
//! [[commands]]
//! name = "remote add"
//! parameters = ["<name>", "[url]"]
//!
//! [commands.flags.fetch]
//! type = "boolean"
//! ```

use crate::app::App;
use crate::commands::CommandDef;
use crate::error::{ArgotError, Result};
use crate::flags::{Converter, FlagConfig, FlagOptions, TypeDescriptor};
use crate::interceptors::CommandHandler;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A whole application schema.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub cli: CliSection,

    /// Global flags by name.
    #[serde(default)]
    pub flags: BTreeMap<String, FlagEntry>,

    #[serde(default)]
    pub commands: Vec<CommandEntry>,
}

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSection {
    #[serde(default = "default_name")]
    pub name: String,

    pub version: Option<String>,

    #[serde(default)]
    pub description: String,

    /// Reject unknown flags.
    #[serde(default)]
    pub strict: bool,

    /// Suggest close command names on a typo.
    #[serde(default = "default_true")]
    pub suggest: bool,

    /// Report errors as a single line and exit code 1.
    #[serde(default)]
    pub friendly_errors: bool,
}

fn default_name() -> String {
    "app".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CliSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: None,
            description: String::new(),
            strict: false,
            suggest: default_true(),
            friendly_errors: false,
        }
    }
}

/// Value type of a flag entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Boolean,
    #[default]
    String,
    Integer,
    Number,
    Object,
}

/// One flag as written in the schema file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlagEntry {
    #[serde(rename = "type", default)]
    pub kind: FlagKind,

    /// Repeatable: values are collected, booleans are counted.
    #[serde(default)]
    pub multiple: bool,

    #[serde(default)]
    pub aliases: Vec<String>,

    pub default: Option<serde_json::Value>,

    #[serde(default)]
    pub required: bool,

    pub negatable: Option<bool>,

    /// Allowed values of a string flag.
    #[serde(default)]
    pub choices: Vec<String>,

    /// Anchored regular expression a string flag must match.
    pub pattern: Option<String>,

    #[serde(default)]
    pub description: String,
}

impl FlagEntry {
    /// Converts the entry into a flag declaration.
    pub fn to_flag_config(&self, name: &str) -> Result<FlagConfig> {
        let restricted = !self.choices.is_empty() || self.pattern.is_some();
        if restricted && self.kind != FlagKind::String {
            return Err(ArgotError::config(format!(
                "flag \"{name}\": choices and pattern only apply to string flags"
            )));
        }

        let element: TypeDescriptor = match self.kind {
            FlagKind::Boolean => TypeDescriptor::Boolean,
            FlagKind::Object => TypeDescriptor::Object,
            FlagKind::Integer => Converter::integer().into(),
            FlagKind::Number => Converter::number().into(),
            FlagKind::String => match (&self.pattern, self.choices.is_empty()) {
                (Some(_), false) => {
                    return Err(ArgotError::config(format!(
                        "flag \"{name}\": use either choices or pattern, not both"
                    )))
                }
                (Some(pattern), true) => Converter::pattern(pattern)
                    .map_err(|e| ArgotError::config(format!("flag \"{name}\": {e}")))?
                    .into(),
                (None, false) => Converter::choice(self.choices.iter().cloned()).into(),
                (None, true) => Converter::string().into(),
            },
        };

        let kind = if self.multiple {
            if self.kind == FlagKind::Object {
                return Err(ArgotError::config(format!(
                    "flag \"{name}\": object flags cannot be multiple"
                )));
            }
            TypeDescriptor::list(element)
        } else {
            element
        };

        let mut options = FlagOptions::new(kind).description(self.description.clone());
        for alias in &self.aliases {
            options = options.alias(alias.clone());
        }
        if let Some(default) = &self.default {
            options = options.default_value(default.clone());
        }
        if self.required {
            options = options.required();
        }
        if let Some(negatable) = self.negatable {
            options = options.negatable(negatable);
        }

        Ok(options.into())
    }
}

/// One command as written in the schema file. Without a name it is the
/// root command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandEntry {
    pub name: Option<String>,

    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub description: String,

    /// Declarations such as `<input>` or `[files...]`.
    #[serde(default)]
    pub parameters: Vec<String>,

    #[serde(default)]
    pub flags: BTreeMap<String, FlagEntry>,
}

impl CommandEntry {
    fn to_command_def(&self, handler: Option<&Arc<dyn CommandHandler>>) -> Result<CommandDef> {
        let mut def = match self.name.as_deref() {
            None | Some("") => CommandDef::root(),
            Some(name) => CommandDef::new(name),
        };
        def = def.description(self.description.clone());
        for alias in &self.aliases {
            def = def.alias(alias.clone());
        }
        for parameter in &self.parameters {
            def = def.parameter(parameter.clone());
        }
        for (name, entry) in &self.flags {
            def = def.flag(name.clone(), entry.to_flag_config(name)?);
        }
        if let Some(handler) = handler {
            def = def.shared_handler(handler.clone());
        }
        Ok(def)
    }
}

impl Config {
    /// Returns the default schema path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("argot")
            .join("schema.toml")
    }

    /// Loads a schema from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ArgotError::config(format!("Failed to read {}: {e}", path.display()))
        })?;

        Self::parse_toml(&content, path)
    }

    /// Parses a schema from a TOML string.
    pub fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ArgotError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Builds the application. `handler`, if given, runs for every command.
    pub fn into_app(&self, handler: Option<Arc<dyn CommandHandler>>) -> Result<App> {
        let mut builder = App::builder(self.cli.name.clone()).description(self.cli.description.clone());

        if let Some(version) = &self.cli.version {
            builder = builder.version(version.clone());
        }
        for (name, entry) in &self.flags {
            builder = builder.flag(name.clone(), entry.to_flag_config(name)?);
        }
        for entry in &self.commands {
            builder = builder.command(entry.to_command_def(handler.as_ref())?);
        }
        if self.cli.strict {
            builder = builder.strict();
        }
        if self.cli.suggest {
            builder = builder.suggest_commands();
        }
        if self.cli.friendly_errors {
            builder = builder.friendly_errors();
        }

        builder.build()
    }
}
