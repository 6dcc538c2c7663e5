//! Command definitions.
//!
//! A [`CommandDef`] is the builder-side description of a command. It is
//! normalized into an immutable [`Command`] when the application is built,
//! with its flags merged on top of the global flags.

use super::parameters::{self, ParameterSpec};
use crate::error::{ArgotError, Result};
use crate::flags::{Converter, FlagConfig, FlagSchema};
use crate::interceptors::CommandHandler;
use crate::parser::ignore::{IgnoreFactory, IgnorePolicy, Never};
use std::fmt;
use std::sync::Arc;

/// The name a command is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandName {
    /// The command run when no name is given.
    Root,
    /// One or more space-separated segments, e.g. `remote add`.
    Named(String),
}

impl CommandName {
    /// Normalizes a name: segments are split on whitespace and re-joined with
    /// single spaces. An empty name is rejected; use [`CommandName::Root`].
    pub fn named(raw: &str) -> Result<Self> {
        let segments: Vec<&str> = raw.split_whitespace().collect();
        if segments.is_empty() {
            return Err(ArgotError::schema(
                "command name cannot be empty; register a root command instead",
            ));
        }
        if let Some(bad) = segments.iter().find(|s| s.starts_with('-')) {
            return Err(ArgotError::schema(format!(
                "command name \"{raw}\" has a segment starting with a dash: {bad}"
            )));
        }
        Ok(Self::Named(segments.join(" ")))
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// The name as matched against tokens; empty for the root command.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Root => "",
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "<root>"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Builder for one command.
#[derive(Clone)]
pub struct CommandDef {
    name: Option<String>,
    aliases: Vec<String>,
    description: String,
    flags: Vec<(String, FlagConfig)>,
    parameters: Vec<(String, Option<Converter>)>,
    handler: Option<Arc<dyn CommandHandler>>,
    ignore: Option<IgnoreFactory>,
}

impl CommandDef {
    /// Starts a named command (`"build"`, `"remote add"`).
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_name(Some(name.into()))
    }

    /// Starts the root command.
    pub fn root() -> Self {
        Self::with_name(None)
    }

    fn with_name(name: Option<String>) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            description: String::new(),
            flags: Vec::new(),
            parameters: Vec::new(),
            handler: None,
            ignore: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declares a command-local flag.
    pub fn flag(mut self, name: impl Into<String>, config: impl Into<FlagConfig>) -> Self {
        self.flags.push((name.into(), config.into()));
        self
    }

    /// Declares a positional parameter such as `<input>` or `[rest...]`.
    pub fn parameter(mut self, declaration: impl Into<String>) -> Self {
        self.parameters.push((declaration.into(), None));
        self
    }

    /// Declares a positional parameter whose values are converted.
    pub fn parameter_with(mut self, declaration: impl Into<String>, converter: Converter) -> Self {
        self.parameters.push((declaration.into(), Some(converter)));
        self
    }

    pub fn handler<H: CommandHandler + 'static>(self, handler: H) -> Self {
        self.shared_handler(Arc::new(handler))
    }

    /// Uses an already shared handler, e.g. one handler for several commands.
    pub fn shared_handler(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Sets the ignore policy used when parsing this command's tokens.
    pub fn ignore(mut self, factory: IgnoreFactory) -> Self {
        self.ignore = Some(factory);
        self
    }

    /// Normalizes the definition against the application's global flags.
    pub(crate) fn build(self, globals: &FlagSchema) -> Result<Command> {
        let name = match &self.name {
            Some(raw) => CommandName::named(raw)?,
            None => CommandName::Root,
        };

        if name.is_root() && !self.aliases.is_empty() {
            return Err(ArgotError::schema("the root command cannot have aliases"));
        }

        let mut aliases: Vec<String> = Vec::new();
        for raw in &self.aliases {
            let CommandName::Named(alias) = CommandName::named(raw)? else {
                continue;
            };
            if alias != name.as_str() && !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }

        let local = FlagSchema::build(self.flags).map_err(|e| in_command(&name, e))?;
        let flags = globals.extend(&local).map_err(|e| in_command(&name, e))?;

        let parameters = self
            .parameters
            .into_iter()
            .map(|(decl, converter)| {
                let spec = ParameterSpec::parse(&decl)?;
                Ok(match converter {
                    Some(conv) => spec.with_converter(conv),
                    None => spec,
                })
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| in_command(&name, e))?;
        parameters::validate(&parameters).map_err(|e| in_command(&name, e))?;

        Ok(Command {
            name,
            aliases,
            description: self.description,
            flags,
            parameters,
            handler: self.handler,
            ignore: self.ignore,
        })
    }
}

fn in_command(name: &CommandName, err: ArgotError) -> ArgotError {
    match err {
        ArgotError::Schema(msg) => ArgotError::schema(format!("command {name}: {msg}")),
        other => other,
    }
}

/// A registered, immutable command.
pub struct Command {
    name: CommandName,
    aliases: Vec<String>,
    description: String,
    flags: FlagSchema,
    parameters: Vec<ParameterSpec>,
    handler: Option<Arc<dyn CommandHandler>>,
    ignore: Option<IgnoreFactory>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("flags", &self.flags.specs().len())
            .field("parameters", &self.parameters)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl Command {
    pub fn name(&self) -> &CommandName {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Global plus command-local flags.
    pub fn flags(&self) -> &FlagSchema {
        &self.flags
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn handler(&self) -> Option<&Arc<dyn CommandHandler>> {
        self.handler.as_ref()
    }

    /// Every spelling this command answers to; empty for the root command.
    pub fn spellings(&self) -> Vec<&str> {
        match &self.name {
            CommandName::Root => Vec::new(),
            CommandName::Named(name) => std::iter::once(name.as_str())
                .chain(self.aliases.iter().map(String::as_str))
                .collect(),
        }
    }

    /// A fresh ignore policy for one parse.
    pub fn ignore_policy(&self) -> Box<dyn IgnorePolicy + Send> {
        match &self.ignore {
            Some(make) => make(),
            None => Box::new(Never),
        }
    }
}
