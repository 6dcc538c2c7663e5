//! The set of registered commands.

use super::definitions::Command;
use crate::error::{ArgotError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registered commands indexed by every name and alias.
///
/// No two spellings may stand in a segment-prefix relation: with `remote`
/// registered, `remote add` is rejected (and the other way round), since the
/// resolver could never tell a parameter from a sub-command.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<Command>>,
    spellings: HashMap<String, usize>,
    root: Option<usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command. On error the registry is left unchanged.
    pub fn register(&mut self, command: Command) -> Result<()> {
        if command.name().is_root() {
            if self.root.is_some() {
                return Err(ArgotError::schema("a root command is already registered"));
            }
            self.root = Some(self.commands.len());
            self.commands.push(Arc::new(command));
            debug!("registered root command");
            return Ok(());
        }

        let new: Vec<&str> = command.spellings();
        for (i, name) in new.iter().enumerate() {
            for other in &new[..i] {
                if prefix_related(name, other) {
                    return Err(ArgotError::schema(format!(
                        "command \"{name}\" conflicts with its own alias \"{other}\""
                    )));
                }
            }
            for existing in self.spellings.keys() {
                if prefix_related(name, existing) {
                    return Err(ArgotError::schema(format!(
                        "command \"{name}\" conflicts with registered command \"{existing}\""
                    )));
                }
            }
        }

        let index = self.commands.len();
        for name in &new {
            self.spellings.insert(name.to_string(), index);
        }
        debug!(name = %command.name(), aliases = command.aliases().len(), "registered command");
        self.commands.push(Arc::new(command));
        Ok(())
    }

    /// Looks up a command by exact (space-joined) spelling.
    pub fn get(&self, spelling: &str) -> Option<&Arc<Command>> {
        self.spellings.get(spelling).map(|&i| &self.commands[i])
    }

    pub fn root(&self) -> Option<&Arc<Command>> {
        self.root.map(|i| &self.commands[i])
    }

    pub fn commands(&self) -> &[Arc<Command>] {
        &self.commands
    }

    /// Every registered spelling, in registration order.
    pub fn spellings(&self) -> Vec<String> {
        self.commands
            .iter()
            .flat_map(|c| c.spellings().into_iter().map(str::to_string))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// True if one name's segments are a prefix of the other's (or equal).
fn prefix_related(a: &str, b: &str) -> bool {
    let a: Vec<&str> = a.split(' ').collect();
    let b: Vec<&str> = b.split(' ').collect();
    let n = a.len().min(b.len());
    a[..n] == b[..n]
}
