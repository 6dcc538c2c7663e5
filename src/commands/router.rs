//! Command resolution.
//!
//! Maps the leading positional tokens of an invocation to a registered
//! command, preferring the longest matching multi-segment name.

use super::definitions::Command;
use super::registry::CommandRegistry;
use std::sync::Arc;
use tracing::debug;

/// Largest edit distance for which a command name is suggested.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// A resolved command.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub command: Arc<Command>,
    /// The spelling that matched; empty for the root command.
    pub called_as: String,
    /// How many leading positional tokens the name used.
    pub consumed: usize,
}

/// Resolves a command from the leading positional tokens.
///
/// The full sequence is tried first, then one token shorter, and so on. If
/// nothing matches, the root command (if any) is used with nothing consumed.
pub fn resolve<S: AsRef<str>>(registry: &CommandRegistry, leading: &[S]) -> Option<RouteMatch> {
    for n in (1..=leading.len()).rev() {
        let candidate = leading[..n]
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(command) = registry.get(&candidate) {
            debug!(called_as = %candidate, consumed = n, "resolved command");
            return Some(RouteMatch {
                command: command.clone(),
                called_as: candidate,
                consumed: n,
            });
        }
    }

    registry.root().map(|command| {
        debug!("resolved root command");
        RouteMatch {
            command: command.clone(),
            called_as: String::new(),
            consumed: 0,
        }
    })
}

/// Suggests the registered spelling closest to what was typed.
///
/// Each spelling is compared against as many leading tokens as it has
/// segments. Ties go to the spelling registered first.
pub fn suggest<S: AsRef<str>>(spellings: &[String], leading: &[S]) -> Option<String> {
    if leading.is_empty() {
        return None;
    }

    let mut best: Option<(usize, &String)> = None;
    for spelling in spellings {
        let segments = spelling.split(' ').count().min(leading.len());
        let typed = leading[..segments]
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        let distance = strsim::levenshtein(&typed, spelling);
        if distance <= MAX_SUGGESTION_DISTANCE && best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, spelling));
        }
    }

    best.map(|(_, spelling)| spelling.clone())
}
