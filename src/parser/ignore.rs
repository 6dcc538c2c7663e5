//! Pluggable ignore policies.
//!
//! The parser asks the policy once per token, in order, before interpreting
//! it. Tokens the policy accepts are moved to `ignored` untouched. Policies may
//! keep state across calls, which is how a "stop here" cut-off is expressed.

use serde::Serialize;
use std::sync::Arc;

/// What the parser would do with a token if it were not ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// A flag (or bundle starting with a flag) that resolves in the schema.
    KnownFlag,
    /// A flag-shaped token that does not resolve.
    UnknownFlag,
    /// A positional parameter.
    Parameter,
    /// The `--` separator.
    DoubleDash,
}

/// Decides whether a token should be skipped by the parser.
pub trait IgnorePolicy {
    fn ignore(&mut self, class: Classification, token: &str) -> bool;
}

impl<F> IgnorePolicy for F
where
    F: FnMut(Classification, &str) -> bool,
{
    fn ignore(&mut self, class: Classification, token: &str) -> bool {
        self(class, token)
    }
}

/// Builds a fresh policy for each parse.
pub type IgnoreFactory = Arc<dyn Fn() -> Box<dyn IgnorePolicy + Send> + Send + Sync>;

/// A policy that never ignores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl IgnorePolicy for Never {
    fn ignore(&mut self, _class: Classification, _token: &str) -> bool {
        false
    }
}

/// Ignores the first positional parameter and everything after it.
///
/// Used by commands that forward their remaining arguments to another
/// program, so the child's flags are not read as this command's flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct AfterFirstParameter {
    stopped: bool,
}

impl IgnorePolicy for AfterFirstParameter {
    fn ignore(&mut self, class: Classification, _token: &str) -> bool {
        if class == Classification::Parameter {
            self.stopped = true;
        }
        self.stopped
    }
}

/// Ignores everything after `limit` known flags have been read.
#[derive(Debug, Clone, Copy)]
pub struct AfterKnownFlags {
    limit: usize,
    seen: usize,
}

impl IgnorePolicy for AfterKnownFlags {
    fn ignore(&mut self, class: Classification, _token: &str) -> bool {
        if self.seen >= self.limit {
            return true;
        }
        if class == Classification::KnownFlag {
            self.seen += 1;
        }
        false
    }
}

/// See [`AfterFirstParameter`].
pub fn after_first_parameter() -> AfterFirstParameter {
    AfterFirstParameter::default()
}

/// See [`AfterKnownFlags`].
pub fn after_known_flags(limit: usize) -> AfterKnownFlags {
    AfterKnownFlags { limit, seen: 0 }
}

/// Wraps a policy constructor as a per-parse factory.
pub fn factory<P, F>(make: F) -> IgnoreFactory
where
    P: IgnorePolicy + Send + 'static,
    F: Fn() -> P + Send + Sync + 'static,
{
    Arc::new(move || Box::new(make()) as Box<dyn IgnorePolicy + Send>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_first_parameter_latches() {
        let mut policy = after_first_parameter();
        assert!(!policy.ignore(Classification::KnownFlag, "--x"));
        assert!(policy.ignore(Classification::Parameter, "child"));
        assert!(policy.ignore(Classification::KnownFlag, "--x"));
        assert!(policy.ignore(Classification::DoubleDash, "--"));
    }

    #[test]
    fn test_after_known_flags() {
        let mut policy = after_known_flags(1);
        assert!(!policy.ignore(Classification::Parameter, "a"));
        assert!(!policy.ignore(Classification::UnknownFlag, "--u"));
        assert!(!policy.ignore(Classification::KnownFlag, "--k"));
        assert!(policy.ignore(Classification::Parameter, "b"));
    }

    #[test]
    fn test_closure_policy() {
        let mut calls = Vec::new();
        let mut policy = |class: Classification, token: &str| {
            calls.push((class, token.to_string()));
            token == "skip"
        };
        assert!(!policy.ignore(Classification::Parameter, "keep"));
        assert!(policy.ignore(Classification::Parameter, "skip"));
        drop(policy);
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn test_factory_builds_fresh_state() {
        let make = factory(after_first_parameter);
        let mut first = make();
        assert!(first.ignore(Classification::Parameter, "a"));
        let mut second = make();
        assert!(!second.ignore(Classification::KnownFlag, "--x"));
    }
}
