//! Interceptors shipped with the crate.

use super::{Interceptor, Next};
use crate::commands::suggest;
use crate::context::Context;
use crate::error::{ArgotError, Result};
use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Shared output sink for interceptors that print.
pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;

pub fn stdout() -> SharedWriter {
    Arc::new(Mutex::new(io::stdout()))
}

pub fn stderr() -> SharedWriter {
    Arc::new(Mutex::new(io::stderr()))
}

fn write_line(out: &SharedWriter, line: &str) -> Result<()> {
    let mut out = out
        .lock()
        .map_err(|_| ArgotError::internal("output writer lock poisoned"))?;
    writeln!(out, "{line}").map_err(|e| ArgotError::internal(format!("failed to write output: {e}")))
}

/// Prints `name version` and stops when the `version` flag is set.
pub struct VersionFlag {
    line: String,
    out: SharedWriter,
}

impl VersionFlag {
    pub fn new(name: &str, version: &str) -> Self {
        Self::with_writer(name, version, stdout())
    }

    pub fn with_writer(name: &str, version: &str, out: SharedWriter) -> Self {
        Self {
            line: format!("{name} {version}"),
            out,
        }
    }
}

#[async_trait]
impl Interceptor for VersionFlag {
    async fn intercept(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        if ctx.flag_enabled("version") {
            return write_line(&self.out, &self.line);
        }
        next.run(ctx).await
    }
}

/// Turns any error from the rest of the chain into a one-line message and
/// exit code 1.
pub struct FriendlyError {
    out: SharedWriter,
}

impl FriendlyError {
    pub fn new() -> Self {
        Self::with_writer(stderr())
    }

    pub fn with_writer(out: SharedWriter) -> Self {
        Self { out }
    }
}

impl Default for FriendlyError {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interceptor for FriendlyError {
    async fn intercept(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        match next.run(ctx).await {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!(category = e.category(), "reporting error");
                write_line(&self.out, &format!("error: {e}"))?;
                ctx.exit_code = 1;
                Ok(())
            }
        }
    }
}

/// Raises a resolution error with a suggestion when no command matched.
pub struct NotFound {
    spellings: Vec<String>,
}

impl NotFound {
    /// `spellings` are the registered names and aliases suggestions come from.
    pub fn new(spellings: Vec<String>) -> Self {
        Self { spellings }
    }
}

#[async_trait]
impl Interceptor for NotFound {
    async fn intercept(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        if ctx.resolved {
            return next.run(ctx).await;
        }
        let Some(name) = ctx.raw.parameters.first() else {
            return Err(ArgotError::NoCommandGiven);
        };
        Err(ArgotError::CommandNotFound {
            name: name.clone(),
            suggestion: suggest(&self.spellings, &ctx.raw.parameters),
        })
    }
}

/// Rejects invocations with unknown flags.
#[derive(Debug, Default)]
pub struct StrictFlags;

#[async_trait]
impl Interceptor for StrictFlags {
    async fn intercept(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        if !ctx.raw.unknown.is_empty() {
            let names: Vec<String> = ctx.raw.unknown.keys().cloned().collect();
            warn!(unknown = ?names, "rejecting unknown flags");
            return Err(ArgotError::UnknownFlags(names));
        }
        next.run(ctx).await
    }
}
