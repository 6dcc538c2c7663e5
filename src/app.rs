//! Application builder and dispatcher.
//!
//! An [`App`] owns the global flag schema, the command registry and the
//! interceptor links. Running it drives the interceptor chain over the raw
//! tokens: `pre` links wrap everything, then the tokens are resolved and
//! parsed, then `normal` and `post` links run down to the command handler.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::commands::{parameters, router, CommandDef, CommandRegistry};
use crate::context::Context;
use crate::error::{ArgotError, Result};
use crate::flags::{FlagConfig, FlagOptions, FlagSchema, TypeDescriptor};
use crate::interceptors::builtin::{self, FriendlyError, NotFound, SharedWriter, StrictFlags, VersionFlag};
use crate::interceptors::{
    CommandHandler, Enforce, Interceptor, InterceptorChain, InterceptorLink, Next,
};
use crate::parser;

/// Accumulates flags, commands and interceptors until [`AppBuilder::build`].
pub struct AppBuilder {
    name: String,
    version: Option<String>,
    description: String,
    flags: Vec<(String, FlagConfig)>,
    commands: Vec<CommandDef>,
    interceptors: Vec<InterceptorLink>,
    strict: bool,
    friendly_errors: bool,
    suggest_commands: bool,
    stdout: Option<SharedWriter>,
    stderr: Option<SharedWriter>,
}

impl AppBuilder {
    /// Enables the global `--version`/`-V` flag.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declares a global flag, available to every command.
    pub fn flag(mut self, name: impl Into<String>, config: impl Into<FlagConfig>) -> Self {
        self.flags.push((name.into(), config.into()));
        self
    }

    pub fn command(mut self, command: CommandDef) -> Self {
        self.commands.push(command);
        self
    }

    pub fn interceptor<I: Interceptor + 'static>(mut self, enforce: Enforce, interceptor: I) -> Self {
        self.interceptors.push(InterceptorLink::new(enforce, interceptor));
        self
    }

    /// Rejects unknown flags.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Reports errors as `error: ...` with exit code 1 instead of returning them.
    pub fn friendly_errors(mut self) -> Self {
        self.friendly_errors = true;
        self
    }

    /// Suggests a close command name when none matched.
    pub fn suggest_commands(mut self) -> Self {
        self.suggest_commands = true;
        self
    }

    /// Where the version line is written (stdout by default).
    pub fn output(mut self, out: SharedWriter) -> Self {
        self.stdout = Some(out);
        self
    }

    /// Where friendly errors are written (stderr by default).
    pub fn error_output(mut self, out: SharedWriter) -> Self {
        self.stderr = Some(out);
        self
    }

    /// Validates every definition and freezes the application.
    pub fn build(self) -> Result<App> {
        let mut flags = self.flags;
        if self.version.is_some() {
            flags.push((
                "version".to_string(),
                FlagOptions::new(TypeDescriptor::Boolean)
                    .alias("V")
                    .description("Print version information")
                    .into(),
            ));
        }
        let globals = FlagSchema::build(flags)?;

        let mut registry = CommandRegistry::new();
        for def in self.commands {
            registry.register(def.build(&globals)?)?;
        }

        let resolver = Arc::new(Resolver { globals, registry });

        let mut links = Vec::new();
        if self.friendly_errors {
            let out = self.stderr.unwrap_or_else(builtin::stderr);
            links.push(InterceptorLink::new(Enforce::Pre, FriendlyError::with_writer(out)));
        }
        // First of the normal tier: every pre link sees parse errors.
        links.push(InterceptorLink::new(
            Enforce::Normal,
            ParseTokens(Arc::clone(&resolver)),
        ));
        if let Some(version) = &self.version {
            let out = self.stdout.unwrap_or_else(builtin::stdout);
            links.push(InterceptorLink::new(
                Enforce::Normal,
                VersionFlag::with_writer(&self.name, version, out),
            ));
        }
        links.extend(self.interceptors);
        if self.suggest_commands {
            links.push(InterceptorLink::new(
                Enforce::Normal,
                NotFound::new(resolver.registry.spellings()),
            ));
        }
        if self.strict {
            links.push(InterceptorLink::new(Enforce::Normal, StrictFlags));
        }

        info!(
            name = %self.name,
            commands = resolver.registry.commands().len(),
            interceptors = links.len(),
            "built application"
        );

        Ok(App {
            name: self.name,
            version: self.version,
            description: self.description,
            resolver,
            links,
            chain: OnceLock::new(),
        })
    }
}

/// A validated, immutable command-line application.
pub struct App {
    name: String,
    version: Option<String>,
    description: String,
    resolver: Arc<Resolver>,
    links: Vec<InterceptorLink>,
    chain: OnceLock<InterceptorChain>,
}

impl App {
    pub fn builder(name: impl Into<String>) -> AppBuilder {
        AppBuilder {
            name: name.into(),
            version: None,
            description: String::new(),
            flags: Vec::new(),
            commands: Vec::new(),
            interceptors: Vec::new(),
            strict: false,
            friendly_errors: false,
            suggest_commands: false,
            stdout: None,
            stderr: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn globals(&self) -> &FlagSchema {
        &self.resolver.globals
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.resolver.registry
    }

    fn chain(&self) -> &InterceptorChain {
        self.chain
            .get_or_init(|| InterceptorChain::compose(&self.links))
    }

    /// Resolves and parses `tokens` without running anything.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Context> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        self.resolver.parse(tokens)
    }

    /// Runs the interceptor chain over `tokens`, returning the final context.
    ///
    /// Parsing happens inside the chain, so conversion errors reach the
    /// `pre` links like any other error.
    pub async fn dispatch<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Context> {
        let mut ctx = Context {
            tokens: tokens.iter().map(|t| t.as_ref().to_string()).collect(),
            ..Context::default()
        };
        self.chain().run(&mut ctx, &Dispatch).await?;
        Ok(ctx)
    }

    /// Like [`App::dispatch`], returning only the exit code.
    pub async fn run<S: AsRef<str>>(&self, tokens: &[S]) -> Result<i32> {
        self.dispatch(tokens).await.map(|ctx| ctx.exit_code)
    }
}

/// The frozen schema: global flags plus registered commands.
struct Resolver {
    globals: FlagSchema,
    registry: CommandRegistry,
}

impl Resolver {
    /// A first pass against the global flags finds the positional tokens.
    /// The longest prefix of them naming a command is removed, and the rest
    /// is parsed against that command's flags and ignore policy.
    fn parse(&self, tokens: Vec<String>) -> Result<Context> {
        let (scan, positions) = parser::scan(&tokens, &self.globals)?;

        let Some(route) = router::resolve(&self.registry, &scan.parameters) else {
            debug!(parameters = ?scan.parameters, "no command resolved");
            return Ok(Context {
                tokens,
                flags: scan.flags.clone(),
                raw: scan,
                ..Context::default()
            });
        };

        let consumed = positions.get(..route.consumed).unwrap_or_default();
        let rest: Vec<&str> = tokens
            .iter()
            .enumerate()
            .filter(|(i, _)| !consumed.contains(i))
            .map(|(_, token)| token.as_str())
            .collect();

        let mut policy = route.command.ignore_policy();
        let raw = parser::parse_with(&rest, route.command.flags(), &mut *policy)?;
        let (parameters, missing_parameters) =
            parameters::bind(route.command.parameters(), &raw.parameters)?;

        Ok(Context {
            tokens,
            resolved: true,
            command: Some(route.command),
            called_as: Some(route.called_as),
            parameters,
            flags: raw.flags.clone(),
            raw,
            missing_parameters,
            exit_code: 0,
        })
    }
}

/// Resolves and parses `ctx.tokens`, replacing the context before the rest
/// of the chain runs.
struct ParseTokens(Arc<Resolver>);

#[async_trait]
impl Interceptor for ParseTokens {
    async fn intercept(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        let parsed = self.0.parse(ctx.tokens.clone())?;
        let exit_code = ctx.exit_code;
        *ctx = parsed;
        ctx.exit_code = exit_code;
        next.run(ctx).await
    }
}

/// The end of every chain: final checks, then the command handler.
struct Dispatch;

#[async_trait]
impl CommandHandler for Dispatch {
    async fn handle(&self, ctx: &mut Context) -> Result<()> {
        let Some(command) = ctx.command.clone() else {
            return Err(match ctx.raw.parameters.first() {
                None => ArgotError::NoCommandGiven,
                Some(name) => ArgotError::CommandNotFound {
                    name: name.clone(),
                    suggestion: None,
                },
            });
        };

        if !ctx.raw.missing_required_flags.is_empty() {
            return Err(ArgotError::MissingRequiredFlags(
                ctx.raw.missing_required_flags.clone(),
            ));
        }
        if let Some(missing) = ctx.missing_parameters.first() {
            return Err(ArgotError::MissingParameter(missing.clone()));
        }

        match command.handler() {
            Some(handler) => {
                debug!(command = %command.name(), "running handler");
                handler.handle(ctx).await
            }
            None => {
                debug!(command = %command.name(), "command has no handler");
                Ok(())
            }
        }
    }
}
