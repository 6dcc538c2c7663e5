//! Argot - command-line parsing and dispatch, driven by a TOML schema.

mod cli;

use anyhow::{Context as _, Result};
use argot::config::Config;
use argot::error::ArgotError;
use argot::interceptors::CommandHandler;
use argot::logging;
use argot::Context;
use cli::{Cli, Mode};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    logging::init_stderr_logging(&cli.log_level);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let path = cli.schema_path();
    info!("Loading schema from: {}", path.display());
    let config = Config::load_from_file(&path)?;

    match cli.mode {
        Mode::Check => {
            let app = config
                .into_app(None)
                .with_context(|| format!("invalid schema {}", path.display()))?;
            println!(
                "{}: ok ({} commands, {} global flags)",
                path.display(),
                app.registry().commands().len(),
                app.globals().specs().len()
            );
            Ok(0)
        }
        Mode::Parse { tokens } => {
            let app = config.into_app(None)?;
            let ctx = app.parse(&tokens)?;
            println!("{}", serde_json::to_string_pretty(&ctx)?);
            Ok(0)
        }
        Mode::Run { tokens } => {
            let handler: Arc<dyn CommandHandler> = Arc::new(print_context);
            let app = config.into_app(Some(handler))?;
            Ok(app.run(&tokens).await?)
        }
    }
}

/// Handler used by `run`: prints what the command would have received.
fn print_context(ctx: &mut Context) -> argot::Result<()> {
    let json = serde_json::to_string_pretty(ctx)
        .map_err(|e| ArgotError::internal(format!("failed to serialize context: {e}")))?;
    println!("{json}");
    Ok(())
}
