//! Applications built from TOML schema files.

use argot::config::Config;
use argot::interceptors::CommandHandler;
use argot::{ArgotError, Context, Result};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = r#"
[cli]
name = "pkg"
version = "0.9.0"
strict = true
friendly_errors = false

[flags.verbose]
type = "boolean"
multiple = true
aliases = ["v"]

[[commands]]
name = "install"
aliases = ["i"]
parameters = ["<packages...>"]

[commands.flags.save-dev]
type = "boolean"
aliases = ["D"]

[commands.flags.registry]
pattern = "https?://.+"

[[commands]]
name = "cache clean"
"#;

fn load(content: &str) -> Config {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    Config::load_from_file(file.path()).unwrap()
}

#[test]
fn test_schema_file_parse() {
    let app = load(SCHEMA).into_app(None).unwrap();
    let ctx = app
        .parse(&["i", "-vD", "left-pad", "--registry", "https://r.example", "lodash"])
        .unwrap();

    assert_eq!(ctx.called_as.as_deref(), Some("i"));
    assert_eq!(ctx.flags["verbose"], json!(1));
    assert_eq!(ctx.flags["save-dev"], json!(true));
    assert_eq!(ctx.flags["registry"], json!("https://r.example"));
    assert_eq!(ctx.parameters["packages"], json!(["left-pad", "lodash"]));
}

#[test]
fn test_schema_pattern_rejects() {
    let app = load(SCHEMA).into_app(None).unwrap();
    let err = app
        .parse(&["install", "x", "--registry", "ftp://nope"])
        .unwrap_err();
    assert_eq!(
        err,
        ArgotError::conversion("registry", "ftp://nope", "does not match pattern https?://.+")
    );
}

#[tokio::test]
async fn test_schema_app_runs_shared_handler() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let handler: Arc<dyn CommandHandler> = Arc::new(move |ctx: &mut Context| -> Result<()> {
        sink.lock()
            .unwrap()
            .push(ctx.called_as.clone().unwrap_or_default());
        Ok(())
    });

    let app = load(SCHEMA).into_app(Some(handler)).unwrap();
    app.run(&["cache", "clean"]).await.unwrap();
    app.run(&["install", "a"]).await.unwrap();

    let err = app.run(&["install", "a", "--frozen"]).await.unwrap_err();
    assert_eq!(err, ArgotError::UnknownFlags(vec!["frozen".into()]));

    let err = app.run(&["instal", "a"]).await.unwrap_err();
    assert_eq!(
        err,
        ArgotError::CommandNotFound {
            name: "instal".into(),
            suggestion: Some("install".into()),
        }
    );

    assert_eq!(*calls.lock().unwrap(), vec!["cache clean", "install"]);
}

#[test]
fn test_schema_collision_rejected() {
    let config = load(
        r#"
[[commands]]
name = "cache"

[[commands]]
name = "cache clean"
"#,
    );
    assert!(matches!(config.into_app(None), Err(ArgotError::Schema(_))));
}
