//! Dispatch through the interceptor chain.

use argot::commands::CommandDef;
use argot::flags::{Converter, FlagOptions, TypeDescriptor};
use argot::interceptors::builtin::SharedWriter;
use argot::interceptors::{CommandHandler, Enforce, Interceptor, Next};
use argot::{App, ArgotError, Context, Result};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Stores the context the handler was called with.
#[derive(Clone, Default)]
struct Capture {
    seen: Arc<Mutex<Option<Context>>>,
}

impl Capture {
    fn taken(&self) -> Option<Context> {
        self.seen.lock().unwrap().take()
    }
}

#[async_trait]
impl CommandHandler for Capture {
    async fn handle(&self, ctx: &mut Context) -> Result<()> {
        tokio::task::yield_now().await;
        *self.seen.lock().unwrap() = Some(ctx.clone());
        Ok(())
    }
}

/// Ends the chain when `--dry-run` is set.
struct DryRun;

#[async_trait]
impl Interceptor for DryRun {
    async fn intercept(&self, ctx: &mut Context, next: Next<'_>) -> Result<()> {
        if ctx.flag_enabled("dry-run") {
            ctx.exit_code = 3;
            return Ok(());
        }
        next.run(ctx).await
    }
}

fn buffer() -> (Arc<Mutex<Vec<u8>>>, SharedWriter) {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let writer: SharedWriter = buf.clone();
    (buf, writer)
}

fn text(buf: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(buf.lock().unwrap().clone()).unwrap()
}

fn app(capture: &Capture) -> App {
    App::builder("deploy")
        .flag("dry-run", TypeDescriptor::Boolean)
        .command(
            CommandDef::new("push")
                .flag("target", FlagOptions::new(Converter::string()).required())
                .flag("replicas", FlagOptions::new(Converter::integer()).default_value(1))
                .parameter("<service>")
                .parameter("[extra...]")
                .handler(capture.clone()),
        )
        .command(CommandDef::new("status").handler(capture.clone()))
        .interceptor(Enforce::Normal, DryRun)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_handler_receives_typed_context() {
    let capture = Capture::default();
    let code = app(&capture)
        .run(&["push", "api", "--target", "prod", "--replicas=3", "a", "b"])
        .await
        .unwrap();
    assert_eq!(code, 0);

    let ctx = capture.taken().unwrap();
    assert_eq!(ctx.called_as.as_deref(), Some("push"));
    assert_eq!(ctx.flags["target"], json!("prod"));
    assert_eq!(ctx.flags["replicas"], json!(3));
    assert_eq!(ctx.parameters["service"], json!("api"));
    assert_eq!(ctx.parameters["extra"], json!(["a", "b"]));
}

#[tokio::test]
async fn test_interceptor_short_circuits() {
    let capture = Capture::default();
    let code = app(&capture)
        .run(&["--dry-run", "push", "api", "--target", "prod"])
        .await
        .unwrap();
    assert_eq!(code, 3);
    assert!(capture.taken().is_none());
}

#[tokio::test]
async fn test_required_flag_enforced_at_dispatch() {
    let capture = Capture::default();
    let app = app(&capture);

    let ctx = app.parse(&["push", "api"]).unwrap();
    assert_eq!(ctx.raw.missing_required_flags, vec!["target"]);
    assert!(ctx.flags.get("target").is_none());

    let err = app.run(&["push", "api"]).await.unwrap_err();
    assert_eq!(err, ArgotError::MissingRequiredFlags(vec!["target".into()]));
    assert!(capture.taken().is_none());
}

#[tokio::test]
async fn test_missing_parameter() {
    let capture = Capture::default();
    let err = app(&capture)
        .run(&["push", "--target", "prod"])
        .await
        .unwrap_err();
    assert_eq!(err, ArgotError::MissingParameter("<service>".into()));
}

#[tokio::test]
async fn test_strict_mode_rejects_unknown_flags() {
    let capture = Capture::default();
    let app = App::builder("deploy")
        .command(CommandDef::new("status").handler(capture.clone()))
        .strict()
        .build()
        .unwrap();

    let err = app.run(&["status", "--verbose"]).await.unwrap_err();
    assert_eq!(err, ArgotError::UnknownFlags(vec!["verbose".into()]));
    assert!(capture.taken().is_none());

    app.run(&["status"]).await.unwrap();
    assert!(capture.taken().is_some());
}

#[tokio::test]
async fn test_friendly_errors_with_suggestion() {
    let (buf, writer) = buffer();
    let app = App::builder("deploy")
        .command(CommandDef::new("status"))
        .command(CommandDef::new("push"))
        .suggest_commands()
        .friendly_errors()
        .error_output(writer)
        .build()
        .unwrap();

    let code = app.run(&["stauts"]).await.unwrap();
    assert_eq!(code, 1);
    assert_eq!(
        text(&buf),
        "error: Command \"stauts\" not found. Did you mean \"status\"?\n"
    );
}

#[tokio::test]
async fn test_friendly_errors_report_bad_values() {
    let (buf, writer) = buffer();
    let app = App::builder("tool")
        .command(CommandDef::new("serve").flag("port", Converter::integer()))
        .friendly_errors()
        .error_output(writer)
        .build()
        .unwrap();

    let code = app.run(&["serve", "--port", "high"]).await.unwrap();
    assert_eq!(code, 1);
    assert_eq!(
        text(&buf),
        "error: Invalid value \"high\" for port: expected an integer\n"
    );
}

#[tokio::test]
async fn test_local_boolean_before_command_name() {
    let capture = Capture::default();
    let app = App::builder("tool")
        .command(
            CommandDef::new("deploy")
                .flag("force", TypeDescriptor::Boolean)
                .handler(capture.clone()),
        )
        .build()
        .unwrap();

    for tokens in [["deploy", "--force"], ["--force", "deploy"]] {
        app.run(&tokens).await.unwrap();
        let ctx = capture.taken().unwrap();
        assert_eq!(ctx.called_as.as_deref(), Some("deploy"));
        assert_eq!(ctx.flags["force"], json!(true));
        assert!(ctx.raw.unknown.is_empty());
    }
}

#[tokio::test]
async fn test_no_command_given() {
    let app = App::builder("deploy")
        .command(CommandDef::new("status"))
        .build()
        .unwrap();
    assert_eq!(
        app.run::<&str>(&[]).await.unwrap_err(),
        ArgotError::NoCommandGiven
    );
}

#[tokio::test]
async fn test_root_command_runs_without_name() {
    let capture = Capture::default();
    let app = App::builder("cat")
        .command(
            CommandDef::root()
                .parameter("[files...]")
                .handler(capture.clone()),
        )
        .build()
        .unwrap();

    app.run(&["a.txt", "b.txt"]).await.unwrap();
    let ctx = capture.taken().unwrap();
    assert_eq!(ctx.called_as.as_deref(), Some(""));
    assert_eq!(ctx.parameters["files"], json!(["a.txt", "b.txt"]));
}

#[tokio::test]
async fn test_version_flag() {
    let (buf, writer) = buffer();
    let capture = Capture::default();
    let app = App::builder("deploy")
        .version("1.4.0")
        .command(CommandDef::new("status").handler(capture.clone()))
        .output(writer)
        .build()
        .unwrap();

    app.run(&["-V"]).await.unwrap();
    assert_eq!(text(&buf), "deploy 1.4.0\n");

    app.run(&["status", "--version"]).await.unwrap();
    assert_eq!(text(&buf), "deploy 1.4.0\ndeploy 1.4.0\n");
    assert!(capture.taken().is_none());
}

#[test]
fn test_closure_handler_blocking() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let app = App::builder("echo")
        .command(CommandDef::root().parameter("[words...]").handler(
            move |ctx: &mut Context| -> Result<()> {
                sink.lock().unwrap().push(ctx.raw.parameters.join(" "));
                Ok(())
            },
        ))
        .build()
        .unwrap();

    let code = tokio_test::block_on(app.run(&["hello", "world"])).unwrap();
    assert_eq!(code, 0);
    assert_eq!(*seen.lock().unwrap(), vec!["hello world"]);
}
