//! Parsing behavior through a built application.

use argot::commands::CommandDef;
use argot::flags::{Converter, FlagOptions, TypeDescriptor};
use argot::parser::ignore;
use argot::{App, ArgotError};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn app() -> App {
    App::builder("git")
        .flag(
            "verbose",
            FlagOptions::new(TypeDescriptor::list(TypeDescriptor::Boolean)).alias("v"),
        )
        .flag("color", TypeDescriptor::Boolean)
        .flag("config", FlagOptions::new(TypeDescriptor::Object).alias("c"))
        .command(
            CommandDef::new("remote add")
                .flag(
                    "tag",
                    FlagOptions::new(TypeDescriptor::list(Converter::string())).alias("t"),
                )
                .parameter("<name>")
                .parameter("[url]"),
        )
        .command(
            CommandDef::new("remote remove")
                .alias("remote rm")
                .parameter("<name>"),
        )
        .command(
            CommandDef::new("exec")
                .parameter("[argv...]")
                .ignore(ignore::factory(ignore::after_first_parameter)),
        )
        .build()
        .unwrap()
}

#[test]
fn test_longest_prefix_command_match() {
    let app = app();

    let ctx = app.parse(&["remote", "add", "origin", "url"]).unwrap();
    assert_eq!(ctx.called_as.as_deref(), Some("remote add"));
    assert_eq!(ctx.raw.parameters, vec!["origin", "url"]);

    let ctx = app.parse(&["remote", "rm", "origin"]).unwrap();
    assert_eq!(ctx.called_as.as_deref(), Some("remote rm"));
    assert_eq!(ctx.parameters["name"], json!("origin"));

    let ctx = app.parse(&["remote", "list"]).unwrap();
    assert!(!ctx.resolved);
    assert_eq!(ctx.raw.parameters, vec!["remote", "list"]);
}

#[test]
fn test_flags_interleave_with_command_name() {
    let ctx = app()
        .parse(&["-v", "remote", "--color", "add", "-vt", "x", "origin"])
        .unwrap();
    assert_eq!(ctx.called_as.as_deref(), Some("remote add"));
    assert_eq!(ctx.flags["verbose"], json!(2));
    assert_eq!(ctx.flags["color"], json!(true));
    assert_eq!(ctx.flags["tag"], json!(["x"]));
    assert_eq!(ctx.parameters["name"], json!("origin"));
}

#[test]
fn test_order_preserved() {
    let ctx = app()
        .parse(&["remote", "add", "-t", "b", "origin", "--tag=a", "-t", "b", "url"])
        .unwrap();
    assert_eq!(ctx.flags["tag"], json!(["b", "a", "b"]));
    assert_eq!(ctx.raw.parameters, vec!["origin", "url"]);
}

#[test]
fn test_double_dash_is_opaque() {
    let ctx = app()
        .parse(&["remote", "add", "origin", "--", "--tag", "x", "-v", "--"])
        .unwrap();
    assert_eq!(ctx.raw.double_dash, vec!["--tag", "x", "-v", "--"]);
    assert_eq!(ctx.flags["tag"], json!([]));
    assert_eq!(ctx.flags["verbose"], json!(0));
    assert!(ctx.raw.unknown.is_empty());
}

fn color(app: &App, tokens: &[&str]) -> Value {
    app.parse(tokens).unwrap().flags["color"].clone()
}

#[test]
fn test_negation_round_trip() {
    let app = app();
    assert_eq!(color(&app, &["exec"]), json!(false));
    assert_eq!(color(&app, &["--color", "exec"]), json!(true));
    assert_eq!(color(&app, &["--no-color", "exec"]), json!(false));
    assert_eq!(color(&app, &["--no-color=false", "exec"]), json!(true));
    assert_eq!(color(&app, &["--noColor", "exec"]), json!(false));
}

#[test]
fn test_defaults_are_idempotent() {
    let app = app();
    let first = app.parse(&["remote", "add", "origin"]).unwrap();
    let second = app.parse(&["remote", "add", "origin"]).unwrap();
    assert_eq!(first.raw, second.raw);
    assert_eq!(
        Value::Object(first.flags),
        json!({ "verbose": 0, "color": false, "config": {}, "tag": [] })
    );
}

#[test]
fn test_object_flag_paths() {
    let ctx = app()
        .parse(&[
            "--config.user.name=Ann",
            "-c",
            "exec",
            "--config.core.bare",
        ])
        .unwrap();
    assert_eq!(
        ctx.flags["config"],
        json!({ "user": { "name": "Ann" }, "core": { "bare": true } })
    );
    assert_eq!(ctx.raw.unknown["c"], vec![json!(true)]);
}

#[test]
fn test_ignore_policy_truncates() {
    let ctx = app()
        .parse(&["-v", "exec", "ls", "-la", "--verbose", "--", "x"])
        .unwrap();
    assert_eq!(ctx.called_as.as_deref(), Some("exec"));
    assert_eq!(ctx.flags["verbose"], json!(1));
    assert_eq!(ctx.raw.ignored, vec!["ls", "-la", "--verbose", "--", "x"]);
    assert!(ctx.raw.double_dash.is_empty());
    assert_eq!(ctx.parameters["argv"], json!([]));
}

#[test]
fn test_unknown_flags_are_collected() {
    let ctx = app()
        .parse(&["remote", "add", "--depth", "1", "origin", "--bare"])
        .unwrap();
    assert_eq!(ctx.raw.unknown["depth"], vec![json!("1")]);
    assert_eq!(ctx.raw.unknown["bare"], vec![json!(true)]);
    assert_eq!(ctx.raw.unknown_raw, vec!["--depth", "1", "--bare"]);
    assert_eq!(ctx.parameters["name"], json!("origin"));
}

#[test]
fn test_nested_command_names_rejected() {
    let result = App::builder("git")
        .command(CommandDef::new("remote add"))
        .command(CommandDef::new("remote"))
        .build();
    assert!(matches!(result, Err(ArgotError::Schema(_))));
}

#[test]
fn test_required_with_default_rejected() {
    let result = App::builder("git")
        .command(CommandDef::new("clone").flag(
            "depth",
            FlagOptions::new(Converter::integer())
                .required()
                .default_value(1),
        ))
        .build();
    assert!(matches!(result, Err(ArgotError::Schema(_))));
}
