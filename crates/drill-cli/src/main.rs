//! `drill` - resolve named schemas and walk entities from the command line

mod registry;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use drill_core::{ColumnSchema, EditorConfig, EntityEditor};
use drill_schema::{synthesize, DataPath, Schema, SchemaResolver};
use registry::DirectoryRegistry;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn cli() -> Command {
    Command::new("drill")
        .version(drill_core::VERSION)
        .about("Schema-driven entity drill-down")
        .subcommand_required(true)
        .arg(
            Arg::new("registry")
                .long("registry")
                .global(true)
                .default_value(".")
                .value_parser(value_parser!(PathBuf))
                .help("Directory of <name>.json schemas"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Editor configuration (TOML)"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log output format"),
        )
        .subcommand(
            Command::new("resolve")
                .about("Print the effective schema of a named schema")
                .arg(Arg::new("schema").required(true).help("Schema name")),
        )
        .subcommand(
            Command::new("defaults")
                .about("Print the synthesized default entity of a named schema")
                .arg(Arg::new("schema").required(true).help("Schema name")),
        )
        .subcommand(
            Command::new("walk")
                .about("Open an entity and drill down along a path")
                .arg(Arg::new("schema").required(true).help("Schema name"))
                .arg(
                    Arg::new("path")
                        .required(true)
                        .help("Dot-separated path, e.g. tags.0.name"),
                )
                .arg(
                    Arg::new("data")
                        .long("data")
                        .value_parser(value_parser!(PathBuf))
                        .help("Entity JSON (defaults are synthesized when omitted)"),
                ),
        )
}

fn init_logging(format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn load_config(path: Option<&PathBuf>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading config {}", path.display()))?;
    Ok(EditorConfig::from_toml_str(&source)?)
}

async fn load_data(path: Option<&PathBuf>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Null);
    };
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading entity {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing entity {}", path.display()))
}

fn schema_name(args: &ArgMatches) -> Result<&str> {
    args.get_one::<String>("schema")
        .map(String::as_str)
        .context("missing schema name")
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn walk(editor: &mut EntityEditor, name: &str, path: &DataPath, data: Value) -> Result<()> {
    editor
        .open_entity(&Schema::reference(name, false), data)
        .await?;

    for (column, segment) in path.iter().enumerate() {
        let outcome = editor.navigate(column, segment.clone()).await?;
        if !outcome.is_clean() {
            tracing::warn!("{} field error(s) left behind", outcome.outstanding_errors.len());
        }
    }

    for column in editor.columns() {
        let label = match column.schema() {
            ColumnSchema::Resolved(schema) => schema.type_name().to_string(),
            ColumnSchema::Placeholder(diagnostic) => format!("unresolved ({diagnostic})"),
        };
        let shown = if column.path().is_empty() {
            "<root>".to_string()
        } else {
            column.path().to_string()
        };
        println!("{shown}\t{label}");
    }

    let last = editor.columns().len().saturating_sub(1);
    print_json(editor.column_data(last)?)
}

async fn run(matches: &ArgMatches) -> Result<()> {
    let registry_dir = matches
        .get_one::<PathBuf>("registry")
        .map_or_else(|| Path::new(".").to_path_buf(), Clone::clone);
    if !registry_dir.is_dir() {
        bail!("registry {} is not a directory", registry_dir.display());
    }
    let config = load_config(matches.get_one::<PathBuf>("config")).await?;
    let registry = Arc::new(DirectoryRegistry::new(&registry_dir));
    tracing::debug!("Using registry {}", registry_dir.display());

    match matches.subcommand() {
        Some(("resolve", args)) => {
            let resolver = SchemaResolver::new(config.schema_cache(registry))
                .with_max_reference_depth(config.max_reference_depth);
            let effective = resolver.resolve_named(schema_name(args)?).await?;
            print_json(&effective)
        }
        Some(("defaults", args)) => {
            let resolver = SchemaResolver::new(config.schema_cache(registry))
                .with_max_reference_depth(config.max_reference_depth);
            let effective = resolver.resolve_named(schema_name(args)?).await?;
            print_json(&synthesize(&effective))
        }
        Some(("walk", args)) => {
            let path: DataPath = args
                .get_one::<String>("path")
                .context("missing path")?
                .parse()?;
            let data = load_data(args.get_one::<PathBuf>("data")).await?;
            let mut editor = EntityEditor::with_config(registry, config);
            walk(&mut editor, schema_name(args)?, &path, data).await
        }
        _ => bail!("unknown command"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let format = matches
        .get_one::<String>("log-format")
        .map_or("text", String::as_str);
    init_logging(format);

    run(&matches).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry_dir(files: &[(&str, Value)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            std::fs::write(dir.path().join(format!("{name}.json")), body.to_string()).unwrap();
        }
        dir
    }

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn parses_walk_with_globals() {
        let matches = cli()
            .try_get_matches_from([
                "drill", "walk", "user", "tags.0", "--registry", "schemas", "--log-format", "json",
            ])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("log-format").map(String::as_str),
            Some("json")
        );
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "walk");
        assert_eq!(schema_name(args).unwrap(), "user");
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(cli()
            .try_get_matches_from(["drill", "resolve", "user", "--log-format", "xml"])
            .is_err());
    }

    #[tokio::test]
    async fn walk_follows_path() {
        let dir = registry_dir(&[
            (
                "user",
                json!({"type": "object", "properties": {
                    "tags": {"type": "jsonschema-reference", "referencedSchemaName": "tag", "multiple": true}
                }}),
            ),
            ("tag", json!({"type": "object", "properties": {"name": {"type": "string"}}})),
        ]);
        let registry = Arc::new(DirectoryRegistry::new(dir.path()));
        let mut editor = EntityEditor::with_config(registry, EditorConfig::default());

        walk(
            &mut editor,
            "user",
            &"tags.0".parse().unwrap(),
            json!({"tags": [{"name": "x"}]}),
        )
        .await
        .unwrap();
        assert_eq!(editor.columns().len(), 3);
        assert_eq!(editor.column_data(2).unwrap(), &json!({"name": "x"}));
    }

    #[tokio::test]
    async fn walk_rejects_missing_index() {
        let dir = registry_dir(&[(
            "list",
            json!({"type": "array", "items": {"type": "string"}}),
        )]);
        let registry = Arc::new(DirectoryRegistry::new(dir.path()));
        let mut editor = EntityEditor::with_config(registry, EditorConfig::default());

        let result = walk(&mut editor, "list", &"3".parse().unwrap(), json!([])).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn config_defaults_without_file() {
        assert_eq!(load_config(None).await.unwrap(), EditorConfig::default());
    }
}
