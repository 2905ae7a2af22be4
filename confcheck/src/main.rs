//! confcheck - check configuration documents against their schemas.
//!
//! ## Usage
//!
//! ```bash
//! # Validate a document against a whole-document schema
//! confcheck validate settings.json --schema schema.json
//!
//! # Validate against a map of setting key to schema, one entry per key
//! confcheck validate settings.jsonc --schema registry.json --batch
//!
//! # Rewrite the file with coerced values after a clean run
//! confcheck validate settings.json --schema schema.json --write-coerced
//!
//! # Print the default document a schema describes
//! confcheck defaults --schema schema.json
//!
//! # Re-emit commented JSON as canonical JSON
//! confcheck fmt settings.jsonc
//! confcheck fmt settings.json --indent 4 --write
//! ```
//!
//! Documents may be `.json`, `.jsonc` (comments and trailing commas
//! tolerated) or `.toml`. Schema files are always strict JSON.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use confschema::{
    Schema, ValidationResult, Value, default_value, format_config_indent, parse_config, validate,
    validate_all,
};
use log::debug;
use serde_json::Map;

#[derive(Parser, Debug)]
#[command(
    name = "confcheck",
    version,
    about = "Check configuration documents against their schemas"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a configuration document
    Validate {
        /// Configuration document (.json, .jsonc or .toml)
        config: PathBuf,

        /// Schema file (strict JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Treat the schema file as a map of setting key to schema
        #[arg(long)]
        batch: bool,

        /// Rewrite the document with coerced values after a clean run
        #[arg(long)]
        write_coerced: bool,
    },

    /// Print the default document a schema describes
    Defaults {
        /// Schema file (strict JSON)
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Re-emit a configuration document as canonical JSON
    Fmt {
        /// Configuration document (.json, .jsonc or .toml)
        config: PathBuf,

        /// Indent width
        #[arg(long, default_value_t = 2)]
        indent: usize,

        /// Rewrite the file in place instead of printing
        #[arg(long)]
        write: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

/// Returns `Ok(true)` for a clean run and `Ok(false)` when validation
/// found errors. Hard failures (I/O, unparseable input, bad schema) are
/// `Err` and exit with code 2.
fn run(command: Command) -> anyhow::Result<bool> {
    match command {
        Command::Validate {
            config,
            schema,
            batch,
            write_coerced,
        } => run_validate(&config, &schema, batch, write_coerced),
        Command::Defaults { schema } => run_defaults(&schema),
        Command::Fmt {
            config,
            indent,
            write,
        } => run_fmt(&config, indent, write),
    }
}

fn run_validate(
    config: &Path,
    schema: &Path,
    batch: bool,
    write_coerced: bool,
) -> anyhow::Result<bool> {
    let entries = load_document(config)?;

    let result = if batch {
        let schemas = load_schema_map(schema)?;
        validate_all(&entries, &schemas)
    } else {
        let schema = load_schema(schema)?;
        validate(&Value::Object(entries), &schema)
    };

    report(&result);
    if !result.valid {
        return Ok(false);
    }

    if write_coerced && let Some(coerced) = &result.coerced_value {
        write_document(config, coerced)?;
        println!("{} {}", "updated".green().bold(), config.display());
    }
    Ok(true)
}

fn run_defaults(schema: &Path) -> anyhow::Result<bool> {
    let schema = load_schema(schema)?;
    let Some(value) = default_value(&schema) else {
        bail!("schema does not describe a default value");
    };
    println!("{}", format_config_indent(&value, 2));
    Ok(true)
}

fn run_fmt(config: &Path, indent: usize, write: bool) -> anyhow::Result<bool> {
    if write && !matches!(extension(config), "json" | "jsonc") {
        bail!("cannot write JSON back to a {:?} file", extension(config));
    }

    let entries = load_document(config)?;
    let text = format_config_indent(&Value::Object(entries), indent);

    if write {
        fs::write(config, text)
            .with_context(|| format!("Failed to write {}", config.display()))?;
        println!("{} {}", "formatted".green().bold(), config.display());
    } else {
        println!("{text}");
    }
    Ok(true)
}

fn report(result: &ValidationResult) {
    for error in &result.errors {
        println!("{} {error}", "error:".red().bold());
    }
    for warning in &result.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning.message);
    }
    if result.valid {
        println!("{}", "configuration is valid".green().bold());
    } else {
        let n = result.errors.len();
        println!("{}", format!("found {n} error(s)").red().bold());
    }
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|s| s.to_str()).unwrap_or("")
}

/// Load a document as a JSON object, tolerant of comments and trailing
/// commas for the JSON flavors, via `toml` for TOML.
fn load_document(path: &Path) -> anyhow::Result<Map<String, Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let entries = match extension(path) {
        "json" | "jsonc" => parse_config(&content)?,
        "toml" => {
            let table: toml::Value = toml::from_str(&content)?;
            match serde_json::to_value(table)? {
                Value::Object(entries) => entries,
                other => bail!(
                    "expected a table at the top level, got {}",
                    confschema::ValueKind::of(&other).name()
                ),
            }
        }
        ext => bail!("unsupported config file extension: {ext}"),
    };
    debug!("loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    let json = load_schema_json(path)?;
    let schema = Schema::from_value(&json)
        .with_context(|| format!("Failed to parse schema {}", path.display()))?;
    Ok(schema)
}

/// Load a batch schema file: a JSON object mapping setting keys to
/// schema nodes.
fn load_schema_map(path: &Path) -> anyhow::Result<BTreeMap<String, Schema>> {
    let json = load_schema_json(path)?;
    let Value::Object(entries) = json else {
        bail!("batch schema file must be an object of setting key to schema");
    };

    let mut schemas = BTreeMap::new();
    for (key, node) in &entries {
        let schema =
            Schema::from_value(node).with_context(|| format!("Failed to parse schema for {key:?}"))?;
        schemas.insert(key.clone(), schema);
    }
    Ok(schemas)
}

fn load_schema_json(path: &Path) -> anyhow::Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let json = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(json)
}

/// Write the coerced document back in the format the file already uses.
fn write_document(path: &Path, value: &Value) -> anyhow::Result<()> {
    let content = match extension(path) {
        "json" | "jsonc" => format_config_indent(value, 2),
        "toml" => toml::to_string_pretty(value)?,
        ext => bail!("unsupported config file extension: {ext}"),
    };
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_validate_rewrites_coerced_document() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_file(
            &dir,
            "schema.json",
            r#"{"type": "object", "properties": {"port": {"type": "integer"}}}"#,
        );
        let config = write_file(
            &dir,
            "app.json",
            "{\n  // listen port\n  \"port\": \"8080\",\n}",
        );

        let clean = run(Command::Validate {
            config: config.clone(),
            schema,
            batch: false,
            write_coerced: true,
        })
        .unwrap();
        assert!(clean);

        let written: Value = serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
        assert_eq!(written, json!({"port": 8080}));
    }

    #[test]
    fn test_validate_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_file(
            &dir,
            "schema.json",
            r#"{"type": "object", "properties": {"port": {"type": "integer"}}}"#,
        );
        let config = write_file(&dir, "app.json", r#"{"port": "not a number"}"#);

        let clean = run(Command::Validate {
            config,
            schema,
            batch: false,
            write_coerced: false,
        })
        .unwrap();
        assert!(!clean);
    }

    #[test]
    fn test_batch_validation_keys_paths() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_file(
            &dir,
            "registry.json",
            r#"{
                "editor.tabSize": {"type": "number", "minimum": 1},
                "editor.theme": {"type": "string"}
            }"#,
        );
        let config = write_file(
            &dir,
            "settings.json",
            r#"{"editor.tabSize": 0, "editor.theme": "dark", "unregistered": true}"#,
        );

        let clean = run(Command::Validate {
            config,
            schema,
            batch: true,
            write_coerced: false,
        })
        .unwrap();
        assert!(!clean);
    }

    #[test]
    fn test_load_document_toml() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(&dir, "app.toml", "port = 8080\n\n[editor]\ntheme = \"dark\"\n");

        let entries = load_document(&config).unwrap();
        assert_eq!(entries["port"], json!(8080));
        assert_eq!(entries["editor"]["theme"], json!("dark"));
    }

    #[test]
    fn test_load_document_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(&dir, "app.yaml", "port: 8080");

        let err = load_document(&config).unwrap_err();
        assert!(err.to_string().contains("unsupported config file extension"));
    }

    #[test]
    fn test_fmt_rewrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(
            &dir,
            "settings.jsonc",
            "{\n  /* theme */ \"workbench.theme\": \"light\",\n}",
        );

        let clean = run(Command::Fmt {
            config: config.clone(),
            indent: 2,
            write: true,
        })
        .unwrap();
        assert!(clean);

        let written = fs::read_to_string(&config).unwrap();
        assert_eq!(written, "{\n  \"workbench.theme\": \"light\"\n}");
    }

    #[test]
    fn test_fmt_refuses_toml_write() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(&dir, "app.toml", "port = 8080\n");

        let err = run(Command::Fmt {
            config,
            indent: 2,
            write: true,
        })
        .unwrap_err();
        assert!(err.to_string().contains("cannot write JSON back"));
    }

    #[test]
    fn test_defaults_prints_synthesized_document() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_file(
            &dir,
            "schema.json",
            r#"{
                "type": "object",
                "properties": {
                    "tabSize": {"type": "number", "default": 4},
                    "rulers": {"type": "array"}
                }
            }"#,
        );

        assert!(run(Command::Defaults { schema }).unwrap());
    }

    #[test]
    fn test_defaults_requires_a_default() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_file(&dir, "schema.json", r#"{"type": "string"}"#);

        let err = run(Command::Defaults { schema }).unwrap_err();
        assert!(err.to_string().contains("does not describe a default"));
    }
}
