//! Schema Inspect CLI
//!
//! Compiles a schema and prints its node kinds with every callable accessor name.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use schema_builder::names::suggest;
use schema_builder::{
    BuilderConfig, BuilderError, NodeKind, OutputFormat, PluralRules, SchemaDocument, SchemaLinter,
    TypeRegistry,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-inspect")]
#[command(about = "Compile a type schema and list its builder accessors")]
struct Cli {
    /// Schema file (.yaml, .yml or .json); defaults to [schema].path from config
    schema: Option<PathBuf>,

    /// Config file layered over the default locations
    #[arg(short, long)]
    config: Option<String>,

    /// Namespace label for the compiled registry
    #[arg(short, long)]
    namespace: Option<String>,

    /// Only show this type
    #[arg(short = 't', long = "type")]
    type_name: Option<String>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,

    /// Skip the lint pass
    #[arg(long)]
    no_lint: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = BuilderConfig::load_from(cli.config.as_deref()).context("loading config")?;
    if let Some(namespace) = cli.namespace {
        config.schema.namespace = Some(namespace);
    }
    if cli.compact {
        config.output.format = OutputFormat::Compact;
    }

    let Some(path) = cli.schema.or_else(|| config.schema_path()) else {
        bail!("no schema given and [schema].path is not configured");
    };
    let document = SchemaDocument::from_path(&path)
        .with_context(|| format!("loading schema {}", path.display()))?;

    if config.lint.enabled && !cli.no_lint {
        let linter = SchemaLinter::with_plurals(PluralRules::from_config(&config.naming));
        let result = linter.lint(&path.to_string_lossy(), &document);
        for warning in &result.warnings {
            eprintln!("⚠️  [{}] {}: {}", warning.code, warning.path, warning.message);
        }
    }

    let registry = TypeRegistry::from_document(&document, &config)?;

    let kinds: Vec<&NodeKind> = match &cli.type_name {
        Some(name) => {
            let kind = registry.lookup(name).ok_or_else(|| BuilderError::UnknownType {
                name: name.clone(),
                suggestion: suggest(name, registry.kinds().map(NodeKind::name)),
            })?;
            vec![kind]
        }
        None => registry.kinds().collect(),
    };

    if cli.json {
        let described: serde_json::Map<String, serde_json::Value> = kinds
            .iter()
            .map(|kind| (kind.name().to_string(), describe(&registry, kind)))
            .collect();
        let report = json!({
            "namespace": registry.namespace(),
            "fingerprint": registry.fingerprint().as_str(),
            "kinds": described,
        });
        println!("{}", config.output.format.render(&report)?);
        return Ok(());
    }

    println!("📦 {} kinds (fingerprint {})", registry.len(), registry.fingerprint().short());
    if let Some(namespace) = registry.namespace() {
        println!("  Namespace: {}", namespace);
    }
    println!();

    for kind in kinds {
        if let Some(primitive) = kind.primitive() {
            println!("{} = {}", kind.name(), primitive);
            continue;
        }
        println!("{}", kind.name());
        for attr in kind.attributes() {
            let target = registry.kind(attr.kind.target()).name();
            let shape = if attr.kind.is_list() {
                format!("[{}]", target)
            } else {
                target.to_string()
            };
            let names = kind.accessors().names_for(&attr.name).join(", ");
            println!("  {:<24} {:<24} {}", attr.name, shape, names);
        }
    }

    Ok(())
}

fn describe(registry: &TypeRegistry, kind: &NodeKind) -> serde_json::Value {
    if let Some(primitive) = kind.primitive() {
        return json!({ "primitive": primitive });
    }
    let attributes: serde_json::Map<String, serde_json::Value> = kind
        .attributes()
        .iter()
        .map(|attr| {
            (
                attr.name.clone(),
                json!({
                    "type": registry.kind(attr.kind.target()).name(),
                    "list": attr.kind.is_list(),
                    "accessors": kind.accessors().names_for(&attr.name),
                }),
            )
        })
        .collect();
    json!({ "attributes": attributes })
}
