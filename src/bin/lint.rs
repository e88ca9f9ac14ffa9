//! Schema Lint CLI
//!
//! Reports unknown type references and shadowed accessor aliases in schema
//! files. Exits non-zero on findings only when `lint.deny_warnings` is set.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use schema_builder::{lint_schemas, BuilderConfig, LintResult, PluralRules, SchemaDocument, SchemaLinter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-lint")]
#[command(about = "Lint type schemas for unknown references and shadowed aliases")]
struct Cli {
    /// Schema file or directory; defaults to [schema].path from config
    path: Option<PathBuf>,

    /// Config file layered over the default locations
    #[arg(short, long)]
    config: Option<String>,

    /// Fail on any warning
    #[arg(long)]
    deny_warnings: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// Returns whether the run passed
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = BuilderConfig::load_from(cli.config.as_deref()).context("loading config")?;
    let deny_warnings = cli.deny_warnings || config.lint.deny_warnings;

    let Some(path) = cli.path.or_else(|| config.schema_path()) else {
        bail!("no path given and [schema].path is not configured");
    };

    let linter = SchemaLinter::with_plurals(PluralRules::from_config(&config.naming));
    let results: Vec<LintResult> = if path.is_dir() {
        println!("🔍 Linting schemas in {}", path.display());
        lint_schemas(&path, &linter)
    } else {
        let document = SchemaDocument::from_path(&path)
            .with_context(|| format!("loading schema {}", path.display()))?;
        let result = linter.lint(&path.to_string_lossy(), &document);
        if result.has_warnings() {
            vec![result]
        } else {
            Vec::new()
        }
    };

    if results.is_empty() {
        println!("✅ No lint warnings");
        return Ok(true);
    }

    let mut total = 0;
    for result in &results {
        println!("{}", result.schema_id);
        for warning in &result.warnings {
            println!("  ⚠️  [{}] {}: {}", warning.code, warning.path, warning.message);
        }
        total += result.warnings.len();
    }
    println!();
    println!("{} warning(s) in {} schema(s)", total, results.len());

    Ok(!deny_warnings)
}
