//! Atelier CLI - quote recomputation and purchasing tool

use anyhow::{bail, Context, Result};
use atelier::prelude::*;
use atelier::referenced_fields;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(
    author,
    version,
    about = "Recompute quote rows and aggregate material purchases"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute every formula column of a row file
    Recompute {
        /// Schema file (JSON array of column definitions)
        #[arg(short, long)]
        schema: PathBuf,

        /// Row file (JSON array of rows)
        #[arg(short, long)]
        rows: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Evaluate in dependency order instead of schema order
        #[arg(long)]
        topological: bool,
    },

    /// Validate a schema and report its formula columns
    #[command(name = "check-schema")]
    CheckSchema {
        /// Schema file
        schema: PathBuf,
    },

    /// Aggregate material purchases across row files
    Purchases {
        /// Schema file used to recompute the rows first
        #[arg(short, long)]
        schema: PathBuf,

        /// Settings file carrying the material price catalog
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Row files; each file counts as one document
        #[arg(required = true)]
        rows: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Recompute {
            schema,
            rows,
            output,
            topological,
        } => recompute(&schema, &rows, output.as_deref(), topological),
        Commands::CheckSchema { schema } => check_schema(&schema),
        Commands::Purchases {
            schema,
            settings,
            rows,
        } => purchases(&schema, settings.as_deref(), &rows),
    }
}

fn recompute(
    schema_path: &Path,
    rows_path: &Path,
    output: Option<&Path>,
    topological: bool,
) -> Result<()> {
    let schema = load_schema(schema_path)?;
    let rows = load_rows(rows_path)?;

    let options = RecomputeOptions {
        order: if topological {
            RecomputeOrder::Topological
        } else {
            RecomputeOrder::SchemaTwoPass
        },
    };
    let engine = RecomputeEngine::with_options(&schema, &options);
    let (rows, stats) = engine.recompute_rows(&rows);

    eprintln!(
        "Recomputed {} cells across {} rows ({} manual skipped, {} broken formulas)",
        stats.cells_recomputed,
        rows.len(),
        stats.manual_skipped,
        stats.broken_formulas
    );
    if !stats.cycles.is_empty() {
        eprintln!("Warning: circular formula dependencies: {}", stats.cycles.join(", "));
    }

    let json = serde_json::to_string_pretty(&rows)?;
    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn check_schema(schema_path: &Path) -> Result<()> {
    let schema = load_schema(schema_path)?;
    println!(
        "{} columns, {} with formulas",
        schema.len(),
        schema.formula_columns().count()
    );

    let mut broken = 0;
    for col in schema.formula_columns() {
        let text = col.formula.as_deref().unwrap_or_default();
        match parse_expression(text) {
            Ok(expr) => {
                let refs = referenced_fields(&expr);
                let unknown: Vec<_> = refs
                    .iter()
                    .filter(|key| !schema.contains(key))
                    .cloned()
                    .collect();
                if unknown.is_empty() {
                    println!("  {} <- {}", col.key, refs.join(", "));
                } else {
                    println!("  {} <- unknown columns: {}", col.key, unknown.join(", "));
                }
            }
            Err(err) => {
                println!("  {} !! {err}", col.key);
                broken += 1;
            }
        }
    }

    let engine = RecomputeEngine::with_options(
        &schema,
        &RecomputeOptions {
            order: RecomputeOrder::Topological,
        },
    );
    let order: Vec<_> = engine.evaluation_order().collect();
    println!("evaluation order: {}", order.join(" -> "));

    if broken > 0 {
        bail!("{broken} formula column(s) do not parse");
    }
    Ok(())
}

fn purchases(schema_path: &Path, settings: Option<&Path>, row_files: &[PathBuf]) -> Result<()> {
    let schema = load_schema(schema_path)?;
    let engine = RecomputeEngine::new(&schema);

    let mut summary = match settings {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            let settings: Settings = serde_json::from_str(&text)
                .with_context(|| format!("Invalid settings in '{}'", path.display()))?;
            PurchaseSummary::with_prices(settings.prices)
        }
        None => PurchaseSummary::new(),
    };

    for path in row_files {
        let rows = load_rows(path)?;
        let (rows, _) = engine.recompute_rows(&rows);
        let document = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
        summary.add_rows(&document, &rows);
    }

    if summary.is_empty() {
        println!("No materials referenced");
        return Ok(());
    }

    println!("{:<40} {:>10} {:>12}", "Material", "ML", "Cost");
    for line in summary.lines() {
        println!(
            "{:<40} {:>10.2} {:>12.2}",
            line.material.label(),
            line.linear_meters,
            line.cost
        );
        for source in &line.sources {
            println!("    {} / {}: {:.2} ml", source.document, source.row_id, source.linear_meters);
        }
    }
    Ok(())
}

fn load_schema(path: &Path) -> Result<Schema> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid schema in '{}'", path.display()))
}

fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid rows in '{}'", path.display()))
}
