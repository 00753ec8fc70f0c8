//! Tabula command-line driver.
//!
//! Usage:
//!   tabula compile Heroes.csv Items.xlsx --json
//!   tabula generate Heroes.csv --out src/generated/heroes.rs
//!   tabula check data/tables --config tabula.ron
//!
//! Set `RUST_LOG=debug` to trace each compile stage.

use clap::{Parser, Subcommand};
use log::debug;
use std::path::{Path, PathBuf};

use tabula_core::asset::{AssetResolver, NoAssets};
use tabula_core::compiler::{CompileOptions, CompileOutcome, SchemaSync, TableCompiler};
use tabula_core::raw::RawTable;
use tabula_core::resolver::TypeResolver;
use tabula_core::schema::{SchemaGenerator, write_artifact};
use tabula_core::settings::ImportSettings;
use tabula_core::table::CompiledTable;
use tabula_core::table_set::TableSet;

#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(about = "Compile spreadsheet tables into typed game data")]
#[command(version)]
struct Args {
    /// Importer settings file (.ron, .toml, or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Namespace for generated code (overrides the settings file)
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Directory that asset-reference cells are resolved against
    #[arg(long, global = true)]
    asset_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile sheets and print a summary of each table
    Compile {
        #[arg(required = true)]
        sheets: Vec<PathBuf>,

        /// Print entries as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Write the generated schema source for a sheet, if it changed
    Generate {
        sheet: PathBuf,

        /// Output file for the generated Rust source
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Compile every sheet in a directory without writing anything
    Check { dir: PathBuf },
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> CliResult<()> {
    let mut settings = match &args.config {
        Some(path) => ImportSettings::load(path)?,
        None => ImportSettings::default(),
    };
    if let Some(namespace) = args.namespace {
        settings.namespace = namespace;
    }
    if let Some(root) = args.asset_root {
        settings.asset_root = Some(root);
    }
    debug!("settings: {settings:?}");

    let catalog = settings.catalog();
    let fs_assets = settings.asset_resolver();
    let assets: &dyn AssetResolver = match &fs_assets {
        Some(resolver) => resolver,
        None => &NoAssets,
    };

    match args.command {
        Command::Compile { sheets, json } => {
            for sheet in &sheets {
                let compiler = TableCompiler::new(&catalog)
                    .with_assets(assets)
                    .with_options(settings.compile_options(sheet));
                match compiler.compile(sheet)? {
                    CompileOutcome::Compiled {
                        table,
                        schema_status,
                    } => {
                        if json {
                            println!("{}", serde_json::to_string_pretty(&table_json(&table))?);
                        } else {
                            println!(
                                "{}: {} entries, {} fields (schema {schema_status:?})",
                                table.name(),
                                table.len(),
                                table.schema().fields.len()
                            );
                        }
                    }
                    CompileOutcome::SchemaRegenerated { artifact } => {
                        println!(
                            "{}: schema regenerated at {}; run again to bind",
                            sheet.display(),
                            artifact.display()
                        );
                    }
                }
            }
        }
        Command::Generate { sheet, out } => {
            generate(&settings, &catalog, &sheet, &out)?;
        }
        Command::Check { dir } => {
            let compiler = TableCompiler::new(&catalog)
                .with_assets(assets)
                .with_options(CompileOptions {
                    namespace: settings.namespace.clone(),
                    sync: SchemaSync::Skip,
                });
            let set = TableSet::compile_dir(&dir, &compiler)?;
            for table in set.iter() {
                println!("ok  {} ({} entries)", table.name(), table.len());
            }
            println!("{} tables checked", set.len());
        }
    }
    Ok(())
}

fn generate(
    settings: &ImportSettings,
    catalog: &tabula_core::catalog::TypeCatalog,
    sheet: &Path,
    out: &Path,
) -> CliResult<()> {
    let raw = RawTable::load(sheet)?;
    let text = SchemaGenerator::generate(&settings.namespace, &raw, &TypeResolver::new(catalog))?;
    if write_artifact(out, &text)? {
        println!("wrote {}", out.display());
    } else {
        println!("{} is up to date", out.display());
    }
    Ok(())
}

/// Entries as `{ key: { field: value } }`.
fn table_json(table: &CompiledTable) -> serde_json::Value {
    let fields: Vec<&str> = table.schema().field_names().collect();
    let mut rows = serde_json::Map::new();
    for entry in table {
        let mut row = serde_json::Map::new();
        for (name, value) in fields.iter().zip(&entry.values) {
            row.insert(
                name.to_string(),
                serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
            );
        }
        rows.insert(entry.key.clone(), serde_json::Value::Object(row));
    }
    serde_json::json!({ "table": table.name(), "entries": rows })
}
