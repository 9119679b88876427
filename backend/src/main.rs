//! Catalog Import CLI - supplier catalogs to Shopify product CSV
//!
//! # Main Commands
//!
//! ```bash
//! catalog-import import supplier.xlsx                     # Full import, physical goods
//! catalog-import import supplier.csv --mode description-only
//! catalog-import import ebooks.csv --strategy digital --name ebooks
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! catalog-import resolve supplier.csv     # Show how headers map to fields
//! catalog-import parse supplier.csv       # Parse to JSON
//! catalog-import fields                   # List the 53 output fields
//! ```

use clap::{Parser, Subcommand};
use catalog_import::config::ImportConfig;
use catalog_import::export::DEFAULT_EXPORT_DIR;
use catalog_import::parser::format_delimiter;
use catalog_import::{
    import_file, logging, read_source, CanonicalField, ColumnResolver, ExportMode, FieldKind,
    ImportOptions, ProductStrategy,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "catalog-import")]
#[command(about = "Turn supplier product files into a Shopify import CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a supplier file and write the Shopify CSV
    Import {
        /// Input file (.csv, .xls, .xlsx)
        input: PathBuf,

        /// Which columns to populate
        #[arg(short, long, value_enum, default_value_t = ExportMode::Full)]
        mode: ExportMode,

        /// Physical or digital products
        #[arg(short, long, value_enum, default_value_t = ProductStrategy::Physical)]
        strategy: ProductStrategy,

        /// JSON config file
        #[arg(short, long, env = "CATALOG_IMPORT_CONFIG")]
        config: Option<PathBuf>,

        /// Directory for the CSV and error log
        #[arg(short, long, env = "CATALOG_EXPORT_DIR", default_value = DEFAULT_EXPORT_DIR)]
        export_dir: PathBuf,

        /// Output file name (default: shopify_import_<timestamp>)
        #[arg(short, long)]
        name: Option<String>,

        /// Use a saved mapping instead of fuzzy matching
        #[arg(long)]
        mapping: Option<PathBuf>,

        /// Save the mapping used for this file
        #[arg(long)]
        save_mapping: Option<PathBuf>,
    },

    /// Resolve the columns of a file and print the mapping
    Resolve {
        /// Input file
        input: PathBuf,

        /// JSON config file (matching threshold and algorithm)
        #[arg(short, long, env = "CATALOG_IMPORT_CONFIG")]
        config: Option<PathBuf>,

        /// Save the mapping to a file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Parse a file and output its rows as JSON
    Parse {
        /// Input file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the output fields and their aliases
    Fields,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            input,
            mode,
            strategy,
            config,
            export_dir,
            name,
            mapping,
            save_mapping,
        } => cmd_import(
            &input,
            ImportArgs {
                mode,
                strategy,
                config,
                export_dir,
                name,
                mapping,
                save_mapping,
            },
        ),

        Commands::Resolve { input, config, save } => {
            cmd_resolve(&input, config.as_deref(), save.as_deref())
        }

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Fields => cmd_fields(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

struct ImportArgs {
    mode: ExportMode,
    strategy: ProductStrategy,
    config: Option<PathBuf>,
    export_dir: PathBuf,
    name: Option<String>,
    mapping: Option<PathBuf>,
    save_mapping: Option<PathBuf>,
}

fn cmd_import(input: &Path, args: ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());
    eprintln!("   Mode: {} / {}", args.mode, args.strategy);

    let config = ImportConfig::load_or_default(args.config.as_deref())?;

    let options = ImportOptions {
        mode: args.mode,
        strategy: args.strategy,
        config,
        export_dir: args.export_dir,
        output_name: args.name,
        mapping_path: args.mapping,
        save_mapping: args.save_mapping,
    };

    let summary = import_file(input, options)?;

    eprintln!("\n📊 Summary:");
    eprintln!("   Rows processed: {}", summary.rows_processed);
    eprintln!("   Rows written:   {}", summary.rows_written);
    eprintln!("   Rows skipped:   {}", summary.rows_skipped);
    eprintln!("   Fields mapped:  {}", summary.mapped_fields);
    if !summary.unmatched_columns.is_empty() {
        eprintln!("   Unmapped columns: {}", summary.unmatched_columns.join(", "));
    }
    eprintln!("   💾 Output: {}", summary.output_path.display());
    if let Some(ref log) = summary.error_log {
        eprintln!("   ⚠️  Error log: {}", log.display());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_resolve(
    input: &Path,
    config_path: Option<&Path>,
    save: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔎 Resolving columns: {}", input.display());

    let config = ImportConfig::load_or_default(config_path)?;
    let table = read_source(input)?;
    let resolver = ColumnResolver::from_config(&config.matching);
    let mapping = resolver.resolve(&table.columns)?;

    println!("{:<45} {:<30} {:>5}", "FIELD", "COLUMN", "SCORE");
    for (field, matched) in mapping.iter() {
        let marker = if field.is_required() { "*" } else { " " };
        println!(
            "{}{:<44} {:<30} {:>5.2}",
            marker,
            field.header(),
            matched.column.name,
            matched.score
        );
    }

    let unmatched = mapping.unmatched(&table.columns);
    if !unmatched.is_empty() {
        let names: Vec<&str> = unmatched.iter().map(|c| c.name.as_str()).collect();
        eprintln!("\n   Unmapped columns: {}", names.join(", "));
    }

    if let Some(path) = save {
        mapping.save(path)?;
        eprintln!("   💾 Mapping saved to: {}", path.display());
    }

    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let table = read_source(input)?;

    eprintln!("   Encoding: {}", table.encoding);
    if let Some(d) = table.delimiter {
        eprintln!("   Delimiter: '{}'", format_delimiter(d));
    }
    eprintln!("   Columns: {}", table.headers().join(", "));
    eprintln!("✅ Parsed {} rows", table.rows.len());

    let json = serde_json::to_string_pretty(&table.to_json())?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_fields() -> Result<(), Box<dyn std::error::Error>> {
    for (i, field) in CanonicalField::ALL.iter().enumerate() {
        let marker = if field.is_required() { "*" } else { " " };
        let kind = match field.kind() {
            FieldKind::Decimal => " [decimal]",
            FieldKind::Text => "",
        };
        let aliases = field.aliases();
        if aliases.is_empty() {
            println!("[{:2}]{} {}{}", i + 1, marker, field.header(), kind);
        } else {
            println!("[{:2}]{} {}{}  ({})", i + 1, marker, field.header(), kind, aliases.join(", "));
        }
    }
    eprintln!("\n* required");
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("   💾 Saved to: {}", p.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
