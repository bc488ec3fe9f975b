use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mood_import::importer::read_grid;
use mood_import::{
    CsvMoodStore, ImportReport, ImportSession, MappingConfig, MappingFile, MergePolicy,
};

#[derive(Parser)]
#[command(version, about = "Import mood data from spreadsheets exported by other apps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import mood ratings from a CSV or spreadsheet file
    Import {
        /// Path to input CSV, XLSX, XLS or ODS file
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the mood store CSV (created if missing)
        #[arg(short, long)]
        store: PathBuf,

        #[command(flatten)]
        mapping: MappingArgs,

        /// Parse and merge without writing the store
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the parsed grid with cell coordinates
    Inspect {
        /// Path to input CSV, XLSX, XLS or ODS file
        #[arg(short, long)]
        input: PathBuf,

        /// Number of rows to print
        #[arg(short, long, default_value_t = 20)]
        rows: usize,
    },
}

#[derive(Args)]
struct MappingArgs {
    /// JSON mapping file; replaces the range options below
    #[arg(short, long, conflicts_with = "date_range")]
    mapping: Option<PathBuf>,

    /// Range holding the dates, e.g. A2:A40
    #[arg(long, required_unless_present = "mapping")]
    date_range: Option<String>,

    /// Date pattern tried before the built-in ones, e.g. dd/MM/yyyy
    #[arg(long, default_value = "")]
    date_format: String,

    /// Range holding morning moods
    #[arg(long)]
    morning: Option<String>,

    /// Range holding midday moods
    #[arg(long)]
    midday: Option<String>,

    /// Range holding evening moods
    #[arg(long)]
    evening: Option<String>,

    /// Range holding morning notes
    #[arg(long)]
    morning_notes: Option<String>,

    /// Range holding midday notes
    #[arg(long)]
    midday_notes: Option<String>,

    /// Range holding evening notes
    #[arg(long)]
    evening_notes: Option<String>,

    /// Also save notes for segments without a mood value
    #[arg(long)]
    attach_notes: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            input,
            store,
            mapping,
            dry_run,
            json,
        } => handle_import(&input, &store, mapping, dry_run, json),
        Commands::Inspect { input, rows } => handle_inspect(&input, rows),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn handle_import(
    input: &Path,
    store_path: &Path,
    args: MappingArgs,
    dry_run: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, policy) = load_mapping(args)?;

    let mut store = CsvMoodStore::open(store_path)?;
    let mut session = ImportSession::new(config).with_policy(policy);
    let report = session.run_path(input, &mut store)?;

    if report.success && !dry_run {
        store.flush()?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, input, store_path, dry_run);
    }

    match report.error {
        Some(error) if !report.success => Err(error.into()),
        _ => Ok(()),
    }
}

fn load_mapping(args: MappingArgs) -> Result<(MappingConfig, MergePolicy), Box<dyn std::error::Error>> {
    let mut file = match &args.mapping {
        Some(path) => MappingFile::from_json(&std::fs::read_to_string(path)?)?,
        None => MappingFile {
            date_range: args.date_range.unwrap_or_default(),
            date_format: args.date_format,
            morning: args.morning,
            midday: args.midday,
            evening: args.evening,
            morning_notes: args.morning_notes,
            midday_notes: args.midday_notes,
            evening_notes: args.evening_notes,
            attach_notes_without_mood: false,
        },
    };
    file.attach_notes_without_mood |= args.attach_notes;

    let policy = file.policy();
    Ok((MappingConfig::try_from(file)?, policy))
}

fn print_report(report: &ImportReport, input: &Path, store: &Path, dry_run: bool) {
    if !report.success {
        return;
    }

    println!(
        "Imported {} mood values from {} entries in {} ({} skipped, already rated)",
        report.imported,
        report.total,
        input.display(),
        report.skipped
    );
    if report.notes_attached > 0 {
        println!("Attached {} notes without mood values", report.notes_attached);
    }
    for error in &report.errors {
        println!("  - {}", error);
    }
    if dry_run {
        println!("Dry run: {} was not modified", store.display());
    } else {
        println!("Saved to {}", store.display());
    }
}

fn handle_inspect(input: &Path, rows: usize) -> Result<(), Box<dyn std::error::Error>> {
    let grid = read_grid(input)?;
    let preview = mood_import::importer::grid::Grid::from_rows(
        grid.rows().iter().take(rows).cloned().collect(),
    );

    print!("{}", preview);
    if grid.row_count() > rows {
        println!("... {} more rows", grid.row_count() - rows);
    }
    Ok(())
}
