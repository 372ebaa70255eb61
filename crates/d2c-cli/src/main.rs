//! D2 Compare CLI
//!
//! Command-line tool for comparing Diablo II data tables between game versions
//! and converting them to another version's layout.

mod report;

use clap::{Parser, Subcommand, ValueEnum};
use d2c_core::{
    compare_file, compare_folder, convert_folder, discover_files, resolve_data_dir, JobFile,
    RowConversionMode, BUILT_IN_VERSIONS,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "d2c")]
#[command(about = "Diablo II data table compare and convert", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two table files
    CompareFile {
        /// Source (older) file
        #[arg(short, long)]
        source: PathBuf,

        /// Target (newer) file
        #[arg(short, long)]
        target: PathBuf,

        /// List rows that only exist in the target
        #[arg(long)]
        new_rows: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Compare every table present in both folders
    Compare {
        /// Source folder or built-in version
        #[arg(short, long)]
        source: String,

        /// Target folder or built-in version
        #[arg(short, long)]
        target: String,

        /// List rows that only exist in the target
        #[arg(long)]
        new_rows: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Folder containing TXT/<version> for built-in versions
        #[arg(long, default_value = ".")]
        data_root: PathBuf,
    },

    /// Convert source tables toward the target version's layout
    Convert {
        /// Source folder or built-in version
        #[arg(short, long)]
        source: String,

        /// Target folder or built-in version
        #[arg(short, long)]
        target: String,

        /// Output folder for converted tables
        #[arg(short, long)]
        output: PathBuf,

        /// Use the target's columns instead of the source's
        #[arg(long)]
        columns: bool,

        /// How source and target rows are combined: none, append-original-at-end
        /// or append-target-at-end
        #[arg(long, default_value_t = RowConversionMode::None)]
        row_mode: RowConversionMode,

        /// Folder containing TXT/<version> for built-in versions
        #[arg(long, default_value = ".")]
        data_root: PathBuf,
    },

    /// List files that exist in only one of the folders
    Files {
        /// Source folder or built-in version
        #[arg(short, long)]
        source: String,

        /// Target folder or built-in version
        #[arg(short, long)]
        target: String,

        /// Folder containing TXT/<version> for built-in versions
        #[arg(long, default_value = ".")]
        data_root: PathBuf,
    },

    /// List the built-in game versions
    Versions,

    /// Run a job file
    Run {
        /// Path to job file (JSON)
        #[arg(short, long)]
        job: PathBuf,
    },

    /// Create a job file template
    CreateJob {
        /// Output path for the job file
        #[arg(short, long)]
        output: PathBuf,

        /// Source folder or built-in version
        #[arg(short, long)]
        source: String,

        /// Target folder or built-in version
        #[arg(short, long)]
        target: String,

        /// Folder for converted tables; omit for a compare-only job
        #[arg(long)]
        convert_to: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if std::env::var("RUST_LOG").is_err() {
        let level = if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        builder.filter_level(level);
    }
    let _ = builder.format_timestamp(None).try_init();
}

fn run(command: Commands) -> d2c_core::Result<()> {
    match command {
        Commands::CompareFile {
            source,
            target,
            new_rows,
            format,
        } => cmd_compare_file(&source, &target, new_rows, format),
        Commands::Compare {
            source,
            target,
            new_rows,
            format,
            data_root,
        } => cmd_compare(&source, &target, new_rows, format, &data_root),
        Commands::Convert {
            source,
            target,
            output,
            columns,
            row_mode,
            data_root,
        } => cmd_convert(&source, &target, &output, columns, row_mode, &data_root),
        Commands::Files {
            source,
            target,
            data_root,
        } => cmd_files(&source, &target, &data_root),
        Commands::Versions => cmd_versions(),
        Commands::Run { job } => cmd_run(&job),
        Commands::CreateJob {
            output,
            source,
            target,
            convert_to,
        } => cmd_create_job(&output, &source, &target, convert_to),
    }
}

fn cmd_compare_file(
    source: &Path,
    target: &Path,
    new_rows: bool,
    format: OutputFormat,
) -> d2c_core::Result<()> {
    let result = compare_file(source, target, new_rows)?;

    if result.row_header.is_none() {
        log::warn!("{}: no common column, nothing to compare", result.file_name);
    }

    match format {
        OutputFormat::Text => print!("{}", report::render(std::slice::from_ref(&result))),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

fn cmd_compare(
    source: &str,
    target: &str,
    new_rows: bool,
    format: OutputFormat,
    data_root: &Path,
) -> d2c_core::Result<()> {
    let source_dir = resolve_data_dir(source, data_root)?;
    let target_dir = resolve_data_dir(target, data_root)?;

    let results = compare_folder(&source_dir, &target_dir, new_rows, |name| {
        log::info!("Comparing {}", name)
    })?;

    match format {
        OutputFormat::Text => {
            print!("{}", report::render(&results));
            let changed = results.iter().filter(|r| !r.is_empty()).count();
            println!("{} file(s) compared, {} with differences", results.len(), changed);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
    }
    Ok(())
}

fn cmd_convert(
    source: &str,
    target: &str,
    output: &Path,
    columns: bool,
    row_mode: RowConversionMode,
    data_root: &Path,
) -> d2c_core::Result<()> {
    let source_dir = resolve_data_dir(source, data_root)?;
    let target_dir = resolve_data_dir(target, data_root)?;

    let result = convert_folder(&source_dir, &target_dir, output, columns, row_mode, |name| {
        log::info!("Converting {}", name)
    })?;

    println!("Conversion complete:");
    println!("  {} files written to {}", result.files_written.len(), output.display());
    for path in &result.files_written {
        println!("  - {}", path.display());
    }

    if !result.skipped.is_empty() {
        println!("\nSkipped (no common column):");
        for name in &result.skipped {
            println!("  {}", name);
        }
    }
    Ok(())
}

fn cmd_files(source: &str, target: &str, data_root: &Path) -> d2c_core::Result<()> {
    let source_dir = resolve_data_dir(source, data_root)?;
    let target_dir = resolve_data_dir(target, data_root)?;
    let files = discover_files(&source_dir, &target_dir)?;

    println!("{} file(s) in both folders", files.common.len());
    for line in report::file_list_lines(&files) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_versions() -> d2c_core::Result<()> {
    println!("Built-in versions ({}):", BUILT_IN_VERSIONS.len());
    println!();
    for version in BUILT_IN_VERSIONS {
        println!("  {:<18} {}", version.display_name, version.path().display());
    }
    Ok(())
}

fn cmd_run(job_path: &Path) -> d2c_core::Result<()> {
    let job = JobFile::load(job_path)?;
    println!("Running job {}", job_path.display());
    println!("Source: {}", job.source);
    println!("Target: {}", job.target);
    println!();

    cmd_compare(
        &job.source,
        &job.target,
        job.include_new_rows,
        OutputFormat::Text,
        &job.data_root,
    )?;

    if let Some(output) = &job.output {
        println!();
        cmd_convert(
            &job.source,
            &job.target,
            output,
            job.convert_columns,
            job.row_mode,
            &job.data_root,
        )?;
    }
    Ok(())
}

fn cmd_create_job(
    output: &Path,
    source: &str,
    target: &str,
    convert_to: Option<PathBuf>,
) -> d2c_core::Result<()> {
    let mut job = JobFile::new(source, target);
    if let Some(dir) = convert_to {
        job.output = Some(dir);
        job.convert_columns = true;
        job.row_mode = RowConversionMode::AppendTargetAtEnd;
    }

    job.save(output)?;
    println!("Created job file: {}", output.display());
    println!();
    println!("Edit the file to configure your job, then run:");
    println!("  d2c run --job {}", output.display());
    Ok(())
}
