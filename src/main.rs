//! reclaim - find and reclaim wasted disk space.
//!
//! Usage:
//!   reclaim                     Interactive menu
//!   reclaim disks               Partition usage
//!   reclaim analyze [PATH]      Directory sizes, large files, file types
//!   reclaim temp                Temp and cache directories
//!   reclaim duplicates [PATH]   Find duplicate files
//!   reclaim dedupe [PATH]       Delete or link duplicate files
//!   reclaim clean-large [PATH]  Remove large files
//!   reclaim clean-temp          Remove old temp and cache files
//!   reclaim --help              Show help

mod menu;
mod progress;
mod report;
mod ui;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;

use reclaim_analyze::{DEFAULT_MIN_SIZE, DuplicateConfig, DuplicateFinder, LARGE_FILE_THRESHOLD};
use reclaim_core::{ScanConfig, format_size, parse_size};
use reclaim_ops::{
    ConsolidateOptions, ConsolidationStrategy, Consolidator, ProgressReporter, SafeDeleter,
    clean_large_files, clean_locations,
};
use reclaim_scan::{LocationKind, disk_usage};

use crate::progress::SpinnerReporter;
use crate::report::{DirectoryAnalysis, LocationReport};
use crate::ui::Terminal;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "RECLAIM_LOG";

#[derive(Parser)]
#[command(
    name = "reclaim",
    version,
    about = "Find and reclaim wasted disk space",
    long_about = "reclaim shows where disk space goes and frees it.\n\n\
                  Run `reclaim` without arguments for the interactive menu, or \
                  use subcommands for scripted operations."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show usage of mounted partitions
    Disks {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Analyze directory sizes, large files and file types
    Analyze {
        /// Directory to analyze
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Subdirectory levels to list
        #[arg(short, long, default_value = "1")]
        depth: usize,

        /// Threshold for large files (e.g., "100MB")
        #[arg(short, long, default_value = "100MB")]
        min_size: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Analyze temp and cache directories
    Temp {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Find duplicate files
    Duplicates {
        #[command(flatten)]
        scan: DuplicateArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Keep one copy of each duplicate and delete or link the rest
    Dedupe {
        #[command(flatten)]
        scan: DuplicateArgs,

        /// What to do with the other copies
        #[arg(short, long, default_value = "delete")]
        strategy: ConsolidationStrategy,

        /// Keep the oldest copy instead of the newest
        #[arg(long)]
        keep_oldest: bool,

        /// Delete permanently instead of moving to the trash
        #[arg(long)]
        permanent: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Remove files above a size threshold
    CleanLarge {
        /// Directory to clean
        path: PathBuf,

        /// Minimum file size (e.g., "100MB")
        #[arg(short, long, default_value = "100MB")]
        min_size: String,

        /// Delete permanently instead of moving to the trash
        #[arg(long)]
        permanent: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Remove old temp files and caches
    CleanTemp {
        /// Locations to clean
        #[arg(short, long, default_value = "all")]
        target: TempTarget,

        /// Delete permanently instead of moving to the trash
        #[arg(long)]
        permanent: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(clap::Args)]
struct DuplicateArgs {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Minimum file size to consider (e.g., "1KB", "1MB")
    #[arg(short, long, default_value = "1KB")]
    min_size: String,

    /// Maximum number of duplicate groups (0 = all)
    #[arg(short = 'n', long, default_value = "0")]
    top: usize,

    /// Glob patterns to exclude (repeatable)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Skip hidden files and directories
    #[arg(long)]
    no_hidden: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TempTarget {
    System,
    Browser,
    Package,
    All,
}

impl TempTarget {
    fn kinds(self) -> Vec<LocationKind> {
        match self {
            Self::System => vec![LocationKind::SystemTemp],
            Self::Browser => vec![LocationKind::BrowserCache],
            Self::Package => vec![LocationKind::PackageCache],
            Self::All => LocationKind::iter().collect(),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let cli = Cli::parse();
    let mut term = Terminal::stdio();

    match cli.command {
        None => menu::run(&mut term)?,
        Some(Command::Disks { format }) => run_disks(&mut term, format)?,
        Some(Command::Analyze {
            path,
            depth,
            min_size,
            format,
        }) => run_analyze(&mut term, &path, depth, &min_size, format)?,
        Some(Command::Temp { format }) => run_temp(&mut term, format)?,
        Some(Command::Duplicates { scan, format }) => run_duplicates(&mut term, &scan, format)?,
        Some(Command::Dedupe {
            scan,
            strategy,
            keep_oldest,
            permanent,
            yes,
            format,
        }) => {
            let options = ConsolidateOptions::builder()
                .strategy(strategy)
                .keep_newest(!keep_oldest)
                .use_trash(!permanent)
                .build()
                .context("Invalid consolidation options")?;
            run_dedupe(&mut term, &scan, options, yes, format)?
        }
        Some(Command::CleanLarge {
            path,
            min_size,
            permanent,
            yes,
            format,
        }) => run_clean_large(&mut term, &path, &min_size, deleter(permanent), yes, format)?,
        Some(Command::CleanTemp {
            target,
            permanent,
            yes,
            format,
        }) => run_clean_temp(&mut term, target, deleter(permanent), yes, format)?,
    }

    Ok(())
}

/// Log to stderr, filtered by `RECLAIM_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn deleter(permanent: bool) -> SafeDeleter {
    SafeDeleter {
        use_trash: !permanent,
    }
}

fn spinner(format: OutputFormat, message: &str) -> SpinnerReporter {
    match format {
        OutputFormat::Text => SpinnerReporter::new(message),
        OutputFormat::Json => SpinnerReporter::hidden(),
    }
}

fn existing_dir(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        bail!("Directory '{}' does not exist", path.display());
    }
    std::path::absolute(path).context("Invalid path")
}

fn size_arg(text: &str) -> Result<u64> {
    parse_size(text).with_context(|| format!("Invalid size format: {text}"))
}

/// Ask before a destructive step unless `--yes` was given.
fn confirmed<R: BufRead, W: Write>(term: &mut Terminal<R, W>, yes: bool, question: &str) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if term.confirm(question, false)? {
        Ok(true)
    } else {
        term.info("Operation cancelled.")?;
        Ok(false)
    }
}

fn run_disks<R: BufRead, W: Write>(term: &mut Terminal<R, W>, format: OutputFormat) -> Result<()> {
    let disks = disk_usage();
    match format {
        OutputFormat::Text => report::show_disks(term, &disks)?,
        OutputFormat::Json => report::print_json(&disks)?,
    }
    Ok(())
}

fn run_analyze<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    path: &Path,
    depth: usize,
    min_size: &str,
    format: OutputFormat,
) -> Result<()> {
    let path = existing_dir(path)?;
    let threshold = size_arg(min_size)?;

    let spinner = spinner(format, "Analyzing directory...");
    let analysis = DirectoryAnalysis::collect(&path, depth, threshold, &spinner);
    spinner.finish();
    let analysis = analysis?;

    match format {
        OutputFormat::Text => {
            term.header(&format!("Directory Analysis: {}", path.display()))?;
            report::show_directory_analysis(term, &analysis)?;
        }
        OutputFormat::Json => report::print_json(&analysis)?,
    }
    Ok(())
}

fn run_temp<R: BufRead, W: Write>(term: &mut Terminal<R, W>, format: OutputFormat) -> Result<()> {
    let spinner = spinner(format, "Analyzing temporary files...");
    let locations = LocationReport::collect_all(SystemTime::now());
    spinner.finish();

    match format {
        OutputFormat::Text => {
            term.header("Temporary Files Analysis")?;
            report::show_locations(term, &locations)?;
        }
        OutputFormat::Json => report::print_json(&locations)?,
    }
    Ok(())
}

fn find_duplicates(args: &DuplicateArgs, format: OutputFormat) -> Result<reclaim_analyze::DuplicateReport> {
    let path = existing_dir(&args.path)?;
    let min_size = if args.min_size.is_empty() {
        DEFAULT_MIN_SIZE
    } else {
        size_arg(&args.min_size)?
    };

    let config = DuplicateConfig::builder()
        .min_size(min_size)
        .max_groups(args.top)
        .exclude_patterns(args.exclude.clone())
        .build()
        .context("Invalid duplicate options")?;
    let scan = ScanConfig::builder()
        .root(path)
        .include_hidden(!args.no_hidden)
        .build()
        .context("Invalid scan options")?;

    let mut spinner = spinner(format, "Finding duplicates...");
    let found = DuplicateFinder::with_config(config)
        .find_with_progress(&scan, |path| spinner.report_progress(path));
    spinner.finish();
    found.context("Duplicate scan failed")
}

fn run_duplicates<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    args: &DuplicateArgs,
    format: OutputFormat,
) -> Result<()> {
    let found = find_duplicates(args, format)?;
    match format {
        OutputFormat::Text => {
            term.header("Duplicate File Report")?;
            if found.has_duplicates() {
                report::show_duplicate_summary(term, &found)?;
                report::show_duplicate_groups(term, &found)?;
            } else {
                term.info("No duplicate files found.")?;
            }
        }
        OutputFormat::Json => report::print_json(&found)?,
    }
    Ok(())
}

fn run_dedupe<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    args: &DuplicateArgs,
    options: ConsolidateOptions,
    yes: bool,
    format: OutputFormat,
) -> Result<()> {
    let found = find_duplicates(args, format)?;
    if !found.has_duplicates() {
        if let OutputFormat::Json = format {
            return report::print_json(&reclaim_ops::ConsolidationResult::default());
        }
        term.info("No duplicate files found.")?;
        return Ok(());
    }

    if let OutputFormat::Text = format {
        report::show_duplicate_summary(term, &found)?;
        term.info(format!("Strategy: {}", options.strategy.description()))?;
    }
    let question = format!(
        "Process {} duplicate files ({})?",
        found.groups.iter().map(|group| group.deletable_count()).sum::<usize>(),
        format_size(found.total_wasted_space)
    );
    if !confirmed(term, yes, &question)? {
        return Ok(());
    }

    let mut spinner = spinner(format, "Processing duplicate files...");
    let result = Consolidator::new(options).consolidate_all(&found.groups, &mut spinner);
    spinner.finish();

    match format {
        OutputFormat::Text => report::show_consolidation(term, &result)?,
        OutputFormat::Json => report::print_json(&result)?,
    }
    Ok(())
}

fn run_clean_large<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    path: &Path,
    min_size: &str,
    deleter: SafeDeleter,
    yes: bool,
    format: OutputFormat,
) -> Result<()> {
    let path = existing_dir(path)?;
    let threshold = if min_size.is_empty() {
        LARGE_FILE_THRESHOLD
    } else {
        size_arg(min_size)?
    };

    let question = format!(
        "Remove every file of at least {} below {}?",
        format_size(threshold),
        path.display()
    );
    if !confirmed(term, yes, &question)? {
        return Ok(());
    }

    let mut spinner = spinner(format, "Cleaning large files...");
    let result = clean_large_files(&path, threshold, &deleter, &mut spinner);
    spinner.finish();

    match format {
        OutputFormat::Text => report::show_clean_result(term, "files", &result)?,
        OutputFormat::Json => report::print_json(&result)?,
    }
    Ok(())
}

fn run_clean_temp<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    target: TempTarget,
    deleter: SafeDeleter,
    yes: bool,
    format: OutputFormat,
) -> Result<()> {
    let kinds = target.kinds();
    let names: Vec<String> = kinds.iter().map(|kind| kind.to_string().to_lowercase()).collect();
    if !confirmed(term, yes, &format!("Clean {}?", names.join(", ")))? {
        return Ok(());
    }

    let now = SystemTime::now();
    let mut spinner = spinner(format, "Cleaning files...");
    let mut summaries = Vec::with_capacity(kinds.len());
    for kind in kinds {
        spinner.set_stage(&format!("Cleaning {}...", kind.to_string().to_lowercase()));
        summaries.push((kind, clean_locations(kind, now, &deleter, &mut spinner)));
    }
    spinner.finish();

    match format {
        OutputFormat::Text => {
            for (kind, summary) in &summaries {
                report::show_clean_summary(term, *kind, summary)?;
            }
        }
        OutputFormat::Json => report::print_json(&summaries)?,
    }
    Ok(())
}
