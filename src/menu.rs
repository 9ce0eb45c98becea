//! Interactive main menu.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use color_eyre::eyre::{Context, Result};
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::debug;

use reclaim_analyze::{
    DuplicateConfig, DuplicateFinder, DuplicateReport, LARGE_FILE_THRESHOLD, find_large_files,
};
use reclaim_core::{ScanConfig, format_size, parse_size};
use reclaim_ops::{
    ConsolidateOptions, ConsolidationStrategy, Consolidator, ProgressReporter, SafeDeleter,
    clean_locations, clean_paths,
};
use reclaim_scan::{LocationKind, disk_usage};

use crate::progress::SpinnerReporter;
use crate::report::{self, DirectoryAnalysis, LocationReport};
use crate::ui::Terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
enum MenuAction {
    #[strum(to_string = "Show disk usage")]
    DiskUsage,
    #[strum(to_string = "Analyze directory")]
    AnalyzeDirectory,
    #[strum(to_string = "Analyze temporary files")]
    AnalyzeTemp,
    #[strum(to_string = "Analyze duplicate files")]
    AnalyzeDuplicates,
    #[strum(to_string = "Clean temporary files")]
    CleanTemp,
    #[strum(to_string = "Clean large files")]
    CleanLarge,
    #[strum(to_string = "Clean duplicate files")]
    CleanDuplicates,
    #[strum(to_string = "Exit")]
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
enum DedupeChoice {
    #[strum(to_string = "Delete duplicate files (keep newest)")]
    KeepNewest,
    #[strum(to_string = "Delete duplicate files (keep oldest)")]
    KeepOldest,
    #[strum(to_string = "Replace with hard links")]
    Hardlink,
    #[strum(to_string = "Replace with symbolic links")]
    Symlink,
    #[strum(to_string = "Cancel")]
    Cancel,
}

impl DedupeChoice {
    fn options(self) -> Option<ConsolidateOptions> {
        let (strategy, keep_newest) = match self {
            Self::KeepNewest => (ConsolidationStrategy::Delete, true),
            Self::KeepOldest => (ConsolidationStrategy::Delete, false),
            Self::Hardlink => (ConsolidationStrategy::Hardlink, true),
            Self::Symlink => (ConsolidationStrategy::Symlink, true),
            Self::Cancel => return None,
        };
        Some(ConsolidateOptions {
            strategy,
            keep_newest,
            use_trash: true,
        })
    }
}

/// Which files the operator picked from a numbered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Cancel,
    /// 0-based indices, in the order given.
    Indices(Vec<usize>),
}

/// Parse `all`, `cancel` or comma-separated 1-based numbers.
///
/// Numbers outside `1..=len` are dropped; anything unparsable is `None`.
pub fn parse_selection(input: &str, len: usize) -> Option<Selection> {
    match input.trim().to_lowercase().as_str() {
        "all" => Some(Selection::All),
        "cancel" => Some(Selection::Cancel),
        text => {
            let numbers: Vec<usize> = text
                .split(',')
                .map(|part| part.trim().parse::<usize>())
                .collect::<Result<_, _>>()
                .ok()?;
            Some(Selection::Indices(
                numbers
                    .into_iter()
                    .filter(|n| (1..=len).contains(n))
                    .map(|n| n - 1)
                    .collect(),
            ))
        }
    }
}

/// Run the menu until the operator exits.
pub fn run<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<()> {
    let actions: Vec<MenuAction> = MenuAction::iter().collect();

    loop {
        let action = actions[term.menu("reclaim - Storage Cleaning Utility", &actions)?];
        debug!(?action, "Menu selection");
        let outcome = match action {
            MenuAction::DiskUsage => show_disk_usage(term),
            MenuAction::AnalyzeDirectory => analyze_directory(term),
            MenuAction::AnalyzeTemp => analyze_temp(term),
            MenuAction::AnalyzeDuplicates => analyze_duplicates(term),
            MenuAction::CleanTemp => clean_temp(term),
            MenuAction::CleanLarge => clean_large(term),
            MenuAction::CleanDuplicates => clean_duplicates(term),
            MenuAction::Exit => {
                term.info("Exiting reclaim. Goodbye!")?;
                return Ok(());
            }
        };

        if let Err(err) = outcome {
            if err.downcast_ref::<io::Error>().is_some() {
                return Err(err);
            }
            term.error(format!("{err:#}"))?;
        }
        term.pause()?;
    }
}

/// Ask for a directory, defaulting to the home directory.
fn prompt_directory<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<Option<PathBuf>> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let answer = term.prompt("Enter directory path to analyze", Some(&home.display().to_string()))?;
    let directory = PathBuf::from(answer);

    if !directory.is_dir() {
        term.error(format!("Directory '{}' does not exist.", directory.display()))?;
        return Ok(None);
    }
    Ok(Some(directory))
}

/// Ask for a size threshold; `None` after reporting bad input.
fn prompt_size<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    message: &str,
    default: &str,
) -> Result<Option<u64>> {
    let answer = term.prompt(message, Some(default))?;
    match parse_size(&answer) {
        Ok(size) => Ok(Some(size)),
        Err(err) => {
            term.error(format!("Invalid size format: {err}"))?;
            Ok(None)
        }
    }
}

/// Prompt for a root and minimum size, then scan for duplicates.
fn scan_duplicates<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<Option<DuplicateReport>> {
    let Some(directory) = prompt_directory(term)? else {
        return Ok(None);
    };
    let Some(min_size) = prompt_size(term, "Enter minimum file size to consider (e.g., 1KB)", "1KB")? else {
        return Ok(None);
    };
    let config = DuplicateConfig::builder()
        .min_size(min_size)
        .build()
        .context("Invalid duplicate options")?;

    let mut spinner = SpinnerReporter::new("Analyzing duplicate files...");
    let found = DuplicateFinder::with_config(config)
        .find_with_progress(&ScanConfig::new(&directory), |path| {
            spinner.report_progress(path)
        });
    spinner.finish();
    Ok(Some(found.context("Duplicate scan failed")?))
}

fn show_disk_usage<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<()> {
    term.header("Disk Usage Information")?;
    report::show_disks(term, &disk_usage())?;
    Ok(())
}

fn analyze_directory<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<()> {
    term.header("Directory Analysis")?;
    let Some(directory) = prompt_directory(term)? else {
        return Ok(());
    };

    let spinner = SpinnerReporter::new("Analyzing directory...");
    let analysis = DirectoryAnalysis::collect(&directory, 1, LARGE_FILE_THRESHOLD, &spinner);
    spinner.finish();

    report::show_directory_analysis(term, &analysis?)?;
    Ok(())
}

fn analyze_temp<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<()> {
    term.header("Temporary Files Analysis")?;

    let spinner = SpinnerReporter::new("Analyzing temporary files...");
    let locations = LocationReport::collect_all(SystemTime::now());
    spinner.finish();

    report::show_locations(term, &locations)?;
    Ok(())
}

fn analyze_duplicates<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<()> {
    term.header("Duplicate Files Analysis")?;
    let Some(found) = scan_duplicates(term)? else {
        return Ok(());
    };

    report::show_duplicate_summary(term, &found)?;
    report::show_duplicate_groups(term, &found)?;
    Ok(())
}

fn clean_temp<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<()> {
    term.header("Clean Temporary Files")?;

    let mut options: Vec<String> = LocationKind::iter()
        .map(|kind| format!("Clean {} files", kind.to_string().to_lowercase()))
        .collect();
    options.push("Clean all temporary files".to_string());
    options.push("Back to main menu".to_string());

    let choice = term.menu("Select cleaning option:", &options)?;
    let kinds: Vec<LocationKind> = match choice {
        n if n < LocationKind::iter().count() => LocationKind::iter().skip(n).take(1).collect(),
        n if n == LocationKind::iter().count() => LocationKind::iter().collect(),
        _ => return Ok(()),
    };

    if !term.confirm("Are you sure you want to clean these files?", false)? {
        term.info("Operation cancelled.")?;
        return Ok(());
    }

    let now = SystemTime::now();
    let deleter = SafeDeleter::with_trash();
    let mut spinner = SpinnerReporter::new("Cleaning files...");
    let summaries: Vec<_> = kinds
        .into_iter()
        .map(|kind| {
            spinner.set_stage(&format!("Cleaning {}...", kind.to_string().to_lowercase()));
            (kind, clean_locations(kind, now, &deleter, &mut spinner))
        })
        .collect();
    spinner.finish();

    for (kind, summary) in &summaries {
        report::show_clean_summary(term, *kind, summary)?;
    }
    term.success("Temporary files cleaning completed!")?;
    Ok(())
}

fn clean_large<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<()> {
    term.header("Clean Large Files")?;
    let Some(directory) = prompt_directory(term)? else {
        return Ok(());
    };

    let Some(min_size) = prompt_size(term, "Enter minimum file size to consider (e.g., 100MB)", "100MB")? else {
        return Ok(());
    };

    let spinner = SpinnerReporter::new("Finding large files...");
    let large_files = find_large_files(&directory, min_size);
    spinner.finish();
    let large_files = large_files.context("Failed to find large files")?;

    if large_files.is_empty() {
        term.info(format!("No files larger than {} found.", format_size(min_size)))?;
        return Ok(());
    }
    report::show_files(term, "Large Files", &large_files)?;

    term.info("Enter the numbers of files to clean (comma-separated), 'all' to clean all, or 'cancel' to cancel:")?;
    let answer = term.prompt(">", None)?;
    let selected: Vec<PathBuf> = match parse_selection(&answer, large_files.len()) {
        Some(Selection::All) => large_files.into_iter().map(|file| file.path).collect(),
        Some(Selection::Cancel) => {
            term.info("Operation cancelled.")?;
            return Ok(());
        }
        Some(Selection::Indices(indices)) => indices
            .into_iter()
            .map(|index| large_files[index].path.clone())
            .collect(),
        None => {
            term.error("Invalid input.")?;
            return Ok(());
        }
    };

    if selected.is_empty() {
        term.info("No files selected for cleaning.")?;
        return Ok(());
    }
    if !term.confirm(
        &format!("Are you sure you want to clean {} files?", selected.len()),
        false,
    )? {
        term.info("Operation cancelled.")?;
        return Ok(());
    }

    let mut spinner = SpinnerReporter::new("Cleaning large files...");
    let result = clean_paths(&selected, &SafeDeleter::with_trash(), &mut spinner);
    spinner.finish();

    report::show_clean_result(term, "files", &result)?;
    Ok(())
}

fn clean_duplicates<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<()> {
    term.header("Clean Duplicate Files")?;
    let Some(found) = scan_duplicates(term)? else {
        return Ok(());
    };

    if !found.has_duplicates() {
        term.info("No duplicate files found.")?;
        return Ok(());
    }
    report::show_duplicate_summary(term, &found)?;

    let choices: Vec<DedupeChoice> = DedupeChoice::iter().collect();
    let Some(options) = choices[term.menu("Select cleaning method:", &choices)?].options() else {
        term.info("Operation cancelled.")?;
        return Ok(());
    };

    if !term.confirm("Are you sure you want to clean duplicate files?", false)? {
        term.info("Operation cancelled.")?;
        return Ok(());
    }

    let mut spinner = SpinnerReporter::new("Processing duplicate files...");
    let result = Consolidator::new(options).consolidate_all(&found.groups, &mut spinner);
    spinner.finish();

    report::show_consolidation(term, &result)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection(" ALL ", 3), Some(Selection::All));
        assert_eq!(parse_selection("cancel", 3), Some(Selection::Cancel));
        assert_eq!(
            parse_selection("1, 3,9", 3),
            Some(Selection::Indices(vec![0, 2]))
        );
        assert_eq!(parse_selection("0", 3), Some(Selection::Indices(vec![])));
        assert_eq!(parse_selection("one", 3), None);
        assert_eq!(parse_selection("", 3), None);
    }

    #[test]
    fn test_dedupe_choices_map_to_options() {
        let oldest = DedupeChoice::KeepOldest.options().unwrap();
        assert_eq!(oldest.strategy, ConsolidationStrategy::Delete);
        assert!(!oldest.keep_newest);
        assert_eq!(
            DedupeChoice::Symlink.options().unwrap().strategy,
            ConsolidationStrategy::Symlink
        );
        assert!(DedupeChoice::Cancel.options().is_none());
    }

    #[test]
    fn test_menu_exit() {
        let mut term = Terminal::new(Cursor::new(b"8\n".to_vec()), Vec::new());
        run(&mut term).unwrap();
        let text = String::from_utf8(term.into_output()).unwrap();
        assert!(text.contains("1. Show disk usage"));
        assert!(text.contains("Goodbye"));
    }

    #[test]
    fn test_menu_missing_directory_returns_to_menu() {
        let input = b"2\n/definitely/not/a/dir\n\n8\n".to_vec();
        let mut term = Terminal::new(Cursor::new(input), Vec::new());
        run(&mut term).unwrap();
        let text = String::from_utf8(term.into_output()).unwrap();
        assert!(text.contains("does not exist"));
    }

    fn run_menu(input: String) -> String {
        let mut term = Terminal::new(Cursor::new(input.into_bytes()), Vec::new());
        run(&mut term).unwrap();
        String::from_utf8(term.into_output()).unwrap()
    }

    #[test]
    fn test_duplicate_scan_rejects_bad_min_size() {
        let temp = tempfile::TempDir::new().unwrap();
        let text = run_menu(format!("4\n{}\nlots\n\n8\n", temp.path().display()));
        assert!(text.contains("Enter minimum file size to consider (e.g., 1KB) [1KB]: "));
        assert!(text.contains("Invalid size format"));
        assert!(!text.contains("Total duplicate sets"));
    }

    #[test]
    fn test_duplicate_scan_honors_min_size() {
        let temp = tempfile::TempDir::new().unwrap();
        let content = vec![b'x'; 2048];
        std::fs::write(temp.path().join("a.bin"), &content).unwrap();
        std::fs::write(temp.path().join("b.bin"), &content).unwrap();

        let text = run_menu(format!("7\n{}\n4KB\n\n8\n", temp.path().display()));
        assert!(text.contains("No duplicate files found."));

        let text = run_menu(format!("4\n{}\n\n\n8\n", temp.path().display()));
        assert!(text.contains("Total duplicate sets: 1"));
    }

    #[test]
    fn test_menu_eof_is_error() {
        let mut term = Terminal::new(Cursor::new(Vec::new()), Vec::new());
        assert!(run(&mut term).is_err());
    }
}
