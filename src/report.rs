//! Report collection and rendering shared by the menu and the subcommands.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use color_eyre::eyre::{Context, Result};
use serde::Serialize;
use strum::IntoEnumIterator;

use reclaim_analyze::{
    DirectorySize, DuplicateReport, FileTypeStats, TempReport, analyze_location,
    directory_tree_sizes, file_type_summary, find_large_files, size_distribution,
};
use reclaim_core::{FileRecord, SizeDistribution, format_size};
use reclaim_ops::{CleanResult, CleanSummary, ConsolidationResult};
use reclaim_scan::{DiskUsage, LocationKind};

use crate::progress::SpinnerReporter;
use crate::ui::Terminal;

/// Rows shown per table.
pub const TABLE_LIMIT: usize = 20;

/// Everything learned about one directory.
#[derive(Debug, Serialize)]
pub struct DirectoryAnalysis {
    pub directory: PathBuf,
    pub subdirectories: Vec<DirectorySize>,
    pub large_files: Vec<FileRecord>,
    pub file_types: Vec<FileTypeStats>,
    pub distribution: SizeDistribution,
}

impl DirectoryAnalysis {
    /// Walk `dir` for each part of the analysis.
    pub fn collect(dir: &Path, depth: usize, large_threshold: u64, spinner: &SpinnerReporter) -> Result<Self> {
        spinner.set_stage("Analyzing directory sizes...");
        let mut subdirectories =
            directory_tree_sizes(dir, depth).context("Failed to measure directories")?;
        subdirectories.sort_by(|a, b| b.size.cmp(&a.size));

        spinner.set_stage("Finding large files...");
        let large_files =
            find_large_files(dir, large_threshold).context("Failed to find large files")?;

        spinner.set_stage("Analyzing file types...");
        let file_types = file_type_summary(dir).context("Failed to summarize file types")?;
        let distribution = size_distribution(dir).context("Failed to bucket file sizes")?;

        Ok(Self {
            directory: dir.to_path_buf(),
            subdirectories,
            large_files,
            file_types,
            distribution,
        })
    }
}

/// Temp analysis of every directory of one location kind.
#[derive(Debug, Serialize)]
pub struct LocationReport {
    pub kind: LocationKind,
    pub directories: Vec<TempReport>,
}

impl LocationReport {
    /// Analyze every location kind.
    pub fn collect_all(now: SystemTime) -> Vec<Self> {
        LocationKind::iter()
            .map(|kind| Self {
                kind,
                directories: analyze_location(kind, now),
            })
            .collect()
    }
}

/// Local timestamp for tables.
pub fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M").to_string()
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}

pub fn show_disks<R: BufRead, W: Write>(term: &mut Terminal<R, W>, disks: &[DiskUsage]) -> io::Result<()> {
    let rows: Vec<Vec<String>> = disks
        .iter()
        .map(|disk| {
            vec![
                disk.device.clone(),
                disk.mountpoint.display().to_string(),
                disk.filesystem.clone(),
                format_size(disk.total),
                format_size(disk.used),
                format_size(disk.free),
                format!("{:.1}%", disk.percent),
            ]
        })
        .collect();

    term.table(
        "Disk Usage",
        &["Device", "Mount Point", "Filesystem", "Total", "Used", "Free", "Usage"],
        &rows,
    )
}

pub fn show_directory_analysis<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    analysis: &DirectoryAnalysis,
) -> io::Result<()> {
    term.subheader("Directory Size Analysis")?;
    let rows: Vec<Vec<String>> = analysis
        .subdirectories
        .iter()
        .take(TABLE_LIMIT)
        .map(|dir| vec![dir.label.clone(), format_size(dir.size)])
        .collect();
    term.table("Directory Sizes", &["Path", "Size"], &rows)?;

    term.subheader("Large Files Analysis")?;
    show_files(term, "Large Files", &analysis.large_files)?;

    term.subheader("File Types Analysis")?;
    let rows: Vec<Vec<String>> = analysis
        .file_types
        .iter()
        .take(TABLE_LIMIT)
        .map(|stats| {
            vec![
                stats.extension.to_string(),
                stats.count.to_string(),
                format_size(stats.total_size),
            ]
        })
        .collect();
    term.table("File Types", &["Extension", "Count", "Total Size"], &rows)?;

    let rows: Vec<Vec<String>> = analysis
        .distribution
        .ranges()
        .iter()
        .map(|(label, count)| vec![label.to_string(), count.to_string()])
        .collect();
    term.table("Size Distribution", &["Range", "Files"], &rows)
}

/// Numbered table of files, largest first as given.
pub fn show_files<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    title: &str,
    files: &[FileRecord],
) -> io::Result<()> {
    let rows: Vec<Vec<String>> = files
        .iter()
        .take(TABLE_LIMIT)
        .enumerate()
        .map(|(index, file)| {
            vec![
                (index + 1).to_string(),
                file.path.display().to_string(),
                format_size(file.size),
                format_time(file.modified),
            ]
        })
        .collect();
    term.table(title, &["#", "Path", "Size", "Modified"], &rows)?;
    if files.len() > TABLE_LIMIT {
        term.info(format!("... and {} more", files.len() - TABLE_LIMIT))?;
    }
    Ok(())
}

pub fn show_locations<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    locations: &[LocationReport],
) -> io::Result<()> {
    let mut total_size = 0;
    let mut cleanable_size = 0;

    for location in locations {
        term.subheader(&format!("{} Directories", location.kind))?;
        let rows: Vec<Vec<String>> = location
            .directories
            .iter()
            .map(|report| {
                vec![
                    report.directory.display().to_string(),
                    format_size(report.total_size),
                    format_size(report.old_files_size),
                ]
            })
            .collect();
        term.table(
            &location.kind.to_string(),
            &["Directory", "Total Size", "Cleanable Size"],
            &rows,
        )?;

        total_size += location.directories.iter().map(|r| r.total_size).sum::<u64>();
        cleanable_size += location.directories.iter().map(|r| r.old_files_size).sum::<u64>();
    }

    term.subheader("Summary")?;
    term.info(format!("Total temporary files size: {}", format_size(total_size)))?;
    term.info(format!("Total cleanable size: {}", format_size(cleanable_size)))
}

pub fn show_duplicate_summary<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    report: &DuplicateReport,
) -> io::Result<()> {
    term.subheader("Summary")?;
    term.info(format!("Files analyzed: {}", report.files_analyzed))?;
    term.info(format!("Total duplicate sets: {}", report.group_count))?;
    term.info(format!("Total duplicate files: {}", report.files_with_duplicates))?;
    term.info(format!("Total wasted space: {}", format_size(report.total_wasted_space)))?;
    if !report.warnings.is_empty() {
        term.warning(format!("{} entries could not be read", report.warnings.len()))?;
    }
    Ok(())
}

pub fn show_duplicate_groups<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    report: &DuplicateReport,
) -> io::Result<()> {
    term.subheader("Duplicate Sets")?;
    for (index, group) in report.groups.iter().enumerate() {
        term.subheader(&format!("Duplicate Set {}", index + 1))?;
        term.info(format!("File size: {}", format_size(group.size)))?;
        term.info(format!("Number of duplicates: {}", group.count()))?;
        term.info(format!("Wasted space: {}", format_size(group.wasted_bytes())))?;

        let rows: Vec<Vec<String>> = group
            .members
            .iter()
            .map(|member| vec![member.path.display().to_string(), format_time(member.modified)])
            .collect();
        term.table("Files", &["Path", "Modified"], &rows)?;
    }
    Ok(())
}

pub fn show_consolidation<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    result: &ConsolidationResult,
) -> io::Result<()> {
    for failure in result.failures() {
        term.error(format!(
            "{}: {}",
            failure.path.display(),
            failure.error.as_deref().unwrap_or("failed")
        ))?;
    }
    term.success(format!(
        "Processed {} files ({})",
        result.total_count,
        format_size(result.total_bytes_reclaimed)
    ))
}

pub fn show_clean_result<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    label: &str,
    result: &CleanResult,
) -> io::Result<()> {
    if let Some(error) = &result.error {
        return term.error(format!("{}: {error}", result.directory.display()));
    }
    if !result.failed.is_empty() {
        term.warning(format!("{} files could not be removed", result.failed.len()))?;
    }
    term.success(format!(
        "Cleaned {} {label} ({})",
        result.total_count,
        format_size(result.total_size)
    ))
}

pub fn show_clean_summary<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    kind: LocationKind,
    summary: &CleanSummary,
) -> io::Result<()> {
    let failed: usize = summary.details.iter().map(|detail| detail.failed.len()).sum();
    if failed > 0 {
        term.warning(format!("{failed} {} items could not be removed", kind.to_string().to_lowercase()))?;
    }
    term.success(format!(
        "Cleaned {} {} files ({})",
        summary.total_count,
        kind.to_string().to_lowercase(),
        format_size(summary.total_size)
    ))
}
