//! Command handlers for the j2cov CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cobertura::Coverage;
use crate::{parser, sources, transform, writer};

/// Convert a JaCoCo report file into one (or, in split mode, several)
/// Cobertura report files.
pub fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    source_dirs: &[PathBuf],
    root_package: Option<&str>,
    split_by_package: bool,
) -> Result<String> {
    let content = std::fs::read(input).with_context(|| format!("reading `{}`", input.display()))?;
    let report = parser::parse(&content).context("loading JaCoCo report")?;

    let source_files = collect_source_files(source_dirs)?;
    let roots = sources::resolve_roots(&source_files, &report.package_names());

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input),
    };

    let mut out = String::new();
    if split_by_package {
        for (package, coverage) in transform::transform_split(&report, &roots, root_package) {
            let path = package_output_path(&output, &package);
            write_coverage_file(&path, &coverage)?;
            writeln!(
                out,
                "Cobertura report for package {} written to {}",
                package,
                path.display()
            )
            .unwrap();
        }
    } else {
        let coverage = transform::transform(&report, &roots, root_package);
        write_coverage_file(&output, &coverage)?;
        writeln!(out, "Cobertura report written to {}", output.display()).unwrap();
    }
    Ok(out)
}

/// Print a summary of a JaCoCo report, as text or JSON.
pub fn cmd_inspect(input: &Path, json: bool) -> Result<String> {
    let content = std::fs::read(input).with_context(|| format!("reading `{}`", input.display()))?;
    let report = parser::parse(&content).context("loading JaCoCo report")?;
    let summary = report.summary();

    if json {
        let mut out =
            serde_json::to_string_pretty(&summary).context("serializing report summary")?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    writeln!(out, "Report:       {}", summary.name).unwrap();
    for session in &summary.sessions {
        writeln!(
            out,
            "Session:      {} (start: {}, dump: {})",
            session.id.as_deref().unwrap_or("-"),
            session.start.as_deref().unwrap_or("-"),
            session.dump.as_deref().unwrap_or("-"),
        )
        .unwrap();
    }
    writeln!(out, "Packages:     {}", summary.packages).unwrap();
    writeln!(out, "Classes:      {}", summary.classes).unwrap();
    writeln!(out, "Methods:      {}", summary.methods).unwrap();
    writeln!(out, "Source files: {}", summary.source_files).unwrap();
    writeln!(
        out,
        "Lines:        {}/{} ({:.1}%)",
        summary.lines_covered,
        summary.lines_valid,
        summary.line_rate * 100.0
    )
    .unwrap();
    if summary.branches_valid > 0 {
        writeln!(
            out,
            "Branches:     {}/{} ({:.1}%)",
            summary.branches_covered,
            summary.branches_valid,
            summary.branch_rate * 100.0
        )
        .unwrap();
    }
    if summary.complexity > 0.0 {
        writeln!(out, "Complexity:   {}", summary.complexity).unwrap();
    }
    Ok(out)
}

/// Default output path: `cobertura-<input-stem>.xml` next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    input.with_file_name(format!("cobertura-{stem}.xml"))
}

/// Split-mode output path: the output file name suffixed with the dotted
/// package name, e.g. `cobertura.xml` → `cobertura-com.example.xml`.
fn package_output_path(output: &Path, package: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("cobertura");
    match output.extension().and_then(|s| s.to_str()) {
        Some(ext) => output.with_file_name(format!("{stem}-{package}.{ext}")),
        None => output.with_file_name(format!("{stem}-{package}")),
    }
}

/// Serialize fully in memory, then write the file in one shot. A conversion
/// that fails never leaves a partial report behind.
fn write_coverage_file(path: &Path, coverage: &Coverage) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory `{}`", parent.display()))?;
        }
    }
    let xml = writer::to_xml_string(coverage).context("writing Cobertura report")?;
    std::fs::write(path, xml).with_context(|| format!("writing `{}`", path.display()))?;
    Ok(())
}

/// Collect the files under each source directory, as absolute paths where
/// the directories resolve.
fn collect_source_files(dirs: &[PathBuf]) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for dir in dirs {
        let pattern = format!("{}/**/*", dir.display());
        let entries = glob::glob(&pattern)
            .with_context(|| format!("scanning source directory `{}`", dir.display()))?;
        for entry in entries {
            let path = entry.with_context(|| format!("reading entry under `{}`", dir.display()))?;
            if path.is_file() {
                let path = std::fs::canonicalize(&path).unwrap_or(path);
                files.push(path.to_string_lossy().into_owned());
            }
        }
    }
    Ok(files)
}
