pub mod archive;
pub mod block;
pub mod cli;
pub mod discover;
pub mod error;
pub mod projects;
pub mod scanner;
pub mod script;
pub mod tree;
pub mod writer;

use anyhow::{bail, Context, Result};
use block::Block;
use discover::{discover_projects, is_project_archive, ProjectSource};
use projects::ProjectCollection;
use scanner::{scan_project, ScanOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tree::Tree;

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub indent_width: usize,
    pub scan: ScanOptions,
    pub replace_output: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            scan: ScanOptions::default(),
            replace_output: true,
        }
    }
}

impl ExtractOptions {
    pub fn from_args(args: &cli::Args) -> Self {
        Self {
            indent_width: args.indent_width,
            scan: ScanOptions {
                include_literals: args.literals,
            },
            replace_output: !args.keep_output,
        }
    }

    pub fn indent(&self) -> String {
        " ".repeat(self.indent_width)
    }
}

pub fn run_cli(args: &cli::Args) -> Result<()> {
    let options = ExtractOptions::from_args(args);
    if args.input.is_file() {
        return run_single_file(args, &options);
    }
    if !args.input.is_dir() {
        bail!("Input not found: '{}'.", args.input.display());
    }

    let progress = CliProgress::new("Extract", 3);
    progress.emit(1, "Discovering projects");
    let discovery = discover_projects(&args.input)?;
    for dir in &discovery.skipped {
        eprintln!(
            "warning: skipping '{}': directory name is not an owner id.",
            dir.display()
        );
    }

    progress.emit(
        2,
        &format!("Scanning {} project archive(s)", discovery.sources.len()),
    );
    let (projects, failures) = collect_projects(&discovery.sources, options.scan);
    for (path, err) in &failures {
        eprintln!("warning: skipping '{}': {:#}", path.display(), err);
    }

    let indent = options.indent();
    if args.print {
        progress.emit(3, "Printing projects");
        for (_, trees) in projects.iter() {
            for tree in trees {
                println!("{}", tree.render_to_string(1, &indent));
            }
        }
    } else {
        let out_dir = args
            .output
            .clone()
            .unwrap_or_else(|| default_output_dir(&args.input));
        progress.emit(3, &format!("Writing '{}'", out_dir.display()));
        writer::write_projects(
            &projects,
            &out_dir,
            &args.input,
            &indent,
            options.replace_output,
        )?;
    }

    eprintln!(
        "[Extract] Done: {} project(s) for {} owner(s), {} failed.",
        projects.project_count(),
        projects.owner_count(),
        failures.len()
    );
    Ok(())
}

fn run_single_file(args: &cli::Args, options: &ExtractOptions) -> Result<()> {
    let trees = extract_file(&args.input, options.scan)?;
    let indent = options.indent();
    let text = trees
        .iter()
        .map(|tree| tree.render_to_string(1, &indent))
        .collect::<Vec<_>>()
        .join("\n");
    match &args.output {
        Some(path) if !args.print => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, text.as_bytes())
                .with_context(|| format!("Failed to write '{}'.", path.display()))?;
        }
        _ => print!("{}", text),
    }
    Ok(())
}

/// Scans every source, grouping the resulting trees by owner. A source that
/// fails is reported back and does not stop the others.
pub fn collect_projects(
    sources: &[ProjectSource],
    scan: ScanOptions,
) -> (ProjectCollection, Vec<(PathBuf, anyhow::Error)>) {
    let mut projects = ProjectCollection::new();
    let mut failures = Vec::new();
    for source in sources {
        match extract_archive(&source.path, &source.file_name(), scan) {
            Ok(trees) => {
                for tree in trees {
                    projects.add_project(source.owner, tree);
                }
            }
            Err(err) => failures.push((source.path.clone(), err)),
        }
    }
    (projects, failures)
}

/// One tree per project description in the archive that declares an object.
pub fn extract_archive(path: &Path, name: &str, scan: ScanOptions) -> Result<Vec<Tree<Block>>> {
    let mut trees = Vec::new();
    for project in archive::read_project_texts(path)? {
        let tree = scan_project(&project.text, name, scan).with_context(|| {
            format!("Failed to scan '{}' in '{}'.", project.entry, path.display())
        })?;
        trees.extend(tree);
    }
    Ok(trees)
}

/// Accepts an `.sb2` archive or an already extracted project description.
pub fn extract_file(path: &Path, scan: ScanOptions) -> Result<Vec<Tree<Block>>> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if is_project_archive(path) {
        return extract_archive(path, &name, scan);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'.", path.display()))?;
    let tree = scan_project(&text, &name, scan)
        .with_context(|| format!("Failed to scan '{}'.", path.display()))?;
    Ok(tree.into_iter().collect())
}

fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("projects");
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{}_se", stem))
}

struct CliProgress {
    prefix: &'static str,
    total: usize,
}

impl CliProgress {
    fn new(prefix: &'static str, total: usize) -> Self {
        Self {
            prefix,
            total: total.max(1),
        }
    }

    fn emit(&self, step: usize, label: &str) {
        let step = step.clamp(1, self.total);
        let bar = render_progress_bar(step, self.total, 14);
        eprintln!(
            "[{}] {}... ({}/{}) {}",
            self.prefix, label, step, self.total, bar
        );
    }
}

fn render_progress_bar(step: usize, total: usize, width: usize) -> String {
    let width = width.max(1);
    let filled = ((step * width) + (total / 2)) / total;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < filled { '=' } else { '-' });
    }
    s.push(']');
    s
}
