use crate::projects::OwnerId;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const PROJECT_EXTENSION: &str = "sb2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSource {
    pub owner: OwnerId,
    pub path: PathBuf,
}

impl ProjectSource {
    /// Base name of the archive, used as the tree name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct Discovery {
    pub sources: Vec<ProjectSource>,
    /// Directories whose names are not owner ids.
    pub skipped: Vec<PathBuf>,
}

/// Finds `<root>/<owner id>/*.sb2`, sorted by owner directory then file name.
pub fn discover_projects(root: &Path) -> Result<Discovery> {
    if !root.is_dir() {
        return Err(anyhow!("Input directory not found: '{}'.", root.display()));
    }
    let mut discovery = Discovery::default();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to walk '{}'.", root.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some(owner) = owner_id(entry.path()) else {
            discovery.skipped.push(entry.path().to_path_buf());
            continue;
        };
        collect_archives(entry.path(), owner, &mut discovery.sources)?;
    }
    Ok(discovery)
}

fn collect_archives(dir: &Path, owner: OwnerId, out: &mut Vec<ProjectSource>) -> Result<()> {
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk '{}'.", dir.display()))?;
        if entry.file_type().is_file() && is_project_archive(entry.path()) {
            out.push(ProjectSource {
                owner,
                path: entry.path().to_path_buf(),
            });
        }
    }
    Ok(())
}

pub fn owner_id(dir: &Path) -> Option<OwnerId> {
    dir.file_name()?.to_str()?.parse().ok()
}

pub fn is_project_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(PROJECT_EXTENSION))
        .unwrap_or(false)
}
