use crate::projects::ProjectCollection;
use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const OUTPUT_EXTENSION: &str = "se";

/// `game.sb2` -> `game.se`
pub fn output_file_name(project_name: &str) -> PathBuf {
    Path::new(project_name).with_extension(OUTPUT_EXTENSION)
}

/// Writes every project as `<out_dir>/<owner>/<name>.se`.
///
/// With `replace` set, the whole tree of files is first written into a
/// staging directory next to `out_dir`, then swapped in for any previous
/// output. Replacing is refused when `out_dir` is a filesystem root, holds
/// the working directory, or holds `input`. Without `replace`, files are
/// written straight into `out_dir` and existing files are left alone unless
/// overwritten.
pub fn write_projects(
    projects: &ProjectCollection,
    out_dir: &Path,
    input: &Path,
    indent: &str,
    replace: bool,
) -> Result<Vec<PathBuf>> {
    if !replace {
        return write_into(projects, out_dir, out_dir, indent);
    }

    let target = resolve_output_dir(out_dir)?;
    check_replace_target(&target, input)?;
    let parent = target
        .parent()
        .ok_or_else(|| anyhow!("Refusing to replace '{}': it is a filesystem root.", target.display()))?;
    let staging = tempfile::Builder::new()
        .prefix(".sbtree-")
        .tempdir_in(parent)
        .with_context(|| format!("Failed to create staging directory in '{}'.", parent.display()))?;

    let written = write_into(projects, staging.path(), out_dir, indent)?;
    let staged = staging.keep();

    if target.exists() {
        fs::remove_dir_all(&target)
            .with_context(|| format!("Failed to clear '{}'.", target.display()))?;
    }
    if let Err(err) = fs::rename(&staged, &target) {
        let _ = fs::remove_dir_all(&staged);
        return Err(err).with_context(|| {
            format!(
                "Failed to move '{}' to '{}'.",
                staged.display(),
                target.display()
            )
        });
    }
    Ok(written)
}

/// Absolute, symlink-free form of `out_dir`, which need not exist yet.
fn resolve_output_dir(out_dir: &Path) -> Result<PathBuf> {
    if out_dir.exists() {
        return out_dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve '{}'.", out_dir.display()));
    }
    let name = out_dir
        .file_name()
        .ok_or_else(|| anyhow!("Output path '{}' has no directory name.", out_dir.display()))?;
    let parent = match out_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create '{}'.", parent.display()))?;
    let parent = parent
        .canonicalize()
        .with_context(|| format!("Failed to resolve '{}'.", parent.display()))?;
    Ok(parent.join(name))
}

fn check_replace_target(target: &Path, input: &Path) -> Result<()> {
    if target.parent().is_none() {
        bail!("Refusing to replace '{}': it is a filesystem root.", target.display());
    }
    let cwd = std::env::current_dir()
        .and_then(|dir| dir.canonicalize())
        .context("Failed to resolve the current directory.")?;
    if cwd.starts_with(target) {
        bail!(
            "Refusing to replace '{}': it holds the current directory. Choose another OUTPUT or pass --keep-output.",
            target.display()
        );
    }
    let input = input
        .canonicalize()
        .with_context(|| format!("Failed to resolve '{}'.", input.display()))?;
    if input.starts_with(target) {
        bail!(
            "Refusing to replace '{}': it holds the input '{}'. Choose another OUTPUT.",
            target.display(),
            input.display()
        );
    }
    Ok(())
}

/// Writes under `target`, reporting paths as they will appear under `final_dir`.
fn write_into(
    projects: &ProjectCollection,
    target: &Path,
    final_dir: &Path,
    indent: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (owner, trees) in projects.iter() {
        let owner_dir = target.join(owner.to_string());
        fs::create_dir_all(&owner_dir)
            .with_context(|| format!("Failed to create '{}'.", owner_dir.display()))?;
        for tree in trees {
            let file_name = output_file_name(tree.name());
            let path = owner_dir.join(&file_name);
            fs::write(&path, tree.render_to_string(1, indent).as_bytes())
                .with_context(|| format!("Failed to write '{}'.", path.display()))?;
            written.push(final_dir.join(owner.to_string()).join(file_name));
        }
    }
    Ok(written)
}
