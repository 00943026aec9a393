use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// A project description pulled out of an archive.
#[derive(Debug, Clone)]
pub struct ProjectText {
    pub entry: String,
    pub text: String,
}

/// Reads every top-level `*.json` entry of an `.sb2` archive, in archive
/// order. Costume and sound assets are skipped without being inflated.
pub fn read_project_texts(input: &Path) -> Result<Vec<ProjectText>> {
    let file =
        fs::File::open(input).with_context(|| format!("Failed to open '{}'.", input.display()))?;
    let texts = read_project_texts_from(file)
        .with_context(|| format!("'{}' is not a valid .sb2 archive.", input.display()))?;
    if texts.is_empty() {
        return Err(anyhow!("No project description found in '{}'.", input.display()));
    }
    Ok(texts)
}

pub fn read_project_texts_from<R: Read + Seek>(reader: R) -> Result<Vec<ProjectText>> {
    let mut zip = ZipArchive::new(reader)?;
    let mut texts = Vec::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let name = entry.name().to_string();
        if name.contains('/') || !name.ends_with(".json") {
            continue;
        }
        let mut text = String::new();
        entry
            .read_to_string(&mut text)
            .with_context(|| format!("Failed reading '{}' from archive.", name))?;
        texts.push(ProjectText { entry: name, text });
    }
    Ok(texts)
}
