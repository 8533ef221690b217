//! Unpacking template archives into a project directory.

use crate::error::{Result, SpecifyError};
use crate::paths;
use serde_json::Value;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};

/// Extract a zip archive held in memory into `dest`.
///
/// When every entry sits under one non-hidden top-level directory, that
/// directory is stripped. Existing files are overwritten, except
/// `.vscode/settings.json`, which is deep-merged. Returns the written paths
/// relative to `dest`.
pub fn extract_zip(bytes: &[u8], dest: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    if archive.is_empty() {
        return Err(SpecifyError::EmptyArchive);
    }

    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        match file.enclosed_name() {
            Some(path) => names.push(Some(path)),
            None => {
                tracing::warn!(entry = file.name(), "skipping archive entry outside destination");
                names.push(None);
            }
        }
    }
    let strip = common_root(names.iter().flatten());
    if let Some(root) = &strip {
        tracing::debug!(root = %root.display(), "flattening archive root directory");
    }

    std::fs::create_dir_all(dest)?;
    let mut written = Vec::new();
    for (i, name) in names.into_iter().enumerate() {
        let Some(name) = name else { continue };
        let rel = match &strip {
            Some(root) => match name.strip_prefix(root) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
                _ => continue,
            },
            None => name,
        };

        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            std::fs::create_dir_all(dest.join(&rel))?;
            continue;
        }
        let mode = file.unix_mode();
        let declared = file.size();
        let data = read_entry(&mut file, declared)?;
        install_file(dest, &rel, &data, mode)?;
        written.push(rel);
    }

    tracing::debug!(files = written.len(), dest = %dest.display(), "extracted template archive");
    Ok(written)
}

/// Largest buffer reserved up front for one entry. Declared sizes come from
/// the archive itself and are not trusted beyond this.
const MAX_PREALLOC: u64 = 1 << 20;

fn read_entry<R: Read>(mut reader: R, declared: u64) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(declared.min(MAX_PREALLOC) as usize);
    reader.read_to_end(&mut data)?;
    Ok(data)
}

/// Write one bundle file below `dest`, applying the settings merge rule.
pub fn install_file(dest: &Path, rel: &Path, data: &[u8], mode: Option<u32>) -> Result<()> {
    let target = dest.join(rel);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if rel == Path::new(paths::VSCODE_SETTINGS) && target.exists() {
        return merge_settings_file(&target, data);
    }

    std::fs::write(&target, data)?;
    set_mode(&target, mode)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if let Some(mode) = mode.map(|m| m & 0o777).filter(|m| *m != 0) {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}

/// Top-level directory shared by every entry, if there is exactly one.
fn common_root<'a>(names: impl Iterator<Item = &'a PathBuf>) -> Option<PathBuf> {
    let mut root: Option<PathBuf> = None;
    let mut nested = false;
    for name in names {
        let mut components = name.components();
        let first = match components.next() {
            Some(Component::Normal(first)) => PathBuf::from(first),
            _ => return None,
        };
        if components.next().is_some() {
            nested = true;
        }
        match &root {
            Some(r) if *r != first => return None,
            Some(_) => {}
            None => root = Some(first),
        }
    }
    let root = root?;
    let hidden = root.to_string_lossy().starts_with('.');
    (nested && !hidden).then_some(root)
}

/// Merge incoming JSON into an existing settings file. An existing file that
/// does not parse as plain JSON is left alone.
fn merge_settings_file(target: &Path, incoming: &[u8]) -> Result<()> {
    let existing = std::fs::read_to_string(target)?;
    let mut base: Value = match serde_json::from_str(&existing) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(
                path = %target.display(),
                error = %e,
                "existing settings are not plain JSON; leaving them unchanged"
            );
            return Ok(());
        }
    };
    let incoming: Value = serde_json::from_slice(incoming)?;
    merge_json(&mut base, incoming);
    let mut out = serde_json::to_string_pretty(&base)?;
    out.push('\n');
    std::fs::write(target, out)?;
    Ok(())
}

/// Recursively merge `incoming` into `base`. Objects merge key by key; any
/// other value in `incoming` replaces the one in `base`.
pub fn merge_json(base: &mut Value, incoming: Value) {
    match (base, incoming) {
        (Value::Object(base), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, incoming) => *base = incoming,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
