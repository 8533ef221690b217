use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from leaving half-rendered templates behind.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}

/// True if `dir` exists and has at least one entry.
pub fn dir_has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Set `0o755`-style execute bits on a single file, mirroring each read bit.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    let mode = perms.mode();
    let new_mode = mode | ((mode & 0o444) >> 2);
    if new_mode == mode {
        return Ok(false);
    }
    perms.set_mode(new_mode);
    std::fs::set_permissions(path, perms)?;
    Ok(true)
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<bool> {
    Ok(false)
}

/// Walk `dir` and make every `*.sh` file that starts with a shebang executable.
///
/// Returns the files whose mode changed. A missing directory is not an error.
pub fn ensure_executable_scripts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut updated = Vec::new();
    if !dir.is_dir() {
        return Ok(updated);
    }
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                stack.push(path);
                continue;
            }
            if !file_type.is_file() || path.extension().and_then(|e| e.to_str()) != Some("sh") {
                continue;
            }
            if !has_shebang(&path)? {
                continue;
            }
            if make_executable(&path)? {
                tracing::debug!(path = %path.display(), "made script executable");
                updated.push(path);
            }
        }
    }
    updated.sort();
    Ok(updated)
}

fn has_shebang(path: &Path) -> Result<bool> {
    use std::io::Read;
    let mut head = [0u8; 2];
    let mut f = std::fs::File::open(path)?;
    let n = f.read(&mut head)?;
    Ok(n == 2 && &head == b"#!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c/test.md");
        atomic_write(&path, b"data").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "data");
    }

    #[test]
    fn write_if_missing_skips_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("existing.txt");
        std::fs::write(&path, b"original").unwrap();
        let written = write_if_missing(&path, b"new").unwrap();
        assert!(!written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn dir_has_entries_detects_empty() {
        let dir = TempDir::new().unwrap();
        assert!(!dir_has_entries(dir.path()));
        std::fs::write(dir.path().join("x"), b"").unwrap();
        assert!(dir_has_entries(dir.path()));
        assert!(!dir_has_entries(&dir.path().join("missing")));
    }

    #[cfg(unix)]
    #[test]
    fn executable_fixup_only_touches_shebang_scripts() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("bash");
        std::fs::create_dir_all(&nested).unwrap();
        let script = nested.join("run.sh");
        let plain = nested.join("notes.sh");
        let other = nested.join("readme.md");
        std::fs::write(&script, "#!/usr/bin/env bash\necho hi\n").unwrap();
        std::fs::write(&plain, "echo no shebang\n").unwrap();
        std::fs::write(&other, "#!not a script").unwrap();
        for p in [&script, &plain, &other] {
            std::fs::set_permissions(p, std::fs::Permissions::from_mode(0o644)).unwrap();
        }

        let updated = ensure_executable_scripts(dir.path()).unwrap();
        assert_eq!(updated, vec![script.clone()]);
        let mode = std::fs::metadata(&script).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);
        let mode = std::fs::metadata(&plain).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);

        // Second pass has nothing left to change.
        assert!(ensure_executable_scripts(dir.path()).unwrap().is_empty());
    }
}
