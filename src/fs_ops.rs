#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{FmError, Result};
use crate::model::{BatchReport, Entry, Properties};

/// Lists the immediate children of `dir` with metadata.
///
/// Fails with `NotFound`/`AccessDenied` when the directory itself cannot be
/// opened. Children that cannot be stat-ed are omitted rather than surfaced;
/// mobile storage routinely exposes unreadable system entries. Symlinks are
/// classified by the link itself, never the target.
pub fn read_entries(dir: &Path) -> Result<Vec<Entry>> {
    let read = fs::read_dir(dir).map_err(|e| FmError::from_io(e, dir))?;
    let mut entries = Vec::new();
    for item in read {
        let Ok(item) = item else { continue };
        // DirEntry::metadata does not traverse symlinks.
        let Ok(metadata) = item.metadata() else {
            debug!(path = %item.path().display(), "skipping unreadable entry");
            continue;
        };
        let is_dir = metadata.is_dir();
        let name = item.file_name().to_string_lossy().to_string();
        entries.push(Entry {
            name,
            path: item.path(),
            is_dir,
            size: if is_dir { 0 } else { metadata.len() },
            modified: metadata.modified().ok(),
        });
    }
    Ok(entries)
}

/// Finds a collision-free variant of `candidate` by probing ` (1)`, ` (2)`, …
/// suffixes on the stem. A candidate that does not exist is returned as is.
pub fn dedupe_name(candidate: &Path) -> PathBuf {
    if !candidate.exists() {
        return candidate.to_path_buf();
    }
    let parent = candidate.parent().unwrap_or(Path::new(""));
    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = candidate
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let mut i = 1u32;
    loop {
        let probe = parent.join(format!("{stem} ({i}){ext}"));
        if !probe.exists() {
            return probe;
        }
        i += 1;
    }
}

/// Creates `parent/name`. Missing intermediate ancestors are an error, not
/// auto-created.
pub fn create_folder(parent: &Path, name: &str) -> Result<PathBuf> {
    let target = parent.join(name);
    if target.exists() {
        return Err(FmError::AlreadyExists(target));
    }
    fs::create_dir(&target).map_err(|e| FmError::from_io(e, &target))?;
    Ok(target)
}

/// Renames `old` to a sibling named `new_name`.
pub fn rename_entry(old: &Path, new_name: &str) -> Result<PathBuf> {
    let parent = old.parent().unwrap_or(Path::new(""));
    let dest = parent.join(new_name);
    fs::rename(old, &dest).map_err(|source| FmError::RenameFailed { source })?;
    Ok(dest)
}

/// Removes every path in `paths`, recursively for directories. Failures are
/// collected per item; the batch never aborts early.
pub fn delete_paths(paths: &[PathBuf]) -> BatchReport {
    let mut report = BatchReport::default();
    for path in paths {
        match remove_path(path) {
            Ok(()) => report.record_ok(),
            Err(err) => {
                warn!(path = %path.display(), %err, "delete failed");
                report.record_failure(path.clone(), err);
            }
        }
    }
    report
}

/// Copies every source into `dest_dir` under its base name, deduplicating
/// the target name on collision. Per-item failures are isolated.
pub fn copy_paths(paths: &[PathBuf], dest_dir: &Path) -> BatchReport {
    let mut report = BatchReport::default();
    for src in paths {
        let target = dedupe_name(&join_basename(dest_dir, src));
        match copy_entry(src, &target) {
            Ok(()) => report.record_ok(),
            Err(err) => {
                warn!(src = %src.display(), %err, "copy failed");
                report.record_failure(src.clone(), err);
            }
        }
    }
    report
}

/// Relocates every source into `dest_dir` under its base name. No collision
/// resolution; an existing target fails or is overwritten by the underlying
/// rename, matching native move semantics.
pub fn move_paths(paths: &[PathBuf], dest_dir: &Path) -> BatchReport {
    let mut report = BatchReport::default();
    for src in paths {
        let target = join_basename(dest_dir, src);
        match move_entry(src, &target) {
            Ok(()) => report.record_ok(),
            Err(err) => {
                warn!(src = %src.display(), %err, "move failed");
                report.record_failure(src.clone(), err);
            }
        }
    }
    report
}

fn join_basename(dest_dir: &Path, src: &Path) -> PathBuf {
    dest_dir.join(src.file_name().unwrap_or_default())
}

pub fn remove_path(path: &Path) -> Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| FmError::from_io(e, path))
}

pub fn copy_entry(src: &Path, dest: &Path) -> Result<()> {
    if src.is_dir() {
        copy_dir_recursive(src, dest)
    } else {
        copy_file(src, dest)
    }
}

fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    fs::copy(src, dest).map_err(|e| FmError::from_io(e, src))?;
    // Keep the source's modification timestamp on the copy; best effort.
    if let Ok(metadata) = fs::metadata(src) {
        if let (Ok(mtime), Ok(file)) = (metadata.modified(), fs::File::options().write(true).open(dest)) {
            let _ = file.set_modified(mtime);
        }
    }
    Ok(())
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    if !dest.exists() {
        fs::create_dir_all(dest).map_err(|e| FmError::from_io(e, dest))?;
    }
    let read = fs::read_dir(src).map_err(|e| FmError::from_io(e, src))?;
    for entry in read {
        let entry = entry.map_err(FmError::Io)?;
        let path = entry.path();
        let target = dest.join(entry.file_name());
        if path.is_dir() {
            copy_dir_recursive(&path, &target)?;
        } else {
            copy_file(&path, &target)?;
        }
    }
    Ok(())
}

pub fn move_entry(src: &Path, dest: &Path) -> Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        // Cross-device rename; fall back to copy then delete.
        Err(_) => {
            copy_entry(src, dest)?;
            remove_path(src)
        }
    }
}

/// Recursive file/size totals over a selection. Unreadable descendants are
/// skipped silently, the same best-effort policy as `read_entries`.
pub fn aggregate_properties(paths: &[PathBuf]) -> Properties {
    let mut props = Properties {
        item_count: paths.len(),
        ..Properties::default()
    };
    let mut stack: Vec<PathBuf> = Vec::new();
    for path in paths {
        if path.is_dir() {
            stack.push(path.clone());
        } else if let Ok(metadata) = fs::metadata(path) {
            props.file_count += 1;
            props.total_bytes += metadata.len();
        }
    }
    while let Some(dir) = stack.pop() {
        let Ok(read) = fs::read_dir(&dir) else { continue };
        for entry in read.flatten() {
            let Ok(metadata) = entry.metadata() else { continue };
            if metadata.is_dir() {
                stack.push(entry.path());
            } else {
                props.file_count += 1;
                props.total_bytes += metadata.len();
            }
        }
    }
    props
}
