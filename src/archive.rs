#![forbid(unsafe_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{FmError, Result};

/// Writes a deflate-compressed zip of `paths` to `output`.
///
/// A directory member contributes every contained file under a name relative
/// to the member's parent, so the member's own folder name stays as a prefix
/// inside the archive. A file member is stored under its bare name. Creation
/// is all-or-nothing: on failure the partial output is removed, since a zip
/// without its end-of-central-directory record is useless on disk.
pub fn create_archive(paths: &[PathBuf], output: &Path) -> Result<()> {
    match write_zip(paths, output) {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = fs::remove_file(output);
            Err(FmError::ArchiveWriteFailed { source: err })
        }
    }
}

fn write_zip(paths: &[PathBuf], output: &Path) -> io::Result<()> {
    let file = fs::File::create(output)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for src in paths {
        if src.is_dir() {
            let base = src.parent().unwrap_or(src);
            for file_path in walk_files(src) {
                let name = archive_name(&file_path, base)?;
                add_file(&mut writer, &file_path, &name, options)?;
            }
        } else {
            let name = src
                .file_name()
                .ok_or_else(|| io::Error::other("source has no file name"))?
                .to_string_lossy()
                .to_string();
            add_file(&mut writer, src, &name, options)?;
        }
    }
    writer.finish().map_err(zip_to_io)?;
    Ok(())
}

fn add_file(
    writer: &mut ZipWriter<fs::File>,
    path: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> io::Result<()> {
    debug!(%name, "adding archive entry");
    writer.start_file(name, options).map_err(zip_to_io)?;
    let mut src = fs::File::open(path)?;
    io::copy(&mut src, writer)?;
    Ok(())
}

/// Entry names always use forward slashes, whatever the host convention.
fn archive_name(path: &Path, base: &Path) -> io::Result<String> {
    let rel = path
        .strip_prefix(base)
        .map_err(|_| io::Error::other("entry escapes archive base"))?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Ok(parts.join("/"))
}

fn walk_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(read) = fs::read_dir(&dir) else { continue };
        for entry in read.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Extracts `archive` under `dest`, creating `dest` if absent and preserving
/// the entries' relative paths. Entries whose names would escape `dest` are
/// skipped.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive).map_err(|e| FmError::from_io(e, archive))?;
    let mut reader = match ZipArchive::new(file) {
        Ok(reader) => reader,
        Err(ZipError::InvalidArchive(_)) => {
            return Err(FmError::NotAnArchive(archive.to_path_buf()));
        }
        Err(err) => return Err(FmError::ArchiveReadFailed { source: zip_to_io(err) }),
    };
    fs::create_dir_all(dest).map_err(|e| FmError::from_io(e, dest))?;

    for i in 0..reader.len() {
        let mut entry = reader
            .by_index(i)
            .map_err(|err| FmError::ArchiveReadFailed { source: zip_to_io(err) })?;
        let Some(rel) = entry.enclosed_name() else {
            warn!(name = entry.name(), "skipping entry escaping destination");
            continue;
        };
        let target = dest.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| FmError::from_io(e, &target))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| FmError::from_io(e, parent))?;
        }
        let mut out = fs::File::create(&target).map_err(|e| FmError::from_io(e, &target))?;
        io::copy(&mut entry, &mut out)
            .map_err(|source| FmError::ArchiveReadFailed { source })?;
    }
    Ok(())
}

fn zip_to_io(err: ZipError) -> io::Error {
    match err {
        ZipError::Io(err) => err,
        other => io::Error::other(other),
    }
}
