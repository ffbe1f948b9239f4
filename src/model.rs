#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::time::SystemTime;

use crate::error::FmError;

/// One file-system node surfaced by a directory listing. Entries are built
/// fresh on every listing pass and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    /// Size in bytes; directories report 0.
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl Entry {
    /// Base-1024 size with one decimal, `<DIR>` for directories.
    pub fn human_size(&self) -> String {
        if self.is_dir {
            return "<DIR>".to_string();
        }
        let mut size = self.size as f64;
        for unit in ["B", "KB", "MB", "GB", "TB"] {
            if size < 1024.0 {
                return format!("{size:.1} {unit}");
            }
            size /= 1024.0;
        }
        format!("{size:.1} PB")
    }

    /// `YYYY-MM-DD HH:MM` in the local offset, empty when unknown.
    pub fn human_mtime(&self) -> String {
        format_mtime(self.modified)
    }
}

pub fn format_mtime(time: Option<SystemTime>) -> String {
    let Some(time) = time else {
        return String::new();
    };
    let Ok(fmt) = time::format_description::parse("[year]-[month]-[day] [hour]:[minute]") else {
        return String::new();
    };
    let offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let dt = time::OffsetDateTime::from(time).to_offset(offset);
    dt.format(&fmt).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Size,
    Date,
}

/// Ordering among same-kind entries. Directories always group before files;
/// `descending` reverses the secondary key only, never the grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub descending: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self { key: SortKey::Name, descending: false }
    }
}

/// One row of a rendered listing. The selected flag is joined in from the
/// selection store when the view is built; it is never stored on the entry.
#[derive(Debug, Clone)]
pub struct ListingRow {
    pub entry: Entry,
    pub selected: bool,
}

/// Filtered, sorted view over one directory listing. Replaced wholesale on
/// every reload.
#[derive(Debug, Clone, Default)]
pub struct ListingView {
    pub rows: Vec<ListingRow>,
}

impl ListingView {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.rows.get(index).map(|row| &row.entry)
    }
}

/// Outcome of a batch operation. The batch always runs to completion; one
/// bad item never aborts the rest.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failures: Vec<(PathBuf, FmError)>,
}

impl BatchReport {
    pub fn record_ok(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, path: PathBuf, err: FmError) {
        self.failures.push((path, err));
    }

    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Short aggregate line for the status bar, e.g. `Deleted 3 item(s), 1 failed`.
    pub fn summary(&self, verb: &str) -> String {
        if self.failures.is_empty() {
            format!("{verb} {} item(s)", self.succeeded)
        } else {
            format!(
                "{verb} {} item(s), {} failed",
                self.succeeded,
                self.failures.len()
            )
        }
    }
}

/// Recursive totals over a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Properties {
    pub item_count: usize,
    pub file_count: usize,
    pub total_bytes: u64,
}
