#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::time::SystemTime;

use crate::model::{Entry, ListingRow, ListingView, SortKey, SortSpec};
use crate::state::SelectionStore;

/// Filters, sorts, and joins selection flags over a raw listing.
///
/// Directories always group before files. `descending` flips the secondary
/// key only, never that grouping; the reference behavior works this way and
/// it is preserved deliberately.
pub fn apply(
    entries: Vec<Entry>,
    hidden_visible: bool,
    query: &str,
    sort: SortSpec,
    selection: &SelectionStore,
) -> ListingView {
    let query = query.trim().to_lowercase();
    let mut entries: Vec<Entry> = entries
        .into_iter()
        .filter(|e| hidden_visible || !e.name.starts_with('.'))
        .filter(|e| query.is_empty() || e.name.to_lowercase().contains(&query))
        .collect();

    entries.sort_by(|a, b| {
        if a.is_dir != b.is_dir {
            return if a.is_dir { Ordering::Less } else { Ordering::Greater };
        }
        let ordering = match sort.key {
            SortKey::Name => cmp_name(a, b),
            SortKey::Size => cmp_size(a, b).then_with(|| cmp_name(a, b)),
            SortKey::Date => cmp_time(a, b).then_with(|| cmp_name(a, b)),
        };
        if sort.descending { ordering.reverse() } else { ordering }
    });

    let rows = entries
        .into_iter()
        .map(|entry| {
            let selected = selection.contains(&entry.path);
            ListingRow { entry, selected }
        })
        .collect();
    ListingView { rows }
}

fn cmp_name(a: &Entry, b: &Entry) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

fn cmp_size(a: &Entry, b: &Entry) -> Ordering {
    a.size.cmp(&b.size)
}

fn cmp_time(a: &Entry, b: &Entry) -> Ordering {
    let a_time = a.modified.unwrap_or(SystemTime::UNIX_EPOCH);
    let b_time = b.modified.unwrap_or(SystemTime::UNIX_EPOCH);
    a_time.cmp(&b_time)
}
