#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::archive;
use crate::error::{FmError, Result};
use crate::fs_ops;
use crate::listing;
use crate::model::{ListingView, Properties, SortKey, SortSpec};
use crate::open::{DocumentOpener, guess_mime};
use crate::state::{ClipboardMode, ClipboardStore, SelectionStore};

/// Yes/no confirmation, presented by the embedding shell. The guarded
/// action runs only on an affirmative answer.
pub trait ConfirmDialog {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Single-line text input, presented by the embedding shell. `None` means
/// the user cancelled; the pending intent is then abandoned without side
/// effects. Returned text is trimmed before use.
pub trait InputDialog {
    fn prompt(&mut self, title: &str, placeholder: &str, default: &str) -> Option<String>;
}

/// The controller: owns the navigation state, selection, clipboard, and the
/// current listing view, and wires user intents to the engine. Every
/// mutation re-queries the pipeline; every failure becomes a transient
/// status notice rather than an abort.
#[derive(Debug)]
pub struct Browser {
    cwd: PathBuf,
    show_hidden: bool,
    query: String,
    sort: SortSpec,
    selection: SelectionStore,
    clipboard: ClipboardStore,
    view: ListingView,
    status: String,
}

impl Browser {
    pub fn new(start: &Path) -> Result<Self> {
        let cwd = fs::canonicalize(start).map_err(|e| FmError::from_io(e, start))?;
        let mut browser = Self {
            cwd,
            show_hidden: false,
            query: String::new(),
            sort: SortSpec::default(),
            selection: SelectionStore::default(),
            clipboard: ClipboardStore::default(),
            view: ListingView::default(),
            status: "Ready".to_string(),
        };
        browser.reload();
        Ok(browser)
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn view(&self) -> &ListingView {
        &self.view
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn hidden_visible(&self) -> bool {
        self.show_hidden
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn clipboard(&self) -> &ClipboardStore {
        &self.clipboard
    }

    // ---- navigation ----

    pub fn navigate_to(&mut self, path: &Path) {
        let path = match fs::canonicalize(path) {
            Ok(path) => path,
            Err(_) => {
                self.status = format!("Path not found: {}", path.display());
                return;
            }
        };
        debug!(path = %path.display(), "navigate");
        self.cwd = path;
        // Navigation clears the selection; a plain reload keeps it.
        self.selection.clear();
        self.reload();
    }

    pub fn go_up(&mut self) {
        if let Some(parent) = self.cwd.parent().map(Path::to_path_buf) {
            self.navigate_to(&parent);
        }
    }

    /// Re-reads the current directory and rebuilds the view. Selected paths
    /// that vanished externally stay in the selection store; they simply no
    /// longer render as selected rows.
    pub fn reload(&mut self) {
        match fs_ops::read_entries(&self.cwd) {
            Ok(entries) => {
                self.view = listing::apply(
                    entries,
                    self.show_hidden,
                    &self.query,
                    self.sort,
                    &self.selection,
                );
                self.status = format!("{} items", self.view.len());
            }
            Err(err) => self.status = format!("Error: {err}"),
        }
    }

    // ---- listing options ----

    pub fn toggle_hidden(&mut self) {
        self.show_hidden = !self.show_hidden;
        self.reload();
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.reload();
    }

    /// Same key again flips the direction; a new key starts ascending.
    pub fn set_sort(&mut self, key: SortKey) {
        if self.sort.key == key {
            self.sort.descending = !self.sort.descending;
        } else {
            self.sort = SortSpec { key, descending: false };
        }
        self.reload();
    }

    // ---- selection ----

    pub fn toggle_select(&mut self, index: usize) {
        let Some(path) = self.view.entry(index).map(|e| e.path.clone()) else {
            return;
        };
        self.selection.toggle(&path);
        self.refresh_selection_flags();
        self.status = format!("Selected: {}", self.selection.len());
    }

    pub fn select_all(&mut self) {
        let paths: Vec<PathBuf> = self.view.rows.iter().map(|r| r.entry.path.clone()).collect();
        self.selection.select_all(paths);
        self.refresh_selection_flags();
        self.status = format!("Selected: {}", self.selection.len());
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.refresh_selection_flags();
        self.status = "Selected: 0".to_string();
    }

    fn refresh_selection_flags(&mut self) {
        for row in &mut self.view.rows {
            row.selected = self.selection.contains(&row.entry.path);
        }
    }

    // ---- opening ----

    pub fn open_entry(&mut self, index: usize, opener: &mut dyn DocumentOpener) {
        let Some(entry) = self.view.entry(index) else { return };
        if entry.is_dir {
            let path = entry.path.clone();
            self.navigate_to(&path);
            return;
        }
        let path = entry.path.clone();
        let mime = guess_mime(&path);
        if let Err(message) = opener.open(&path, mime) {
            self.status = message;
        }
    }

    // ---- mutations ----

    pub fn new_folder(&mut self, input: &mut dyn InputDialog) {
        let Some(name) = self.ask(input, "New Folder", "Folder name", "New Folder") else {
            return;
        };
        match fs_ops::create_folder(&self.cwd, &name) {
            Ok(_) => {
                self.reload();
                self.status = format!("Created {name}");
            }
            Err(err) => self.status = format!("Error: {err}"),
        }
    }

    pub fn rename_selected(&mut self, input: &mut dyn InputDialog) {
        let Some(src) = self.selection.single().cloned() else {
            self.status = "Select exactly one item to rename".to_string();
            return;
        };
        let current = src
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let Some(new_name) = self.ask(input, "Rename", "New name", &current) else {
            return;
        };
        match fs_ops::rename_entry(&src, &new_name) {
            Ok(dest) => {
                self.selection.replace_with(dest);
                self.reload();
                self.status = format!("Renamed to {new_name}");
            }
            Err(err) => self.status = format!("Error: {err}"),
        }
    }

    pub fn delete_selected(&mut self, confirm: &mut dyn ConfirmDialog) {
        if self.selection.is_empty() {
            self.status = "Nothing selected".to_string();
            return;
        }
        let count = self.selection.len();
        if !confirm.confirm(&format!("Delete {count} item(s)?")) {
            return;
        }
        let report = fs_ops::delete_paths(&self.selection.to_vec());
        self.selection.clear();
        self.reload();
        self.status = report.summary("Deleted");
    }

    pub fn copy_selection(&mut self) {
        self.stage_clipboard(ClipboardMode::Copy);
    }

    pub fn cut_selection(&mut self) {
        self.stage_clipboard(ClipboardMode::Cut);
    }

    fn stage_clipboard(&mut self, mode: ClipboardMode) {
        if !self.clipboard.stage(self.selection.to_vec(), mode) {
            self.status = match mode {
                ClipboardMode::Copy => "Select files to copy",
                ClipboardMode::Cut => "Select files to cut",
            }
            .to_string();
            return;
        }
        let verb = match mode {
            ClipboardMode::Copy => "Copied",
            ClipboardMode::Cut => "Cut",
        };
        self.status = format!("{verb} {} to clipboard", self.clipboard.len());
    }

    /// Pastes the staged paths into the current directory. Copy-mode pastes
    /// deduplicate colliding names and keep the clipboard staged; cut-mode
    /// moves without collision resolution and clears the clipboard only
    /// after the whole batch has run.
    pub fn paste(&mut self) {
        if self.clipboard.is_empty() {
            self.status = "Clipboard empty".to_string();
            return;
        }
        let staged: Vec<PathBuf> = self.clipboard.peek().to_vec();
        let summary = match self.clipboard.mode() {
            Some(ClipboardMode::Copy) | None => {
                let report = fs_ops::copy_paths(&staged, &self.cwd);
                report.summary("Copied")
            }
            Some(ClipboardMode::Cut) => {
                let report = fs_ops::move_paths(&staged, &self.cwd);
                self.clipboard.clear();
                report.summary("Moved")
            }
        };
        // Reload first; the batch summary must survive as the visible notice.
        self.reload();
        self.status = summary;
    }

    // ---- archive ----

    pub fn zip_selection(&mut self, input: &mut dyn InputDialog) {
        if self.selection.is_empty() {
            self.status = "Select files/folders to zip".to_string();
            return;
        }
        let Some(name) = self.ask(input, "Zip", "archive name", "archive.zip") else {
            return;
        };
        let name = if name.to_lowercase().ends_with(".zip") {
            name
        } else {
            format!("{name}.zip")
        };
        let output = self.cwd.join(&name);
        let mut sources = self.selection.to_vec();
        sources.sort();
        match archive::create_archive(&sources, &output) {
            Ok(()) => {
                self.reload();
                self.status = format!("Created {name}");
            }
            Err(err) => self.status = format!("Error: {err}"),
        }
    }

    pub fn unzip_selected(&mut self, input: &mut dyn InputDialog) {
        let Some(src) = self.selection.single().cloned() else {
            self.status = "Select exactly one .zip file".to_string();
            return;
        };
        if !src.to_string_lossy().to_lowercase().ends_with(".zip") {
            self.status = "Not a .zip file".to_string();
            return;
        }
        let default = src
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let Some(target) = self.ask(input, "Unzip", "folder name", &default) else {
            return;
        };
        let dest = self.cwd.join(&target);
        match archive::extract_archive(&src, &dest) {
            Ok(()) => {
                self.reload();
                self.status = format!("Extracted to {target}");
            }
            Err(err) => self.status = format!("Error: {err}"),
        }
    }

    // ---- properties ----

    pub fn properties(&mut self) -> Option<Properties> {
        if self.selection.is_empty() {
            self.status = "Select item(s)".to_string();
            return None;
        }
        let props = fs_ops::aggregate_properties(&self.selection.to_vec());
        self.status = format!(
            "Items: {}  Files: {}  Size: {} bytes",
            props.item_count, props.file_count, props.total_bytes
        );
        Some(props)
    }

    /// Runs a text-input dialog; cancellation or a blank answer abandons
    /// the intent.
    fn ask(
        &mut self,
        input: &mut dyn InputDialog,
        title: &str,
        placeholder: &str,
        default: &str,
    ) -> Option<String> {
        let answer = input.prompt(title, placeholder, default)?;
        let answer = answer.trim().to_string();
        if answer.is_empty() { None } else { Some(answer) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct AlwaysYes;
    impl ConfirmDialog for AlwaysYes {
        fn confirm(&mut self, _message: &str) -> bool {
            true
        }
    }

    struct AlwaysNo;
    impl ConfirmDialog for AlwaysNo {
        fn confirm(&mut self, _message: &str) -> bool {
            false
        }
    }

    struct Answer(Option<String>);
    impl InputDialog for Answer {
        fn prompt(&mut self, _title: &str, _placeholder: &str, default: &str) -> Option<String> {
            self.0.clone().map(|s| if s.is_empty() { default.to_string() } else { s })
        }
    }

    fn row_names(browser: &Browser) -> Vec<String> {
        browser
            .view()
            .rows
            .iter()
            .map(|r| r.entry.name.clone())
            .collect()
    }

    fn index_of(browser: &Browser, name: &str) -> usize {
        browser
            .view()
            .rows
            .iter()
            .position(|r| r.entry.name == name)
            .unwrap()
    }

    #[test]
    fn navigation_clears_selection_but_reload_keeps_it() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), b"x").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();

        let mut browser = Browser::new(temp.path()).unwrap();
        browser.toggle_select(index_of(&browser, "a.txt"));
        assert_eq!(browser.selection().len(), 1);

        browser.reload();
        assert_eq!(browser.selection().len(), 1);

        let sub = temp.path().join("sub");
        browser.navigate_to(&sub);
        assert_eq!(browser.selection().len(), 0);
    }

    #[test]
    fn name_sort_keeps_directories_first_when_descending() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.txt"), vec![0u8; 10]).unwrap();
        fs::create_dir(temp.path().join("A")).unwrap();

        let mut browser = Browser::new(temp.path()).unwrap();
        assert_eq!(row_names(&browser), ["A", "b.txt"]);
        // Same key again flips direction; grouping stays.
        browser.set_sort(SortKey::Name);
        assert!(browser.sort().descending);
        assert_eq!(row_names(&browser), ["A", "b.txt"]);
    }

    #[test]
    fn delete_requires_confirmation() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("doomed.txt");
        fs::write(&file, b"x").unwrap();

        let mut browser = Browser::new(temp.path()).unwrap();
        browser.toggle_select(0);
        browser.delete_selected(&mut AlwaysNo);
        assert!(file.exists());

        browser.delete_selected(&mut AlwaysYes);
        assert!(!file.exists());
        assert_eq!(browser.status(), "Deleted 1 item(s)");
        assert_eq!(browser.selection().len(), 0);
    }

    #[test]
    fn cancelled_input_abandons_new_folder() {
        let temp = TempDir::new().unwrap();
        let mut browser = Browser::new(temp.path()).unwrap();
        browser.new_folder(&mut Answer(None));
        assert_eq!(browser.view().len(), 0);

        browser.new_folder(&mut Answer(Some("docs".to_string())));
        assert!(temp.path().join("docs").is_dir());
        assert_eq!(browser.status(), "Created docs");
    }

    #[test]
    fn rename_updates_selection_to_new_path() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("old.txt"), b"x").unwrap();

        let mut browser = Browser::new(temp.path()).unwrap();
        browser.toggle_select(0);
        browser.rename_selected(&mut Answer(Some("new.txt".to_string())));
        assert!(temp.path().join("new.txt").exists());
        let renamed_index = index_of(&browser, "new.txt");
        assert!(browser.view().rows[renamed_index].selected);
    }

    #[test]
    fn rename_needs_exactly_one_selected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a"), b"x").unwrap();
        fs::write(temp.path().join("b"), b"x").unwrap();

        let mut browser = Browser::new(temp.path()).unwrap();
        browser.select_all();
        browser.rename_selected(&mut Answer(Some("c".to_string())));
        assert_eq!(browser.status(), "Select exactly one item to rename");
        assert!(temp.path().join("a").exists());
    }

    #[test]
    fn copy_paste_dedupes_and_keeps_clipboard() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), b"payload").unwrap();

        let mut browser = Browser::new(temp.path()).unwrap();
        browser.toggle_select(0);
        browser.copy_selection();
        assert_eq!(browser.clipboard().len(), 1);

        browser.paste();
        assert!(temp.path().join("a (1).txt").exists());
        // The batch summary is the visible notice even though paste reloads.
        assert_eq!(browser.status(), "Copied 1 item(s)");
        // Copy-mode paste leaves the clipboard staged for another paste.
        assert_eq!(browser.clipboard().len(), 1);
        browser.paste();
        assert!(temp.path().join("a (2).txt").exists());
    }

    #[test]
    fn cut_paste_moves_and_clears_clipboard() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("file.txt");
        fs::write(&src, b"x").unwrap();
        fs::create_dir(temp.path().join("dest")).unwrap();

        let mut browser = Browser::new(temp.path()).unwrap();
        browser.toggle_select(index_of(&browser, "file.txt"));
        browser.cut_selection();

        let dest = temp.path().join("dest");
        browser.navigate_to(&dest);
        browser.paste();
        assert!(!src.exists());
        assert!(dest.join("file.txt").exists());
        assert!(browser.clipboard().is_empty());
        assert_eq!(browser.status(), "Moved 1 item(s)");
    }

    #[test]
    fn staging_empty_selection_names_the_mode() {
        let temp = TempDir::new().unwrap();
        let mut browser = Browser::new(temp.path()).unwrap();
        browser.copy_selection();
        assert_eq!(browser.status(), "Select files to copy");
        browser.cut_selection();
        assert_eq!(browser.status(), "Select files to cut");
    }

    #[test]
    fn paste_with_empty_clipboard_is_a_notice() {
        let temp = TempDir::new().unwrap();
        let mut browser = Browser::new(temp.path()).unwrap();
        browser.paste();
        assert_eq!(browser.status(), "Clipboard empty");
    }

    #[test]
    fn search_narrows_the_view() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Report.pdf"), b"x").unwrap();
        fs::write(temp.path().join("notes.txt"), b"x").unwrap();

        let mut browser = Browser::new(temp.path()).unwrap();
        browser.set_query("report");
        assert_eq!(row_names(&browser), ["Report.pdf"]);
        browser.set_query("");
        assert_eq!(browser.view().len(), 2);
    }

    #[test]
    fn unzip_rejects_non_zip_selection() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("plain.txt"), b"x").unwrap();

        let mut browser = Browser::new(temp.path()).unwrap();
        browser.toggle_select(0);
        browser.unzip_selected(&mut Answer(Some("out".to_string())));
        assert_eq!(browser.status(), "Not a .zip file");
    }

    #[test]
    fn open_entry_routes_directories_and_files() {
        struct Recorder {
            opened: Vec<(PathBuf, String)>,
            fail: bool,
        }
        impl crate::open::DocumentOpener for Recorder {
            fn open(&mut self, path: &Path, mime: &str) -> std::result::Result<(), String> {
                self.opened.push((path.to_path_buf(), mime.to_string()));
                if self.fail {
                    Err("No viewer app found".to_string())
                } else {
                    Ok(())
                }
            }
        }

        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("song.mp3"), b"x").unwrap();

        let mut browser = Browser::new(temp.path()).unwrap();
        let mut opener = Recorder { opened: Vec::new(), fail: false };

        browser.open_entry(index_of(&browser, "sub"), &mut opener);
        assert!(browser.cwd().ends_with("sub"));
        assert!(opener.opened.is_empty());

        browser.go_up();
        browser.open_entry(index_of(&browser, "song.mp3"), &mut opener);
        assert_eq!(opener.opened.len(), 1);
        assert_eq!(opener.opened[0].1, "audio/mpeg");

        let mut failing = Recorder { opened: Vec::new(), fail: true };
        browser.open_entry(index_of(&browser, "song.mp3"), &mut failing);
        assert_eq!(browser.status(), "No viewer app found");
    }

    #[test]
    fn properties_requires_a_selection() {
        let temp = TempDir::new().unwrap();
        let mut browser = Browser::new(temp.path()).unwrap();
        assert!(browser.properties().is_none());
        assert_eq!(browser.status(), "Select item(s)");
    }
}
