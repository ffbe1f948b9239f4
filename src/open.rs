#![forbid(unsafe_code)]

use std::path::Path;

/// Hands a file to the host platform's document-viewing facility.
///
/// A missing handler is an `Err` with a user-presentable message, never a
/// panic; the browser turns it into a status notice.
pub trait DocumentOpener {
    fn open(&mut self, path: &Path, mime: &str) -> std::result::Result<(), String>;
}

/// Best-guess content type from the file extension, `*/*` when unknown.
pub fn guess_mime(path: &Path) -> &'static str {
    mime_guess::from_path(path).first_raw().unwrap_or("*/*")
}
