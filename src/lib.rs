#![forbid(unsafe_code)]

//! File-system operation engine for a touch-oriented file browser.
//!
//! The crate enumerates, filters, sorts, and mutates a directory tree on
//! behalf of a user-driven selection, tolerating partial failures without
//! corrupting browser state. Rendering, gesture dispatch, and the platform
//! "open with" hand-off stay outside; they plug in through the dialog and
//! [`open::DocumentOpener`] traits.

pub mod app;
pub mod archive;
pub mod error;
pub mod fs_ops;
pub mod listing;
pub mod model;
pub mod open;
pub mod state;

pub use app::{Browser, ConfirmDialog, InputDialog};
pub use error::{FmError, Result};
pub use model::{BatchReport, Entry, ListingRow, ListingView, Properties, SortKey, SortSpec};
pub use state::{ClipboardMode, ClipboardStore, SelectionStore};
