//! Module archive creation.
//!
//! Walks a module directory in a deterministic order and writes a ZIP
//! archive whose entries are rooted at the directory's base name.

pub mod walker;
pub mod zip;

pub use walker::EntryType;
pub use walker::ModuleWalker;
pub use walker::WalkEntry;
pub use self::zip::create_module_archive;
pub use self::zip::create_module_archive_with_progress;
