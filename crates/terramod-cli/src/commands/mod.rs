//! Command implementations.

pub mod checksum;
pub mod completion;
pub mod package;
pub mod publish;

use crate::progress::CliProgress;
use terramod_core::ArchiveOptions;
use terramod_core::NestedDirPolicy;
use terramod_core::NoopProgress;
use terramod_core::ProgressCallback;

/// Picks a progress sink: a bar on interactive human output, nothing otherwise.
pub fn progress_for(label: &str, show: bool) -> Box<dyn ProgressCallback> {
    if show && CliProgress::should_show() {
        Box::new(CliProgress::new(label))
    } else {
        Box::new(NoopProgress)
    }
}

pub const fn nested_dir_policy(skip_nested_dirs: bool) -> NestedDirPolicy {
    if skip_nested_dirs {
        NestedDirPolicy::Skip
    } else {
        NestedDirPolicy::Reject
    }
}

pub fn archive_options(compression_level: Option<u8>) -> ArchiveOptions {
    let options = ArchiveOptions::default();
    match compression_level {
        Some(level) => options.with_compression_level(level),
        None => options,
    }
}
