//! Package command implementation.

use super::archive_options;
use super::nested_dir_policy;
use super::progress_for;
use crate::cli::PackageArgs;
use crate::error::add_package_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use terramod_core::PackageConfig;
use terramod_core::package_with_progress;

pub fn execute(args: &PackageArgs, formatter: &dyn OutputFormatter, show_progress: bool) -> Result<()> {
    let config = PackageConfig::new(&args.module_dir, args.module_version.as_str())
        .with_output_dir(&args.output_dir)
        .with_archive_options(archive_options(args.compression_level))
        .with_nested_dirs(nested_dir_policy(args.skip_nested_dirs));

    let mut progress = progress_for("Packaging", show_progress);
    let report = add_package_context(package_with_progress(&config, progress.as_mut()))?;
    drop(progress);

    formatter.format_package_result(&report)
}
